use super::config::AgentConfig;
use crate::{
    base::ValueEstimator,
    error::{Error, Result},
};
use burn::{
    LearningRate,
    backend::{Autodiff, NdArray},
    module::AutodiffModule,
    nn::{
        Initializer, Linear, LinearConfig,
        loss::{MseLoss, Reduction},
    },
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    prelude::*,
    tensor::{ElementConversion, activation::relu, backend::AutodiffBackend},
};

/// CPU backend used by the quiz binary.
pub type DefaultBackend = Autodiff<NdArray>;

#[derive(Module, Debug)]
pub struct Net<B: Backend> {
    layers: Vec<Linear<B>>,
}

impl<B: Backend> Net<B> {
    pub fn new(
        input_size: usize,
        output_size: usize,
        layer_sizes: &[usize],
        device: &B::Device,
    ) -> Self {
        let initializer = Initializer::XavierUniform { gain: 1.0 };

        let mut sizes = Vec::with_capacity(layer_sizes.len() + 2);
        sizes.push(input_size);
        sizes.extend_from_slice(layer_sizes);
        sizes.push(output_size);

        let layers = sizes
            .windows(2)
            .map(|pair| {
                LinearConfig::new(pair[0], pair[1])
                    .with_initializer(initializer.clone())
                    .init(device)
            })
            .collect();

        Self { layers }
    }

    /// Hidden layers use ReLU, the output layer is linear.
    pub fn forward(&self, mut input: Tensor<B, 2>) -> Tensor<B, 2> {
        let num_layers = self.layers.len();
        for layer in &self.layers[..num_layers - 1] {
            input = relu(layer.forward(input));
        }

        self.layers[num_layers - 1].forward(input)
    }
}

fn update_parameters<B: AutodiffBackend, M: AutodiffModule<B>>(
    loss: Tensor<B, 1>,
    module: M,
    optimizer: &mut impl Optimizer<M, B>,
    learning_rate: LearningRate,
) -> M {
    let gradients = loss.backward();
    let gradient_params = GradientsParams::from_grads(gradients, &module);
    optimizer.step(learning_rate, module, gradient_params)
}

/// Multilayer perceptron mapping the knowledge state to one value per question,
/// trained with Adam on a mean squared error loss.
pub struct QNetwork<B: AutodiffBackend> {
    net: Net<B>,
    optimizer: OptimizerAdaptor<Adam, Net<B>, B>,
    learning_rate: LearningRate,
    state_size: usize,
    action_count: usize,
    device: B::Device,
}

impl<B: AutodiffBackend> QNetwork<B> {
    pub fn new(
        state_size: usize,
        action_count: usize,
        config: &AgentConfig,
        device: B::Device,
    ) -> Self {
        B::seed(config.random_seed);

        Self {
            net: Net::new(state_size, action_count, &config.layer_sizes, &device),
            optimizer: AdamConfig::new().with_epsilon(1e-7).init(),
            learning_rate: config.learning_rate,
            state_size,
            action_count,
            device,
        }
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    fn row_tensor(&self, values: &[f32]) -> Tensor<B, 2> {
        Tensor::from_data(
            TensorData::new(values.to_vec(), [1, values.len()]),
            &self.device,
        )
    }
}

impl<B: AutodiffBackend> ValueEstimator for QNetwork<B> {
    fn action_count(&self) -> usize {
        self.action_count
    }

    fn predict(&self, state: &[f32]) -> Result<Vec<f32>> {
        Error::check_len("state", self.state_size, state.len())?;

        let output = self.net.forward(self.row_tensor(state)).detach();
        let values = output
            .into_data()
            .convert::<f32>()
            .into_vec::<f32>()
            .map_err(|e| Error::Estimator(format!("{e:?}")))?;

        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite("network prediction"));
        }
        Ok(values)
    }

    fn update(&mut self, state: &[f32], target: &[f32]) -> Result<f32> {
        Error::check_len("state", self.state_size, state.len())?;
        Error::check_len("target", self.action_count, target.len())?;

        let output = self.net.forward(self.row_tensor(state));
        let loss = MseLoss::new().forward(output, self.row_tensor(target), Reduction::Mean);

        let loss_value = loss.clone().detach().into_scalar().elem::<f32>();
        if !loss_value.is_finite() {
            return Err(Error::NonFinite("training loss"));
        }

        self.net = update_parameters(
            loss,
            self.net.clone(),
            &mut self.optimizer,
            self.learning_rate,
        );

        Ok(loss_value)
    }
}
