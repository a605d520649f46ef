use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rlquiz::{
    ConsoleLearner, DefaultBackend, DqnAgent, Learner, QNetwork, QuestionBank, QuizConfig,
    Session, SimulatedLearner, TabularEstimator, ValueEstimator, logging,
};
use std::path::PathBuf;
use tracing::info;

/// Step size of the lookup-table estimator
const TABLE_LEARNING_RATE: f32 = 0.1;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EstimatorKind {
    /// Multilayer perceptron trained with Adam
    Mlp,
    /// Lookup table keyed on the exact state
    Table,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Adaptive quiz that learns which question to ask next")]
struct Cli {
    /// JSON question bank
    #[arg(short, long)]
    bank: PathBuf,

    /// TOML config, defaults are used for anything missing
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of questions to ask
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Seed for the agent and the simulated learner
    #[arg(long)]
    seed: Option<u64>,

    /// Transcript file, appended to
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Don't write a transcript
    #[arg(long, conflicts_with = "transcript")]
    no_transcript: bool,

    /// Answer with a simulated learner instead of reading stdin
    #[arg(long)]
    simulate: bool,

    #[arg(long, value_enum, default_value_t = EstimatorKind::Mlp)]
    estimator: EstimatorKind,

    /// Print the effective config and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => QuizConfig::load(path)?,
        None => QuizConfig::default(),
    };
    if let Some(episodes) = cli.episodes {
        config.session.episodes = episodes;
    }
    if let Some(seed) = cli.seed {
        config.agent.random_seed = seed;
    }
    if let Some(transcript) = cli.transcript {
        config.session.transcript = transcript;
    }
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let transcript = (!cli.no_transcript).then_some(config.session.transcript.as_path());
    logging::init(transcript).context("failed to set up logging")?;

    let bank = QuestionBank::load(&cli.bank)
        .with_context(|| format!("failed to load question bank {:?}", cli.bank))?;
    info!(
        "Loaded {} questions across {} topics",
        bank.len(),
        bank.num_topics()
    );

    let learner: Box<dyn Learner> = if cli.simulate {
        Box::new(SimulatedLearner::new(
            config.session.simulated_accuracy,
            config.agent.random_seed,
        ))
    } else {
        Box::new(ConsoleLearner::stdio())
    };

    match cli.estimator {
        EstimatorKind::Mlp => {
            let network = QNetwork::<DefaultBackend>::new(
                bank.num_topics(),
                bank.len(),
                &config.agent,
                Default::default(),
            );
            run(network, bank, learner, config)
        }
        EstimatorKind::Table => {
            let table = TabularEstimator::new(bank.len(), TABLE_LEARNING_RATE);
            run(table, bank, learner, config)
        }
    }
}

fn run<E: ValueEstimator>(
    estimator: E,
    bank: QuestionBank,
    learner: Box<dyn Learner>,
    config: QuizConfig,
) -> Result<()> {
    let agent = DqnAgent::new(estimator, bank.action_meta(), config.agent, config.selector)?;
    let mut session = Session::new(agent, bank, learner, config.session)?;
    session.run()?;

    info!("Done! The agent should now recommend more of what you need.");
    Ok(())
}
