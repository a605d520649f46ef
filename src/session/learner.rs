use super::{bank::Question, knowledge::KnowledgeState};
use crate::error::{Error, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Whoever answers the quiz.
pub trait Learner {
    /// Returns the chosen option, or `None` when the response could not be read
    /// as an option index.
    fn answer(&mut self, question: &Question, knowledge: &KnowledgeState)
    -> Result<Option<usize>>;
}

impl<L: Learner + ?Sized> Learner for Box<L> {
    fn answer(
        &mut self,
        question: &Question,
        knowledge: &KnowledgeState,
    ) -> Result<Option<usize>> {
        (**self).answer(question, knowledge)
    }
}

/// Reads answers line by line, e.g. from stdin.
pub struct ConsoleLearner<R, W> {
    input: R,
    output: W,
}

impl ConsoleLearner<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleLearner<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Learner for ConsoleLearner<R, W> {
    fn answer(
        &mut self,
        question: &Question,
        _knowledge: &KnowledgeState,
    ) -> Result<Option<usize>> {
        let hint = (0..question.options.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(self.output, "Your answer ({hint}): ").map_err(Error::Learner)?;
        self.output.flush().map_err(Error::Learner)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(Error::Learner)?;
        let reply = line.trim();
        info!("Your answer ({hint}): {reply}");

        Ok(reply.parse::<usize>().ok())
    }
}

/// Answers correctly with probability `base_accuracy + mastery[topic]`.
pub struct SimulatedLearner {
    rng: StdRng,
    base_accuracy: f32,
}

impl SimulatedLearner {
    pub fn new(base_accuracy: f32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_accuracy,
        }
    }
}

impl Learner for SimulatedLearner {
    fn answer(
        &mut self,
        question: &Question,
        knowledge: &KnowledgeState,
    ) -> Result<Option<usize>> {
        let mastery = knowledge.get(question.topic).unwrap_or(0.0);
        let p_correct = (self.base_accuracy + mastery).clamp(0.0, 1.0) as f64;

        if self.rng.random_bool(p_correct) {
            return Ok(Some(question.answer));
        }

        let wrong: Vec<usize> = (0..question.options.len())
            .filter(|&i| i != question.answer)
            .collect();
        if wrong.is_empty() {
            return Ok(None);
        }
        Ok(Some(wrong[self.rng.random_range(0..wrong.len())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn question() -> Question {
        Question {
            topic: 0,
            difficulty: 0,
            question: "2 + 2?".into(),
            options: vec!["3".into(), "4".into(), "5".into()],
            answer: 1,
        }
    }

    #[test]
    fn console_parses_index_and_prompts() {
        let mut output = Vec::new();
        let mut learner = ConsoleLearner::new(" 1 \n".as_bytes(), &mut output);
        let knowledge = KnowledgeState::new(1, 0.2);

        assert_eq!(learner.answer(&question(), &knowledge).unwrap(), Some(1));
        assert_eq!(String::from_utf8(output).unwrap(), "Your answer (0/1/2): ");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn console_exchange_is_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let knowledge = KnowledgeState::new(1, 0.2);
        let mut learner = ConsoleLearner::new("2\n".as_bytes(), io::sink());
        let response = tracing::subscriber::with_default(subscriber, || {
            learner.answer(&question(), &knowledge).unwrap()
        });

        assert_eq!(response, Some(2));
        let log = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(log.contains("Your answer (0/1/2): 2"), "{log}");
    }

    #[test]
    fn console_malformed_input_is_sentinel() {
        let knowledge = KnowledgeState::new(1, 0.2);
        for input in ["abc\n", "-1\n", "\n", ""] {
            let mut learner = ConsoleLearner::new(input.as_bytes(), io::sink());
            assert_eq!(learner.answer(&question(), &knowledge).unwrap(), None);
        }
    }

    #[test]
    fn simulated_learner_follows_mastery() {
        let question = question();

        let mut expert = SimulatedLearner::new(0.0, 1);
        let knows_all = KnowledgeState::new(1, 1.0);
        for _ in 0..20 {
            assert_eq!(expert.answer(&question, &knows_all).unwrap(), Some(1));
        }

        let mut novice = SimulatedLearner::new(0.0, 1);
        let knows_nothing = KnowledgeState::new(1, 0.0);
        for _ in 0..20 {
            let response = novice.answer(&question, &knows_nothing).unwrap();
            assert!(matches!(response, Some(0) | Some(2)));
        }
    }
}
