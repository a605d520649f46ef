pub mod bank;
pub mod knowledge;
pub mod learner;

pub use bank::{Question, QuestionBank};
pub use knowledge::KnowledgeState;
pub use learner::{ConsoleLearner, Learner, SimulatedLearner};

use crate::{
    agent::DqnAgent,
    base::{Transition, ValueEstimator},
    error::{Error, Result},
    utils::Report,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Questions asked per run
    pub episodes: usize,
    /// Starting mastery of every topic
    pub initial_mastery: f32,
    /// Added to a topic's mastery on every correct answer
    pub mastery_step: f32,
    /// Session transcript, appended to
    pub transcript: PathBuf,
    /// Base accuracy of the simulated learner
    pub simulated_accuracy: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            episodes: 25,
            initial_mastery: 0.2,
            mastery_step: 0.1,
            transcript: PathBuf::from("session_log.txt"),
            simulated_accuracy: 0.3,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.initial_mastery.is_finite() || !self.mastery_step.is_finite() {
            return Err(Error::Config("session mastery values must be finite".into()));
        }
        if self.mastery_step < 0.0 {
            return Err(Error::Config(format!(
                "session.mastery_step must not be negative, got {}",
                self.mastery_step
            )));
        }
        if !(0.0..=1.0).contains(&self.simulated_accuracy) {
            return Err(Error::Config(format!(
                "session.simulated_accuracy must be in [0, 1], got {}",
                self.simulated_accuracy
            )));
        }
        Ok(())
    }
}

/// What happened when one question was asked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub action: usize,
    pub response: Option<usize>,
    pub correct: bool,
    pub reward: f32,
}

/// Quiz loop: the agent picks a question, the learner answers, and the
/// resulting transition is stored and learned from.
pub struct Session<E: ValueEstimator, L: Learner> {
    agent: DqnAgent<E>,
    bank: QuestionBank,
    learner: L,
    knowledge: KnowledgeState,
    config: SessionConfig,
    prev_action: Option<usize>,
    report: Report,
}

impl<E: ValueEstimator, L: Learner> Session<E, L> {
    pub fn new(
        agent: DqnAgent<E>,
        bank: QuestionBank,
        learner: L,
        config: SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        Error::check_len("agent actions", bank.len(), agent.actions().len())?;

        let knowledge = KnowledgeState::new(bank.num_topics(), config.initial_mastery);
        Ok(Self {
            agent,
            bank,
            learner,
            knowledge,
            config,
            prev_action: None,
            report: Report::default(),
        })
    }

    /// Asks one question and learns from the answer.
    pub fn step(&mut self) -> Result<Episode> {
        let state = self.knowledge.to_vec();
        let action = self.agent.act(&state, self.prev_action)?;
        let question = self.bank.get(action).ok_or(Error::InvalidAction {
            action,
            count: self.bank.len(),
        })?;

        info!("Q: {}", question.question);
        for (i, option) in question.options.iter().enumerate() {
            info!("  {i}: {option}");
        }

        let response = self.learner.answer(question, &self.knowledge)?;
        if response.is_none() {
            warn!("Unreadable answer, counting it as incorrect");
        }
        let correct = question.is_correct(response);
        if correct {
            info!("Correct!");
            self.knowledge
                .record_correct(question.topic, self.config.mastery_step);
        } else {
            info!("Incorrect. Correct answer is: {}", question.correct_option());
        }

        let reward = if correct { 1.0 } else { 0.0 };
        self.agent.remember(Transition::new(
            state,
            action,
            reward,
            self.knowledge.to_vec(),
            false,
        ));

        let batch_size = self.agent.config().batch_size;
        if let Some(learned) = self.agent.learn(batch_size)? {
            debug!(loss = learned["Value loss"].value(), "learned from replay");
            self.report["Value loss"] += learned["Value loss"];
            self.report["Learning steps"] += 1usize.into();
        }

        self.report["Questions"] += 1usize.into();
        self.report["Correct"] += (correct as usize).into();
        self.prev_action = Some(action);

        info!("Current knowledge: {}", self.knowledge);

        Ok(Episode {
            action,
            response,
            correct,
            reward,
        })
    }

    /// Runs `config.episodes` questions and returns the session summary.
    pub fn run(&mut self) -> Result<Report> {
        for episode in 0..self.config.episodes {
            info!("Quiz session {}", episode + 1);
            self.step()?;
        }

        let report = self.summary();
        info!("{report}");
        Ok(report)
    }

    pub fn summary(&self) -> Report {
        let mut report = self.report.clone();

        let asked = report.get("Questions").map_or(0.0, |q| q.value());
        let correct = report.get("Correct").map_or(0.0, |c| c.value());
        report["Accuracy"] = (if asked > 0.0 { correct / asked } else { 0.0 }).into();
        report["Epsilon"] = self.agent.epsilon().into();
        report["Stored transitions"] = self.agent.memory().len().into();
        for (topic, mastery) in self.knowledge.as_slice().iter().enumerate() {
            report[format!("Mastery/topic {topic}")] = (*mastery).into();
        }
        report
    }

    pub fn agent(&self) -> &DqnAgent<E> {
        &self.agent
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn knowledge(&self) -> &KnowledgeState {
        &self.knowledge
    }

    pub fn prev_action(&self) -> Option<usize> {
        self.prev_action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agent::config::AgentConfig,
        base::TabularEstimator,
        selector::{ActionMeta, SelectorConfig},
    };

    /// Always answers with a fixed option.
    struct Fixed(Option<usize>);

    impl Learner for Fixed {
        fn answer(&mut self, _: &Question, _: &KnowledgeState) -> Result<Option<usize>> {
            Ok(self.0)
        }
    }

    fn bank() -> QuestionBank {
        QuestionBank::from_json(
            r#"[
                {"topic": 0, "difficulty": 1, "question": "a", "options": ["x", "y"], "answer": 0},
                {"topic": 1, "difficulty": 1, "question": "b", "options": ["x", "y"], "answer": 0},
                {"topic": 0, "difficulty": 2, "question": "c", "options": ["x", "y"], "answer": 0}
            ]"#,
        )
        .unwrap()
    }

    fn session<L: Learner>(learner: L, episodes: usize) -> Session<TabularEstimator, L> {
        let bank = bank();
        let agent = DqnAgent::new(
            TabularEstimator::new(bank.len(), 0.5),
            bank.action_meta(),
            AgentConfig {
                batch_size: 2,
                ..Default::default()
            },
            SelectorConfig::default(),
        )
        .unwrap();
        let config = SessionConfig {
            episodes,
            ..Default::default()
        };
        Session::new(agent, bank, learner, config).unwrap()
    }

    #[test]
    fn correct_answer_raises_mastery_and_rewards() {
        let mut session = session(Fixed(Some(0)), 1);
        let episode = session.step().unwrap();

        assert!(episode.correct);
        assert_eq!(episode.reward, 1.0);
        let topic = session.bank().get(episode.action).unwrap().topic;
        assert!((session.knowledge().get(topic).unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(session.prev_action(), Some(episode.action));
    }

    #[test]
    fn wrong_or_unreadable_answer_leaves_mastery() {
        for response in [Some(1), None] {
            let mut session = session(Fixed(response), 1);
            let episode = session.step().unwrap();

            assert!(!episode.correct);
            assert_eq!(episode.reward, 0.0);
            assert_eq!(session.knowledge().as_slice(), &[0.2, 0.2]);
        }
    }

    #[test]
    fn run_stores_every_transition_and_summarizes() {
        let mut session = session(Fixed(Some(0)), 6);
        let report = session.run().unwrap();

        assert_eq!(session.agent().memory().len(), 6);
        assert_eq!(report["Questions"].as_int(), 6);
        assert_eq!(report["Correct"].as_int(), 6);
        assert_eq!(report["Accuracy"].value(), 1.0);
        // learning starts once the batch of two is available
        assert_eq!(report["Learning steps"].as_int(), 5);
        for topic in 0..session.knowledge().len() {
            let mastery = report[format!("Mastery/topic {topic}")].value();
            assert_eq!(mastery, session.knowledge().get(topic).unwrap() as f64);
        }
        assert!(session.agent().memory().iter().all(|t| !t.done));
    }

    #[test]
    fn rejects_mismatched_agent() {
        let agent = DqnAgent::new(
            TabularEstimator::new(2, 0.5),
            vec![ActionMeta::new(0, 0); 2],
            AgentConfig::default(),
            SelectorConfig::default(),
        )
        .unwrap();
        let result = Session::new(agent, bank(), Fixed(None), SessionConfig::default());
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }
}
