pub mod agent;
pub mod base;
pub mod config;
pub mod error;
pub mod logging;
pub mod selector;
pub mod session;
pub mod utils;

pub use burn;

pub use agent::{
    DqnAgent, Epsilon,
    config::AgentConfig,
    net::{DefaultBackend, QNetwork},
};
pub use base::{ReplayMemory, TabularEstimator, Transition, ValueEstimator};
pub use config::QuizConfig;
pub use error::{Error, Result};
pub use selector::{ActionMeta, ChainSelector, SelectorConfig};
pub use session::{
    ConsoleLearner, KnowledgeState, Learner, Question, QuestionBank, Session, SessionConfig,
    SimulatedLearner,
};
pub use utils::Report;
