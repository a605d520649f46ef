use crate::{
    error::{Error, Result},
    selector::ActionMeta,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// One multiple-choice question. Its position in the bank is its action index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub topic: usize,
    #[serde(default)]
    pub difficulty: i64,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub answer: usize,
}

impl Question {
    pub fn meta(&self) -> ActionMeta {
        ActionMeta::new(self.topic, self.difficulty)
    }

    /// `None` is an unreadable response and never matches.
    pub fn is_correct(&self, response: Option<usize>) -> bool {
        response == Some(self.answer)
    }

    pub fn correct_option(&self) -> &str {
        self.options.get(self.answer).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(Error::InvalidBank("the question bank is empty".into()));
        }

        for (i, question) in questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(Error::InvalidBank(format!("question {i} has no options")));
            }
            if question.answer >= question.options.len() {
                return Err(Error::InvalidBank(format!(
                    "question {i} answers option {} but only has {}",
                    question.answer,
                    question.options.len()
                )));
            }
        }

        Ok(Self { questions })
    }

    /// Parses a JSON array of questions.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::new(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, action: usize) -> Option<&Question> {
        self.questions.get(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// One more than the largest topic id.
    pub fn num_topics(&self) -> usize {
        self.questions.iter().map(|q| q.topic + 1).max().unwrap_or(0)
    }

    pub fn action_meta(&self) -> Vec<ActionMeta> {
        self.questions.iter().map(Question::meta).collect()
    }
}
