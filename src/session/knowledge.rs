use std::fmt;

/// Per-topic mastery estimate used as the agent's state.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeState {
    mastery: Vec<f32>,
}

impl KnowledgeState {
    pub fn new(num_topics: usize, initial: f32) -> Self {
        Self {
            mastery: vec![initial; num_topics],
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.mastery
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.mastery.clone()
    }

    pub fn get(&self, topic: usize) -> Option<f32> {
        self.mastery.get(topic).copied()
    }

    pub fn record_correct(&mut self, topic: usize, step: f32) {
        if let Some(mastery) = self.mastery.get_mut(topic) {
            *mastery += step;
        }
    }

    pub fn len(&self) -> usize {
        self.mastery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mastery.is_empty()
    }
}

impl fmt::Display for KnowledgeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, mastery) in self.mastery.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{mastery:.2}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answers_raise_one_topic() {
        let mut knowledge = KnowledgeState::new(3, 0.2);
        knowledge.record_correct(1, 0.1);

        assert_eq!(knowledge.get(0), Some(0.2));
        assert!((knowledge.get(1).unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(knowledge.to_string(), "[0.20 0.30 0.20]");
    }

    #[test]
    fn unknown_topic_is_ignored() {
        let mut knowledge = KnowledgeState::new(2, 0.2);
        assert!(!knowledge.is_empty());
        knowledge.record_correct(5, 0.1);
        assert_eq!(knowledge.as_slice(), &[0.2, 0.2]);
    }
}
