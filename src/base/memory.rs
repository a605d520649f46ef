use rand::{Rng, seq::index};
use ringbuffer::{AllocRingBuffer, RingBuffer};

/// One step of interaction with the learner.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Vec<f32>,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: Vec<f32>,
        action: usize,
        reward: f32,
        next_state: Vec<f32>,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Bounded replay buffer, the oldest transition is dropped once full.
pub struct ReplayMemory {
    transitions: AllocRingBuffer<Transition>,
}

impl ReplayMemory {
    pub fn with_capacity(capacity: usize) -> Self {
        assert_ne!(capacity, 0, "Replay memory capacity must be non-zero");

        Self {
            transitions: AllocRingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, transition: Transition) {
        #[cfg(debug_assertions)]
        {
            // ensure no NaN values
            assert!(!transition.state.iter().any(|&x| x.is_nan()));
            assert!(!transition.next_state.iter().any(|&x| x.is_nan()));
            assert!(!transition.reward.is_nan());
        }

        self.transitions.push(transition);
    }

    /// Uniformly samples `batch_size` distinct transitions.
    ///
    /// Returns `None` while fewer than `batch_size` transitions are stored,
    /// the caller is expected to defer learning until the buffer fills up.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Option<Vec<&Transition>> {
        if self.len() < batch_size {
            return None;
        }

        let indices = index::sample(rng, self.len(), batch_size);
        Some(indices.into_iter().map(|i| &self.transitions[i]).collect())
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.transitions.capacity()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn transition(action: usize) -> Transition {
        Transition::new(vec![0.2, 0.4], action, 1.0, vec![0.3, 0.4], false)
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut memory = ReplayMemory::with_capacity(4);
        for action in 0..5 {
            memory.push(transition(action));
            assert!(memory.len() <= memory.capacity());
        }

        assert_eq!(memory.len(), 4);
        let actions: Vec<_> = memory.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![1, 2, 3, 4]);

        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.capacity(), 4);
    }

    #[test]
    fn sample_defers_until_enough_transitions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut memory = ReplayMemory::with_capacity(16);
        memory.push(transition(0));
        memory.push(transition(1));

        assert!(memory.sample(3, &mut rng).is_none());
        assert_eq!(memory.sample(2, &mut rng).map(|b| b.len()), Some(2));
    }

    #[test]
    fn sample_is_without_replacement() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut memory = ReplayMemory::with_capacity(32);
        for action in 0..32 {
            memory.push(transition(action));
        }

        for _ in 0..50 {
            let batch = memory.sample(8, &mut rng).unwrap();
            let unique: HashSet<_> = batch.iter().map(|t| t.action).collect();
            assert_eq!(unique.len(), 8);
        }
    }

    #[test]
    fn sample_is_reproducible_with_seed() {
        let mut memory = ReplayMemory::with_capacity(32);
        for action in 0..20 {
            memory.push(transition(action));
        }

        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            memory
                .sample(5, &mut rng)
                .unwrap()
                .into_iter()
                .map(|t| t.action)
                .collect::<Vec<_>>()
        };

        assert_eq!(draw(3), draw(3));
    }
}
