//! Fixed-capacity ring buffer for experience replay.
//!
//! Appends are O(1); once full, each append overwrites the oldest slot.

use rand::Rng;
use rand::seq::index;

use crate::structs::transition::ReplayTransition;

#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    slots: Vec<ReplayTransition>,
    capacity: usize,
    /// Slot the next append writes to once the buffer is full.
    head: usize,
}

impl ReplayBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, transition: ReplayTransition) {
        if self.slots.len() < self.capacity {
            self.slots.push(transition);
        } else {
            self.slots[self.head] = transition;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = &ReplayTransition> {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Uniform sample of `n` distinct transitions. Returns fewer when the
    /// buffer holds fewer than `n`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<&ReplayTransition> {
        let amount = n.min(self.slots.len());
        index::sample(rng, self.slots.len(), amount)
            .into_iter()
            .map(|i| &self.slots[i])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn t(action: usize) -> ReplayTransition {
        ReplayTransition {
            state: vec![0.0],
            action,
            reward: 0.0,
            next_state: vec![0.0],
            done: false,
        }
    }

    #[test]
    fn evicts_oldest_once_full() {
        let mut buf = ReplayBuffer::with_capacity(3);
        for a in 0..5 {
            buf.push(t(a));
        }
        assert_eq!(buf.len(), 3);
        let order: Vec<usize> = buf.iter().map(|x| x.action).collect();
        assert_eq!(order, vec![2, 3, 4]);
    }

    #[test]
    fn sample_is_without_replacement() {
        let mut buf = ReplayBuffer::with_capacity(10);
        for a in 0..10 {
            buf.push(t(a));
        }
        let mut rng = StdRng::seed_from_u64(7);
        let mut picked: Vec<usize> = buf.sample(&mut rng, 10).iter().map(|x| x.action).collect();
        picked.sort_unstable();
        assert_eq!(picked, (0..10).collect::<Vec<_>>());
    }
}
