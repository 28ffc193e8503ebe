//! Waiting queue
//!
//! FIFO of users looking for a partner. First to search is first matched.
//! A user appears at most once.

use std::collections::VecDeque;

use crate::types::UserId;

#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<UserId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail unless already waiting
    ///
    /// Returns true if the user was added.
    pub fn enqueue(&mut self, id: UserId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push_back(id);
        true
    }

    /// Remove and return the longest-waiting user
    pub fn dequeue_oldest(&mut self) -> Option<UserId> {
        self.entries.pop_front()
    }

    /// Remove a user wherever it sits in the queue
    ///
    /// Returns true if the user was waiting.
    pub fn remove(&mut self, id: UserId) -> bool {
        match self.entries.iter().position(|&e| e == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
