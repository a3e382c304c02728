use crate::error::BufferError;
use crate::key::Key;
use std::collections::{HashSet, VecDeque};

/// A bounded FIFO queue of fetched keys that have not been issued yet.
///
/// The buffer is not synchronized; [`KeyGenerator`](crate::KeyGenerator)
/// owns it behind its lock.
#[derive(Debug)]
pub struct KeyBuffer {
    keys: VecDeque<Key>,
    capacity: usize,
}

impl KeyBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a batch of keys in arrival order.
    ///
    /// The whole batch is rejected, leaving the buffer untouched, if it would
    /// exceed the capacity or put two equal keys in the buffer.
    pub fn enqueue(&mut self, batch: Vec<Key>) -> Result<(), BufferError> {
        if self.keys.len() + batch.len() > self.capacity {
            return Err(BufferError::Overflow {
                capacity: self.capacity,
                occupied: self.keys.len(),
                incoming: batch.len(),
            });
        }

        let mut seen: HashSet<&Key> = self.keys.iter().collect();
        if let Some(duplicate) = batch.iter().find(|key| !seen.insert(*key)) {
            return Err(BufferError::DuplicateKey(duplicate.clone()));
        }

        self.keys.extend(batch);
        Ok(())
    }

    /// Removes and returns the oldest key.
    pub fn dequeue(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
