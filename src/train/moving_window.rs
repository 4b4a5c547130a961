use crate::error::{Error, Result};

/// Fixed-capacity circular buffer of recent losses.
///
/// Unfilled slots hold `f64::MAX`, so the mean of a young window stays huge
/// and cannot trigger early stopping on its own.
#[derive(Debug, Clone)]
pub struct MovingWindow {
    values: Vec<f64>,
    next: usize,
    filled: usize,
}

impl MovingWindow {
    pub fn new(capacity: usize) -> Result<MovingWindow> {
        if capacity == 0 {
            return Err(Error::InvalidConfig("moving window needs a positive capacity".into()));
        }
        Ok(MovingWindow {
            values: vec![f64::MAX; capacity],
            next: 0,
            filled: 0,
        })
    }

    /// Window size used by the trainer: a tenth of the query count, rounded
    /// up, and never below two.
    pub fn capacity_for(queries: usize) -> usize {
        ((queries + 9) / 10).max(2)
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Number of real (non-sentinel) values currently held.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Overwrites the oldest slot.
    pub fn push(&mut self, value: f64) {
        let capacity = self.values.len();
        self.values[self.next] = value;
        self.next = (self.next + 1) % capacity;
        self.filled = (self.filled + 1).min(capacity);
    }

    /// Mean over every slot, sentinels included. Each term is scaled before
    /// summing so a window of sentinels stays finite.
    pub fn mean(&self) -> f64 {
        let capacity = self.values.len() as f64;
        self.values.iter().map(|v| v / capacity).sum()
    }
}
