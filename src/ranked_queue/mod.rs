use std::collections::VecDeque;

use crate::error::{HuffError, Result};

/// Anything that can be ordered by a frequency weight.
pub trait Weighted {
    fn weight(&self) -> u64;
}

/// Priority queue over weights, lightest first.
///
/// Entries of equal weight leave in the order they were inserted: a new
/// entry always goes after every entry already present with the same weight.
#[derive(Debug, Clone)]
pub struct RankedQueue<T> {
    entries: VecDeque<T>,
}

impl<T> Default for RankedQueue<T> {
    fn default() -> Self {
        Self { entries: VecDeque::default() }
    }
}

impl<T: Weighted> RankedQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects weightless entries with [`HuffError::InvalidArgument`].
    pub fn insert(&mut self, node: T) -> Result<()> {
        let weight = node.weight();
        if weight == 0 {
            return Err(HuffError::InvalidArgument("cannot rank an entry of weight 0".to_string()));
        }

        // Common case during merging: the new node is at least as heavy as the tail
        if self.entries.back().map_or(true, |last| last.weight() <= weight) {
            self.entries.push_back(node);
            return Ok(());
        }

        let pos = self.entries.partition_point(|e| e.weight() <= weight);
        self.entries.insert(pos, node);
        Ok(())
    }

    pub fn remove_front(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    pub fn peek_front(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
