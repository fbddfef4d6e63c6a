//! Crawl frontier: FIFO queue of raw URLs, visited set of normalized URLs,
//! and the page budget that bounds the whole run.

use crate::normalize::normalize;
use std::collections::{HashSet, VecDeque};

#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    budget: usize,
}

impl Frontier {
    pub fn new(budget: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            budget,
        }
    }

    /// Append a URL unless its normalized form is already visited or
    /// already waiting in the queue. The raw URL is what gets stored.
    pub fn enqueue(&mut self, url: &str) {
        let normalized = normalize(url);
        if self.visited.contains(&normalized) {
            return;
        }
        if self.queue.iter().any(|queued| normalize(queued) == normalized) {
            return;
        }
        self.queue.push_back(url.to_string());
    }

    /// Pop the next URL and mark its normalized form visited in the same
    /// step, so the URL cannot be re-enqueued while it is being scanned.
    /// Returns the normalized URL, which keys the page record.
    pub fn dequeue(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        let normalized = normalize(&url);
        self.visited.insert(normalized.clone());
        Some(normalized)
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty() || self.visited.len() >= self.budget
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }
}
