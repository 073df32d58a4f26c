use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::models::{AnalysisResult, CaptureBuffer};
use crate::global_constants;

/// One retained past capture: the image, what the model said about it, and
/// when it happened (epoch milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub image: CaptureBuffer,
    pub result: AnalysisResult,
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn build_now(image: CaptureBuffer, result: AnalysisResult) -> Self {
        Self {
            image,
            result,
            timestamp: epoch_millis_now(),
        }
    }
}

fn epoch_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Bounded newest-first list of past captures. Prepending past capacity
/// evicts from the tail, so the most recent twenty entries always survive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureHistory {
    entries: Vec<HistoryEntry>,
}

impl CaptureHistory {
    pub fn capacity() -> usize {
        global_constants::HISTORY_CAPACITY
    }

    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(Self::capacity());
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
