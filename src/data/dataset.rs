use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One fully numericalised training example.
/// Both sides are wrapped as: <sos> token ids <eos>
/// Padding happens later, per batch, in the batcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSample {
    pub source_ids: Vec<u32>,
    pub target_ids: Vec<u32>,
}

impl TranslationSample {
    /// Source length including <sos>/<eos> — the bucketing key.
    pub fn src_len(&self) -> usize {
        self.source_ids.len()
    }
}

pub struct TranslationDataset {
    samples: Vec<TranslationSample>,
}

impl TranslationDataset {
    pub fn new(samples: Vec<TranslationSample>) -> Self {
        Self { samples }
    }

    /// Source lengths in index order, consumed by the bucketing scheduler.
    pub fn source_lengths(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.src_len()).collect()
    }
}

impl Dataset<TranslationSample> for TranslationDataset {
    fn get(&self, index: usize) -> Option<TranslationSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
