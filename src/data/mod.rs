// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw parallel text files
// all the way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   train.de / train.en  (one sentence per line)
//       │
//       ▼
//   ParallelCorpusLoader → reads and aligns the line files
//       │
//       ▼
//   Preprocessor         → cleans text (whitespace, encoding)
//       │
//       ▼
//   Tokenizer            → text → ordered token strings / IDs
//       │
//       ▼
//   Vocabulary           → token ↔ index mapping with cutoffs
//       │
//       ▼
//   TranslationDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   bucketing            → groups similarly-lengthed sources
//       │                  so padding waste is minimal
//       ▼
//   TranslationBatcher   → pads and stacks into tensor batches
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Loads aligned parallel line files from a directory
pub mod loader;

/// Cleans and normalises raw corpus text
pub mod preprocessor;

/// Per-language token ↔ index mapping with frequency/size cutoffs
pub mod vocab;

/// Implements Burn's Dataset trait for numericalised pairs
pub mod dataset;

/// Length-bucketed batch scheduling (BucketIterator semantics)
pub mod bucketing;

/// Implements Burn's Batcher trait to create padded tensor batches
pub mod batcher;
