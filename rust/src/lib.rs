//! Fibonacci-offset co-occurrence models and seeded sequence generation.
//!
//! A [`CooccurrenceModel`] records, for every token and every offset in the
//! sequence 2, 3, 5, 8, ..., which tokens appear that far ahead of it and
//! that far behind it. Generation places seed tokens at positions `1..` and
//! extends them outward: a candidate is only accepted when the forward table
//! proposes it and the backward table confirms the relation, and candidates are
//! ranked by the product of both probabilities.
//!
//! - [`merge`] expands every seed once and merges the proposals.
//! - [`diffuse`] repeats the expansion for several passes, using every
//!   occupied position as a weighted anchor, so later passes can revise
//!   earlier choices.
//! - [`generate_dual_level`] runs syllable- and word-level generation side
//!   by side and aligns the two.

mod align;
mod config;
mod corpus;
mod counter;
mod engine;
mod error;
mod expand;
mod interner;
mod model;
mod offsets;
mod persist;
#[cfg(feature = "python")]
mod py_bindings;
mod scoring;
mod sequence;
mod syllable;
mod trace;
mod types;

#[cfg(test)]
mod tests;

pub use align::{align, generate_dual_level, similarity, Alignment, DualLevelOutput};
pub use config::{DualLevelConfig, ExtensionPolicy, GenerationConfig, TrainConfig};
pub use corpus::{read_corpus, tokenize};
pub use counter::TokenCounter;
pub use engine::{
    diffuse, diffuse_traced, merge, merge_traced, DiffusionAnalysis, DiffusionGeneration,
    Generation, MergeAnalysis, MergeGeneration, PassRecord,
};
pub use error::{FibError, FibResult};
pub use expand::{expand, expand_from, Expansion, RankedCandidates};
pub use model::{CooccurrenceKey, CooccurrenceModel, ModelBuilder};
pub use offsets::{fibonacci_offsets, Offsets};
pub use scoring::{rank, rank_candidates, score_candidates, score_pair, Candidate};
pub use sequence::{filled_text, render, Placement, Sequence};
pub use syllable::{split_all, SyllableSplitter, VowelGroupSplitter};
pub use trace::{LogSink, NullSink, Outcome, TraceEvent, TraceSink};
pub use types::{
    Direction, Offset, Position, TokenId, DEFAULT_DUAL_LENGTH, DEFAULT_LENGTH,
    DEFAULT_MAX_DISTANCE, DEFAULT_PASSES, DEFAULT_PROGRESS_INTERVAL, GAP, SEED_SCORE,
};

/// Runs [`diffuse`] with the length and pass count from `config`.
pub fn generate<S: AsRef<str>>(
    model: &CooccurrenceModel,
    seeds: &[S],
    config: &GenerationConfig,
) -> FibResult<DiffusionGeneration> {
    config.validate()?;
    Ok(diffuse(model, seeds, config.length, config.passes))
}
