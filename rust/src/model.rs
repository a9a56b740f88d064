use crate::config::TrainConfig;
use crate::corpus::read_corpus;
use crate::counter::TokenCounter;
use crate::error::FibResult;
use crate::interner::Interner;
use crate::offsets::{fibonacci_offsets, Offsets};
use crate::types::{Direction, Offset, TokenId, DEFAULT_PROGRESS_INTERVAL};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CooccurrenceKey {
    pub anchor: TokenId,
    pub offset: Offset,
}

pub(crate) type Table = FxHashMap<CooccurrenceKey, TokenCounter>;

/// Forward and backward offset-indexed co-occurrence counts over one corpus.
///
/// `forward[(t, d)]` counts the tokens seen `d` positions after each
/// occurrence of `t`; `backward[(t, d)]` counts those `d` positions before.
/// The model is immutable once built; see [`ModelBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct CooccurrenceModel {
    pub(crate) interner: Interner,
    pub(crate) forward: Table,
    pub(crate) backward: Table,
    pub(crate) max_distance: usize,
    pub(crate) offsets: Offsets,
}

impl CooccurrenceModel {
    /// Builds a model from `tokens` with offsets up to `max_distance`.
    pub fn build<S: AsRef<str>>(tokens: &[S], max_distance: usize) -> FibResult<Self> {
        ModelBuilder::new(max_distance).build(tokens)
    }

    pub fn train<S: AsRef<str>>(tokens: &[S], config: &TrainConfig) -> FibResult<Self> {
        config.validate()?;
        ModelBuilder::new(config.max_distance)
            .with_progress_interval(config.progress_interval)
            .build(tokens)
    }

    /// Tokenizes a text file and trains on it.
    pub fn train_file(path: impl AsRef<Path>, config: &TrainConfig) -> FibResult<Self> {
        let tokens = read_corpus(path)?;
        Self::train(&tokens, config)
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// Offsets recorded in the tables.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn token_id(&self, token: &str) -> Option<TokenId> {
        self.interner.maybe_id_for(token)
    }

    /// Panics if `id` did not come from this model.
    pub fn token(&self, id: TokenId) -> &str {
        self.interner.resolve(id)
    }

    pub fn vocabulary(&self) -> &[String] {
        self.interner.vocabulary()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.interner.len()
    }

    /// Counts observed `offset` positions away from `anchor` in `direction`.
    pub fn counts(&self, direction: Direction, anchor: TokenId, offset: Offset) -> Option<&TokenCounter> {
        let table = match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        };
        table.get(&CooccurrenceKey { anchor, offset })
    }

    /// String-level lookup of a single count; 0 when any part is unknown.
    pub fn observed(&self, direction: Direction, anchor: &str, offset: Offset, token: &str) -> u32 {
        let (Some(anchor), Some(token)) = (self.token_id(anchor), self.token_id(token)) else {
            return 0;
        };
        self.counts(direction, anchor, offset)
            .map(|counter| counter.count(token))
            .unwrap_or(0)
    }

    pub fn anchor_count(&self, direction: Direction) -> usize {
        let table = match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        };
        let mut anchors = table.keys().map(|key| key.anchor).collect::<Vec<_>>();
        anchors.sort_unstable();
        anchors.dedup();
        anchors.len()
    }
}

/// Accumulates co-occurrence counts and yields an immutable model.
pub struct ModelBuilder {
    interner: Interner,
    forward: Table,
    backward: Table,
    max_distance: usize,
    offsets: Offsets,
    progress_interval: usize,
}

impl ModelBuilder {
    pub fn new(max_distance: usize) -> Self {
        Self {
            interner: Interner::default(),
            forward: Table::default(),
            backward: Table::default(),
            max_distance,
            offsets: fibonacci_offsets(max_distance),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval.max(1);
        self
    }

    /// Counts every (position, offset) pair of `tokens` in one pass.
    pub fn build<S: AsRef<str>>(mut self, tokens: &[S]) -> FibResult<CooccurrenceModel> {
        log::info!(
            "building bidirectional model from {} tokens (max_distance={}, {} offsets)",
            tokens.len(),
            self.max_distance,
            self.offsets.len()
        );

        let ids = tokens
            .iter()
            .map(|token| self.interner.intern(token.as_ref()))
            .collect::<FibResult<Vec<_>>>()?;

        for (pos, current) in ids.iter().copied().enumerate() {
            for offset in self.offsets.iter().copied() {
                if let Some(future) = ids.get(pos + offset) {
                    self.forward
                        .entry(CooccurrenceKey {
                            anchor: current,
                            offset,
                        })
                        .or_default()
                        .add(*future, 1);
                }
                if let Some(past) = pos.checked_sub(offset).map(|past_pos| ids[past_pos]) {
                    self.backward
                        .entry(CooccurrenceKey {
                            anchor: current,
                            offset,
                        })
                        .or_default()
                        .add(past, 1);
                }
            }

            if pos > 0 && pos % self.progress_interval == 0 {
                log::info!("processed {pos} tokens");
            }
        }

        let model = CooccurrenceModel {
            interner: self.interner,
            forward: self.forward,
            backward: self.backward,
            max_distance: self.max_distance,
            offsets: self.offsets,
        };
        log::info!(
            "forward model: {} anchors, backward model: {} anchors, vocabulary: {}",
            model.anchor_count(Direction::Forward),
            model.anchor_count(Direction::Backward),
            model.vocabulary_size()
        );
        Ok(model)
    }
}
