use crate::model::CooccurrenceModel;
use crate::scoring::Candidate;
use crate::trace::{Outcome, TraceEvent, TraceSink};
use crate::types::{Position, TokenId, GAP, SEED_SCORE};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub token: String,
    /// `None` only for seeds missing from the model's vocabulary.
    pub id: Option<TokenId>,
    pub forward_prob: f64,
    pub backward_prob: f64,
    /// Combined score, or the anchor-weighted score for diffusion placements.
    pub score: f64,
    /// Pass that installed the placement; 0 for seeds.
    pub pass: usize,
}

impl Placement {
    pub(crate) fn seed(model: &CooccurrenceModel, token: &str) -> Self {
        Self {
            token: token.to_string(),
            id: model.token_id(token),
            forward_prob: SEED_SCORE,
            backward_prob: SEED_SCORE,
            score: SEED_SCORE,
            pass: 0,
        }
    }

    pub(crate) fn generated(
        model: &CooccurrenceModel,
        candidate: &Candidate,
        score: f64,
        pass: usize,
    ) -> Self {
        Self {
            token: model.token(candidate.token).to_string(),
            id: Some(candidate.token),
            forward_prob: candidate.forward_prob,
            backward_prob: candidate.backward_prob,
            score,
            pass,
        }
    }

    pub fn is_seed(&self) -> bool {
        self.pass == 0
    }
}

/// Sparse position -> placement map over `1..=length`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    length: usize,
    slots: BTreeMap<Position, Placement>,
}

impl Sequence {
    pub fn empty(length: usize) -> Self {
        Self {
            length,
            slots: BTreeMap::new(),
        }
    }

    /// Places `seeds` at positions `1..`; seeds past `length` are dropped.
    pub(crate) fn seeded<S: AsRef<str>, T: TraceSink + ?Sized>(
        model: &CooccurrenceModel,
        seeds: &[S],
        length: usize,
        sink: &mut T,
    ) -> Self {
        let mut sequence = Self::empty(length);
        for (ix, seed) in seeds.iter().take(length).enumerate() {
            let position = ix + 1;
            sequence
                .slots
                .insert(position, Placement::seed(model, seed.as_ref()));
            sink.record(TraceEvent::Seed {
                position,
                token: seed.as_ref().to_string(),
            });
        }
        sequence
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn get(&self, position: Position) -> Option<&Placement> {
        self.slots.get(&position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Placement)> + '_ {
        self.slots.iter().map(|(position, placement)| (*position, placement))
    }

    pub fn occupied(&self) -> usize {
        self.slots.len()
    }

    /// Applies the merge precedence: seeds never move, gaps are filled, and an
    /// occupant is only displaced by a strictly higher score.
    pub(crate) fn offer(&mut self, position: Position, placement: Placement) -> Outcome {
        match self.slots.get_mut(&position) {
            None => {
                self.slots.insert(position, placement);
                Outcome::FillsGap
            }
            Some(existing) if existing.is_seed() => Outcome::KeepsSeed {
                seed: existing.token.clone(),
            },
            Some(existing) if placement.score > existing.score => {
                let previous = std::mem::replace(existing, placement);
                Outcome::Replaces {
                    previous: previous.token,
                    previous_score: previous.score,
                }
            }
            Some(existing) => Outcome::Keeps {
                existing: existing.token.clone(),
                existing_score: existing.score,
            },
        }
    }

    /// Occupant tokens for `1..=length`; `None` marks a gap.
    pub fn tokens(&self) -> Vec<Option<String>> {
        (1..=self.length)
            .map(|position| self.slots.get(&position).map(|p| p.token.clone()))
            .collect()
    }

    pub(crate) fn report<T: TraceSink + ?Sized>(&self, sink: &mut T, with_pass: bool) {
        for position in 1..=self.length {
            let placement = self.slots.get(&position);
            sink.record(TraceEvent::Final {
                position,
                token: placement.map(|p| p.token.clone()),
                score: placement.filter(|_| with_pass).map(|p| p.score),
                pass: placement.filter(|_| with_pass).map(|p| p.pass),
            });
        }
    }
}

/// Renders gaps as [`GAP`].
pub fn render(tokens: &[Option<String>]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| token.clone().unwrap_or_else(|| GAP.to_string()))
        .collect()
}

/// The non-gap tokens, space separated.
pub fn filled_text(tokens: &[Option<String>]) -> String {
    tokens
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
