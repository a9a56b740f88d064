use crate::model::CooccurrenceModel;
use crate::offsets::fibonacci_offsets;
use crate::scoring::{rank_candidates, Candidate};
use crate::types::{Direction, Position, TokenId};
use std::collections::BTreeMap;

/// Ranked candidates for one target position, as seen from one seed.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedCandidates {
    pub from_seed: TokenId,
    /// Negative for targets before the seed.
    pub offset: isize,
    pub candidates: Vec<Candidate>,
}

/// Everything one seed proposes, keyed by target position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    /// Top-ranked candidate per reachable position.
    pub proposals: BTreeMap<Position, Candidate>,
    pub analysis: BTreeMap<Position, RankedCandidates>,
}

impl Expansion {
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// Expands `seed` placed at `seed_pos` towards `1..=max_pos`.
///
/// Offsets are bounded by the room after the seed (`max_pos - seed_pos`) in
/// both directions, so a seed at or past `max_pos` proposes nothing.
pub fn expand_from(
    model: &CooccurrenceModel,
    seed: TokenId,
    seed_pos: Position,
    max_pos: Position,
) -> Expansion {
    let mut expansion = Expansion::default();

    for offset in fibonacci_offsets(max_pos.saturating_sub(seed_pos)) {
        for direction in [Direction::Forward, Direction::Backward] {
            let Some(target) = direction.target(seed_pos, offset, max_pos) else {
                continue;
            };
            let candidates = rank_candidates(model, seed, offset, direction);
            let Some(best) = candidates.first().copied() else {
                continue;
            };
            expansion.proposals.insert(target, best);
            expansion.analysis.insert(
                target,
                RankedCandidates {
                    from_seed: seed,
                    offset: direction.signed(offset),
                    candidates,
                },
            );
        }
    }

    expansion
}

/// String-level [`expand_from`]; a seed outside the vocabulary proposes nothing.
pub fn expand(model: &CooccurrenceModel, seed: &str, seed_pos: Position, max_pos: Position) -> Expansion {
    match model.token_id(seed) {
        Some(seed) => expand_from(model, seed, seed_pos, max_pos),
        None => Expansion::default(),
    }
}
