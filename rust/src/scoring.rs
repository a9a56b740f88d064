use crate::model::CooccurrenceModel;
use crate::types::{Direction, Offset, TokenId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub token: TokenId,
    pub forward_prob: f64,
    pub backward_prob: f64,
    pub combined_score: f64,
}

impl Candidate {
    fn new(token: TokenId, forward_prob: f64, backward_prob: f64) -> Self {
        Self {
            token,
            forward_prob,
            backward_prob,
            combined_score: forward_prob * backward_prob,
        }
    }
}

fn probability(
    model: &CooccurrenceModel,
    direction: Direction,
    anchor: TokenId,
    offset: Offset,
    token: TokenId,
) -> f64 {
    model
        .counts(direction, anchor, offset)
        .map(|counter| counter.probability(token))
        .unwrap_or(0.0)
}

fn orient(direction: Direction, lead: f64, confirm: f64) -> (f64, f64) {
    match direction {
        Direction::Forward => (lead, confirm),
        Direction::Backward => (confirm, lead),
    }
}

/// Returns `(forward_prob, backward_prob)` for placing `candidate` `offset`
/// positions from `anchor` in `direction`.
///
/// The lead probability comes from the `direction` table of `anchor`; the
/// confirmation probability is the reverse lookup from `candidate` back to
/// `anchor` in the opposite table.
pub fn score_pair(
    model: &CooccurrenceModel,
    anchor: TokenId,
    candidate: TokenId,
    offset: Offset,
    direction: Direction,
) -> (f64, f64) {
    let lead = probability(model, direction, anchor, offset, candidate);
    let confirm = probability(model, direction.reverse(), candidate, offset, anchor);
    orient(direction, lead, confirm)
}

/// Candidates observed from `anchor` that the reverse table confirms, in
/// encounter order. Unconfirmed candidates are dropped.
pub fn score_candidates(
    model: &CooccurrenceModel,
    anchor: TokenId,
    offset: Offset,
    direction: Direction,
) -> Vec<Candidate> {
    let Some(counts) = model.counts(direction, anchor, offset).filter(|c| c.total() > 0) else {
        return Vec::new();
    };
    let total = counts.total() as f64;

    counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .filter_map(|(token, count)| {
            let lead = count as f64 / total;
            let confirm = probability(model, direction.reverse(), token, offset, anchor);
            if confirm > 0.0 {
                let (forward_prob, backward_prob) = orient(direction, lead, confirm);
                Some(Candidate::new(token, forward_prob, backward_prob))
            } else {
                None
            }
        })
        .collect()
}

/// Stable descending sort by combined score; equal scores keep their order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
}

pub fn rank_candidates(
    model: &CooccurrenceModel,
    anchor: TokenId,
    offset: Offset,
    direction: Direction,
) -> Vec<Candidate> {
    let mut candidates = score_candidates(model, anchor, offset, direction);
    rank(&mut candidates);
    candidates
}
