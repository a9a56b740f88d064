use crate::expand::{expand_from, Expansion, RankedCandidates};
use crate::model::CooccurrenceModel;
use crate::scoring::{rank, Candidate};
use crate::sequence::{filled_text, render, Placement, Sequence};
use crate::trace::{NullSink, TraceEvent, TraceSink};
use crate::types::{Position, TokenId, PARALLEL_EXPAND_THRESHOLD, SEED_SCORE};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Final state of one generation call plus its per-position analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Generation<A> {
    pub sequence: Sequence,
    pub analysis: BTreeMap<Position, A>,
}

impl<A> Generation<A> {
    /// Tokens for positions `1..=length`; `None` marks a gap.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.sequence.tokens()
    }

    /// Tokens with gaps rendered as `_`.
    pub fn rendered(&self) -> Vec<String> {
        render(&self.tokens())
    }

    /// Non-gap tokens joined by spaces.
    pub fn text(&self) -> String {
        filled_text(&self.tokens())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeAnalysis {
    /// Set when the position holds a seed.
    pub seed: Option<String>,
    /// Ranked lists from every seed that reached the position, in seed order.
    pub competing: Vec<RankedCandidates>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PassRecord {
    pub pass: usize,
    /// Anchor position of the winning proposal; `None` for the seed record.
    pub source: Option<Position>,
    /// Every proposal this pass, by descending unweighted combined score.
    pub candidates: Vec<Candidate>,
    pub proposed: String,
    /// The proposal, or the seed when the position holds one. A kept
    /// non-seed occupant is not reported here.
    pub chosen: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiffusionAnalysis {
    pub history: Vec<PassRecord>,
}

pub type MergeGeneration = Generation<MergeAnalysis>;
pub type DiffusionGeneration = Generation<DiffusionAnalysis>;

/// Expands every seed in order and merges the proposals.
///
/// Seeds occupy positions `1..` and never move. Within each seed, proposals
/// are applied in ascending position order; a proposal fills a gap or
/// displaces a non-seed occupant with a strictly lower combined score, so the
/// earlier seed wins exact ties.
pub fn merge<S: AsRef<str>>(model: &CooccurrenceModel, seeds: &[S], length: usize) -> MergeGeneration {
    merge_traced(model, seeds, length, &mut NullSink)
}

pub fn merge_traced<S: AsRef<str>, T: TraceSink + ?Sized>(
    model: &CooccurrenceModel,
    seeds: &[S],
    length: usize,
    sink: &mut T,
) -> MergeGeneration {
    let mut sequence = Sequence::seeded(model, seeds, length, sink);
    let mut analysis: BTreeMap<Position, MergeAnalysis> = sequence
        .iter()
        .map(|(position, placement)| {
            (
                position,
                MergeAnalysis {
                    seed: Some(placement.token.clone()),
                    competing: Vec::new(),
                },
            )
        })
        .collect();

    for (ix, seed) in seeds.iter().take(length).enumerate() {
        let seed_pos = ix + 1;
        sink.record(TraceEvent::Expansion {
            pass: None,
            position: seed_pos,
            token: seed.as_ref().to_string(),
            weight: 1.0,
        });
        let Some(seed_id) = model.token_id(seed.as_ref()) else {
            continue;
        };

        let expansion = expand_from(model, seed_id, seed_pos, length);
        for (position, ranked) in expansion.analysis {
            analysis.entry(position).or_default().competing.push(ranked);
        }

        for (position, candidate) in expansion.proposals {
            let placement = Placement::generated(model, &candidate, candidate.combined_score, 1);
            let outcome = sequence.offer(position, placement);
            sink.record(TraceEvent::Decision {
                pass: None,
                position,
                token: model.token(candidate.token).to_string(),
                forward_prob: candidate.forward_prob,
                backward_prob: candidate.backward_prob,
                score: candidate.combined_score,
                outcome,
            });
        }
    }

    sequence.report(sink, false);
    Generation { sequence, analysis }
}

struct Anchor {
    position: Position,
    id: Option<TokenId>,
    token: String,
    weight: f64,
}

struct Proposal {
    candidate: Candidate,
    weighted: f64,
    source: Position,
}

fn expand_anchors(model: &CooccurrenceModel, anchors: &[Anchor], length: usize) -> Vec<Expansion> {
    let expand_one = |anchor: &Anchor| match anchor.id {
        Some(id) => expand_from(model, id, anchor.position, length),
        None => Expansion::default(),
    };

    if anchors.len() >= PARALLEL_EXPAND_THRESHOLD {
        anchors.par_iter().map(expand_one).collect()
    } else {
        anchors.iter().map(expand_one).collect()
    }
}

/// Iteratively re-expands every occupied position for `passes` passes.
///
/// Each pass snapshots the current occupants as anchors weighted by their
/// stored score (1.0 for seeds). Per target position the proposal with the
/// greatest `combined_score * weight` wins, earliest anchor first on ties, and
/// is applied with the merge precedence against the stored weighted score.
/// One pass reproduces [`merge`]; zero passes returns the seeds alone.
pub fn diffuse<S: AsRef<str>>(
    model: &CooccurrenceModel,
    seeds: &[S],
    length: usize,
    passes: usize,
) -> DiffusionGeneration {
    diffuse_traced(model, seeds, length, passes, &mut NullSink)
}

pub fn diffuse_traced<S: AsRef<str>, T: TraceSink + ?Sized>(
    model: &CooccurrenceModel,
    seeds: &[S],
    length: usize,
    passes: usize,
    sink: &mut T,
) -> DiffusionGeneration {
    let mut sequence = Sequence::seeded(model, seeds, length, sink);
    let mut analysis: BTreeMap<Position, DiffusionAnalysis> = sequence
        .iter()
        .map(|(position, placement)| {
            (
                position,
                DiffusionAnalysis {
                    history: vec![PassRecord {
                        pass: 0,
                        source: None,
                        candidates: placement
                            .id
                            .map(|token| Candidate {
                                token,
                                forward_prob: SEED_SCORE,
                                backward_prob: SEED_SCORE,
                                combined_score: SEED_SCORE,
                            })
                            .into_iter()
                            .collect(),
                        proposed: placement.token.clone(),
                        chosen: placement.token.clone(),
                    }],
                },
            )
        })
        .collect();

    for pass in 1..=passes {
        let anchors = sequence
            .iter()
            .map(|(position, placement)| Anchor {
                position,
                id: placement.id,
                token: placement.token.clone(),
                weight: placement.score,
            })
            .collect::<Vec<_>>();
        for anchor in &anchors {
            sink.record(TraceEvent::Expansion {
                pass: Some(pass),
                position: anchor.position,
                token: anchor.token.clone(),
                weight: anchor.weight,
            });
        }

        let expansions = expand_anchors(model, &anchors, length);

        let mut proposals: BTreeMap<Position, Vec<Proposal>> = BTreeMap::new();
        for (anchor, expansion) in anchors.iter().zip(expansions) {
            for (position, candidate) in expansion.proposals {
                proposals.entry(position).or_default().push(Proposal {
                    candidate,
                    weighted: candidate.combined_score * anchor.weight,
                    source: anchor.position,
                });
            }
        }

        for (position, proposed) in proposals {
            let Some(best) = proposed
                .iter()
                .reduce(|best, next| if next.weighted > best.weighted { next } else { best })
            else {
                continue;
            };

            let placement = Placement::generated(model, &best.candidate, best.weighted, pass);
            let proposed_token = placement.token.clone();
            let outcome = sequence.offer(position, placement);
            sink.record(TraceEvent::Decision {
                pass: Some(pass),
                position,
                token: proposed_token.clone(),
                forward_prob: best.candidate.forward_prob,
                backward_prob: best.candidate.backward_prob,
                score: best.weighted,
                outcome,
            });

            let mut candidates = proposed.iter().map(|p| p.candidate).collect::<Vec<_>>();
            rank(&mut candidates);
            let chosen = match sequence.get(position) {
                Some(occupant) if occupant.is_seed() => occupant.token.clone(),
                _ => proposed_token.clone(),
            };
            analysis.entry(position).or_default().history.push(PassRecord {
                pass,
                source: Some(best.source),
                candidates,
                proposed: proposed_token,
                chosen,
            });
        }
    }

    sequence.report(sink, true);
    Generation { sequence, analysis }
}
