use crate::types::Position;
use std::fmt;

/// What happened when a proposal met a position.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    FillsGap,
    Replaces { previous: String, previous_score: f64 },
    Keeps { existing: String, existing_score: f64 },
    KeepsSeed { seed: String },
}

impl Outcome {
    pub fn installed(&self) -> bool {
        matches!(self, Self::FillsGap | Self::Replaces { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    Seed {
        position: Position,
        token: String,
    },
    /// An anchor is about to be expanded. `pass` is `None` for the plain merge.
    Expansion {
        pass: Option<usize>,
        position: Position,
        token: String,
        weight: f64,
    },
    Decision {
        pass: Option<usize>,
        position: Position,
        token: String,
        forward_prob: f64,
        backward_prob: f64,
        score: f64,
        outcome: Outcome,
    },
    Final {
        position: Position,
        token: Option<String>,
        score: Option<f64>,
        pass: Option<usize>,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed { position, token } => write!(f, "seed pos {position}: '{token}'"),
            Self::Expansion {
                pass,
                position,
                token,
                weight,
            } => match pass {
                Some(pass) => write!(
                    f,
                    "pass {pass}: expanding pos {position} ('{token}', w:{weight:.3})"
                ),
                None => write!(f, "expanding pos {position} ('{token}')"),
            },
            Self::Decision {
                pass,
                position,
                token,
                forward_prob,
                backward_prob,
                score,
                outcome,
            } => {
                if let Some(pass) = pass {
                    write!(f, "pass {pass}: ")?;
                }
                write!(
                    f,
                    "pos {position}: '{token}' (F:{:.1}% B:{:.1}% C:{score:.3}) ",
                    forward_prob * 100.0,
                    backward_prob * 100.0
                )?;
                match outcome {
                    Outcome::FillsGap => write!(f, "[fills gap]"),
                    Outcome::Replaces {
                        previous,
                        previous_score,
                    } => write!(f, "[replaces '{previous}' (C:{previous_score:.3})]"),
                    Outcome::Keeps {
                        existing,
                        existing_score,
                    } => write!(f, "[keeps '{existing}' (C:{existing_score:.3})]"),
                    Outcome::KeepsSeed { seed } => write!(f, "[keeps seed '{seed}']"),
                }
            }
            Self::Final {
                position,
                token,
                score,
                pass,
            } => match (token, score, pass) {
                (Some(token), Some(score), Some(pass)) => {
                    write!(f, "final {position}: {token} (w:{score:.3}, pass:{pass})")
                }
                (Some(token), _, _) => write!(f, "final {position}: {token}"),
                (None, _, _) => write!(f, "final {position}: _ (gap)"),
            },
        }
    }
}

/// Receives generation events in the order decisions are made.
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Forwards events to `log::debug!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&mut self, event: TraceEvent) {
        log::debug!("{event}");
    }
}

impl TraceSink for Vec<TraceEvent> {
    fn record(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
