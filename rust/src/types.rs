pub(crate) const PARALLEL_EXPAND_THRESHOLD: usize = 64;

/// Score carried by seed placements. Seeds are never displaced.
pub const SEED_SCORE: f64 = 1.0;
/// Placeholder rendered for positions that were never filled.
pub const GAP: &str = "_";

pub const DEFAULT_MAX_DISTANCE: usize = 200;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50_000;
pub const DEFAULT_LENGTH: usize = 20;
pub const DEFAULT_PASSES: usize = 3;
pub const DEFAULT_DUAL_LENGTH: usize = 12;

pub type TokenId = u32;
/// 1-based position on the generation axis.
pub type Position = usize;
pub type Offset = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Target lies after the anchor.
    Forward,
    /// Target lies before the anchor.
    Backward,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    pub fn signed(self, offset: Offset) -> isize {
        match self {
            Self::Forward => offset as isize,
            Self::Backward => -(offset as isize),
        }
    }

    pub fn target(self, anchor_pos: Position, offset: Offset, max_pos: Position) -> Option<Position> {
        match self {
            Self::Forward => anchor_pos
                .checked_add(offset)
                .filter(|target| *target <= max_pos),
            Self::Backward => anchor_pos.checked_sub(offset).filter(|target| *target >= 1),
        }
    }
}
