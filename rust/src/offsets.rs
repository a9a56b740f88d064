use crate::types::Offset;
use smallvec::{smallvec, SmallVec};

/// Offsets up to any realistic bound fit inline (the 16th term is 2584).
pub type Offsets = SmallVec<[Offset; 16]>;

/// Fibonacci-recurrence step sizes seeded with (2, 3), capped at `max_distance`.
///
/// The unit terms of the plain sequence are skipped, so adjacent positions are
/// never related directly. Empty when `max_distance < 2`.
pub fn fibonacci_offsets(max_distance: usize) -> Offsets {
    let mut terms: Offsets = smallvec![2, 3];
    loop {
        let last = terms[terms.len() - 1];
        if last >= max_distance {
            break;
        }
        match terms[terms.len() - 2].checked_add(last) {
            Some(next) => terms.push(next),
            None => break,
        }
    }
    terms.retain(|term| *term <= max_distance);
    terms
}
