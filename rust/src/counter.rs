use crate::types::TokenId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Multiset of observed tokens that remembers first-observation order.
///
/// Iteration follows encounter order; rankings rely on it to break ties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(TokenId, u32)>", into = "Vec<(TokenId, u32)>")]
pub struct TokenCounter {
    entries: Vec<(TokenId, u32)>,
    index: FxHashMap<TokenId, usize>,
    total: u64,
}

impl TokenCounter {
    pub(crate) fn add(&mut self, token: TokenId, delta: u32) {
        match self.index.get(&token) {
            Some(slot) => self.entries[*slot].1 += delta,
            None => {
                self.index.insert(token, self.entries.len());
                self.entries.push((token, delta));
            }
        }
        self.total += u64::from(delta);
    }

    pub fn count(&self, token: TokenId) -> u32 {
        self.index
            .get(&token)
            .map(|slot| self.entries[*slot].1)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `count(token) / total`, or 0 when the token was never observed.
    pub fn probability(&self, token: TokenId) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(token) as f64 / self.total as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, u32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(TokenId, u32)>> for TokenCounter {
    fn from(entries: Vec<(TokenId, u32)>) -> Self {
        let mut counter = Self::default();
        for (token, count) in entries {
            counter.add(token, count);
        }
        counter
    }
}

impl From<TokenCounter> for Vec<(TokenId, u32)> {
    fn from(counter: TokenCounter) -> Self {
        counter.entries
    }
}
