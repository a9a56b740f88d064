use crate::error::{FibError, FibResult};
use crate::types::TokenId;
use rustc_hash::FxHashMap;

pub(crate) fn validate_token_vocabulary_size(vocab_size: usize) -> FibResult<()> {
    let capacity = (u32::MAX as usize).saturating_add(1);
    if vocab_size > capacity {
        return Err(FibError::VocabularyOverflow);
    }
    Ok(())
}

/// String <-> id table. Ids are dense and assigned in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Interner {
    str_to_id: FxHashMap<String, TokenId>,
    id_to_str: Vec<String>,
}

impl Interner {
    pub(crate) fn from_vocabulary(vocabulary: Vec<String>) -> FibResult<Self> {
        validate_token_vocabulary_size(vocabulary.len())?;

        let mut interner = Self::default();
        interner.str_to_id.reserve(vocabulary.len());
        interner.id_to_str.reserve(vocabulary.len());
        for token in vocabulary {
            interner.intern(&token)?;
        }
        Ok(interner)
    }

    pub(crate) fn intern(&mut self, token: &str) -> FibResult<TokenId> {
        if let Some(id) = self.str_to_id.get(token) {
            return Ok(*id);
        }

        let id = TokenId::try_from(self.id_to_str.len()).map_err(|_| FibError::VocabularyOverflow)?;
        self.id_to_str.push(token.to_string());
        self.str_to_id.insert(token.to_string(), id);
        Ok(id)
    }

    pub(crate) fn maybe_id_for(&self, value: &str) -> Option<TokenId> {
        self.str_to_id.get(value).copied()
    }

    pub(crate) fn resolve(&self, id: TokenId) -> &str {
        &self.id_to_str[id as usize]
    }

    pub(crate) fn vocabulary(&self) -> &[String] {
        &self.id_to_str
    }

    pub(crate) fn len(&self) -> usize {
        self.id_to_str.len()
    }
}
