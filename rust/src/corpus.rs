use crate::error::FibResult;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b[a-zA-Z]+\b").expect("word pattern is valid"))
}

/// Lowercases `text` and returns its alphabetic words in order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Reads a UTF-8 text file and tokenizes it.
pub fn read_corpus(path: impl AsRef<Path>) -> FibResult<Vec<String>> {
    let text = fs::read_to_string(path.as_ref())?;
    let tokens = tokenize(&text);
    log::info!(
        "read {} tokens from {}",
        tokens.len(),
        path.as_ref().display()
    );
    Ok(tokens)
}
