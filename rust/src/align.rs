use crate::config::DualLevelConfig;
use crate::engine::diffuse;
use crate::error::FibResult;
use crate::model::CooccurrenceModel;
use crate::sequence::filled_text;
use crate::syllable::{split_all, SyllableSplitter};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

const MATCH_THRESHOLD: f64 = 0.3;

type SmallPair = (Option<char>, Option<char>);

fn first_two(value: &str) -> SmallPair {
    let mut chars = value.chars();
    (chars.next(), chars.next())
}

fn last_two(value: &str) -> SmallPair {
    let mut chars = value.chars().rev();
    (chars.next(), chars.next())
}

/// Lexical closeness of a syllable to a word.
///
/// 1.0 when the syllable is one of the word's own syllables, 0.7 when it is a
/// substring, 0.3 for a shared two-character prefix, 0.2 for a shared
/// two-character suffix, else 0.0.
pub fn similarity<P: SyllableSplitter + ?Sized>(splitter: &P, syllable: &str, word: &str) -> f64 {
    if splitter.split(word).iter().any(|part| part == syllable) {
        return 1.0;
    }
    if word.contains(syllable) {
        return 0.7;
    }
    if syllable.chars().count() >= 2 && word.chars().count() >= 2 {
        if first_two(syllable) == first_two(word) {
            return 0.3;
        }
        if last_two(syllable) == last_two(word) {
            return 0.2;
        }
    }
    0.0
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Alignment {
    /// Non-gap syllables in order, each replaced by its matched word if any.
    pub combined: Vec<String>,
    /// Syllable index (gaps included) -> matched word.
    pub mapping: BTreeMap<usize, String>,
}

/// Greedily matches each syllable to the most similar unused word.
///
/// Syllables are visited in order and words in generation order; the first
/// word with the highest similarity wins and must score above 0.3. A matched
/// word string is consumed for the rest of the run. No global optimum is
/// attempted.
pub fn align<P: SyllableSplitter + ?Sized>(
    splitter: &P,
    syllables: &[Option<String>],
    words: &[Option<String>],
) -> Alignment {
    let mut alignment = Alignment::default();
    let mut used: FxHashSet<&str> = FxHashSet::default();

    for (ix, syllable) in syllables.iter().enumerate() {
        let Some(syllable) = syllable else {
            continue;
        };

        let mut best: Option<&str> = None;
        let mut best_similarity = 0.0;
        for word in words.iter().flatten() {
            if used.contains(word.as_str()) {
                continue;
            }
            let score = similarity(splitter, syllable, word);
            if score > best_similarity {
                best_similarity = score;
                best = Some(word.as_str());
            }
        }

        match best.filter(|_| best_similarity > MATCH_THRESHOLD) {
            Some(word) => {
                used.insert(word);
                alignment.mapping.insert(ix, word.to_string());
                alignment.combined.push(word.to_string());
            }
            None => alignment.combined.push(syllable.clone()),
        }
    }

    alignment
}

#[derive(Clone, Debug, PartialEq)]
pub struct DualLevelOutput {
    pub seed_syllables: Vec<String>,
    pub effective_length: usize,
    pub syllables: Vec<Option<String>>,
    pub words: Vec<Option<String>>,
    /// Non-gap syllables, space separated.
    pub syllable_version: String,
    /// Syllables with aligned words substituted, space separated.
    pub word_enhanced_version: String,
    pub alignments: BTreeMap<usize, String>,
}

/// Generates a syllable sequence and a word sequence from the same seed words
/// and aligns them.
///
/// The syllable run covers the effective length from the extension policy;
/// the word run covers half of it plus one position per seed word.
pub fn generate_dual_level<S: AsRef<str>, P: SyllableSplitter + ?Sized>(
    syllable_model: &CooccurrenceModel,
    word_model: &CooccurrenceModel,
    seed_words: &[S],
    splitter: &P,
    config: &DualLevelConfig,
) -> FibResult<DualLevelOutput> {
    config.validate()?;

    let seed_syllables = split_all(splitter, seed_words);
    let effective_length = config
        .extension
        .effective_length(config.length, seed_syllables.len());
    log::info!(
        "dual-level generation: {} seed words, {} seed syllables, {} positions",
        seed_words.len(),
        seed_syllables.len(),
        effective_length
    );

    let syllables = diffuse(syllable_model, &seed_syllables, effective_length, config.passes).tokens();

    let max_word_pos = effective_length / 2 + seed_words.len();
    let words = diffuse(word_model, seed_words, max_word_pos, config.passes).tokens();

    let alignment = align(splitter, &syllables, &words);
    log::info!(
        "aligned {} of {} syllables to words",
        alignment.mapping.len(),
        syllables.iter().flatten().count()
    );

    Ok(DualLevelOutput {
        syllable_version: filled_text(&syllables),
        word_enhanced_version: alignment.combined.join(" "),
        alignments: alignment.mapping,
        seed_syllables,
        effective_length,
        syllables,
        words,
    })
}
