use smallvec::SmallVec;

/// Splits a token into an ordered list of syllable-like sub-tokens.
pub trait SyllableSplitter {
    fn split(&self, token: &str) -> Vec<String>;
}

impl<F> SyllableSplitter for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn split(&self, token: &str) -> Vec<String> {
        self(token)
    }
}

/// Orthographic splitter built around vowel groups.
///
/// Every syllable holds exactly one vowel group (`y` counts as a vowel except
/// word-initially). A lone consonant between groups opens the next syllable;
/// a longer cluster is split after its first consonant. Tokens without a
/// vowel stay whole.
#[derive(Clone, Copy, Debug, Default)]
pub struct VowelGroupSplitter;

fn is_vowel(ix: usize, ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u') || (ch == 'y' && ix > 0)
}

impl SyllableSplitter for VowelGroupSplitter {
    fn split(&self, token: &str) -> Vec<String> {
        let chars = token.chars().collect::<Vec<_>>();

        let mut groups: SmallVec<[(usize, usize); 8]> = SmallVec::new();
        let mut ix = 0;
        while ix < chars.len() {
            if is_vowel(ix, chars[ix]) {
                let start = ix;
                while ix < chars.len() && is_vowel(ix, chars[ix]) {
                    ix += 1;
                }
                groups.push((start, ix));
            } else {
                ix += 1;
            }
        }

        if groups.len() < 2 {
            return vec![token.to_string()];
        }

        let mut syllables = Vec::with_capacity(groups.len());
        let mut start = 0;
        for pair in groups.windows(2) {
            let (_, vowel_end) = pair[0];
            let (next_start, _) = pair[1];
            let boundary = if next_start - vowel_end <= 1 {
                vowel_end
            } else {
                vowel_end + 1
            };
            syllables.push(chars[start..boundary].iter().collect::<String>());
            start = boundary;
        }
        syllables.push(chars[start..].iter().collect::<String>());
        syllables
    }
}

/// Concatenated syllables of every word, in order.
pub fn split_all<S: AsRef<str>, P: SyllableSplitter + ?Sized>(splitter: &P, words: &[S]) -> Vec<String> {
    words
        .iter()
        .flat_map(|word| splitter.split(word.as_ref()))
        .collect()
}
