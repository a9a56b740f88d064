use crate::counter::TokenCounter;
use crate::error::{FibError, FibResult};
use crate::interner::Interner;
use crate::model::{CooccurrenceKey, CooccurrenceModel, Table};
use crate::offsets::fibonacci_offsets;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub(crate) const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ModelBodyRef<'a> {
    max_distance: usize,
    vocabulary: &'a [String],
    forward: Vec<(&'a CooccurrenceKey, &'a TokenCounter)>,
    backward: Vec<(&'a CooccurrenceKey, &'a TokenCounter)>,
}

#[derive(Deserialize)]
struct ModelBody {
    max_distance: usize,
    vocabulary: Vec<String>,
    forward: Vec<(CooccurrenceKey, TokenCounter)>,
    backward: Vec<(CooccurrenceKey, TokenCounter)>,
}

fn sorted_entries(table: &Table) -> Vec<(&CooccurrenceKey, &TokenCounter)> {
    let mut entries = table.iter().collect::<Vec<_>>();
    entries.sort_unstable_by_key(|(key, _)| **key);
    entries
}

fn table_from_entries(
    entries: Vec<(CooccurrenceKey, TokenCounter)>,
    vocab_size: usize,
) -> FibResult<Table> {
    let mut table = Table::default();
    table.reserve(entries.len());
    for (key, counter) in entries {
        let out_of_range = key.anchor as usize >= vocab_size
            || counter.iter().any(|(token, _)| token as usize >= vocab_size);
        if out_of_range {
            return Err(FibError::CorruptModel(format!(
                "entry ({}, {}) references a token outside the vocabulary",
                key.anchor, key.offset
            )));
        }
        if table.insert(key, counter).is_some() {
            return Err(FibError::CorruptModel(format!(
                "duplicate entry ({}, {})",
                key.anchor, key.offset
            )));
        }
    }
    Ok(table)
}

impl CooccurrenceModel {
    /// Writes the model in the versioned bincode format.
    ///
    /// Entries are written in key order and counters in encounter order, so
    /// the same model always produces the same bytes.
    pub fn write_to<W: Write>(&self, mut writer: W) -> FibResult<()> {
        bincode::serialize_into(&mut writer, &MODEL_FORMAT_VERSION)?;
        let body = ModelBodyRef {
            max_distance: self.max_distance,
            vocabulary: self.interner.vocabulary(),
            forward: sorted_entries(&self.forward),
            backward: sorted_entries(&self.backward),
        };
        bincode::serialize_into(&mut writer, &body)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> FibResult<Self> {
        let found: u32 = bincode::deserialize_from(&mut reader)?;
        if found != MODEL_FORMAT_VERSION {
            return Err(FibError::IncompatibleModel {
                found,
                expected: MODEL_FORMAT_VERSION,
            });
        }

        let body: ModelBody = bincode::deserialize_from(&mut reader)?;
        let vocab_size = body.vocabulary.len();
        let interner = Interner::from_vocabulary(body.vocabulary)?;
        if interner.len() != vocab_size {
            return Err(FibError::CorruptModel(
                "vocabulary contains duplicate tokens".to_string(),
            ));
        }
        Ok(Self {
            forward: table_from_entries(body.forward, vocab_size)?,
            backward: table_from_entries(body.backward, vocab_size)?,
            interner,
            max_distance: body.max_distance,
            offsets: fibonacci_offsets(body.max_distance),
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> FibResult<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        log::info!("saved model to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> FibResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let model = Self::read_from(BufReader::new(file))?;
        log::info!(
            "loaded model from {} ({} tokens, max_distance={})",
            path.display(),
            model.vocabulary_size(),
            model.max_distance
        );
        Ok(model)
    }
}
