use crate::align::generate_dual_level;
use crate::config::{DualLevelConfig, TrainConfig};
use crate::corpus::tokenize;
use crate::engine::{diffuse, merge};
use crate::error::FibError;
use crate::model::CooccurrenceModel;
use crate::syllable::VowelGroupSplitter;
use crate::types::{DEFAULT_DUAL_LENGTH, DEFAULT_LENGTH, DEFAULT_MAX_DISTANCE, DEFAULT_PASSES};
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

pub(crate) type DualLevelPayload = (String, String, BTreeMap<usize, String>);

impl From<FibError> for PyErr {
    fn from(err: FibError) -> Self {
        match err {
            FibError::Io(_)
            | FibError::Codec(_)
            | FibError::IncompatibleModel { .. }
            | FibError::CorruptModel(_) => PyIOError::new_err(err.to_string()),
            FibError::Config(_) | FibError::VocabularyOverflow => {
                PyValueError::new_err(err.to_string())
            }
        }
    }
}

fn panic_payload_to_string(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}

fn guarded<T, F>(py: Python<'_>, operation: &str, work: F) -> PyResult<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    py.allow_threads(|| catch_unwind(AssertUnwindSafe(work)).map_err(panic_payload_to_string))
        .map_err(|message| {
            PyRuntimeError::new_err(format!("fibdiffuse panicked during {operation}(): {message}"))
        })
}

#[pyclass(name = "Model", frozen)]
pub struct PyModel {
    inner: CooccurrenceModel,
}

#[pymethods]
impl PyModel {
    #[staticmethod]
    #[pyo3(signature = (text, max_distance=DEFAULT_MAX_DISTANCE))]
    fn train(py: Python<'_>, text: &str, max_distance: usize) -> PyResult<Self> {
        let config = TrainConfig {
            max_distance,
            ..TrainConfig::default()
        };
        let tokens = tokenize(text);
        let inner = guarded(py, "train", || CooccurrenceModel::train(&tokens, &config))??;
        Ok(Self { inner })
    }

    #[staticmethod]
    #[pyo3(signature = (path, max_distance=DEFAULT_MAX_DISTANCE))]
    fn train_file(py: Python<'_>, path: PathBuf, max_distance: usize) -> PyResult<Self> {
        let config = TrainConfig {
            max_distance,
            ..TrainConfig::default()
        };
        let inner = guarded(py, "train_file", || CooccurrenceModel::train_file(&path, &config))??;
        Ok(Self { inner })
    }

    #[staticmethod]
    fn load(py: Python<'_>, path: PathBuf) -> PyResult<Self> {
        let inner = guarded(py, "load", || CooccurrenceModel::load(&path))??;
        Ok(Self { inner })
    }

    fn save(&self, py: Python<'_>, path: PathBuf) -> PyResult<()> {
        let model = &self.inner;
        guarded(py, "save", || model.save(&path))??;
        Ok(())
    }

    #[getter]
    fn max_distance(&self) -> usize {
        self.inner.max_distance()
    }

    #[getter]
    fn vocabulary_size(&self) -> usize {
        self.inner.vocabulary_size()
    }

    #[pyo3(signature = (seeds, length=DEFAULT_LENGTH))]
    fn generate(&self, py: Python<'_>, seeds: Vec<String>, length: usize) -> PyResult<Vec<String>> {
        let model = &self.inner;
        guarded(py, "generate", || merge(model, &seeds, length).rendered())
    }

    #[pyo3(signature = (seeds, length=DEFAULT_LENGTH, passes=DEFAULT_PASSES))]
    fn diffuse(
        &self,
        py: Python<'_>,
        seeds: Vec<String>,
        length: usize,
        passes: usize,
    ) -> PyResult<Vec<String>> {
        let model = &self.inner;
        guarded(py, "diffuse", || diffuse(model, &seeds, length, passes).rendered())
    }
}

#[pyfunction]
#[pyo3(signature = (syllable_model, word_model, seed_words, length=DEFAULT_DUAL_LENGTH))]
fn dual_level(
    py: Python<'_>,
    syllable_model: PyRef<'_, PyModel>,
    word_model: PyRef<'_, PyModel>,
    seed_words: Vec<String>,
    length: usize,
) -> PyResult<DualLevelPayload> {
    let config = DualLevelConfig {
        length,
        ..DualLevelConfig::default()
    };
    let syllable_model = &syllable_model.inner;
    let word_model = &word_model.inner;
    let output = guarded(py, "dual_level", || {
        generate_dual_level(
            syllable_model,
            word_model,
            &seed_words,
            &VowelGroupSplitter,
            &config,
        )
    })??;
    Ok((
        output.syllable_version,
        output.word_enhanced_version,
        output.alignments,
    ))
}

#[pymodule(gil_used = true)]
fn _core(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyModel>()?;
    module.add_function(wrap_pyfunction!(dual_level, module)?)?;
    module.add("GAP", crate::types::GAP)?;
    Ok(())
}
