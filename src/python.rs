//! Python bindings for the event-cleaning pipeline.

use once_cell::sync::Lazy;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::classifier::{ClassificationCache, NameClassifier};
use crate::config::EngineConfig;
use crate::error::Error;
use crate::gazetteer::GeoReference;
use crate::motivation::MotivationRule;
use crate::pipeline::ActorPipeline;
use crate::similarity;

static GEO: Lazy<Result<GeoReference, String>> =
    Lazy::new(|| GeoReference::embedded().map_err(|e| e.to_string()));

static MOTIVATION: Lazy<MotivationRule> = Lazy::new(MotivationRule::default);

fn to_py_err(err: Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Normalise text: casefold and collapse whitespace.
#[pyfunction]
pub fn normalize_name(text: &str) -> String {
    similarity::normalize_name(text)
}

/// Token-sort similarity (0-100) of two names.
#[pyfunction]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    similarity::token_sort_ratio(&similarity::normalize_name(a), &similarity::normalize_name(b))
}

/// Partial similarity (0-100) of two names.
#[pyfunction]
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    similarity::partial_ratio(&similarity::normalize_name(a), &similarity::normalize_name(b))
}

/// Protest motivation label for a CAMEO event code.
#[pyfunction]
pub fn derive_motivation(event_code: &str) -> String {
    MOTIVATION.derive(event_code).to_string()
}

/// Whether a name denotes a country, demonym or subdivision.
#[pyfunction]
pub fn is_place_name(name: &str) -> PyResult<bool> {
    let geo = GEO.as_ref().map_err(|e| PyValueError::new_err(e.clone()))?;
    Ok(geo.is_place(name))
}

/// Memoising actor classifier.
///
/// Parameters
/// ----------
/// names : list[str]
///     Every actor name in the dataset; feeds the top-names frequency pass.
/// config_path : str | None
///     Taxonomy TOML; the bundled configuration when omitted.
#[pyclass(name = "ActorClassifier")]
pub struct PyActorClassifier {
    pipeline: ActorPipeline,
    cache: ClassificationCache,
}

impl PyActorClassifier {
    fn with_classifier<T>(&mut self, f: impl FnOnce(&mut NameClassifier<'_>) -> T) -> T {
        let cache = std::mem::take(&mut self.cache);
        let mut classifier = NameClassifier::with_cache(self.pipeline.resources(), cache);
        let out = f(&mut classifier);
        self.cache = classifier.into_cache();
        out
    }
}

#[pymethods]
impl PyActorClassifier {
    #[new]
    #[pyo3(signature = (names, config_path=None))]
    fn new(names: Vec<String>, config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => EngineConfig::from_path(path),
            None => EngineConfig::embedded(),
        }
        .map_err(to_py_err)?;
        let geo = GeoReference::embedded().map_err(to_py_err)?;
        let pipeline = ActorPipeline::build_from_names(&config, geo, &names).map_err(to_py_err)?;
        Ok(Self {
            pipeline,
            cache: ClassificationCache::new(),
        })
    }

    /// Category label for one name.
    fn classify(&mut self, name: &str) -> String {
        self.with_classifier(|c| c.classify(name).as_str().to_string())
    }

    /// (category, stage) for one name.
    fn explain(&mut self, name: &str) -> (String, String) {
        self.with_classifier(|c| {
            let result = c.classify_traced(name);
            (result.category.as_str().to_string(), result.stage.to_string())
        })
    }

    /// Category labels for many names, in input order.
    fn classify_many(&mut self, names: Vec<String>) -> Vec<String> {
        self.with_classifier(|c| {
            names
                .iter()
                .map(|n| c.classify(n).as_str().to_string())
                .collect()
        })
    }

    /// Number of distinct normalised names classified so far.
    fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Actor categorization core: native accelerator for protest-event cleaning.
#[pymodule]
fn protest_actor_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Name normalisation and similarity
    m.add_function(wrap_pyfunction!(normalize_name, m)?)?;
    m.add_function(wrap_pyfunction!(token_sort_ratio, m)?)?;
    m.add_function(wrap_pyfunction!(partial_ratio, m)?)?;

    // Reference lookups
    m.add_function(wrap_pyfunction!(derive_motivation, m)?)?;
    m.add_function(wrap_pyfunction!(is_place_name, m)?)?;

    // Memoised classifier
    m.add_class::<PyActorClassifier>()?;

    Ok(())
}
