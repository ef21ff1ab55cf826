//! Classifier loader
//!
//! Loading walks an ordered ladder of progressively more permissive rungs
//! and stops at the first one that yields a network:
//!
//! 1. `Primary`         two-layer head, strict load
//! 2. `NormalizedKeys`  two-layer head, strict load, container prefixes stripped
//! 3. `SingleLinearHead` single linear head, non-strict load (degraded)
//!
//! Every rung produces a tagged [`AttemptOutcome`]. Nothing raised while
//! loading escapes [`ClassifierLoader::load`]; the caller gets a slot and a
//! [`LoadReport`].

use crate::config::Config;
use crate::errors::{NeuroError, Result};
use crate::models::architecture::{HeadKind, TumorNet};
use crate::models::handle::{ModelHandle, ModelSlot};
use crate::models::resolver::ModelResolver;
use crate::models::state::{LoaderEvent, LoaderState};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefixes added by common checkpoint wrappers
const CONTAINER_PREFIXES: [&str; 3] = ["module.", "model.", "state_dict."];

/// One step of the loading ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rung {
    Primary,
    NormalizedKeys,
    SingleLinearHead,
}

/// Rungs in the order they are attempted
pub const LADDER: [Rung; 3] = [Rung::Primary, Rung::NormalizedKeys, Rung::SingleLinearHead];

impl Rung {
    pub fn head(self) -> HeadKind {
        match self {
            Rung::Primary | Rung::NormalizedKeys => HeadKind::TwoLayer,
            Rung::SingleLinearHead => HeadKind::SingleLinear,
        }
    }

    pub fn is_strict(self) -> bool {
        !matches!(self, Rung::SingleLinearHead)
    }

    fn normalizes_keys(self) -> bool {
        !matches!(self, Rung::Primary)
    }

    fn success_event(self) -> LoaderEvent {
        if self.is_strict() {
            LoaderEvent::StrictLoaded
        } else {
            LoaderEvent::LenientLoaded
        }
    }
}

/// Tagged result of a single rung
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Loaded { copied: usize, skipped: usize },
    NotFound { tried: Vec<PathBuf> },
    Mismatch { detail: String },
    Unreadable { detail: String },
}

impl AttemptOutcome {
    fn from_error(err: NeuroError) -> Self {
        match err {
            NeuroError::ResourceNotFound { tried } => AttemptOutcome::NotFound { tried },
            NeuroError::WeightLoadMismatch(detail) => AttemptOutcome::Mismatch { detail },
            other => AttemptOutcome::Unreadable {
                detail: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RungOutcome {
    pub rung: Rung,
    pub outcome: AttemptOutcome,
}

/// Summary of one full ladder run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub state: LoaderState,
    pub weights_path: Option<PathBuf>,
    pub attempts: Vec<RungOutcome>,
}

impl LoadReport {
    pub fn unloaded() -> Self {
        Self {
            state: LoaderState::Unloaded,
            weights_path: None,
            attempts: Vec::new(),
        }
    }

    /// Short reason for the last failed rung
    pub fn failure_detail(&self) -> Option<String> {
        self.attempts.last().and_then(|a| match &a.outcome {
            AttemptOutcome::Loaded { .. } => None,
            AttemptOutcome::NotFound { tried } => Some(
                NeuroError::ResourceNotFound {
                    tried: tried.clone(),
                }
                .to_string(),
            ),
            AttemptOutcome::Mismatch { detail } | AttemptOutcome::Unreadable { detail } => {
                Some(detail.clone())
            }
        })
    }
}

/// Counts from copying stored tensors into the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CopyStats {
    copied: usize,
    skipped: usize,
}

/// Builds the classifier and attaches weights following the ladder
#[derive(Debug, Clone)]
pub struct ClassifierLoader {
    resolver: ModelResolver,
    device: Device,
}

impl ClassifierLoader {
    pub fn new(resolver: ModelResolver) -> Self {
        Self {
            resolver,
            device: Device::Cpu,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ModelResolver::from_config(config))
    }

    pub fn resolver(&self) -> &ModelResolver {
        &self.resolver
    }

    /// Run the full ladder to a terminal state
    pub fn load(&self) -> (ModelSlot, LoadReport) {
        let mut state = LoaderState::Unloaded;
        state = advance(state, LoaderEvent::Begin);

        let mut attempts = Vec::with_capacity(LADDER.len());

        for rung in LADDER {
            match self.attempt(rung) {
                Ok((handle, stats)) => {
                    state = advance(state, rung.success_event());
                    info!(
                        ?rung,
                        ?state,
                        copied = stats.copied,
                        skipped = stats.skipped,
                        path = ?handle.weights_path(),
                        "Classifier loaded"
                    );
                    let weights_path = handle.weights_path().map(Path::to_path_buf);
                    attempts.push(RungOutcome {
                        rung,
                        outcome: AttemptOutcome::Loaded {
                            copied: stats.copied,
                            skipped: stats.skipped,
                        },
                    });
                    return (
                        ModelSlot::Loaded(handle),
                        LoadReport {
                            state,
                            weights_path,
                            attempts,
                        },
                    );
                }
                Err(err) => {
                    warn!(?rung, error = %err, "Load attempt failed");
                    attempts.push(RungOutcome {
                        rung,
                        outcome: AttemptOutcome::from_error(err),
                    });
                }
            }
        }

        state = advance(state, LoaderEvent::LadderExhausted);
        let report = LoadReport {
            state,
            weights_path: None,
            attempts,
        };
        let reason = report
            .failure_detail()
            .unwrap_or_else(|| "all load attempts failed".to_string());
        warn!(reason = %reason, "Classifier unavailable; serving placeholder results");

        (ModelSlot::absent(reason), report)
    }

    /// One rung: resolve, read, build, copy
    fn attempt(&self, rung: Rung) -> Result<(ModelHandle, CopyStats)> {
        let path = self.resolver.resolve()?;
        debug!(?rung, path = %path.display(), "Reading weights");

        let mut stored = read_weights(&path, &self.device)?;
        if rung.normalizes_keys() {
            stored = normalize_keys(stored);
        }

        // The VarMap only checks names and shapes; inference runs on detached tensors
        let varmap = VarMap::new();
        TumorNet::new(rung.head(), VarBuilder::from_varmap(&varmap, DType::F32, &self.device))?;
        let stats = copy_weights(&varmap, &stored, rung.is_strict())?;

        let vb = VarBuilder::from_tensors(frozen_parameters(&varmap)?, DType::F32, &self.device);
        let network = TumorNet::new(rung.head(), vb)?;
        let state = if rung.is_strict() {
            LoaderState::Ready
        } else {
            LoaderState::Degraded
        };

        Ok((ModelHandle::new(network, state, Some(path)), stats))
    }
}

/// Transitions here are fixed by the ladder and cannot be invalid
fn advance(state: LoaderState, event: LoaderEvent) -> LoaderState {
    state.transition(event).unwrap_or(LoaderState::Failed)
}

/// Read a parameter bundle by extension: safetensors, otherwise a torch pickle
pub fn read_weights(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let is_safetensors = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("safetensors"))
        .unwrap_or(false);

    if is_safetensors {
        return Ok(candle_core::safetensors::load(path, device)?);
    }

    candle_core::pickle::read_all(path)?
        .into_iter()
        .map(|(name, tensor)| Ok((name, tensor.to_device(device)?)))
        .collect()
}

/// Strip wrapper prefixes such as `module.` from parameter names
pub fn normalize_keys(stored: HashMap<String, Tensor>) -> HashMap<String, Tensor> {
    stored
        .into_iter()
        .map(|(name, tensor)| {
            let mut key = name.as_str();
            while let Some(rest) = CONTAINER_PREFIXES
                .iter()
                .find_map(|prefix| key.strip_prefix(prefix))
            {
                key = rest;
            }
            (key.to_string(), tensor)
        })
        .collect()
}

/// Buffers torch serializes that have no counterpart in the network
fn is_untracked_buffer(name: &str) -> bool {
    name.ends_with("num_batches_tracked")
}

/// Copy stored tensors into the network variables.
///
/// Strict mode requires every variable to be present with the same shape and
/// no unexpected stored tensors. Lenient mode copies what matches and leaves
/// the rest at their initial values, but still needs at least one match.
fn copy_weights(varmap: &VarMap, stored: &HashMap<String, Tensor>, strict: bool) -> Result<CopyStats> {
    let vars = varmap
        .data()
        .lock()
        .map_err(|_| NeuroError::Generic("Variable map lock poisoned".to_string()))?;

    let mut missing = Vec::new();
    let mut mismatched = Vec::new();
    for (name, var) in vars.iter() {
        match stored.get(name) {
            None => missing.push(name.clone()),
            Some(tensor) if tensor.dims() != var.dims() => mismatched.push(format!(
                "{} (expected {:?}, found {:?})",
                name,
                var.dims(),
                tensor.dims()
            )),
            Some(_) => {}
        }
    }
    let unexpected: Vec<&String> = stored
        .keys()
        .filter(|k| !vars.contains_key(*k) && !is_untracked_buffer(k))
        .collect();

    if strict && !(missing.is_empty() && mismatched.is_empty() && unexpected.is_empty()) {
        missing.sort();
        mismatched.sort();
        let mut unexpected: Vec<_> = unexpected.into_iter().cloned().collect();
        unexpected.sort();
        return Err(NeuroError::WeightLoadMismatch(format!(
            "missing [{}]; unexpected [{}]; shape mismatch [{}]",
            preview(&missing),
            preview(&unexpected),
            preview(&mismatched)
        )));
    }

    let mut copied = 0;
    for (name, var) in vars.iter() {
        if let Some(tensor) = stored.get(name) {
            if tensor.dims() == var.dims() {
                var.set(&tensor.to_dtype(var.dtype())?)?;
                copied += 1;
            }
        }
    }

    if copied == 0 {
        return Err(NeuroError::WeightLoadMismatch(
            "no stored tensor matched the network parameters".to_string(),
        ));
    }

    Ok(CopyStats {
        copied,
        skipped: vars.len() - copied,
    })
}

/// Parameter values as plain tensors, outside autograd tracking
fn frozen_parameters(varmap: &VarMap) -> Result<HashMap<String, Tensor>> {
    let vars = varmap
        .data()
        .lock()
        .map_err(|_| NeuroError::Generic("Variable map lock poisoned".to_string()))?;

    Ok(vars
        .iter()
        .map(|(name, var)| (name.clone(), var.as_tensor().detach()))
        .collect())
}

fn preview(names: &[String]) -> String {
    const SHOWN: usize = 5;
    let mut out = names.iter().take(SHOWN).cloned().collect::<Vec<_>>().join(", ");
    if names.len() > SHOWN {
        out.push_str(&format!(", … {} more", names.len() - SHOWN));
    }
    out
}
