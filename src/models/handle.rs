use crate::models::state::LoaderState;
use crate::types::ResultSource;
use candle_core::{Module, Tensor};
use std::fmt;
use std::path::{Path, PathBuf};

/// Inference-ready network plus how it was obtained
pub struct ModelHandle {
    network: Box<dyn Module + Send + Sync>,
    state: LoaderState,
    weights_path: Option<PathBuf>,
}

impl ModelHandle {
    pub fn new<M>(network: M, state: LoaderState, weights_path: Option<PathBuf>) -> Self
    where
        M: Module + Send + Sync + 'static,
    {
        Self {
            network: Box::new(network),
            state,
            weights_path,
        }
    }

    /// Raw logits for a preprocessed batch
    pub fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
        self.network.forward(input)
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn weights_path(&self) -> Option<&Path> {
        self.weights_path.as_deref()
    }

    /// Tag carried by results produced with this handle
    pub fn result_source(&self) -> ResultSource {
        match self.state {
            LoaderState::Degraded => ResultSource::DegradedModel,
            _ => ResultSource::Model,
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("state", &self.state)
            .field("weights_path", &self.weights_path)
            .finish_non_exhaustive()
    }
}

/// Process-wide model slot: a loaded handle or an explicit absence
#[derive(Debug)]
pub enum ModelSlot {
    Loaded(ModelHandle),
    Absent { reason: String },
}

impl ModelSlot {
    pub fn absent(reason: impl Into<String>) -> Self {
        ModelSlot::Absent {
            reason: reason.into(),
        }
    }

    pub fn handle(&self) -> Option<&ModelHandle> {
        match self {
            ModelSlot::Loaded(handle) => Some(handle),
            ModelSlot::Absent { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }
}
