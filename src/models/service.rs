//! Model service owning the process-wide classifier slot
//!
//! Readers take an `Arc` snapshot and keep it for the whole request. A reload
//! builds a complete new slot off the async runtime and then swaps the
//! reference, so in-flight requests keep the slot they started with.

use crate::config::Config;
use crate::errors::{NeuroError, Result};
use crate::models::handle::ModelSlot;
use crate::models::loader::{ClassifierLoader, LoadReport};
use crate::models::state::{LoaderEvent, LoaderState};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// What the service currently publishes
#[derive(Debug)]
struct Published {
    slot: Arc<ModelSlot>,
    report: LoadReport,
}

/// Observable model state
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub state: LoaderState,
    pub model_loaded: bool,
    pub weights_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Shared classifier with atomic reload
pub struct ModelService {
    loader: ClassifierLoader,
    published: RwLock<Published>,
    reload_guard: Mutex<()>,
}

impl ModelService {
    /// Create an unloaded service; call [`ModelService::reload`] to load
    pub fn new(loader: ClassifierLoader) -> Self {
        Self {
            loader,
            published: RwLock::new(Published {
                slot: Arc::new(ModelSlot::absent("model not loaded yet")),
                report: LoadReport::unloaded(),
            }),
            reload_guard: Mutex::new(()),
        }
    }

    /// Create the service and run the loading ladder once
    pub async fn start(loader: ClassifierLoader) -> Self {
        let service = Self::new(loader);
        service.reload().await;
        service
    }

    pub async fn from_config(config: &Config) -> Self {
        Self::start(ClassifierLoader::from_config(config)).await
    }

    /// Service with a pre-built slot, bypassing the ladder
    pub fn with_slot(loader: ClassifierLoader, slot: ModelSlot) -> Self {
        let state = match slot.handle() {
            Some(handle) => handle.state(),
            None => LoaderState::Failed,
        };
        let weights_path = slot
            .handle()
            .and_then(|h| h.weights_path().map(|p| p.to_path_buf()));

        Self {
            loader,
            published: RwLock::new(Published {
                slot: Arc::new(slot),
                report: LoadReport {
                    state,
                    weights_path,
                    attempts: Vec::new(),
                },
            }),
            reload_guard: Mutex::new(()),
        }
    }

    /// Current slot; hold it for the duration of one request
    pub async fn snapshot(&self) -> Arc<ModelSlot> {
        Arc::clone(&self.published.read().await.slot)
    }

    pub async fn status(&self) -> ModelStatus {
        let published = self.published.read().await;
        ModelStatus {
            state: published.report.state,
            model_loaded: published.slot.is_loaded(),
            weights_path: published.report.weights_path.clone(),
            detail: match published.slot.as_ref() {
                ModelSlot::Absent { reason } => Some(reason.clone()),
                ModelSlot::Loaded(_) => None,
            },
        }
    }

    /// Re-run the loading ladder and publish the result
    pub async fn reload(&self) -> LoadReport {
        let _guard = self.reload_guard.lock().await;

        {
            let mut published = self.published.write().await;
            if let Ok(loading) = published.report.state.transition(LoaderEvent::Begin) {
                published.report.state = loading;
            }
        }

        let loader = self.loader.clone();
        let (slot, report) = match tokio::task::spawn_blocking(move || loader.load()).await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(error = %err, "Loader task aborted");
                let reason = format!("loader task aborted: {}", err);
                let report = LoadReport {
                    state: LoaderState::Failed,
                    weights_path: None,
                    attempts: Vec::new(),
                };
                (ModelSlot::absent(reason), report)
            }
        };

        let mut published = self.published.write().await;
        published.slot = Arc::new(slot);
        published.report = report.clone();
        info!(state = ?report.state, "Model slot published");

        report
    }

    /// Write a replacement artifact, then reload
    pub async fn install_weights(&self, bytes: &[u8]) -> Result<LoadReport> {
        if bytes.is_empty() {
            return Err(NeuroError::Config("Refusing to install an empty weights file".to_string()));
        }

        let target = self.loader.resolver().install_target();
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut staging = target.clone().into_os_string();
        staging.push(".partial");
        let staging = PathBuf::from(staging);

        let staged = match tokio::fs::write(&staging, bytes).await {
            Ok(()) => tokio::fs::rename(&staging, &target).await,
            Err(err) => Err(err),
        };
        if let Err(err) = staged {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                debug!(path = %staging.display(), error = %cleanup, "No partial file to remove");
            }
            return Err(err.into());
        }
        info!(path = %target.display(), bytes = bytes.len(), "Installed weights artifact");

        Ok(self.reload().await)
    }
}
