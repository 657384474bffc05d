use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{
    config::Config,
    error::{AppError, AppResult},
};

use super::EngineHandle;

type Builder = dyn Fn() -> AppResult<EngineHandle> + Send + Sync;

/// Lazily built, process-wide engine
///
/// The first caller of [`SharedEngine::get_or_init`] starts the build on a
/// blocking thread; concurrent callers wait for that same build instead of
/// starting their own, even if the caller that started it goes away. Once built, every caller receives a clone of the same
/// handle. A failed build is not cached, so the next caller starts a fresh one.
#[derive(Clone)]
pub struct SharedEngine {
    cell: Arc<OnceCell<EngineHandle>>,
    builder: Arc<Builder>,
}

impl SharedEngine {
    /// Builds from the dataset and tuning described by `config`
    pub fn new(config: Config) -> Self {
        Self::with_builder(move || EngineHandle::from_config(&config))
    }

    /// Builds with an arbitrary blocking constructor
    pub fn with_builder<F>(builder: F) -> Self
    where
        F: Fn() -> AppResult<EngineHandle> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            builder: Arc::new(builder),
        }
    }

    /// Returns the engine, building it first if no build has completed
    ///
    /// The build is driven by its own task, so dropping or aborting this
    /// future only abandons the wait. Later callers join the build that is
    /// still in flight.
    pub async fn get_or_init(&self) -> AppResult<EngineHandle> {
        if let Some(handle) = self.cell.get() {
            return Ok(handle.clone());
        }

        let cell = Arc::clone(&self.cell);
        let builder = Arc::clone(&self.builder);

        tokio::spawn(async move {
            cell.get_or_try_init(|| async move {
                tracing::info!("Building recommendation engine");

                tokio::task::spawn_blocking(move || builder())
                    .await
                    .map_err(|e| AppError::Internal(format!("Engine build task failed: {}", e)))
                    .and_then(|built| built)
                    .map_err(|e| {
                        tracing::error!(error = %e, "Engine build failed");
                        e
                    })
            })
            .await
            .map(EngineHandle::clone)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Engine build task failed: {}", e)))?
    }

    /// The engine if a build has already completed
    pub fn get(&self) -> Option<EngineHandle> {
        self.cell.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}
