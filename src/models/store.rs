//! Load-once cache for the inference artifacts

use crate::config::ArtifactsConfig;
use crate::error::{AdvisorError, ArtifactKind, Result};
use crate::models::loader::{ArtifactSource, Artifacts, FileArtifactSource};
use once_cell::sync::OnceCell;
use std::time::Instant;
use tracing::{error, info};

/// Read-only artifact cache.
///
/// The first successful `get` runs the source's loader; concurrent first
/// callers block on the same initialization instead of loading again. A failed
/// load leaves the cache empty so a later call can retry.
pub struct ArtifactStore {
    source: Box<dyn ArtifactSource>,
    artifacts: OnceCell<Artifacts>,
}

impl ArtifactStore {
    pub fn new(source: impl ArtifactSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            artifacts: OnceCell::new(),
        }
    }

    /// Store reading the files named in the configuration.
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self::new(FileArtifactSource::from_config(config))
    }

    /// Store around artifacts that are already in memory.
    pub fn preloaded(artifacts: Artifacts) -> Self {
        Self {
            source: Box::new(Preloaded),
            artifacts: OnceCell::with_value(artifacts),
        }
    }

    /// Cached artifacts, loading them on first use.
    pub fn get(&self) -> Result<&Artifacts> {
        self.artifacts.get_or_try_init(|| {
            let started = Instant::now();
            info!(source = %self.source.describe(), "Loading artifacts");

            match self.source.load() {
                Ok(artifacts) => {
                    info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Artifacts ready"
                    );
                    Ok(artifacts)
                }
                Err(e) => {
                    error!(error = %e, "Artifact load failed");
                    Err(e)
                }
            }
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }
}

/// Source behind a preloaded store. The cell is filled up front, so `load`
/// only runs if that invariant is broken.
struct Preloaded;

impl ArtifactSource for Preloaded {
    fn load(&self) -> Result<Artifacts> {
        Err(AdvisorError::incompatible(
            ArtifactKind::Model,
            "preloaded store has no source",
        ))
    }

    fn describe(&self) -> String {
        "in-memory artifacts".to_string()
    }
}
