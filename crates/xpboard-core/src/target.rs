//! Render targets: where finished scenes go
//!
//! Each `present` fully replaces whatever the slot showed before.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::charts::{to_svg, ChartSlot, Scene};
use crate::error::CoreError;

/// Sink for the coordinator's output
pub trait RenderTarget: Send + Sync {
    /// A cycle started; previous output may be dimmed or kept
    fn show_loading(&self);

    /// Replace the slot's content with `scene`
    fn present(&self, slot: ChartSlot, scene: &Scene) -> Result<(), CoreError>;

    /// A cycle failed before any chart could be drawn
    fn show_error(&self, message: &str);
}

/// Keeps the latest scene per slot in memory
#[derive(Debug, Default)]
pub struct MemoryTarget {
    scenes: RwLock<HashMap<ChartSlot, Scene>>,
    errors: RwLock<Vec<String>>,
    loading_count: RwLock<usize>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self, slot: ChartSlot) -> Option<Scene> {
        self.scenes.read().get(&slot).cloned()
    }

    pub fn slot_count(&self) -> usize {
        self.scenes.read().len()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.read().clone()
    }

    pub fn loading_count(&self) -> usize {
        *self.loading_count.read()
    }
}

impl RenderTarget for MemoryTarget {
    fn show_loading(&self) {
        *self.loading_count.write() += 1;
    }

    fn present(&self, slot: ChartSlot, scene: &Scene) -> Result<(), CoreError> {
        self.scenes.write().insert(slot, scene.clone());
        Ok(())
    }

    fn show_error(&self, message: &str) {
        self.errors.write().push(message.to_string());
    }
}

/// Writes `<dir>/<slot id>.svg`, overwriting previous files
#[derive(Debug, Clone)]
pub struct SvgFileTarget {
    dir: PathBuf,
}

impl SvgFileTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, slot: ChartSlot) -> PathBuf {
        self.dir.join(format!("{}.svg", slot.id()))
    }
}

impl RenderTarget for SvgFileTarget {
    fn show_loading(&self) {
        debug!(dir = %self.dir.display(), "Rendering into directory");
    }

    fn present(&self, slot: ChartSlot, scene: &Scene) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| CoreError::FileWrite {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(slot);
        // Atomic replace via sibling temp file
        let tmp = path.with_extension("svg.tmp");
        fs::write(&tmp, to_svg(scene)).map_err(|source| CoreError::FileWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| CoreError::FileWrite {
            path: path.clone(),
            source,
        })?;

        debug!(slot = %slot, path = %path.display(), "Chart written");
        Ok(())
    }

    fn show_error(&self, message: &str) {
        warn!(error = message, "Dashboard load failed");
    }
}
