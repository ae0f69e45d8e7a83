//! Configuration system
//!
//! Every tunable lives in a serde struct; [`SimulationConfig`] aggregates them
//! and loads from `.toml` or `.ron` files through the [`Config`] trait.
//! Missing fields fall back to their defaults. Out-of-range octree limits are
//! clamped (with a warning) when the tree is built, never rejected.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::debug::{CollisionDebugVisualizer, OctreeDisplay, VolumeVisibility};
use crate::physics::CollisionConfig;
use crate::spatial::OctreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        log::debug!("Saved configuration to {}", path.display());
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Debug visualization settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw bounding spheres
    pub show_sphere: bool,
    /// Draw oriented boxes
    pub show_obb: bool,
    /// Draw re-aligned world boxes
    pub show_arbb: bool,
    /// Which octants to draw
    pub octree_display: OctreeDisplay,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_sphere: false,
            show_obb: true,
            show_arbb: false,
            octree_display: OctreeDisplay::Hidden,
        }
    }
}

impl DebugConfig {
    /// Volume parts to draw, as flags
    pub fn visibility(&self) -> VolumeVisibility {
        let mut flags = VolumeVisibility::empty();
        flags.set(VolumeVisibility::SPHERE, self.show_sphere);
        flags.set(VolumeVisibility::OBB, self.show_obb);
        flags.set(VolumeVisibility::ARBB, self.show_arbb);
        flags
    }

    /// A visualizer set up with these settings
    pub fn visualizer(&self) -> CollisionDebugVisualizer {
        let mut visualizer = CollisionDebugVisualizer::new();
        visualizer.visibility = self.visibility();
        visualizer.octree_display = self.octree_display;
        visualizer
    }
}

/// Everything needed to run the partition and collision pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Log filter in `RUST_LOG` syntax; `None` defers to the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    /// Octree limits
    pub octree: OctreeConfig,

    /// Collision pass settings
    pub collision: CollisionConfig,

    /// Debug drawing settings
    pub debug: DebugConfig,
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Install the logger described by [`Self::log_filter`]
    pub fn init_logging(&self) {
        match self.log_filter.as_deref() {
            Some(filter) => crate::foundation::logging::init_with_filter(filter),
            None => crate::foundation::logging::init(),
        }
    }
}
