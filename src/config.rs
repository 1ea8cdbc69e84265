//! Application configuration management.
//!
//! Two layers live here:
//! - [`ScanConfig`]: the validated depth and size settings of one scan.
//! - [`Settings`]: tuning knobs layered with figment
//!   (defaults < TOML file < `DUPFIND_*` environment < command line).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::duplicates::{AcceptanceFilter, SizeFilter, SizeParseError};
use crate::scanner::hasher::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::scanner::WalkerConfig;

/// Environment variable prefix for settings.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Errors raised while building the configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// `min_depth` is greater than `max_depth`.
    #[error("mindepth ({min_depth}) is greater than maxdepth ({max_depth})")]
    DepthOrder {
        /// Requested minimum depth
        min_depth: usize,
        /// Requested maximum depth
        max_depth: usize,
    },

    /// The size expression could not be parsed.
    #[error("Invalid size expression: {0}")]
    InvalidSize(#[from] SizeParseError),

    /// An explicitly requested settings file does not exist.
    #[error("Settings file not found: {0}")]
    FileNotFound(PathBuf),

    /// `io_threads` was set to zero.
    #[error("io_threads must be at least 1")]
    InvalidIoThreads,

    /// The settings file or environment could not be read.
    #[error("Invalid settings: {0}")]
    Settings(#[source] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Settings(Box::new(e))
    }
}

/// Depth and size settings for one scan.
///
/// Always valid: `min_depth <= max_depth` when a maximum is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanConfig {
    min_depth: usize,
    max_depth: Option<usize>,
    size_filter: SizeFilter,
}

impl ScanConfig {
    /// Build a scan configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DepthOrder`] if `min_depth > max_depth`.
    pub fn new(
        min_depth: usize,
        max_depth: Option<usize>,
        size_filter: SizeFilter,
    ) -> Result<Self, ConfigError> {
        if let Some(max_depth) = max_depth {
            if min_depth > max_depth {
                return Err(ConfigError::DepthOrder {
                    min_depth,
                    max_depth,
                });
            }
        }
        Ok(Self {
            min_depth,
            max_depth,
            size_filter,
        })
    }

    /// Build a scan configuration from a raw size expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSize`] for a malformed expression and
    /// [`ConfigError::DepthOrder`] for inverted depths.
    pub fn parse(
        min_depth: usize,
        max_depth: Option<usize>,
        size: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let size_filter = match size {
            Some(expr) => expr.parse::<SizeFilter>()?,
            None => SizeFilter::default(),
        };
        Self::new(min_depth, max_depth, size_filter)
    }

    /// Minimum accepted depth.
    #[must_use]
    pub fn min_depth(&self) -> usize {
        self.min_depth
    }

    /// Deepest level the walker descends to.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Size gate.
    #[must_use]
    pub fn size_filter(&self) -> SizeFilter {
        self.size_filter
    }

    /// Acceptance filter built from these settings.
    #[must_use]
    pub fn acceptance_filter(&self) -> AcceptanceFilter {
        AcceptanceFilter::new(self.min_depth, self.size_filter)
    }

    /// Walker configuration built from these settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.max_depth)
    }
}

/// Tuning settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Threads used to digest files (1 = streaming).
    pub io_threads: usize,
    /// Read buffer size in bytes.
    pub buffer_size: usize,
    /// Output format.
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            io_threads: 4,
            buffer_size: DEFAULT_BUFFER_SIZE,
            output: OutputFormat::Text,
        }
    }
}

/// Values given on the command line; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    /// `--io-threads`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads: Option<usize>,
    /// `--buffer-size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<usize>,
    /// `--output`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
}

impl Settings {
    /// Load settings from every layer.
    ///
    /// `config_path` replaces the platform default settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if `config_path` is missing,
    /// [`ConfigError::Settings`] for a malformed file or a bad value and
    /// [`ConfigError::InvalidIoThreads`] for `io_threads = 0`.
    pub fn load(
        config_path: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                log::debug!("Loading settings from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.exists()) {
                    log::debug!("Loading settings from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        let settings: Settings = figment
            .merge(Env::prefixed(ENV_PREFIX).only(&["io_threads", "buffer_size", "output"]))
            .merge(Serialized::defaults(overrides))
            .extract()?;

        settings.validated()
    }

    /// Check invariants and normalize values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidIoThreads`] for `io_threads = 0`.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::InvalidIoThreads);
        }
        if self.buffer_size < MIN_BUFFER_SIZE {
            log::debug!(
                "Raising buffer size from {} to {} bytes",
                self.buffer_size,
                MIN_BUFFER_SIZE
            );
            self.buffer_size = MIN_BUFFER_SIZE;
        }
        Ok(self)
    }

    /// Platform-specific default settings file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupfind", "dupfind")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
