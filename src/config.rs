//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - `ScanConfig`: radice, pattern include/exclude e politica di ricorsione
//! - `OptimizeConfig`: parametri di ottimizzazione condivisi in sola lettura
//!   da tutti i worker della stessa run
//! - `Settings`: contenitore serializzabile (JSON) per caricare/salvare la
//!   configurazione da file
//!
//! ## Parametri di ottimizzazione:
//! - `quality`: Qualità JPEG (1-100, default: 85)
//! - `max_width` / `max_height`: Bounding box per il resize (default: 1920x1080)
//! - `dry_run`: Simulazione senza modifiche su disco (default: false)
//! - `verbose`: Logging dettagliato per file (default: false)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che max_width e max_height siano > 0
//! - Controlla che workers, se specificato, sia > 0
//!
//! ## Esempio:
//! ```rust
//! use prefine::config::OptimizeConfig;
//!
//! let config = OptimizeConfig {
//!     quality: 70,
//!     max_width: 1280,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where to look and which files to consider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory to walk
    pub root_path: PathBuf,
    /// Filename globs; when non-empty only matching files are kept
    pub include: Vec<String>,
    /// Filename globs or path substrings; always win over `include`
    pub exclude: Vec<String>,
    /// Descend into sub-directories
    pub recursive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            include: Vec::new(),
            exclude: Vec::new(),
            recursive: true,
        }
    }
}

impl ScanConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Default::default()
        }
    }
}

/// Parameters shared read-only by every transform of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Maximum width before an image is fit-resized
    pub max_width: u32,
    /// Maximum height before an image is fit-resized
    pub max_height: u32,
    /// Report what would happen without touching the disk
    pub dry_run: bool,
    /// Per-file logging
    pub verbose: bool,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            max_width: 1920,
            max_height: 1080,
            dry_run: false,
            verbose: false,
        }
    }
}

impl OptimizeConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.max_width == 0 || self.max_height == 0 {
            return Err(anyhow::anyhow!("Maximum width and height must be greater than 0"));
        }

        Ok(())
    }
}

/// Complete set of settings, loadable from and savable to a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanConfig,
    pub optimize: OptimizeConfig,
    /// Bounded worker pool size; `None` spawns one task per file
    pub workers: Option<usize>,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.optimize.validate()?;

        if self.workers == Some(0) {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        Ok(())
    }

    /// Load settings from file, defaults when the file does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
