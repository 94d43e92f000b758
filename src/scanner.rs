//! # File Scanner Module
//!
//! Discovery dei file da ottimizzare a partire da una directory radice.
//!
//! ## Responsabilità:
//! - Attraversamento dell'albero con `walkdir` (ordinato per nome)
//! - Pruning delle sotto-directory quando `recursive == false`
//! - Filtri include/exclude tramite `GlobFilter`
//! - Classificazione per estensione: i file `Unsupported` non vengono emessi
//! - Controllo cooperativo della cancellazione tra un'entry e l'altra
//!
//! ## Regole di filtro:
//! 1. **Exclude** (precedenza): glob sul nome file OPPURE sottostringa del path
//! 2. **Include**: se non vuoto, serve un match glob sul nome file
//! 3. **Tipo**: solo immagini, JSON e YAML
//!
//! Un errore di attraversamento (permessi, I/O) interrompe l'intera scansione:
//! non vengono restituiti risultati parziali.

use crate::{
    config::ScanConfig,
    error::ScanError,
    file_manager::{FileType, MediaFile},
};
use std::path::Path;
use tokio::sync::broadcast;
use tracing::debug;
use walkdir::WalkDir;

/// A user pattern compiled once. Invalid globs still take part in the
/// path-substring exclusion test.
#[derive(Debug, Clone)]
struct CompiledPattern {
    raw: String,
    glob: Option<glob::Pattern>,
}

impl CompiledPattern {
    fn new(raw: &str) -> Self {
        let glob = match glob::Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                debug!("Pattern '{}' is not a valid glob: {}", raw, e);
                None
            }
        };

        Self {
            raw: raw.to_string(),
            glob,
        }
    }

    fn matches_name(&self, file_name: &str) -> bool {
        self.glob
            .as_ref()
            .is_some_and(|glob| glob.matches(file_name))
    }
}

/// Include/exclude filter applied to every discovered file
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    include: Vec<CompiledPattern>,
    exclude: Vec<CompiledPattern>,
}

impl GlobFilter {
    /// Compile the patterns. Empty strings are ignored.
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| CompiledPattern::new(p))
                .collect()
        };

        Self {
            include: compile(include),
            exclude: compile(exclude),
        }
    }

    /// True when the file name matches an exclude glob or the full path
    /// contains an exclude pattern
    pub fn should_exclude(&self, path: &Path) -> bool {
        let file_name = file_name_of(path);
        let full_path = path.to_string_lossy();

        self.exclude
            .iter()
            .any(|p| p.matches_name(&file_name) || full_path.contains(p.raw.as_str()))
    }

    /// True when no include patterns are set, or the file name matches one
    pub fn should_include(&self, path: &Path) -> bool {
        if self.include.is_empty() {
            return true;
        }

        let file_name = file_name_of(path);
        self.include.iter().any(|p| p.matches_name(&file_name))
    }

    /// Exclusion first, then inclusion
    pub fn accepts(&self, path: &Path) -> bool {
        !self.should_exclude(path) && self.should_include(path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Walks a directory tree and produces classified file descriptors
#[derive(Default)]
pub struct FileScanner {
    stop_receiver: Option<broadcast::Receiver<()>>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner that aborts with [`ScanError::Cancelled`] once a stop signal
    /// arrives on `stop_receiver`
    pub fn with_cancellation(stop_receiver: broadcast::Receiver<()>) -> Self {
        Self {
            stop_receiver: Some(stop_receiver),
        }
    }

    fn is_cancelled(&mut self) -> bool {
        let Some(receiver) = self.stop_receiver.as_mut() else {
            return false;
        };

        match receiver.try_recv() {
            Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(broadcast::error::TryRecvError::Empty)
            | Err(broadcast::error::TryRecvError::Closed) => false,
        }
    }

    /// Discover every eligible file under `config.root_path`.
    ///
    /// Output order follows the traversal (lexical per directory). Sizes are
    /// captured here and not refreshed later.
    pub fn scan(&mut self, config: &ScanConfig) -> Result<Vec<MediaFile>, ScanError> {
        if !config.root_path.exists() {
            return Err(ScanError::RootNotFound(config.root_path.clone()));
        }

        let filter = GlobFilter::new(&config.include, &config.exclude);
        let mut files = Vec::new();
        let mut walker = WalkDir::new(&config.root_path).sort_by_file_name();
        if !config.recursive {
            // Subdirectories are listed but never opened
            walker = walker.max_depth(1);
        }

        for entry in walker {
            if self.is_cancelled() {
                debug!("Stop signal received, aborting scan");
                return Err(ScanError::Cancelled);
            }

            let entry = entry?;

            // Directories are descended into, symlinks are neither followed nor replaced
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !filter.accepts(path) {
                continue;
            }

            let kind = FileType::from_path(path);
            if kind == FileType::Unsupported {
                continue;
            }

            let size = entry.metadata()?.len();
            files.push(MediaFile::new(path, kind, size));
        }

        debug!(
            "Scan of {} found {} files",
            config.root_path.display(),
            files.len()
        );

        Ok(files)
    }
}
