//! # Progress Tracking Module
//!
//! Progress bar visuale con `indicatif` per il feedback in tempo reale.
//!
//! ## Responsabilità:
//! - Una tacca per ogni file completato, con messaggio di esito
//! - Messaggio finale con il riepilogo della run
//! - Barra nascosta in modalità JSON e nei test
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 90/150 (60%) [OK] photo.jpg: 45.2% saved
//! ```

use crate::report::OptimizeResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; `visible == false` draws nothing
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Record one completed file
    pub fn file_done(&self, result: &OptimizeResult) {
        let name = result.file.display_name();
        let message = match &result.error {
            Some(error) => format!("[ERROR] {}: {}", name, error.kind()),
            None if result.was_optimized() => {
                format!("[OK] {}: {:.1}% saved", name, result.savings_percent())
            }
            None => format!("[SKIP] {}: no improvement", name),
        };
        self.update(&message);
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
