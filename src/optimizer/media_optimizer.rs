//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore principale: scansione → fan-out concorrente → report.
//!
//! ## Flusso di esecuzione:
//! 1. **Scan**: `FileScanner` sul blocking pool, cancellabile via broadcast
//! 2. **Fan-out**: un task `spawn_blocking` per file, eventualmente limitato
//!    da un semaforo (`Concurrency::Bounded`)
//! 3. **Join**: gli handle vengono attesi nell'ordine di input, quindi
//!    `results[i]` appartiene sempre a `files[i]`
//! 4. **Report**: aggregazione e riepilogo nei log
//!
//! Un errore su un file non interrompe la run né gli altri file. La
//! cancellazione viene controllata solo durante la scansione: un file già
//! avviato arriva sempre in fondo.

use crate::{
    config::{OptimizeConfig, ScanConfig},
    error::{ScanError, TransformError},
    file_manager::{FileManager, MediaFile},
    optimizer::task_optimizer::TaskOptimizer,
    progress::ProgressManager,
    report::{OptimizationReport, OptimizeResult},
    scanner::FileScanner,
    transform::TransformerRegistry,
};
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Semaphore};
use tracing::{error, info};

/// Fan-out strategy for per-file tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One task per file, all started at once
    #[default]
    Unbounded,
    /// At most `n` files in flight
    Bounded(usize),
}

impl Concurrency {
    /// `None` means one task per file; zero workers is rejected
    pub fn from_workers(workers: Option<usize>) -> Result<Self> {
        let concurrency = match workers {
            Some(n) => Self::Bounded(n),
            None => Self::Unbounded,
        };
        concurrency.validate()?;
        Ok(concurrency)
    }

    pub fn validate(&self) -> Result<()> {
        if *self == Self::Bounded(0) {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }
        Ok(())
    }
}

/// Orchestratore principale
pub struct MediaOptimizer {
    task_optimizer: TaskOptimizer,
    concurrency: Concurrency,
    show_progress: bool,
}

impl MediaOptimizer {
    /// Crea nuova istanza dell'ottimizzatore
    pub fn new(registry: TransformerRegistry, config: OptimizeConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            task_optimizer: TaskOptimizer::new(Arc::new(registry), Arc::new(config)),
            concurrency: Concurrency::default(),
            show_progress: false,
        })
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Result<Self> {
        concurrency.validate()?;
        self.concurrency = concurrency;
        Ok(self)
    }

    /// Draw a progress bar while files are processed
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &OptimizeConfig {
        self.task_optimizer.config()
    }

    /// Scan and process a directory tree.
    ///
    /// A scan failure aborts before any file is touched and yields no report.
    pub async fn optimize_directory(
        &self,
        scan_config: &ScanConfig,
        stop_receiver: Option<broadcast::Receiver<()>>,
    ) -> Result<OptimizationReport, ScanError> {
        let start = Instant::now();
        info!(
            "Starting file optimization in: {}",
            scan_config.root_path.display()
        );

        let files = self.scan(scan_config, stop_receiver).await?;
        let mut report = self.run(files).await;
        report.duration = start.elapsed();
        Ok(report)
    }

    /// Run the scanner on the blocking pool
    pub async fn scan(
        &self,
        scan_config: &ScanConfig,
        stop_receiver: Option<broadcast::Receiver<()>>,
    ) -> Result<Vec<MediaFile>, ScanError> {
        let scan_config = scan_config.clone();

        let scanned = tokio::task::spawn_blocking(move || {
            let mut scanner = match stop_receiver {
                Some(receiver) => FileScanner::with_cancellation(receiver),
                None => FileScanner::new(),
            };
            scanner.scan(&scan_config)
        })
        .await
        .map_err(|e| ScanError::Task(e.to_string()))?;

        if let Err(ref e) = scanned {
            error!("Failed to scan files: {}", e);
        }
        scanned
    }

    /// Process already discovered files concurrently.
    ///
    /// Always returns exactly one result per input file, in input order.
    pub async fn run(&self, files: Vec<MediaFile>) -> OptimizationReport {
        let start = Instant::now();

        if files.is_empty() {
            info!("No files found to optimize");
            return OptimizationReport::from_results(Vec::new(), start.elapsed());
        }

        info!("Found {} files to process", files.len());

        let progress = ProgressManager::new(files.len() as u64, self.show_progress);
        let semaphore = match self.concurrency {
            Concurrency::Bounded(workers) => Some(Arc::new(Semaphore::new(workers))),
            Concurrency::Unbounded => None,
        };

        let mut tasks = Vec::with_capacity(files.len());
        for file in &files {
            // The semaphore is never closed, so acquiring only waits
            let permit = match &semaphore {
                Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                None => None,
            };
            let task_optimizer = self.task_optimizer.clone();
            let progress = progress.clone();
            let file = file.clone();

            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let result = task_optimizer.process_single_file(file);
                progress.file_done(&result);
                result
            }));
        }

        let results: Vec<OptimizeResult> = files
            .into_iter()
            .zip(join_all(tasks).await)
            .map(|(file, joined)| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Worker for {} failed: {}", file.path.display(), e);
                    let result = OptimizeResult::failed(
                        file,
                        TransformError::TaskFailed(e.to_string()),
                        Duration::ZERO,
                    );
                    progress.file_done(&result);
                    result
                }
            })
            .collect();

        let report = OptimizationReport::from_results(results, start.elapsed());
        progress.finish(&report.format_summary());
        Self::log_summary(&report);
        report
    }

    fn log_summary(report: &OptimizationReport) {
        info!("Optimization complete in {:?}", report.duration);
        info!("Files processed: {}", report.total_files);
        info!("Files optimized: {}", report.optimized_files);

        if report.failed_files > 0 {
            info!("Errors encountered: {}", report.failed_files);
        }

        if report.total_savings > 0 {
            info!(
                "Total space saved: {} ({:.1}%)",
                FileManager::format_size(report.total_savings),
                report.total_savings_percent()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_manager::FileType;
    use crate::optimizer::StopSignal;
    use crate::test_support;
    use crate::transform::{ImageTransformer, Transformer};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Sleeps longer for earlier files so completion order is reversed,
    /// and records the peak number of files in flight
    #[derive(Clone, Default)]
    struct SlowEcho {
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Transformer for SlowEcho {
        fn name(&self) -> &'static str {
            "slow-echo"
        }

        fn can_process(&self, file: &MediaFile) -> bool {
            file.file_type == FileType::Image
        }

        fn process(&self, file: &MediaFile, _config: &OptimizeConfig) -> OptimizeResult {
            let in_flight = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(in_flight, Ordering::SeqCst);

            let delay = 200u64.saturating_sub(file.size * 10);
            std::thread::sleep(Duration::from_millis(delay));

            self.active.fetch_sub(1, Ordering::SeqCst);
            OptimizeResult::optimized(file.clone(), file.size / 2, Duration::from_millis(delay))
        }
    }

    struct Panicking;

    impl Transformer for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn can_process(&self, file: &MediaFile) -> bool {
            file.display_name() == "boom.png"
        }

        fn process(&self, _file: &MediaFile, _config: &OptimizeConfig) -> OptimizeResult {
            panic!("transformer bug");
        }
    }

    fn numbered_files(count: u64) -> Vec<MediaFile> {
        (0..count)
            .map(|i| MediaFile::new(format!("img_{:02}.png", i), FileType::Image, i + 2))
            .collect()
    }

    fn optimizer_with(registry: TransformerRegistry) -> MediaOptimizer {
        MediaOptimizer::new(registry, OptimizeConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_results_are_index_aligned() {
        let files = numbered_files(16);
        let optimizer = optimizer_with(TransformerRegistry::new().with(SlowEcho::default()));

        let report = optimizer.run(files.clone()).await;

        assert_eq!(report.total_files, files.len());
        assert_eq!(report.results.len(), files.len());
        for (file, result) in files.iter().zip(&report.results) {
            assert_eq!(&result.file, file);
        }
        assert_eq!(report.optimized_files, 16);
    }

    #[tokio::test]
    async fn test_bounded_concurrency_caps_in_flight_files() {
        let transformer = SlowEcho::default();
        let peak = transformer.peak.clone();
        let optimizer = optimizer_with(TransformerRegistry::new().with(transformer))
            .with_concurrency(Concurrency::Bounded(2))
            .unwrap();

        let files = numbered_files(8);
        let report = optimizer.run(files.clone()).await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(report.results.len(), 8);
        for (file, result) in files.iter().zip(&report.results) {
            assert_eq!(&result.file, file);
        }
    }

    #[tokio::test]
    async fn test_unsupported_files_do_not_abort_the_run() {
        let optimizer = optimizer_with(TransformerRegistry::new().with(SlowEcho::default()));
        let files = vec![
            MediaFile::new("a.png", FileType::Image, 10),
            MediaFile::new("package.json", FileType::Json, 10),
            MediaFile::new("b.png", FileType::Image, 10),
        ];

        let report = optimizer.run(files).await;

        assert_eq!(report.total_files, 3);
        assert_eq!(report.failed_files, 1);
        assert_eq!(report.optimized_files, 2);
        assert_eq!(
            report.results[1].error,
            Some(TransformError::UnsupportedFileType("json".to_string()))
        );
    }

    #[tokio::test]
    async fn test_panicking_transformer_still_yields_a_result() {
        let registry = TransformerRegistry::new()
            .with(Panicking)
            .with(SlowEcho::default());
        let optimizer = optimizer_with(registry);
        let files = vec![
            MediaFile::new("a.png", FileType::Image, 10),
            MediaFile::new("boom.png", FileType::Image, 10),
        ];

        let report = optimizer.run(files).await;

        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].was_optimized());
        assert!(matches!(
            report.results[1].error,
            Some(TransformError::TaskFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_scenario_with_unsupported_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("a.png");
        test_support::write_png(&png, 2000, 1500);
        fs::write(temp_dir.path().join("b.txt"), b"hello").unwrap();

        let config = OptimizeConfig {
            quality: 85,
            max_width: 1920,
            max_height: 1080,
            ..Default::default()
        };
        let optimizer = MediaOptimizer::new(TransformerRegistry::standard(), config).unwrap();
        let report = optimizer
            .optimize_directory(&ScanConfig::new(temp_dir.path()), None)
            .await
            .unwrap();

        assert_eq!(report.total_files, 1);
        assert_eq!(report.failed_files, 0);
        assert!(report.optimized_files <= 1);
        assert!(report
            .results
            .iter()
            .all(|r| r.file.display_name() != "b.txt"));

        for result in report.optimized() {
            assert_eq!(fs::metadata(&result.file.path).unwrap().len(), result.new_size);
            assert_eq!(result.savings, result.original_size - result.new_size);
        }
        assert_eq!(
            test_support::dir_entries(temp_dir.path()),
            vec!["a.png", "b.txt"]
        );
    }

    #[tokio::test]
    async fn test_excluded_files_never_reach_the_report() {
        let temp_dir = TempDir::new().unwrap();
        test_support::write_png(&temp_dir.path().join("a.png"), 32, 32);
        test_support::write_png(&temp_dir.path().join("leftover.tmp.png"), 32, 32);
        fs::write(temp_dir.path().join("leftover.tmp"), b"stray").unwrap();

        let scan_config = ScanConfig {
            exclude: vec!["*.tmp".to_string(), "leftover.tmp.png".to_string()],
            ..ScanConfig::new(temp_dir.path())
        };
        let optimizer = optimizer_with(TransformerRegistry::standard());
        let report = optimizer.optimize_directory(&scan_config, None).await.unwrap();

        let names: Vec<String> = report.results.iter().map(|r| r.file.display_name()).collect();
        assert_eq!(names, vec!["a.png"]);
    }

    #[tokio::test]
    async fn test_dry_run_mutates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        test_support::write_png(&temp_dir.path().join("a.png"), 2000, 1500);
        test_support::write_jpeg(&temp_dir.path().join("b.jpg"), 2000, 1500, 100);
        let before_a = fs::read(temp_dir.path().join("a.png")).unwrap();
        let before_b = fs::read(temp_dir.path().join("b.jpg")).unwrap();

        let config = OptimizeConfig {
            dry_run: true,
            ..Default::default()
        };
        let optimizer = MediaOptimizer::new(TransformerRegistry::standard(), config).unwrap();
        let report = optimizer
            .optimize_directory(&ScanConfig::new(temp_dir.path()), None)
            .await
            .unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_savings, 0);
        assert!(report.results.iter().all(|r| r.new_size == r.original_size));
        assert_eq!(fs::read(temp_dir.path().join("a.png")).unwrap(), before_a);
        assert_eq!(fs::read(temp_dir.path().join("b.jpg")).unwrap(), before_b);
    }

    #[tokio::test]
    async fn test_optimized_files_match_disk_after_run() {
        let temp_dir = TempDir::new().unwrap();
        test_support::write_png(&temp_dir.path().join("one.png"), 2400, 1200);
        test_support::write_jpeg(&temp_dir.path().join("two.jpeg"), 2400, 1200, 100);
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        test_support::write_png(&temp_dir.path().join("nested/three.png"), 2200, 2200);

        let optimizer = optimizer_with(TransformerRegistry::standard())
            .with_concurrency(Concurrency::Bounded(2))
            .unwrap();
        let report = optimizer
            .optimize_directory(&ScanConfig::new(temp_dir.path()), None)
            .await
            .unwrap();

        assert_eq!(report.total_files, 3);
        assert_eq!(report.failed_files, 0);
        assert_eq!(report.optimized_files, 3);
        for result in &report.results {
            assert_eq!(fs::metadata(&result.file.path).unwrap().len(), result.new_size);
        }
        assert!(report.total_savings_percent() > 0.0);
    }

    #[tokio::test]
    async fn test_scan_failure_produces_no_report() {
        let temp_dir = TempDir::new().unwrap();
        let optimizer = optimizer_with(TransformerRegistry::standard());

        let result = optimizer
            .optimize_directory(&ScanConfig::new(temp_dir.path().join("missing")), None)
            .await;

        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[tokio::test]
    async fn test_cancelled_scan_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        test_support::write_png(&temp_dir.path().join("a.png"), 32, 32);
        let before = fs::read(temp_dir.path().join("a.png")).unwrap();

        let (stop_sender, stop_receiver) = broadcast::channel(1);
        stop_sender.send(()).unwrap();

        let optimizer = optimizer_with(TransformerRegistry::standard());
        let result = optimizer
            .optimize_directory(&ScanConfig::new(temp_dir.path()), Some(stop_receiver))
            .await;

        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert_eq!(fs::read(temp_dir.path().join("a.png")).unwrap(), before);
    }

    #[tokio::test]
    async fn test_empty_directory_gives_empty_report() {
        let temp_dir = TempDir::new().unwrap();
        let optimizer = optimizer_with(TransformerRegistry::standard());

        let report = tokio_test::assert_ok!(
            optimizer
                .optimize_directory(&ScanConfig::new(temp_dir.path()), None)
                .await
        );
        assert_eq!(report.total_files, 0);
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = OptimizeConfig {
            quality: 0,
            ..Default::default()
        };
        assert!(MediaOptimizer::new(TransformerRegistry::standard(), config).is_err());
    }

    #[test]
    fn test_concurrency_from_workers() {
        assert_eq!(
            Concurrency::from_workers(None).unwrap(),
            Concurrency::Unbounded
        );
        assert_eq!(
            Concurrency::from_workers(Some(4)).unwrap(),
            Concurrency::Bounded(4)
        );
        assert!(Concurrency::from_workers(Some(0)).is_err());
    }

    #[test]
    fn test_zero_workers_rejected_by_builder() {
        let optimizer = optimizer_with(TransformerRegistry::standard());
        assert!(optimizer.with_concurrency(Concurrency::Bounded(0)).is_err());
    }

    #[tokio::test]
    async fn test_interrupt_after_scan_lets_in_flight_files_finish() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            test_support::write_png(&temp_dir.path().join(name), 2000, 1500);
        }

        let stop = StopSignal::new();
        let optimizer = optimizer_with(TransformerRegistry::standard())
            .with_concurrency(Concurrency::Bounded(1))
            .unwrap();
        let files = optimizer
            .scan(&ScanConfig::new(temp_dir.path()), Some(stop.subscribe()))
            .await
            .unwrap();

        let signal = stop.clone();
        let interrupter = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            signal.request_stop()
        });
        let report = optimizer.run(files).await;

        // The scan is over, so nobody aborts: the interrupt is only recorded
        assert!(!interrupter.await.unwrap());
        assert!(stop.is_interrupted());
        assert_eq!(report.total_files, 3);
        assert_eq!(report.failed_files, 0);
        assert_eq!(report.optimized_files, 3);
        assert_eq!(
            test_support::dir_entries(temp_dir.path()),
            vec!["a.png", "b.png", "c.png"]
        );
    }

    #[test]
    fn test_image_transformer_is_a_transformer() {
        let registry = TransformerRegistry::new().with(ImageTransformer::new());
        let optimizer = optimizer_with(registry);
        assert_eq!(optimizer.config().quality, 85);
    }
}
