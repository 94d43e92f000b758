//! # Optimizer Module
//!
//! Separa le responsabilità in sottomoduli:
//! - `media_optimizer`: Orchestratore principale (scan, fan-out, report)
//! - `task_optimizer`: Worker per singoli file (dispatch + process)
//! - `stop_signal`: Interruzione condivisa (Ctrl-C → scansione)

pub mod media_optimizer;
pub mod stop_signal;
pub mod task_optimizer;

pub use media_optimizer::{Concurrency, MediaOptimizer};
pub use stop_signal::StopSignal;
pub use task_optimizer::TaskOptimizer;
