//! # Sistema de Jobs
//! src/jobs/mod.rs
//!
//! Ciclo de vida de los trabajos ejecutados sobre archivos subidos:
//!
//! ```text
//! add_job → Queued ──start_execution──▶ Running ──(loop)──▶ Completed ──get_result──▶ (eliminado)
//! ```
//!
//! Cada job en ejecución avanza en su propio thread; el `JobRegistry`
//! limita cuántos jobs pueden existir a la vez.

pub mod dataset;
pub mod error;
pub mod handlers;
pub mod job;
pub mod registry;

pub use dataset::{ResultTable, UserRecord};
pub use error::JobError;
pub use job::{Job, JobState};
pub use registry::{JobRegistry, RegistryConfig};
