//! # Errores del Registro de Jobs
//! src/jobs/error.rs
//!
//! Taxonomía cerrada de fallos que puede devolver el `JobRegistry`.
//! Todas las variantes (excepto `Spawn`) son condiciones esperadas que el
//! cliente puede corregir; el mensaje explica *por qué* se rechazó la operación.

use crate::jobs::job::JobState;
use thiserror::Error;

/// Errores del gestor de jobs
#[derive(Debug, Error)]
pub enum JobError {
    /// El registro ya alcanzó su capacidad máxima
    #[error("The number of processes has been exceeded. ({current}/{limit} running)")]
    AdmissionExceeded { current: usize, limit: usize },

    /// No existe un job con ese id
    #[error("The process with id '{id}' was not found.")]
    NotFound { id: String },

    /// Ya existe un job registrado con ese id
    #[error("The process with id '{id}' already exists.")]
    AlreadyExists { id: String },

    /// Se pidió iniciar un job que no está en cola
    #[error("The process with id '{id}' has already been executed and might already be completed.")]
    AlreadyStarted { id: String },

    /// Se pidió el progreso de un job que no está corriendo
    #[error("The process with id '{id}' {}", not_running_reason(.current_state))]
    NotRunning { id: String, current_state: JobState },

    /// Se pidió el resultado de un job que no ha terminado
    #[error("The process with id '{id}' {}", not_completed_reason(.current_state))]
    NotCompleted { id: String, current_state: JobState },

    /// El sistema operativo no pudo crear el thread del loop de progreso
    #[error("failed to spawn progress loop: {0}")]
    Spawn(#[from] std::io::Error),
}

impl JobError {
    /// Indica si el error es una condición esperada (rechazo explicable al cliente)
    pub fn is_expected(&self) -> bool {
        !matches!(self, JobError::Spawn(_))
    }
}

fn not_running_reason(state: &JobState) -> &'static str {
    match state {
        JobState::Queued => "has not started execution.",
        JobState::Completed => "has been completed.",
        JobState::Running => "is not running.",
    }
}

fn not_completed_reason(state: &JobState) -> &'static str {
    match state {
        JobState::Queued => "has not started execution.",
        JobState::Running => "has not been completed and is running.",
        JobState::Completed => "has not been completed.",
    }
}

/// Alias de resultado usado por el módulo de jobs
pub type Result<T> = std::result::Result<T, JobError>;
