//! # Estructura de Job
//! src/jobs/job.rs
//!
//! Representa una unidad de trabajo con su máquina de estados
//! (`Queued → Running → Completed`), su progreso y su resultado.
//!
//! El progreso avanza solo: al iniciar, el job lanza un thread propio que
//! duerme entre incrementos hasta completar todos los pasos.

use crate::jobs::error::{JobError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Duración por defecto de un job (segundos)
pub const DEFAULT_DURATION_SECS: u64 = 10;

/// Frecuencia por defecto del loop de progreso (pasos por segundo)
pub const DEFAULT_STEPS_PER_SECOND: u64 = 10;

/// Estados posibles de un job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Registrado, esperando que el cliente lo inicie
    Queued,

    /// El loop de progreso está avanzando
    Running,

    /// Terminado, con resultado disponible
    Completed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed => "completed",
        }
    }
}

/// Datos internos mutables del job
#[derive(Debug)]
struct JobData {
    state: JobState,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    total_steps: u64,
    completed_steps: u64,
    result: Option<String>,
}

impl JobData {
    fn queued() -> Self {
        Self {
            state: JobState::Queued,
            started_at: None,
            completed_at: None,
            total_steps: 0,
            completed_steps: 0,
            result: None,
        }
    }

    fn finish(&mut self, id: &str) {
        self.completed_steps = self.total_steps;
        self.completed_at = Some(Utc::now());
        // Resultado provisional: el id del artefacto que se descargará
        self.result = Some(id.to_string());
        self.state = JobState::Completed;
    }
}

/// Representa un job individual
#[derive(Debug)]
pub struct Job {
    /// ID único (derivado del artefacto subido)
    id: String,

    /// Nombre original del artefacto (solo para mostrar)
    source_name: String,

    /// Timestamp de creación
    created_at: DateTime<Utc>,

    /// Datos mutables (protegidos por Mutex)
    data: Mutex<JobData>,
}

impl Job {
    /// Crea un nuevo job en estado `Queued`
    pub fn new(id: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_name: source_name.into(),
            created_at: Utc::now(),
            data: Mutex::new(JobData::queued()),
        }
    }

    /// ID del job
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Nombre original del artefacto
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.data().started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.data().completed_at
    }

    /// Obtiene el estado actual
    pub fn state(&self) -> JobState {
        self.data().state
    }

    /// Pasos totales (0 hasta que el job se inicia)
    pub fn total_steps(&self) -> u64 {
        self.data().total_steps
    }

    /// Un thread de progreso que entró en pánico no invalida los datos:
    /// cada modificación deja el job en un estado consistente.
    fn data(&self) -> MutexGuard<'_, JobData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inicia la ejecución del job
    ///
    /// Solo es válido desde `Queued`. Calcula `total_steps = duración * frecuencia`,
    /// pasa a `Running` y lanza el loop de progreso en su propio thread.
    /// Con cero pasos el job se completa inmediatamente, sin thread.
    ///
    /// El thread se crea mientras se mantiene el lock del job: si el sistema
    /// operativo lo rechaza, el job vuelve a `Queued` antes de que nadie
    /// observe el estado intermedio.
    pub fn start(
        self: &Arc<Self>,
        duration_secs: Option<u64>,
        steps_per_second: Option<u64>,
    ) -> Result<()> {
        let mut data = self.data();

        if data.state != JobState::Queued {
            return Err(JobError::AlreadyStarted { id: self.id.clone() });
        }

        let duration_secs = duration_secs.unwrap_or(DEFAULT_DURATION_SECS);
        let steps_per_second = steps_per_second.unwrap_or(DEFAULT_STEPS_PER_SECOND).max(1);

        data.total_steps = duration_secs.saturating_mul(steps_per_second);
        data.state = JobState::Running;
        data.started_at = Some(Utc::now());

        if data.total_steps == 0 {
            data.finish(&self.id);
            tracing::info!(job_id = %self.id, "job completed without steps");
            return Ok(());
        }

        let tick = Duration::from_millis(1000 / steps_per_second);
        let job = Arc::clone(self);

        let spawned = thread::Builder::new()
            .name(format!("job-{}", self.id))
            .spawn(move || job.run_progress_loop(tick));

        if let Err(e) = spawned {
            *data = JobData::queued();
            return Err(JobError::Spawn(e));
        }

        tracing::info!(
            job_id = %self.id,
            total_steps = data.total_steps,
            tick_ms = tick.as_millis() as u64,
            "job started"
        );

        Ok(())
    }

    /// Loop de progreso: un incremento por tick hasta llegar al total
    fn run_progress_loop(&self, tick: Duration) {
        loop {
            thread::sleep(tick);

            let mut data = self.data();
            data.completed_steps += 1;

            if data.completed_steps >= data.total_steps {
                data.finish(&self.id);
                tracing::info!(job_id = %self.id, "job completed");
                return;
            }
        }
    }

    /// Obtiene el progreso (0-100, redondeado hacia abajo)
    pub fn progress(&self) -> u8 {
        let data = self.data();

        if data.total_steps == 0 {
            return if data.state == JobState::Completed { 100 } else { 0 };
        }

        (data.completed_steps * 100 / data.total_steps).min(100) as u8
    }

    /// Obtiene el resultado (solo existe cuando el job está completado)
    pub fn result(&self) -> Option<String> {
        self.data().result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_until_completed(job: &Job, max: Duration) {
        let deadline = std::time::Instant::now() + max;
        while job.state() != JobState::Completed && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_job_creation() {
        let job = Job::new("abc", "report.csv");

        assert_eq!(job.id(), "abc");
        assert_eq!(job.source_name(), "report.csv");
        assert_eq!(job.state(), JobState::Queued);
        assert_eq!(job.progress(), 0);
        assert!(job.result().is_none());
        assert!(job.started_at().is_none());
    }

    #[test]
    fn test_job_lifecycle() {
        let job = Arc::new(Job::new("lifecycle", "f.txt"));

        job.start(Some(1), Some(10)).unwrap();
        assert_eq!(job.state(), JobState::Running);
        assert_eq!(job.total_steps(), 10);
        assert!(job.progress() < 100);
        assert!(job.result().is_none());

        wait_until_completed(&job, Duration::from_secs(3));

        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(job.progress(), 100);
        assert_eq!(job.result().as_deref(), Some("lifecycle"));

        let created = job.created_at();
        let started = job.started_at().unwrap();
        let completed = job.completed_at().unwrap();
        assert!(created <= started);
        assert!(started <= completed);
    }

    #[test]
    fn test_progress_advances() {
        let job = Arc::new(Job::new("advance", "f.txt"));
        job.start(Some(2), Some(10)).unwrap();

        thread::sleep(Duration::from_millis(650));
        let progress = job.progress();
        assert!(progress > 0, "progress should have advanced, got {}", progress);
        assert!(progress < 100);
    }

    #[test]
    fn test_start_twice_fails() {
        let job = Arc::new(Job::new("twice", "f.txt"));
        job.start(Some(1), Some(10)).unwrap();

        let err = job.start(Some(1), Some(10)).unwrap_err();
        assert!(matches!(err, JobError::AlreadyStarted { ref id } if id == "twice"));
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let job = Arc::new(Job::new("instant", "f.txt"));
        job.start(Some(0), None).unwrap();

        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(job.progress(), 100);
        assert_eq!(job.result().as_deref(), Some("instant"));
    }

    #[test]
    fn test_loop_outlives_caller_reference() {
        let job = Arc::new(Job::new("detached", "f.txt"));
        job.start(Some(1), Some(20)).unwrap();

        let observer = Arc::downgrade(&job);
        drop(job);

        // El loop mantiene su propia referencia al job
        let job = observer.upgrade().expect("progress loop should keep the job alive");
        wait_until_completed(&job, Duration::from_secs(3));
        assert_eq!(job.state(), JobState::Completed);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&JobState::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(JobState::Completed.as_str(), "completed");
    }
}
