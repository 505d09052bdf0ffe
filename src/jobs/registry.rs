//! # Registro Central de Jobs
//! src/jobs/registry.rs
//!
//! Colección acotada de jobs indexada por id. Controla la admisión
//! (capacidad máxima), resuelve ids y valida el estado antes de delegar
//! cada operación al job correspondiente.
//!
//! ## Concurrencia
//!
//! El mapa `id → Job` es el único estado compartido mutable y vive detrás de
//! un `Mutex`. Verificar capacidad + insertar, y buscar + consumir resultado,
//! ocurren bajo una sola adquisición del lock. El orden de locks es siempre
//! registro → job; el loop de progreso solo toma el lock de su job.

use crate::jobs::dataset::ResultTable;
use crate::jobs::error::{JobError, Result};
use crate::jobs::job::{Job, JobState, DEFAULT_DURATION_SECS, DEFAULT_STEPS_PER_SECOND};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Configuración del registro
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Máximo de jobs registrados simultáneamente
    pub capacity: usize,

    /// Duración usada cuando el cliente no envía `time`
    pub default_duration_secs: u64,

    /// Frecuencia del loop de progreso
    pub steps_per_second: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            default_duration_secs: DEFAULT_DURATION_SECS,
            steps_per_second: DEFAULT_STEPS_PER_SECOND,
        }
    }
}

impl RegistryConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            capacity: config.max_jobs,
            default_duration_secs: config.default_duration_secs,
            steps_per_second: config.steps_per_second,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

/// Registro de jobs con control de admisión
#[derive(Debug)]
pub struct JobRegistry {
    config: RegistryConfig,
    jobs: Mutex<HashMap<String, Arc<Job>>>,
}

impl JobRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, Arc<Job>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup<'a>(jobs: &'a HashMap<String, Arc<Job>>, id: &str) -> Result<&'a Arc<Job>> {
        jobs.get(id).ok_or_else(|| JobError::NotFound { id: id.to_string() })
    }

    /// Registra un nuevo job en estado `Queued`
    ///
    /// Falla con `AdmissionExceeded` si el registro está lleno y con
    /// `AlreadyExists` si el id ya está registrado.
    pub fn add_job(&self, id: &str, display_name: &str) -> Result<()> {
        let mut jobs = self.jobs();

        if jobs.len() >= self.config.capacity {
            return Err(JobError::AdmissionExceeded {
                current: jobs.len(),
                limit: self.config.capacity,
            });
        }

        if jobs.contains_key(id) {
            return Err(JobError::AlreadyExists { id: id.to_string() });
        }

        jobs.insert(id.to_string(), Arc::new(Job::new(id, display_name)));
        tracing::info!(job_id = %id, source = %display_name, tracked = jobs.len(), "job added");

        Ok(())
    }

    /// Inicia la ejecución de un job en cola
    ///
    /// La transición se hace con el lock del registro tomado, así que de dos
    /// llamadas concurrentes solo una gana; la otra recibe `AlreadyStarted`.
    pub fn start_execution(&self, id: &str, duration_secs: Option<u64>) -> Result<()> {
        let jobs = self.jobs();
        let job = Self::lookup(&jobs, id)?;

        if job.state() != JobState::Queued {
            return Err(JobError::AlreadyStarted { id: id.to_string() });
        }

        job.start(
            Some(duration_secs.unwrap_or(self.config.default_duration_secs)),
            Some(self.config.steps_per_second),
        )
    }

    /// Obtiene el progreso (0-100) de un job en ejecución
    pub fn get_progress(&self, id: &str) -> Result<u8> {
        let jobs = self.jobs();
        let job = Self::lookup(&jobs, id)?;

        match job.state() {
            JobState::Running => Ok(job.progress()),
            current_state => Err(JobError::NotRunning {
                id: id.to_string(),
                current_state,
            }),
        }
    }

    /// Devuelve la tabla de resultados sin consumir el job
    pub fn view_results(&self, id: &str) -> Result<ResultTable> {
        let jobs = self.jobs();
        let job = Self::lookup(&jobs, id)?;
        Self::ensure_completed(job)?;

        Ok(ResultTable::placeholder())
    }

    /// Consume el resultado: lo devuelve y elimina el job del registro
    ///
    /// Búsqueda y borrado ocurren bajo el mismo lock; un resultado se entrega
    /// exactamente una vez.
    pub fn get_result(&self, id: &str) -> Result<String> {
        let mut jobs = self.jobs();
        let job = Self::lookup(&jobs, id)?;
        Self::ensure_completed(job)?;

        let result = job.result().unwrap_or_else(|| id.to_string());
        jobs.remove(id);
        tracing::info!(job_id = %id, tracked = jobs.len(), "job result consumed");

        Ok(result)
    }

    fn ensure_completed(job: &Job) -> Result<()> {
        match job.state() {
            JobState::Completed => Ok(()),
            current_state => Err(JobError::NotCompleted {
                id: job.id().to_string(),
                current_state,
            }),
        }
    }

    /// Estado actual de un job (si existe)
    pub fn state_of(&self, id: &str) -> Option<JobState> {
        self.jobs().get(id).map(|job| job.state())
    }

    /// Número de jobs registrados
    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacidad máxima
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }
}
