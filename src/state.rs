//! # Estado Compartido
//! src/state.rs
//!
//! Recursos que comparten todos los handlers: el registro de jobs, el
//! almacén de artefactos y el directorio de archivos estáticos. Se construye
//! una vez al arrancar el servidor y se pasa por referencia a cada handler.

use crate::config::Config;
use crate::jobs::registry::{JobRegistry, RegistryConfig};
use crate::storage::{ArtifactStore, StorageError};
use std::path::PathBuf;

/// Estado de la aplicación
#[derive(Debug)]
pub struct AppState {
    pub registry: JobRegistry,
    pub store: ArtifactStore,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(registry: JobRegistry, store: ArtifactStore, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            store,
            public_dir: public_dir.into(),
        }
    }

    /// Construye el estado a partir de la configuración
    ///
    /// Crea el directorio de datos si no existe.
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        let registry = JobRegistry::new(RegistryConfig::from_config(config));
        let store = ArtifactStore::new(&config.data_dir)?;
        Ok(Self::new(registry, store, &config.public_dir))
    }
}
