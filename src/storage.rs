//! # Almacenamiento de Artefactos
//! src/storage.rs
//!
//! Guarda en disco los archivos subidos por el cliente, cada uno bajo un id
//! hexadecimal generado. El id es también el id del job asociado.
//!
//! Las escrituras usan archivo temporal + rename para que nunca se observe
//! un artefacto a medio escribir.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Longitud (en caracteres hex) de los ids de artefacto
pub const ARTIFACT_ID_LEN: usize = 32;

/// Errores de almacenamiento
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid artifact id: {0}")]
    InvalidId(String),

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadatos de un artefacto recién guardado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub id: String,
    pub name: String,
    pub size: usize,
}

/// Almacén de artefactos en un directorio
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Crea el almacén (y el directorio si no existe)
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Guarda un artefacto y devuelve su id generado
    pub fn save(&self, original_name: &str, content: &[u8]) -> Result<StoredArtifact, StorageError> {
        let id = Self::generate_id(original_name, content);
        let path = self.root.join(&id);
        let temp_path = self.root.join(format!("{}.tmp", id));

        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content)?;
            writer.flush()?;
        }

        // Renombrar (atómico en sistemas Unix)
        fs::rename(&temp_path, &path)?;

        tracing::debug!(artifact_id = %id, size = content.len(), "artifact stored");

        Ok(StoredArtifact {
            id,
            name: original_name.to_string(),
            size: content.len(),
        })
    }

    /// Ruta en disco de un artefacto
    pub fn path_of(&self, id: &str) -> Result<PathBuf, StorageError> {
        Self::validate_id(id)?;
        Ok(self.root.join(id))
    }

    /// Lee el contenido completo de un artefacto
    pub fn read(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_of(id)?;
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(id.to_string()),
            _ => StorageError::Io(e),
        })
    }

    /// Elimina un artefacto del disco
    pub fn remove(&self, id: &str) -> Result<(), StorageError> {
        let path = self.path_of(id)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(id.to_string()),
            _ => StorageError::Io(e),
        })?;

        tracing::debug!(artifact_id = %id, "artifact removed");
        Ok(())
    }

    /// Verifica si existe un artefacto
    pub fn exists(&self, id: &str) -> bool {
        self.path_of(id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Solo se aceptan ids hexadecimales: evita path traversal
    fn validate_id(id: &str) -> Result<(), StorageError> {
        if id.len() != ARTIFACT_ID_LEN || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(())
    }

    fn generate_id(original_name: &str, content: &[u8]) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(original_name.as_bytes());
        hasher.update(content);
        hasher.update(now.to_le_bytes());
        hasher.update(format!("{:?}", std::thread::current().id()).as_bytes());

        let digest = hasher.finalize();
        digest[..ARTIFACT_ID_LEN / 2]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
