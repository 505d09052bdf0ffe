//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! Traducen requests HTTP a llamadas al `JobRegistry` y los errores a
//! códigos de respuesta:
//! - POST /uploadfile
//! - POST /startexecution
//! - POST /checkstatus
//! - POST /viewresults
//! - POST /downloadresults
//!
//! Los parámetros se leen del body (`application/x-www-form-urlencoded`)
//! o, si no están ahí, de la query string.

use crate::http::multipart::{self, MultipartError};
use crate::http::{Request, Response, StatusCode};
use crate::jobs::error::JobError;
use crate::state::AppState;
use serde_json::json;

/// Nombre del campo multipart que contiene el archivo
pub const FILE_UPLOAD_FIELD_NAME: &str = "upload_file";

/// Segundos sugeridos al cliente cuando el registro está lleno
const RETRY_AFTER_SECS: &str = "5";

/// Convierte un error del registro en una respuesta HTTP
///
/// Las condiciones esperadas devuelven el mensaje explicativo; los fallos
/// inesperados se registran y devuelven un mensaje genérico.
pub fn job_error_response(err: &JobError) -> Response {
    let status = match err {
        JobError::AdmissionExceeded { .. } => StatusCode::ServiceUnavailable,
        JobError::NotFound { .. } => StatusCode::NotFound,
        JobError::AlreadyExists { .. }
        | JobError::AlreadyStarted { .. }
        | JobError::NotRunning { .. }
        | JobError::NotCompleted { .. } => StatusCode::Conflict,
        JobError::Spawn(e) => {
            tracing::error!(error = %e, "could not start progress loop");
            return Response::internal_error();
        }
    };

    let mut response = Response::error(status, &err.to_string());
    if status == StatusCode::ServiceUnavailable {
        response.add_header("Retry-After", RETRY_AFTER_SECS);
    }
    response
}

/// Extrae `fileId` del request
fn file_id(req: &Request) -> Result<String, Response> {
    req.param("fileId")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Response::error(StatusCode::BadRequest, "Did not find 'fileId' in the body."))
}

/// Handler para POST /uploadfile (multipart, campo `upload_file`)
///
/// Guarda el archivo y registra un job con su id.
///
/// # Ejemplo de response
/// ```json
/// {"status": true, "data": {"fileId": "9f2c...", "name": "a.csv", "size": 120, "mimetype": "text/csv"}}
/// ```
pub fn upload_handler(req: &Request, state: &AppState) -> Response {
    if req.body().is_empty() && req.content_type().is_none() {
        return Response::error(StatusCode::BadRequest, "No body was sent in the request.");
    }

    let parts = match multipart::boundary(req).and_then(|b| multipart::parse(req.body(), &b)) {
        Ok(parts) => parts,
        Err(e) => {
            if matches!(e, MultipartError::Malformed(_)) {
                tracing::warn!(error = %e, "rejected multipart body");
            }
            return Response::error(StatusCode::BadRequest, &e.to_string());
        }
    };

    let Some(part) = multipart::find_part(&parts, FILE_UPLOAD_FIELD_NAME) else {
        return Response::error(
            StatusCode::BadRequest,
            &format!("Did not find '{}' in the body.", FILE_UPLOAD_FIELD_NAME),
        );
    };

    let name = part.filename.clone().unwrap_or_else(|| FILE_UPLOAD_FIELD_NAME.to_string());
    let mimetype = part
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let artifact = match state.store.save(&name, &part.data) {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::error!(error = %e, file = %name, "failed to store upload");
            return Response::internal_error();
        }
    };

    if let Err(err) = state.registry.add_job(&artifact.id, &artifact.name) {
        // Sin job no hay forma de descargar el archivo: se descarta
        if let Err(e) = state.store.remove(&artifact.id) {
            tracing::error!(artifact_id = %artifact.id, error = %e, "failed to discard rejected upload");
        }
        return job_error_response(&err);
    }

    Response::json(&json!({
        "status": true,
        "data": {
            "fileId": artifact.id,
            "name": artifact.name,
            "size": artifact.size,
            "mimetype": mimetype,
        }
    }))
}

/// Handler para POST /startexecution (`fileId`, `time` opcional en segundos)
pub fn start_handler(req: &Request, state: &AppState) -> Response {
    let duration = match req.param("time").filter(|t| !t.is_empty()) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                return Response::error(StatusCode::BadRequest, "'time' should be an integer.");
            }
        },
        None => None,
    };

    let id = match file_id(req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.registry.start_execution(&id, duration) {
        Ok(()) => Response::json(&json!({
            "success": true,
            "fileId": id,
            "message": format!("The process with fileId '{}' has been initiated", id),
        })),
        Err(err) => job_error_response(&err),
    }
}

/// Handler para POST /checkstatus (`fileId`)
///
/// # Ejemplo de response
/// ```json
/// {"success": true, "fileId": "9f2c...", "progress": 42}
/// ```
pub fn status_handler(req: &Request, state: &AppState) -> Response {
    let id = match file_id(req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.registry.get_progress(&id) {
        Ok(progress) => Response::json(&json!({
            "success": true,
            "fileId": id,
            "progress": progress,
        })),
        Err(err) => job_error_response(&err),
    }
}

/// Handler para POST /viewresults (`fileId`); no consume el job
pub fn view_results_handler(req: &Request, state: &AppState) -> Response {
    let id = match file_id(req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.registry.view_results(&id) {
        Ok(table) => Response::json(&json!({
            "success": true,
            "fileId": id,
            "data": table,
        })),
        Err(err) => job_error_response(&err),
    }
}

/// Handler para POST /downloadresults (`fileId`)
///
/// Consume el resultado (el job deja de existir), envía el artefacto y lo
/// borra del disco. Si el borrado falla queda un archivo huérfano: se
/// registra como error.
pub fn download_handler(req: &Request, state: &AppState) -> Response {
    let id = match file_id(req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let artifact_id = match state.registry.get_result(&id) {
        Ok(result) => result,
        Err(err) => return job_error_response(&err),
    };

    let content = match state.store.read(&artifact_id) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(job_id = %id, artifact_id = %artifact_id, error = %e, "result consumed but artifact unreadable");
            return Response::internal_error();
        }
    };

    if let Err(e) = state.store.remove(&artifact_id) {
        tracing::error!(artifact_id = %artifact_id, error = %e, "failed to delete downloaded artifact; file leaked");
    }

    Response::new(StatusCode::Ok)
        .with_header("Content-Type", "application/octet-stream")
        .with_header("Content-Disposition", &format!("attachment; filename={}", artifact_id))
        .with_body_bytes(content)
}
