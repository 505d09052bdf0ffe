//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Solo los códigos que produce este servidor. Los errores de jobs se
//! traducen a 404/409/503 en `jobs::handlers`.

/// Códigos de estado soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    /// Respuesta a preflight `OPTIONS`
    NoContent = 204,
    BadRequest = 400,
    /// Path estático fuera del directorio público
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    /// El job no está en el estado que la operación requiere
    Conflict = 409,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    /// Registro de jobs lleno
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Valor numérico del código
    ///
    /// ```
    /// use jobrunner::http::StatusCode;
    /// assert_eq!(StatusCode::Conflict.as_u16(), 409);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Reason phrase de la status line
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::Conflict => "Conflict",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx: fallos del servidor, se registran como warning
    pub fn is_server_error(&self) -> bool {
        self.as_u16() >= 500
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato de la status line: `409 Conflict`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_related_codes() {
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
        assert_eq!(StatusCode::Conflict.as_u16(), 409);
        assert_eq!(StatusCode::ServiceUnavailable.as_u16(), 503);
        assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    }

    #[test]
    fn test_server_errors() {
        assert!(StatusCode::InternalServerError.is_server_error());
        assert!(StatusCode::ServiceUnavailable.is_server_error());
        assert!(!StatusCode::Conflict.is_server_error());
        assert!(!StatusCode::Ok.is_server_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::MethodNotAllowed.to_string(), "405 Method Not Allowed");
        assert_eq!(StatusCode::ServiceUnavailable.to_string(), "503 Service Unavailable");
    }
}
