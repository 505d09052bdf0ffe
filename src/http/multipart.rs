//! # Parsing de multipart/form-data
//! src/http/multipart.rs
//!
//! Extrae las partes de un body `multipart/form-data` (RFC 7578).
//! Solo lo necesario para subir archivos: nombre del campo, nombre del
//! archivo, content type y contenido binario.
//!
//! ```text
//! --BOUNDARY\r\n
//! Content-Disposition: form-data; name="upload_file"; filename="a.txt"\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! <bytes>\r\n
//! --BOUNDARY--\r\n
//! ```

use crate::http::request::find_head_end;
use crate::http::Request;

/// Una parte de un body multipart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Nombre del campo del formulario
    pub name: String,

    /// Nombre original del archivo (si es un campo de archivo)
    pub filename: Option<String>,

    /// Content-Type de la parte
    pub content_type: Option<String>,

    /// Contenido crudo
    pub data: Vec<u8>,
}

/// Errores de parsing multipart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartError {
    /// El request no es multipart/form-data
    NotMultipart,

    /// Falta el parámetro `boundary` en Content-Type
    MissingBoundary,

    /// El body no respeta el formato
    Malformed(String),
}

impl std::fmt::Display for MultipartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipartError::NotMultipart => write!(f, "The body was not of the type multipart/form-data."),
            MultipartError::MissingBoundary => write!(f, "Missing multipart boundary"),
            MultipartError::Malformed(msg) => write!(f, "Malformed multipart body: {}", msg),
        }
    }
}

impl std::error::Error for MultipartError {}

/// Extrae el boundary del header Content-Type
pub fn boundary(request: &Request) -> Result<String, MultipartError> {
    if request.content_type() != Some("multipart/form-data") {
        return Err(MultipartError::NotMultipart);
    }

    let header = request.header("content-type").unwrap_or_default();

    header
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Parsea todas las partes del body
pub fn parse(body: &[u8], boundary: &str) -> Result<Vec<Part>, MultipartError> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();

    let mut parts = Vec::new();

    let mut pos = find(body, delimiter, 0)
        .ok_or_else(|| MultipartError::Malformed("missing opening boundary".to_string()))?
        + delimiter.len();

    loop {
        // `--` tras el boundary marca el final
        if body[pos..].starts_with(b"--") {
            return Ok(parts);
        }

        if !body[pos..].starts_with(b"\r\n") {
            return Err(MultipartError::Malformed("boundary not followed by CRLF".to_string()));
        }
        pos += 2;

        let next = find(body, delimiter, pos)
            .ok_or_else(|| MultipartError::Malformed("missing closing boundary".to_string()))?;

        // El contenido termina con CRLF antes del siguiente boundary
        let end = next.checked_sub(2).filter(|&e| e >= pos).ok_or_else(|| {
            MultipartError::Malformed("part not terminated by CRLF".to_string())
        })?;

        parts.push(parse_part(&body[pos..end])?);
        pos = next + delimiter.len();
    }
}

/// Busca la primera parte con el nombre de campo dado
pub fn find_part<'a>(parts: &'a [Part], name: &str) -> Option<&'a Part> {
    parts.iter().find(|p| p.name == name)
}

fn parse_part(raw: &[u8]) -> Result<Part, MultipartError> {
    let head_end = find_head_end(raw)
        .ok_or_else(|| MultipartError::Malformed("part without headers".to_string()))?;

    let head = std::str::from_utf8(&raw[..head_end - 4])
        .map_err(|_| MultipartError::Malformed("part headers are not UTF-8".to_string()))?;

    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in head.split("\r\n") {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };

        if header.trim().eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                if let Some((key, val)) = param.trim().split_once('=') {
                    let val = val.trim().trim_matches('"').to_string();
                    match key.trim() {
                        "name" => name = Some(val),
                        "filename" => filename = Some(val),
                        _ => {}
                    }
                }
            }
        } else if header.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    let name = name.ok_or_else(|| MultipartError::Malformed("part without name".to_string()))?;

    Ok(Part {
        name,
        filename,
        content_type,
        data: raw[head_end..].to_vec(),
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }

    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"--XyZ\r\n");
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\n");
        body.extend_from_slice(b"hola\r\n");
        body.extend_from_slice(b"--XyZ\r\n");
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"upload_file\"; filename=\"data.bin\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&[0x00, 0x0D, 0x0A, 0xFF]);
        body.extend_from_slice(b"\r\n--XyZ--\r\n");
        body
    }

    #[test]
    fn test_parse_parts() {
        let parts = parse(&sample_body(), "XyZ").unwrap();
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].name, "note");
        assert_eq!(parts[0].filename, None);
        assert_eq!(parts[0].data, b"hola");

        let file = find_part(&parts, "upload_file").unwrap();
        assert_eq!(file.filename.as_deref(), Some("data.bin"));
        assert_eq!(file.content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(file.data, vec![0x00, 0x0D, 0x0A, 0xFF]);
    }

    #[test]
    fn test_boundary_from_header() {
        let raw = b"POST /uploadfile HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=\"abc\"\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(boundary(&request).unwrap(), "abc");
    }

    #[test]
    fn test_boundary_requires_multipart() {
        let raw = b"POST /uploadfile HTTP/1.0\r\nContent-Type: text/plain\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(boundary(&request), Err(MultipartError::NotMultipart));

        let raw = b"POST /uploadfile HTTP/1.0\r\nContent-Type: multipart/form-data\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(boundary(&request), Err(MultipartError::MissingBoundary));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(parse(b"no boundary here", "XyZ"), Err(MultipartError::Malformed(_))));

        let truncated = b"--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue";
        assert!(matches!(parse(truncated, "XyZ"), Err(MultipartError::Malformed(_))));
    }
}
