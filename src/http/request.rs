//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Este módulo implementa un parser HTTP/1.0 desde cero.
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! POST /checkstatus HTTP/1.0\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 14\r\n
//! \r\n
//! fileId=abc1234
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.0`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: bytes crudos (pueden ser binarios, p.ej. multipart)

use std::collections::HashMap;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// HEAD - Como GET pero solo retorna headers
    HEAD,

    /// POST - Enviar datos a un recurso
    POST,

    /// OPTIONS - Preflight de CORS
    OPTIONS,
}

impl Method {
    /// Parsea un método HTTP desde un string
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

/// Representa un request HTTP/1.0 parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path de la petición (ej: "/checkstatus")
    path: String,

    /// Query parameters parseados
    query_params: HashMap<String, String>,

    /// Headers HTTP; los nombres se guardan en minúsculas
    headers: HashMap<String, String>,

    /// Versión HTTP
    version: String,

    /// Body crudo del request
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request incompleto o truncado (falta el fin de headers)
    IncompleteRequest,

    /// Formato inválido de la request line
    InvalidRequestLine,

    /// Método HTTP no soportado
    UnsupportedMethod(String),

    /// Versión HTTP incorrecta
    InvalidHttpVersion(String),

    /// Header malformado
    InvalidHeader(String),

    /// Request vacío
    EmptyRequest,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncompleteRequest => write!(f, "Incomplete HTTP request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidHttpVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::InvalidHeader(h) => write!(f, "Invalid header: {}", h),
            ParseError::EmptyRequest => write!(f, "Empty request"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Busca el fin de los headers (`\r\n\r\n`)
///
/// Retorna la posición donde empieza el body.
pub fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

impl Request {
    /// Parsea un request HTTP/1.0 desde bytes
    ///
    /// Los headers deben ser UTF-8; el body se conserva tal cual.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use jobrunner::http::Request;
    ///
    /// let raw = b"GET /index.html?lang=es HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.query_param("lang"), Some("es"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        let (head, body) = match find_head_end(buffer) {
            Some(end) => (&buffer[..end - 4], &buffer[end..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        let head_str = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        let mut lines = head_str.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;

        // 1. Parsear la request line (primera línea)
        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;

        // 2. Parsear headers
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            version,
            body: body.to_vec(),
        })
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;
        let (path, query_params) = Self::parse_path_and_query(parts[1]);

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, query_params, version))
    }

    /// Separa el path de la query string
    fn parse_path_and_query(path_with_query: &str) -> (String, HashMap<String, String>) {
        match path_with_query.split_once('?') {
            Some((path, query)) => (url_decode(path), parse_urlencoded(query)),
            None => (url_decode(path_with_query), HashMap::new()),
        }
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Valor de `Content-Length`, si es válido
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// Tipo MIME del body sin parámetros (ej: "multipart/form-data")
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parámetros de formulario del body (`application/x-www-form-urlencoded`)
    pub fn form_params(&self) -> HashMap<String, String> {
        if self.content_type() != Some("application/x-www-form-urlencoded") {
            return HashMap::new();
        }

        std::str::from_utf8(&self.body)
            .map(parse_urlencoded)
            .unwrap_or_default()
    }

    /// Busca un parámetro en el body de formulario y, si no está, en la query
    pub fn param(&self, name: &str) -> Option<String> {
        self.form_params()
            .remove(name)
            .or_else(|| self.query_param(name).map(str::to_string))
    }
}

/// Parsea `a=1&b=2` a un HashMap
pub fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }

        match pair.split_once('=') {
            Some((key, value)) => params.insert(url_decode(key), url_decode(value)),
            None => params.insert(url_decode(pair), String::new()),
        };
    }

    params
}

/// Decodifica percent-encoding y `+` como espacio
///
/// Secuencias `%XX` inválidas se dejan tal cual.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_with_query_params() {
        let raw = b"GET /checkstatus?fileId=abc&x=1 HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/checkstatus");
        assert_eq!(request.query_param("fileId"), Some("abc"));
        assert_eq!(request.query_param("x"), Some("1"));
    }

    #[test]
    fn test_headers_case_insensitive() {
        let raw = b"GET / HTTP/1.0\r\nHost: localhost:3000\r\nContent-Length: 0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:3000"));
        assert_eq!(request.header("host"), Some("localhost:3000"));
        assert_eq!(request.content_length(), Some(0));
    }

    #[test]
    fn test_form_body() {
        let raw = b"POST /startexecution HTTP/1.0\r\n\
Content-Type: application/x-www-form-urlencoded\r\n\
Content-Length: 21\r\n\r\nfileId=abc%2F1&time=5";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.param("fileId").as_deref(), Some("abc/1"));
        assert_eq!(request.param("time").as_deref(), Some("5"));
    }

    #[test]
    fn test_param_falls_back_to_query() {
        let raw = b"POST /checkstatus?fileId=q HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.param("fileId").as_deref(), Some("q"));
        assert_eq!(request.param("missing"), None);
    }

    #[test]
    fn test_binary_body_preserved() {
        let mut raw = b"POST /uploadfile HTTP/1.0\r\nContent-Length: 4\r\n\r\n".to_vec();
        raw.extend_from_slice(&[0x00, 0xFF, 0x0D, 0x0A]);

        let request = Request::parse(&raw).unwrap();
        assert_eq!(request.body(), &[0x00, 0xFF, 0x0D, 0x0A]);
    }

    #[test]
    fn test_content_type_without_params() {
        let raw = b"POST / HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=xyz\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.content_type(), Some("multipart/form-data"));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("hello%20world"), "hello world");
        assert_eq!(url_decode("a+b"), "a b");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
        assert_eq!(url_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n\r\nbody"), Some(18));
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n"), None);
    }

    #[test]
    fn test_unsupported_method() {
        let result = Request::parse(b"DELETE / HTTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::UnsupportedMethod(_))));
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET / HTTP/2.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(Request::parse(b""), Err(ParseError::EmptyRequest)));
    }

    #[test]
    fn test_invalid_request_line() {
        let result = Request::parse(b"GET\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
    }
}
