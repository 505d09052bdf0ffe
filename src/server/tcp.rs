//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acepta conexiones y procesa cada una en su propio thread:
//! lee el request completo (headers + body según `Content-Length`), lo pasa
//! al router y escribe la respuesta. HTTP/1.0: una respuesta por conexión.

use crate::config::Config;
use crate::http::request::find_head_end;
use crate::http::{Method, Request, Response, StatusCode};
use crate::jobs::handlers;
use crate::router::Router;
use crate::state::AppState;
use crate::storage::StorageError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Tamaño de cada lectura del socket
const READ_CHUNK: usize = 8192;

/// Límite para la sección de headers
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Tiempo máximo de espera por datos del cliente
const READ_TIMEOUT: Duration = Duration::from_secs(30);

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Resultado de leer un request del socket
enum Incoming {
    /// El cliente cerró sin enviar nada
    Closed,
    /// Request completo
    Parsed(Request),
    /// Request rechazado antes de llegar al router
    Rejected(Response),
}

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    config: Config,
    router: Arc<Router>,
    state: Arc<AppState>,
    listener: Option<TcpListener>,
}

impl Server {
    /// Crea el servidor y su estado compartido
    ///
    /// Falla si no se puede preparar el directorio de datos.
    pub fn new(config: Config) -> Result<Self, StorageError> {
        let state = AppState::from_config(&config)?;

        Ok(Self {
            config,
            router: Arc::new(Self::build_router()),
            state: Arc::new(state),
            listener: None,
        })
    }

    fn build_router() -> Router {
        let mut router = Router::new();

        router.register(Method::POST, "/uploadfile", handlers::upload_handler);
        router.register(Method::POST, "/startexecution", handlers::start_handler);
        router.register(Method::POST, "/checkstatus", handlers::status_handler);
        router.register(Method::POST, "/viewresults", handlers::view_results_handler);
        router.register(Method::POST, "/downloadresults", handlers::download_handler);

        router
    }

    /// Abre el socket de escucha y retorna la dirección real
    ///
    /// Con puerto 0 el sistema asigna uno libre.
    pub fn bind(&mut self) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.address())?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Acepta conexiones indefinidamente (un thread por conexión)
    pub fn run(&mut self) -> io::Result<()> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => TcpListener::bind(self.config.address())?,
        };

        tracing::info!(address = %listener.local_addr()?, "server listening");

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let router = Arc::clone(&self.router);
            let state = Arc::clone(&self.state);
            let max_body_bytes = self.config.max_body_bytes;

            let spawned = thread::Builder::new()
                .name("conn".to_string())
                .spawn(move || {
                    if let Err(e) = Self::handle_connection(stream, &router, &state, max_body_bytes) {
                        tracing::warn!(error = %e, "connection ended with error");
                    }
                });

            if let Err(e) = spawned {
                tracing::error!(error = %e, "failed to spawn connection thread");
            }
        }

        Ok(())
    }

    fn handle_connection(
        mut stream: TcpStream,
        router: &Router,
        state: &AppState,
        max_body_bytes: usize,
    ) -> io::Result<()> {
        let start = Instant::now();
        let request_id = next_request_id();
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let span = tracing::info_span!("request", id = %request_id, peer = %peer);
        let _guard = span.enter();

        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let (mut response, head_only, line) = match read_request(&mut stream, max_body_bytes)? {
            Incoming::Closed => {
                tracing::debug!("connection closed without data");
                return Ok(());
            }
            Incoming::Rejected(response) => (response, false, "-".to_string()),
            Incoming::Parsed(request) => {
                let line = format!("{} {}", request.method().as_str(), request.path());
                let head_only = request.method() == Method::HEAD;
                (router.route(&request, state), head_only, line)
            }
        };

        response.add_header("X-Request-Id", &request_id);
        response.add_header("Connection", "close");

        let bytes = if head_only {
            response.head_bytes()
        } else {
            response.to_bytes()
        };
        stream.write_all(&bytes)?;
        stream.flush()?;

        let status = response.status();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        if status.is_server_error() {
            tracing::warn!(request = %line, status = status.as_u16(), latency_ms, "request failed");
        } else {
            tracing::info!(request = %line, status = status.as_u16(), latency_ms, "request served");
        }

        Ok(())
    }
}

/// Lee un request completo del stream
///
/// Lee hasta el fin de los headers y luego exactamente `Content-Length`
/// bytes de body. Un body mayor a `max_body_bytes` se rechaza con 413 sin
/// leerlo.
fn read_request(stream: &mut impl Read, max_body_bytes: usize) -> io::Result<Incoming> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let body_start = loop {
        if let Some(end) = find_head_end(&buffer) {
            break Some(end);
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Ok(Incoming::Rejected(Response::error(
                StatusCode::BadRequest,
                "Request headers too large",
            )));
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    if buffer.is_empty() {
        return Ok(Incoming::Closed);
    }

    // Sin fin de headers: se parsea lo que llegó
    let Some(body_start) = body_start else {
        return Ok(parse_incoming(&buffer));
    };

    let expected = match Request::parse(&buffer[..body_start]) {
        Ok(head) => head.content_length().unwrap_or(0),
        Err(e) => return Ok(Incoming::Rejected(invalid_request(&e))),
    };

    if expected > max_body_bytes {
        return Ok(Incoming::Rejected(Response::error(
            StatusCode::PayloadTooLarge,
            &format!("Request body exceeds {} bytes", max_body_bytes),
        )));
    }

    let total = body_start + expected;
    while buffer.len() < total {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    buffer.truncate(total);

    Ok(parse_incoming(&buffer))
}

fn parse_incoming(buffer: &[u8]) -> Incoming {
    match Request::parse(buffer) {
        Ok(request) => Incoming::Parsed(request),
        Err(e) => Incoming::Rejected(invalid_request(&e)),
    }
}

fn invalid_request(err: &crate::http::request::ParseError) -> Response {
    tracing::debug!(error = %err, "unparseable request");
    Response::error(StatusCode::BadRequest, &format!("Invalid request: {}", err))
}

/// Genera un id corto para correlacionar logs y respuestas
fn next_request_id() -> String {
    let mut hasher = DefaultHasher::new();
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
        .hash(&mut hasher);
    thread::current().id().hash(&mut hasher);
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
