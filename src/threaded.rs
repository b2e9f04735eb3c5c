//! Thread-per-client alternative driver (§5, §10.3): one OS thread per
//! client, each running a blocking request/response cycle in a loop until
//! `duration_seconds` elapses, folding its local totals into a single
//! shared, mutex-guarded aggregate.
//!
//! Grounded in the teacher's `src/blocking/client.rs`, which offers a
//! synchronous view bolted onto the async machinery; here that idea is
//! taken literally as blocking `std::net::TcpStream` I/O plus blocking
//! `rustls::StreamOwned` for HTTPS, so the crate still needs only one TLS
//! stack (DESIGN.md Open Question resolution #5).

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};
use rustls::{ClientConnection, StreamOwned};

use crate::config::{Config, Protocol};
use crate::engine::EngineTotals;
use crate::net::tls::build_client_config;
use crate::request::Request;

const RECV_BUFFER_SIZE: usize = 8192;

enum BlockingStream {
    Plain(TcpStream),
    Tls(StreamOwned<ClientConnection, TcpStream>),
}

impl Read for BlockingStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            BlockingStream::Plain(s) => s.read(buf),
            BlockingStream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for BlockingStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            BlockingStream::Plain(s) => s.write(buf),
            BlockingStream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            BlockingStream::Plain(s) => s.flush(),
            BlockingStream::Tls(s) => s.flush(),
        }
    }
}

#[derive(Debug, Default)]
struct SharedTotals {
    speed: u64,
    bytes: u64,
    failed: u64,
}

/// Runs the thread-per-client driver to completion and returns the same
/// aggregate shape the core `Engine` returns, plus the measured wall-clock
/// elapsed time the Reporter appends for this driver (§4.6).
pub fn run(config: Config, request: Request) -> (EngineTotals, Duration) {
    let n = config.clamped_clients();
    let duration = Duration::from_secs(config.duration_seconds);
    let config = Arc::new(config);
    let request = Arc::new(request);
    let tls_config = build_client_config();
    let shared = Arc::new(Mutex::new(SharedTotals::default()));
    let start = Instant::now();

    debug!("threaded driver starting with {n} client thread(s)");

    let handles: Vec<_> = (0..n)
        .map(|idx| {
            let config = config.clone();
            let request = request.clone();
            let tls_config = tls_config.clone();
            let shared = shared.clone();
            thread::spawn(move || client_loop(idx, config, request, tls_config, shared, duration))
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    let elapsed = start.elapsed();
    let shared = shared.lock().expect("totals mutex poisoned");
    let totals = EngineTotals {
        speed: shared.speed,
        bytes: shared.bytes,
        failed: shared.failed,
    };
    (totals, elapsed)
}

fn client_loop(
    idx: usize,
    config: Arc<Config>,
    request: Arc<Request>,
    tls_config: Arc<rustls::ClientConfig>,
    shared: Arc<Mutex<SharedTotals>>,
    duration: Duration,
) {
    let deadline = Instant::now() + duration;
    let mut local = SharedTotals::default();

    while Instant::now() < deadline {
        match run_one_cycle(&config, &request, &tls_config) {
            Ok(bytes) => {
                local.speed += 1;
                local.bytes += bytes;
            }
            Err(_) => local.failed += 1,
        }
    }

    trace!(
        "thread {idx} done: speed={} bytes={} failed={}",
        local.speed,
        local.bytes,
        local.failed
    );

    let mut shared = shared.lock().expect("totals mutex poisoned");
    shared.speed += local.speed;
    shared.bytes += local.bytes;
    shared.failed += local.failed;
}

fn run_one_cycle(
    config: &Config,
    request: &Request,
    tls_config: &Arc<rustls::ClientConfig>,
) -> crate::error::Result<u64> {
    use crate::error::Error;

    let (dial_host, dial_port) = match &config.proxy {
        Some(p) => (p.host.as_str(), p.port),
        None => (config.target_host.as_str(), config.target_port),
    };

    let tcp = TcpStream::connect((dial_host, dial_port)).map_err(Error::connect)?;
    tcp.set_nodelay(true).map_err(Error::connect)?;
    let mut stream = BlockingStream::Plain(tcp);

    if config.needs_proxy_tunnel() {
        let connect_request = format!(
            "CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\nConnection: close\r\n\r\n",
            host = config.target_host,
            port = config.target_port,
        );
        stream
            .write_all(connect_request.as_bytes())
            .map_err(Error::io)?;
        let response = read_until(&mut stream, b"HTTP/1.1 200 Connection established", RECV_BUFFER_SIZE - 1)?;
        if !contains(&response, b"HTTP/1.1 200 Connection established") {
            return Err(Error::proxy("CONNECT tunnel not established"));
        }
    }

    if config.protocol == Protocol::Https {
        let tcp = match stream {
            BlockingStream::Plain(tcp) => tcp,
            BlockingStream::Tls(_) => unreachable!("TLS established before the handshake phase"),
        };
        let server_name = rustls::ServerName::try_from(request.host.as_str())
            .map_err(|e| Error::tls(format!("invalid SNI host '{}': {e}", request.host)))?;
        let conn = ClientConnection::new(tls_config.clone(), server_name).map_err(Error::tls)?;
        stream = BlockingStream::Tls(StreamOwned::new(conn, tcp));
    }

    stream.write_all(&request.bytes).map_err(Error::io)?;

    if config.force {
        return Ok(0);
    }

    let body = read_until(&mut stream, b"\r\n\r\n", RECV_BUFFER_SIZE - 1)?;
    Ok(body.len() as u64)
}

fn read_until(stream: &mut BlockingStream, needle: &[u8], cap: usize) -> crate::error::Result<Vec<u8>> {
    use crate::error::Error;

    let mut buf = Vec::with_capacity(RECV_BUFFER_SIZE);
    let mut chunk = [0u8; RECV_BUFFER_SIZE];
    loop {
        if contains(&buf, needle) {
            return Ok(buf);
        }
        if buf.len() >= cap {
            return Ok(buf);
        }
        let remaining = cap - buf.len();
        match stream.read(&mut chunk[..remaining]) {
            Ok(0) => return Err(Error::io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "peer closed before match",
            ))),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) => return Err(Error::io(e)),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}
