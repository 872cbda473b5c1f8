//! The scoring client: owns the listening socket and the scorer subprocess.
//!
//! The client listens first, launches the scorer, then accepts exactly one
//! connection from it. Every exchange is one request line followed by one
//! reply line. Recoverable failures relaunch the scorer on the same listener
//! and retry the batch, up to the configured number of restarts.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ScorerConfig;
use crate::error::{ScorerError, ScorerResult};
use crate::process::{CommandLauncher, ScorerHandle, ScorerLauncher};
use crate::protocol::{decode_scores, encode_batch};

/// Interval between accept polls.
const ACCEPT_POLL: Duration = Duration::from_millis(20);

/// Anything that scores sentences, lower meaning more plausible.
pub trait SentenceScorer {
    /// Score a batch; the result is positionally aligned with the input.
    fn score_batch(&mut self, sentences: &[String]) -> ScorerResult<Vec<f64>>;

    fn score(&mut self, sentence: &str) -> ScorerResult<f64> {
        self.score_batch(&[sentence.to_string()])?
            .into_iter()
            .next()
            .ok_or(ScorerError::CountMismatch {
                expected: 1,
                actual: 0,
            })
    }

    /// Candidates with their scores, best (lowest) first. Equal scores keep
    /// input order.
    fn rank(&mut self, candidates: &[String]) -> ScorerResult<Vec<(String, f64)>> {
        let scores = self.score_batch(candidates)?;
        let mut ranked: Vec<(String, f64)> = candidates.iter().cloned().zip(scores).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(ranked)
    }
}

struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    read_timeout: Duration,
}

impl Connection {
    fn new(stream: TcpStream, read_timeout: Duration) -> ScorerResult<Self> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(read_timeout))?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            read_timeout,
        })
    }

    fn exchange(&mut self, request: &str) -> ScorerResult<String> {
        self.writer.write_all(request.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        let mut reply = String::new();
        match self.reader.read_line(&mut reply) {
            Ok(0) => Err(ScorerError::Disconnected),
            Ok(_) => Ok(reply),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(ScorerError::Timeout {
                    timeout: self.read_timeout,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Client for a language-model scorer running as a supervised subprocess.
pub struct NeuralScorer {
    config: ScorerConfig,
    launcher: Box<dyn ScorerLauncher>,
    listener: TcpListener,
    handle: Option<Box<dyn ScorerHandle>>,
    connection: Option<Connection>,
    restarts: usize,
}

impl NeuralScorer {
    /// Listen, launch the configured program and wait for it to connect.
    pub fn start(config: ScorerConfig) -> ScorerResult<Self> {
        let launcher = CommandLauncher::from_config(&config);
        Self::with_launcher(config, Box::new(launcher))
    }

    /// Like [`NeuralScorer::start`] with a custom way of starting the scorer.
    pub fn with_launcher(
        config: ScorerConfig,
        launcher: Box<dyn ScorerLauncher>,
    ) -> ScorerResult<Self> {
        let addr = config.address();
        let listener = TcpListener::bind(addr.as_str())
            .map_err(|source| ScorerError::Bind { addr, source })?;
        listener.set_nonblocking(true)?;
        info!(addr = %listener.local_addr()?, "Scorer endpoint listening");

        let mut scorer = Self {
            config,
            launcher,
            listener,
            handle: None,
            connection: None,
            restarts: 0,
        };
        scorer.launch()?;
        Ok(scorer)
    }

    /// Address the scorer connects to.
    pub fn local_addr(&self) -> ScorerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Relaunches performed so far.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn launch(&mut self) -> ScorerResult<()> {
        let addr = self.local_addr()?;
        self.handle = Some(self.launcher.launch(addr)?);
        let connection = self.accept()?;
        self.connection = Some(connection);
        Ok(())
    }

    fn accept(&mut self) -> ScorerResult<Connection> {
        let timeout = self.config.accept_timeout();
        let deadline = Instant::now() + timeout;

        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    info!(peer = %peer, "Scorer connected");
                    return Connection::new(stream, self.config.read_timeout());
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if let Some(handle) = self.handle.as_mut() {
                        if !handle.is_alive() {
                            return Err(ScorerError::ScorerExited);
                        }
                    }
                    if Instant::now() >= deadline {
                        return Err(ScorerError::AcceptTimeout { timeout });
                    }
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Drop the connection and stop the subprocess.
    pub fn shutdown(&mut self) {
        self.connection = None;
        if let Some(mut handle) = self.handle.take() {
            handle.terminate();
        }
    }

    /// Stop the scorer and launch a fresh one on the same endpoint.
    pub fn restart(&mut self) -> ScorerResult<()> {
        self.shutdown();
        self.restarts += 1;
        info!(restarts = self.restarts, "Restarting scorer");
        self.launch()
    }

    fn exchange(&mut self, request: &str, expected: usize) -> ScorerResult<Vec<f64>> {
        let connection = self.connection.as_mut().ok_or(ScorerError::Disconnected)?;
        let reply = connection.exchange(request)?;
        decode_scores(&reply, expected)
    }
}

impl SentenceScorer for NeuralScorer {
    fn score_batch(&mut self, sentences: &[String]) -> ScorerResult<Vec<f64>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let request = encode_batch(sentences, &self.config.markers);
        debug!(sentences = sentences.len(), "Scoring batch");

        let mut attempts = 0;
        loop {
            let mut error = match self.exchange(&request, sentences.len()) {
                Ok(scores) => return Ok(scores),
                Err(e) if e.is_recoverable() => e,
                Err(e) => return Err(e),
            };

            // Relaunch until a connection is back or the budget runs out.
            loop {
                if attempts >= self.config.max_restarts {
                    self.shutdown();
                    return Err(ScorerError::RetriesExhausted {
                        attempts,
                        source: Box::new(error),
                    });
                }
                attempts += 1;
                warn!(attempt = attempts, error = %error, "Scorer failed, relaunching");
                match self.restart() {
                    Ok(()) => break,
                    Err(e) if e.is_recoverable() => error = e,
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

impl Drop for NeuralScorer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for NeuralScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralScorer")
            .field("addr", &self.listener.local_addr().ok())
            .field("connected", &self.connection.is_some())
            .field("restarts", &self.restarts)
            .finish()
    }
}

/// A scorer shared between callers; exchanges are serialized by a mutex.
pub struct SharedScorer<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedScorer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SentenceScorer> SharedScorer<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scorer)),
        }
    }

    /// Run `f` with exclusive access to the scorer.
    pub fn with<T>(&self, f: impl FnOnce(&mut S) -> ScorerResult<T>) -> ScorerResult<T> {
        let mut scorer = self.inner.lock().map_err(|_| ScorerError::Poisoned)?;
        f(&mut scorer)
    }
}

impl<S: SentenceScorer> SentenceScorer for SharedScorer<S> {
    fn score_batch(&mut self, sentences: &[String]) -> ScorerResult<Vec<f64>> {
        self.with(|scorer| scorer.score_batch(sentences))
    }
}
