//! The scoring client against an in-process fake scorer speaking real TCP.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use amrgen_lm::{
    NeuralScorer, ScorerConfig, ScorerError, ScorerHandle, ScorerLauncher, ScorerResult,
    SentenceScorer, SharedScorer,
};

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    /// Reply with the word count of every sentence.
    Serve,
    /// Read one request, then close the connection and die.
    CrashOnRequest,
    /// Read requests and never reply.
    Silent,
    /// Reply with something that is not a score.
    Garbage,
    /// Stay alive without ever connecting.
    NeverConnect,
    /// Exit before connecting.
    ExitImmediately,
}

struct FakeHandle {
    alive: Arc<AtomicBool>,
}

impl ScorerHandle for FakeHandle {
    fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn terminate(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// Plays the behaviours in order, repeating the last one.
#[derive(Clone)]
struct FakeLauncher {
    behaviours: Vec<Behaviour>,
    launches: Arc<AtomicUsize>,
    alive: Arc<Mutex<Vec<Arc<AtomicBool>>>>,
}

impl FakeLauncher {
    fn new(behaviours: &[Behaviour]) -> Self {
        Self {
            behaviours: behaviours.to_vec(),
            launches: Arc::new(AtomicUsize::new(0)),
            alive: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    fn any_alive(&self) -> bool {
        self.alive
            .lock()
            .unwrap()
            .iter()
            .any(|flag| flag.load(Ordering::SeqCst))
    }
}

impl ScorerLauncher for FakeLauncher {
    fn launch(&self, addr: SocketAddr) -> ScorerResult<Box<dyn ScorerHandle>> {
        let n = self.launches.fetch_add(1, Ordering::SeqCst);
        let behaviour = self.behaviours[n.min(self.behaviours.len() - 1)];
        let alive = Arc::new(AtomicBool::new(true));
        self.alive.lock().unwrap().push(Arc::clone(&alive));

        match behaviour {
            Behaviour::ExitImmediately => alive.store(false, Ordering::SeqCst),
            Behaviour::NeverConnect => {}
            _ => {
                let flag = Arc::clone(&alive);
                thread::spawn(move || serve(addr, behaviour, flag));
            }
        }
        Ok(Box::new(FakeHandle { alive }))
    }
}

fn word_counts(request: &str) -> String {
    let mut fields = request.split_whitespace();
    let n: usize = fields.next().unwrap().parse().unwrap();
    let mut scores = Vec::new();
    let mut words = 0;
    for field in fields {
        match field {
            "<bos>" => words = 0,
            "<eos>" => scores.push(words.to_string()),
            "<pad>" => {}
            _ => words += 1,
        }
    }
    assert_eq!(scores.len(), n);
    scores.join(" ")
}

fn serve(addr: SocketAddr, behaviour: Behaviour, alive: Arc<AtomicBool>) {
    let Ok(stream) = TcpStream::connect(addr) else {
        return;
    };
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let reply = match behaviour {
            Behaviour::Serve => word_counts(&line),
            Behaviour::CrashOnRequest => {
                alive.store(false, Ordering::SeqCst);
                return;
            }
            Behaviour::Silent => continue,
            Behaviour::Garbage => "not-a-number".to_string(),
            Behaviour::NeverConnect | Behaviour::ExitImmediately => unreachable!(),
        };
        if writeln!(writer, "{reply}").is_err() {
            break;
        }
    }
}

fn config() -> ScorerConfig {
    ScorerConfig {
        port: 0,
        accept_timeout_ms: 2_000,
        read_timeout_ms: 2_000,
        max_restarts: 2,
        ..ScorerConfig::default()
    }
}

fn sentences(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_scores_are_positional() {
    let launcher = FakeLauncher::new(&[Behaviour::Serve]);
    let mut scorer = NeuralScorer::with_launcher(config(), Box::new(launcher.clone())).unwrap();

    let scores = scorer
        .score_batch(&sentences(&["the cat sat", "a dog ran far", "hi"]))
        .unwrap();
    assert_eq!(scores, vec![3.0, 4.0, 1.0]);
    assert_eq!(scorer.score("one two").unwrap(), 2.0);
    assert_eq!(launcher.launches(), 1);
    assert_eq!(scorer.restarts(), 0);
}

#[test]
fn test_empty_batch_skips_exchange() {
    let launcher = FakeLauncher::new(&[Behaviour::CrashOnRequest]);
    let mut scorer = NeuralScorer::with_launcher(config(), Box::new(launcher.clone())).unwrap();
    assert!(scorer.score_batch(&[]).unwrap().is_empty());
    assert_eq!(launcher.launches(), 1);
}

#[test]
fn test_rank_orders_ascending() {
    let launcher = FakeLauncher::new(&[Behaviour::Serve]);
    let mut scorer = NeuralScorer::with_launcher(config(), Box::new(launcher)).unwrap();

    let ranked = scorer
        .rank(&sentences(&["a b c", "a", "x y", "b"]))
        .unwrap();
    let order: Vec<&str> = ranked.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "x y", "a b c"]);
}

#[test]
fn test_restarts_after_crash() {
    let launcher = FakeLauncher::new(&[Behaviour::CrashOnRequest, Behaviour::Serve]);
    let mut scorer = NeuralScorer::with_launcher(config(), Box::new(launcher.clone())).unwrap();

    let scores = scorer.score_batch(&sentences(&["hello world"])).unwrap();
    assert_eq!(scores, vec![2.0]);
    assert_eq!(scorer.restarts(), 1);
    assert_eq!(launcher.launches(), 2);
}

#[test]
fn test_restarts_after_malformed_reply() {
    let launcher = FakeLauncher::new(&[Behaviour::Garbage, Behaviour::Serve]);
    let mut scorer = NeuralScorer::with_launcher(config(), Box::new(launcher)).unwrap();
    assert_eq!(scorer.score("a b c").unwrap(), 3.0);
    assert_eq!(scorer.restarts(), 1);
}

#[test]
fn test_restarts_after_read_timeout() {
    let launcher = FakeLauncher::new(&[Behaviour::Silent, Behaviour::Serve]);
    let config = ScorerConfig {
        read_timeout_ms: 200,
        ..config()
    };
    let mut scorer = NeuralScorer::with_launcher(config, Box::new(launcher)).unwrap();
    assert_eq!(scorer.score("a b").unwrap(), 2.0);
    assert_eq!(scorer.restarts(), 1);
}

#[test]
fn test_retries_are_bounded() {
    let launcher = FakeLauncher::new(&[Behaviour::CrashOnRequest]);
    let mut scorer = NeuralScorer::with_launcher(config(), Box::new(launcher.clone())).unwrap();

    let err = scorer.score("doomed").unwrap_err();
    match err {
        ScorerError::RetriesExhausted { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*source, ScorerError::Disconnected));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(launcher.launches(), 3);
    assert!(!scorer.is_connected());
}

#[test]
fn test_accept_timeout() {
    let launcher = FakeLauncher::new(&[Behaviour::NeverConnect]);
    let config = ScorerConfig {
        accept_timeout_ms: 200,
        ..config()
    };
    let err = NeuralScorer::with_launcher(config, Box::new(launcher.clone())).unwrap_err();
    assert!(matches!(err, ScorerError::AcceptTimeout { .. }));
    // The abandoned scorer is stopped.
    assert!(!launcher.any_alive());
}

#[test]
fn test_scorer_exit_before_connect() {
    let launcher = FakeLauncher::new(&[Behaviour::ExitImmediately]);
    let err = NeuralScorer::with_launcher(config(), Box::new(launcher)).unwrap_err();
    assert!(matches!(err, ScorerError::ScorerExited));
}

#[test]
fn test_port_in_use() {
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = ScorerConfig {
        port: taken.local_addr().unwrap().port(),
        ..config()
    };
    let launcher = FakeLauncher::new(&[Behaviour::Serve]);
    let err = NeuralScorer::with_launcher(config, Box::new(launcher.clone())).unwrap_err();
    assert!(matches!(err, ScorerError::Bind { .. }));
    assert_eq!(launcher.launches(), 0);
}

#[test]
fn test_drop_terminates_scorer() {
    let launcher = FakeLauncher::new(&[Behaviour::Serve]);
    let scorer = NeuralScorer::with_launcher(config(), Box::new(launcher.clone())).unwrap();
    assert!(launcher.any_alive());
    drop(scorer);
    assert!(!launcher.any_alive());
}

#[test]
fn test_shared_scorer_serializes_callers() {
    let launcher = FakeLauncher::new(&[Behaviour::Serve]);
    let scorer = NeuralScorer::with_launcher(config(), Box::new(launcher)).unwrap();
    let shared = SharedScorer::new(scorer);

    let workers: Vec<_> = (1..=4)
        .map(|n| {
            let mut shared = shared.clone();
            thread::spawn(move || {
                let sentence = vec!["w"; n].join(" ");
                (0..5)
                    .map(|_| shared.score(&sentence).unwrap())
                    .collect::<Vec<f64>>()
            })
        })
        .collect();

    for (n, worker) in (1..=4).zip(workers) {
        assert!(worker.join().unwrap().iter().all(|s| *s == n as f64));
    }
}
