//! Starting and stopping the scorer subprocess.

use std::net::SocketAddr;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info, warn};

use crate::config::{ScorerConfig, ENV_PORT};
use crate::error::{ScorerError, ScorerResult};

/// Host the scorer should connect to.
pub const ENV_HOST: &str = "AMRGEN_SCORER_HOST";

/// A running scorer.
pub trait ScorerHandle: Send {
    /// Whether the scorer is still running.
    fn is_alive(&mut self) -> bool;

    /// Stop the scorer and reap it. Calling this twice is harmless.
    fn terminate(&mut self);
}

/// Starts a scorer that will connect back to `addr`.
pub trait ScorerLauncher: Send {
    fn launch(&self, addr: SocketAddr) -> ScorerResult<Box<dyn ScorerHandle>>;
}

/// Launches the scorer as an external program.
///
/// The command is `program args... model`; the listening address is exported
/// as `AMRGEN_SCORER_HOST` / `AMRGEN_SCORER_PORT`.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
    model: String,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            model: model.into(),
        }
    }

    pub fn from_config(config: &ScorerConfig) -> Self {
        Self::new(&config.program, config.args.clone(), &config.model)
    }
}

impl ScorerLauncher for CommandLauncher {
    fn launch(&self, addr: SocketAddr) -> ScorerResult<Box<dyn ScorerHandle>> {
        info!(program = %self.program, model = %self.model, addr = %addr, "Launching scorer");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.model)
            .env(ENV_HOST, addr.ip().to_string())
            .env(ENV_PORT, addr.port().to_string())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ScorerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        debug!(pid = child.id(), "Scorer spawned");
        Ok(Box::new(child))
    }
}

impl ScorerHandle for Child {
    fn is_alive(&mut self) -> bool {
        match self.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = self.id(), status = %status, "Scorer exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Failed to check scorer status");
                false
            }
        }
    }

    fn terminate(&mut self) {
        if let Ok(Some(_)) = self.try_wait() {
            return;
        }
        debug!(pid = self.id(), "Killing scorer");
        if let Err(e) = self.kill() {
            warn!(pid = self.id(), error = %e, "Failed to kill scorer");
        }
        let _ = self.wait();
    }
}
