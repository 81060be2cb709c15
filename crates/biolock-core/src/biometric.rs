//! Biometric capability.
//!
//! [`BiometricAuthenticator`] is the seam between the login flow and the
//! platform's fingerprint/face subsystem. Enrollment is queried at mount and
//! again right before every biometric login attempt, because it can change
//! in between.

use std::collections::VecDeque;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{BiometricBackend, BiometricConfig, SimulatedOutcome};
use crate::error::BiometricError;

/// Exit status conventionally reported by a prompt the user dismissed.
const CANCELLED_EXIT_CODE: i32 = 130;

/// How often a running verify command is checked for exit.
const PROMPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of a single biometric prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthOutcome {
    Success,
    Failed,
    Cancelled,
}

/// Platform biometric subsystem.
pub trait BiometricAuthenticator: Send + Sync {
    /// Whether the device has enrolled biometric records.
    fn is_enrolled(&self) -> Result<bool, BiometricError>;

    /// Shows one blocking prompt. Timeouts and retries belong to the platform.
    fn authenticate(&self, prompt: &str) -> Result<AuthOutcome, BiometricError>;

    /// Tears down a prompt that is still on screen; the blocked
    /// `authenticate` call then reports `Cancelled`. No-op when idle or when
    /// the backend cannot interrupt its prompt.
    fn cancel(&self) {}
}

/// Builds the authenticator selected in config.
pub fn from_config(config: &BiometricConfig) -> Arc<dyn BiometricAuthenticator> {
    match config.backend {
        BiometricBackend::Simulated => Arc::new(SimulatedBiometrics::new(
            config.enrolled,
            config.outcome.into(),
        )),
        BiometricBackend::Command => Arc::new(CommandBiometrics::new(
            config.enroll_command.clone(),
            config.verify_command.clone(),
        )),
    }
}

impl From<SimulatedOutcome> for AuthOutcome {
    fn from(outcome: SimulatedOutcome) -> Self {
        match outcome {
            SimulatedOutcome::Approve => AuthOutcome::Success,
            SimulatedOutcome::Deny => AuthOutcome::Failed,
            SimulatedOutcome::Cancel => AuthOutcome::Cancelled,
        }
    }
}

// ============================================================================
// SimulatedBiometrics
// ============================================================================

/// Fixed enrollment and a fixed prompt outcome.
#[derive(Debug, Clone)]
pub struct SimulatedBiometrics {
    enrolled: bool,
    outcome: AuthOutcome,
}

impl SimulatedBiometrics {
    pub fn new(enrolled: bool, outcome: AuthOutcome) -> Self {
        Self { enrolled, outcome }
    }
}

impl BiometricAuthenticator for SimulatedBiometrics {
    fn is_enrolled(&self) -> Result<bool, BiometricError> {
        Ok(self.enrolled)
    }

    fn authenticate(&self, prompt: &str) -> Result<AuthOutcome, BiometricError> {
        tracing::debug!(prompt, outcome = ?self.outcome, "simulated biometric prompt");
        Ok(self.outcome)
    }
}

// ============================================================================
// CommandBiometrics
// ============================================================================

/// Delegates to external commands (for example the fprintd tools).
///
/// - enrollment: exit status 0 means enrolled
/// - verify: 0 is success, 130 or death by signal is a cancellation,
///   anything else is a rejected match
///
/// The prompt text is passed in `BIOLOCK_PROMPT`. Output is discarded so the
/// commands cannot draw over the terminal UI. The verify child is kept so
/// [`cancel`](BiometricAuthenticator::cancel) can kill it.
#[derive(Debug)]
pub struct CommandBiometrics {
    enroll_command: Vec<String>,
    verify_command: Vec<String>,
    prompt: Mutex<Option<Child>>,
}

impl CommandBiometrics {
    pub fn new(enroll_command: Vec<String>, verify_command: Vec<String>) -> Self {
        Self {
            enroll_command,
            verify_command,
            prompt: Mutex::new(None),
        }
    }

    fn command(argv: &[String], which: &'static str) -> Result<Command, BiometricError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(BiometricError::NotConfigured(which));
        };
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Ok(command)
    }

    fn prompt_slot(&self) -> MutexGuard<'_, Option<Child>> {
        self.prompt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for the registered verify child. `None` means it was cancelled.
    fn wait_for_prompt(&self) -> io::Result<Option<ExitStatus>> {
        loop {
            {
                let mut slot = self.prompt_slot();
                let Some(child) = slot.as_mut() else {
                    return Ok(None);
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        *slot = None;
                        return Ok(Some(status));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        *slot = None;
                        return Err(err);
                    }
                }
            }
            thread::sleep(PROMPT_POLL_INTERVAL);
        }
    }
}

fn spawn_error(argv: &[String], source: io::Error) -> BiometricError {
    BiometricError::Spawn {
        program: argv.first().cloned().unwrap_or_default(),
        source,
    }
}

impl BiometricAuthenticator for CommandBiometrics {
    fn is_enrolled(&self) -> Result<bool, BiometricError> {
        let status = Self::command(&self.enroll_command, "enrollment")?
            .status()
            .map_err(|source| spawn_error(&self.enroll_command, source))?;
        tracing::debug!(?status, "biometric enrollment check finished");
        Ok(status.success())
    }

    fn authenticate(&self, prompt: &str) -> Result<AuthOutcome, BiometricError> {
        let child = Self::command(&self.verify_command, "verify")?
            .env("BIOLOCK_PROMPT", prompt)
            .spawn()
            .map_err(|source| spawn_error(&self.verify_command, source))?;
        *self.prompt_slot() = Some(child);

        let Some(status) = self
            .wait_for_prompt()
            .map_err(|source| spawn_error(&self.verify_command, source))?
        else {
            return Ok(AuthOutcome::Cancelled);
        };
        tracing::debug!(?status, "biometric verify finished");
        Ok(match status.code() {
            Some(0) => AuthOutcome::Success,
            Some(CANCELLED_EXIT_CODE) | None => AuthOutcome::Cancelled,
            Some(_) => AuthOutcome::Failed,
        })
    }

    fn cancel(&self) {
        let Some(mut child) = self.prompt_slot().take() else {
            return;
        };
        tracing::info!(pid = child.id(), "killing biometric prompt");
        if let Err(err) = child.kill() {
            tracing::warn!(error = %err, "failed to kill biometric prompt");
        }
        let _ = child.wait();
    }
}

// ============================================================================
// ScriptedBiometrics
// ============================================================================

/// Test double: switchable enrollment, queued outcomes, recorded prompts.
///
/// With an empty queue, `authenticate` reports `Failed`.
#[derive(Debug, Default)]
pub struct ScriptedBiometrics {
    inner: Mutex<Script>,
}

#[derive(Debug, Default)]
struct Script {
    enrolled: bool,
    outcomes: VecDeque<Result<AuthOutcome, String>>,
    prompts: Vec<String>,
    enrollment_checks: usize,
}

impl ScriptedBiometrics {
    pub fn new(enrolled: bool) -> Self {
        Self {
            inner: Mutex::new(Script {
                enrolled,
                ..Script::default()
            }),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_enrolled(&self, enrolled: bool) {
        self.script().enrolled = enrolled;
    }

    pub fn push_outcome(&self, outcome: AuthOutcome) {
        self.script().outcomes.push_back(Ok(outcome));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.script().outcomes.push_back(Err(message.into()));
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.script().prompts.clone()
    }

    pub fn enrollment_checks(&self) -> usize {
        self.script().enrollment_checks
    }
}

impl BiometricAuthenticator for ScriptedBiometrics {
    fn is_enrolled(&self) -> Result<bool, BiometricError> {
        let mut script = self.script();
        script.enrollment_checks += 1;
        Ok(script.enrolled)
    }

    fn authenticate(&self, prompt: &str) -> Result<AuthOutcome, BiometricError> {
        let mut script = self.script();
        script.prompts.push(prompt.to_string());
        match script.outcomes.pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(BiometricError::Unavailable(message)),
            None => Ok(AuthOutcome::Failed),
        }
    }
}
