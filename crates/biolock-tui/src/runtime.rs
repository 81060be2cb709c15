//! TUI runtime: event loop and effect execution.
//!
//! The runtime uses an "inbox" pattern for async event collection:
//! - Effects run on tokio's blocking pool (adapters are synchronous)
//! - Each effect sends its result `UiEvent` to `inbox_tx`
//! - The loop drains `inbox_rx` every iteration, alongside terminal input

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use biolock_core::Services;
use biolock_core::effects::Effect;
use biolock_core::events::Event;
use biolock_core::state::Pending;
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::TuiState;
use crate::{render, terminal, update};

/// Spinner cadence while an adapter call is in flight.
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop or panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: TuiState,
    services: Services,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: Instant,
}

impl TuiRuntime {
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(services: Services, dev_mode: bool) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal,
            state: TuiState::new(dev_mode),
            services,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Mounts the login screen and runs until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("login screen mounted");
        self.dispatch_event(UiEvent::Core(Event::Mount));
        let result = self.event_loop();
        tracing::info!(logged_in = self.state.app.session.logged_in, "login screen closed");

        // A prompt left on screen would outlive the UI.
        if self.state.app.pending == Some(Pending::Authenticating) {
            tracing::info!("quit during biometric prompt");
        }
        self.services.biometrics.cancel();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }

            for event in self.collect_events()? {
                // Idle ticks change nothing on screen.
                if !matches!(event, UiEvent::Tick) || self.state.is_waiting() {
                    dirty = true;
                }
                self.dispatch_event(event);
            }
        }

        Ok(())
    }

    /// Collects events from the inbox and the terminal.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let tick_interval = if self.state.is_waiting() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking)
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event, self.services.verifier.as_ref());
        for effect in effects {
            self.spawn_effect(effect);
        }
    }

    /// Runs an adapter call on the blocking pool and posts its result to the
    /// inbox.
    fn spawn_effect(&self, effect: Effect) {
        let tx = self.inbox_tx.clone();
        let services = self.services.clone();
        tokio::task::spawn_blocking(move || {
            let event = services.execute(effect);
            let _ = tx.send(UiEvent::Core(event));
        });
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
