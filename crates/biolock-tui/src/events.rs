//! Events processed by the TUI reducer.

use biolock_core::events::Event;

#[derive(Debug)]
pub enum UiEvent {
    /// Animation tick while an adapter call is in flight.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// Core event (mount, or an effect result from the inbox).
    Core(Event),
}
