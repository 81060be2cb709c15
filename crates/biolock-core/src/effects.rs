//! Effect types.
//!
//! Effects are commands returned by the reducer that a driver executes.
//! They represent adapter I/O only; the reducer never touches the store or
//! the biometric subsystem directly.

use crate::credentials::Credentials;
use crate::state::EnrollmentPurpose;

/// Effects returned by the reducer for the driver to execute.
///
/// Each effect produces exactly one result [`Event`](crate::events::Event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read all three secure-store keys.
    LoadStore,

    /// Query biometric enrollment.
    CheckEnrollment(EnrollmentPurpose),

    /// Show the biometric prompt.
    Authenticate,

    /// Persist the pair and the enabled flag.
    SaveCredentials(Credentials),

    /// Delete all three secure-store keys.
    ClearCredentials,
}
