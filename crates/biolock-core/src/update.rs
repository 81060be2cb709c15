//! Login flow reducer.
//!
//! All state transitions happen here. A driver calls
//! `update(state, event, verifier)` and executes the returned effects,
//! feeding each effect's result back in as another event.
//!
//! Exactly one branch runs per submit, chosen by the current [`Screen`].

use crate::biometric::AuthOutcome;
use crate::credentials::Credentials;
use crate::effects::Effect;
use crate::error::{BiometricError, StoreError};
use crate::events::{Event, Form};
use crate::state::{AppState, EnrollmentPurpose, Notice, Pending, Screen};
use crate::store::StoreSnapshot;
use crate::verify::CredentialVerifier;

pub const INVALID_LOGIN: &str = "Invalid login";
pub const BIOMETRIC_FAILED: &str = "Biometric authentication failed";
pub const BIOMETRIC_CANCELLED: &str = "Biometric login cancelled";
pub const BIOMETRIC_UNAVAILABLE: &str = "Biometric prompt unavailable";

fn storage_error(operation: &str) -> String {
    format!("Secure storage error: could not {operation} saved credentials")
}

/// The reducer.
///
/// Mutates `state` in place and returns the effects to run. Never performs
/// I/O.
pub fn update(
    state: &mut AppState,
    event: Event,
    verifier: &dyn CredentialVerifier,
) -> Vec<Effect> {
    match event {
        Event::Mount => vec![
            Effect::LoadStore,
            Effect::CheckEnrollment(EnrollmentPurpose::Mount),
        ],
        Event::StoreLoaded(result) => {
            handle_store_loaded(state, result);
            vec![]
        }
        Event::EnrollmentChecked { purpose, result } => {
            handle_enrollment_checked(state, purpose, result)
        }
        Event::Authenticated(result) => {
            handle_authenticated(state, result);
            vec![]
        }
        Event::CredentialsSaved {
            credentials,
            result,
        } => {
            handle_credentials_saved(state, credentials, result);
            vec![]
        }
        Event::CredentialsCleared(result) => {
            handle_credentials_cleared(state, result);
            vec![]
        }
        Event::DismissNotice => {
            state.notice = None;
            vec![]
        }
        user_event => {
            // A notice blocks the whole screen until acknowledged.
            if state.notice.is_some() {
                return vec![];
            }
            handle_user_event(state, user_event, verifier)
        }
    }
}

fn handle_user_event(
    state: &mut AppState,
    event: Event,
    verifier: &dyn CredentialVerifier,
) -> Vec<Effect> {
    let screen = state.screen();

    // Text stays editable while an operation is in flight; nothing else does.
    if let Event::Edit { form, field, edit } = event {
        match (form, screen) {
            (Form::Login, Screen::LoginForm) => edit.apply(state.login.field_mut(field)),
            (Form::Modal, Screen::SettingsModal) => edit.apply(state.modal.field_mut(field)),
            _ => {}
        }
        return vec![];
    }
    if state.is_busy() {
        tracing::debug!(?event, pending = ?state.pending, "ignoring action while busy");
        return vec![];
    }
    // The form may not reflect the saved opt-in until the mount read lands.
    if !state.loaded {
        tracing::debug!(?event, "ignoring action before secure store load");
        return vec![];
    }

    match (event, screen) {
        (Event::SubmitLogin, Screen::LoginForm) => {
            if verifier.verify(&state.login) {
                tracing::info!("password login succeeded");
                state.session.error = None;
                state.login.clear();
                state.session.logged_in = true;
            } else {
                tracing::info!("password login rejected");
                state.session.error = Some(INVALID_LOGIN.to_string());
            }
            vec![]
        }
        (Event::SubmitLogin, Screen::BiometricForm) => {
            if verifier.verify(&state.cached) {
                state.session.error = None;
                state.login.clear();
                state.pending = Some(Pending::EnrollmentCheck);
                vec![Effect::CheckEnrollment(EnrollmentPurpose::Login)]
            } else {
                tracing::info!("saved credentials rejected for biometric login");
                state.session.error = Some(INVALID_LOGIN.to_string());
                vec![]
            }
        }
        (Event::UseBioLogin, Screen::LoginForm) if state.biometrics.enabled => {
            state.biometrics.show_bio_login = true;
            state.session.error = None;
            vec![]
        }
        (Event::UsePasswordLogin, Screen::BiometricForm) => {
            state.biometrics.show_bio_login = false;
            state.session.error = None;
            vec![]
        }
        (Event::ToggleBiometrics, Screen::Settings) => {
            if state.biometrics.enabled {
                state.pending = Some(Pending::Clearing);
                vec![Effect::ClearCredentials]
            } else if state.biometrics.records {
                state.session.modal_visible = true;
                vec![]
            } else {
                tracing::info!("cannot enable biometrics: no enrolled records");
                state.notice = Some(Notice::no_records_for_settings());
                vec![]
            }
        }
        (Event::SaveModal, Screen::SettingsModal) => {
            if verifier.verify(&state.modal) {
                state.pending = Some(Pending::Saving);
                vec![Effect::SaveCredentials(state.modal.clone())]
            } else {
                state.session.error = Some(INVALID_LOGIN.to_string());
                vec![]
            }
        }
        (Event::CloseModal, Screen::SettingsModal) => {
            state.session.modal_visible = false;
            state.modal.clear();
            state.session.error = None;
            vec![]
        }
        (Event::Logout, Screen::Settings) => {
            tracing::info!("logged out");
            state.session.error = None;
            state.session.logged_in = false;
            state.biometrics.show_bio_login = state.biometrics.enabled;
            vec![]
        }
        (event, screen) => {
            tracing::trace!(?event, ?screen, "event has no transition on this screen");
            vec![]
        }
    }
}

fn handle_store_loaded(state: &mut AppState, result: Result<StoreSnapshot, StoreError>) {
    state.loaded = true;
    match result {
        Ok(snapshot) => {
            state.cached = snapshot.credentials();
            state.biometrics.set_enabled(snapshot.biometrics_enabled());
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load secure store");
            state.session.error = Some(storage_error("load"));
        }
    }
}

fn handle_enrollment_checked(
    state: &mut AppState,
    purpose: EnrollmentPurpose,
    result: Result<bool, BiometricError>,
) -> Vec<Effect> {
    match purpose {
        EnrollmentPurpose::Mount => {
            state.biometrics.records = result.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "enrollment query failed at mount");
                false
            });
            vec![]
        }
        EnrollmentPurpose::Login => {
            if state.pending != Some(Pending::EnrollmentCheck) {
                return vec![];
            }
            match result {
                Ok(true) => {
                    state.biometrics.records = true;
                    state.pending = Some(Pending::Authenticating);
                    vec![Effect::Authenticate]
                }
                Ok(false) => {
                    state.biometrics.records = false;
                    state.pending = None;
                    state.notice = Some(Notice::no_records_for_login());
                    vec![]
                }
                Err(err) => {
                    tracing::error!(error = %err, "enrollment query failed");
                    state.pending = None;
                    state.session.error = Some(BIOMETRIC_UNAVAILABLE.to_string());
                    vec![]
                }
            }
        }
    }
}

fn handle_authenticated(state: &mut AppState, result: Result<AuthOutcome, BiometricError>) {
    if state.pending != Some(Pending::Authenticating) {
        return;
    }
    state.pending = None;
    match result {
        Ok(AuthOutcome::Success) => {
            tracing::info!("biometric login succeeded");
            state.session.error = None;
            state.session.logged_in = true;
        }
        Ok(AuthOutcome::Failed) => {
            tracing::info!("biometric login rejected");
            state.session.error = Some(BIOMETRIC_FAILED.to_string());
        }
        Ok(AuthOutcome::Cancelled) => {
            state.session.error = Some(BIOMETRIC_CANCELLED.to_string());
        }
        Err(err) => {
            tracing::error!(error = %err, "biometric prompt failed");
            state.session.error = Some(BIOMETRIC_UNAVAILABLE.to_string());
        }
    }
}

fn handle_credentials_saved(
    state: &mut AppState,
    credentials: Credentials,
    result: Result<(), StoreError>,
) {
    if state.pending != Some(Pending::Saving) {
        return;
    }
    state.pending = None;
    match result {
        Ok(()) => {
            state.cached = credentials;
            state.biometrics.set_enabled(true);
            state.session.error = None;
            state.login.clear();
            state.modal.clear();
            state.session.modal_visible = false;
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to save credentials");
            state.session.error = Some(storage_error("save"));
        }
    }
}

fn handle_credentials_cleared(state: &mut AppState, result: Result<(), StoreError>) {
    if state.pending != Some(Pending::Clearing) {
        return;
    }
    state.pending = None;
    match result {
        Ok(()) => {
            state.cached.clear();
            state.biometrics.set_enabled(false);
            state.session.error = None;
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to clear credentials");
            state.session.error = Some(storage_error("clear"));
        }
    }
}
