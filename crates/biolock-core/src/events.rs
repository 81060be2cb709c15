//! Events consumed by the reducer.
//!
//! User events come from the front end; result events carry the outcome of
//! an [`Effect`](crate::effects::Effect) back from the driver.

use crate::biometric::AuthOutcome;
use crate::credentials::{CredentialField, Credentials};
use crate::error::{BiometricError, StoreError};
use crate::state::EnrollmentPurpose;
use crate::store::StoreSnapshot;

/// Editable credential forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Login,
    Modal,
}

/// A text-field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    InsertStr(String),
    Backspace,
    Clear,
    Set(String),
}

impl TextEdit {
    pub fn apply(&self, text: &mut String) {
        match self {
            TextEdit::Insert(ch) => text.push(*ch),
            TextEdit::InsertStr(s) => text.push_str(s),
            TextEdit::Backspace => {
                text.pop();
            }
            TextEdit::Clear => text.clear(),
            TextEdit::Set(value) => value.clone_into(text),
        }
    }
}

#[derive(Debug)]
pub enum Event {
    /// Screen mounted: read the store and query enrollment.
    Mount,

    // ------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------
    Edit {
        form: Form,
        field: CredentialField,
        edit: TextEdit,
    },
    /// "Login" on the password form or "Biometric Login" on the bio form.
    SubmitLogin,
    UseBioLogin,
    UsePasswordLogin,
    ToggleBiometrics,
    SaveModal,
    CloseModal,
    Logout,
    DismissNotice,

    // ------------------------------------------------------------------
    // Effect results
    // ------------------------------------------------------------------
    StoreLoaded(Result<StoreSnapshot, StoreError>),
    EnrollmentChecked {
        purpose: EnrollmentPurpose,
        result: Result<bool, BiometricError>,
    },
    Authenticated(Result<AuthOutcome, BiometricError>),
    CredentialsSaved {
        credentials: Credentials,
        result: Result<(), StoreError>,
    },
    CredentialsCleared(Result<(), StoreError>),
}
