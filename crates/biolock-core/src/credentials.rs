//! Credential pair shared by the login form, the settings modal and the
//! secure-store cache.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two text fields of a credential form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialField {
    Email,
    Password,
}

/// An email/password pair.
///
/// `Debug` never prints the password.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.password.is_empty()
    }

    pub fn clear(&mut self) {
        self.email.clear();
        self.password.clear();
    }

    pub fn field(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::Email => &self.email,
            CredentialField::Password => &self.password,
        }
    }

    pub fn field_mut(&mut self, field: CredentialField) -> &mut String {
        match field {
            CredentialField::Email => &mut self.email,
            CredentialField::Password => &mut self.password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &password)
            .finish()
    }
}
