//! Effect execution.
//!
//! [`Services`] bundles the injected capabilities and turns one [`Effect`]
//! into its result [`Event`] by calling the adapters (blocking).
//! [`Driver`] owns an [`AppState`] and runs the reducer/effect loop inline
//! until it is idle; front ends that must stay responsive execute effects
//! on a worker instead and feed results back themselves.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::biometric::{self, BiometricAuthenticator};
use crate::config::{BiometricConfig, Config, StoreBackend};
use crate::credentials::Credentials;
use crate::effects::Effect;
use crate::events::Event;
use crate::state::AppState;
use crate::store::{CredentialCache, FileStore, KeyValueStore, MemoryStore};
use crate::update::update;
use crate::verify::{CredentialVerifier, FixedVerifier};

/// Capabilities the login flow depends on.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn KeyValueStore>,
    pub biometrics: Arc<dyn BiometricAuthenticator>,
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Text shown by the biometric prompt.
    pub prompt: String,
}

impl Services {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        biometrics: Arc<dyn BiometricAuthenticator>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            store,
            biometrics,
            verifier,
            prompt: BiometricConfig::DEFAULT_PROMPT.to_string(),
        }
    }

    /// Builds the services selected in config.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn KeyValueStore> = match config.store.backend {
            StoreBackend::File => Arc::new(FileStore::new(config.store.effective_path())),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Self {
            store,
            biometrics: biometric::from_config(&config.biometric),
            verifier: Arc::new(FixedVerifier::from_config(&config.verification)),
            prompt: config.biometric.prompt.clone(),
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn cache(&self) -> CredentialCache<'_> {
        CredentialCache::new(self.store.as_ref())
    }

    /// Executes one effect, blocking on the adapter call.
    pub fn execute(&self, effect: Effect) -> Event {
        tracing::debug!(?effect, "executing effect");
        match effect {
            Effect::LoadStore => Event::StoreLoaded(self.cache().load()),
            Effect::CheckEnrollment(purpose) => Event::EnrollmentChecked {
                purpose,
                result: self.biometrics.is_enrolled(),
            },
            Effect::Authenticate => Event::Authenticated(self.biometrics.authenticate(&self.prompt)),
            Effect::SaveCredentials(credentials) => save(&self.cache(), credentials),
            Effect::ClearCredentials => Event::CredentialsCleared(self.cache().clear()),
        }
    }
}

fn save(cache: &CredentialCache<'_>, credentials: Credentials) -> Event {
    let result = cache.save(&credentials);
    Event::CredentialsSaved {
        credentials,
        result,
    }
}

/// Synchronous reducer loop over an owned state.
pub struct Driver {
    services: Services,
    state: AppState,
}

impl Driver {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            state: AppState::new(),
        }
    }

    /// Creates a driver and runs the mount sequence.
    pub fn mounted(services: Services) -> Self {
        let mut driver = Self::new(services);
        driver.dispatch(Event::Mount);
        driver
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Feeds `event` through the reducer and executes effects until idle.
    pub fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let effects = update(&mut self.state, event, self.services.verifier.as_ref());
            for effect in effects {
                queue.push_back(self.services.execute(effect));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biometric::{AuthOutcome, ScriptedBiometrics};
    use crate::credentials::CredentialField;
    use crate::events::{Form, TextEdit};
    use crate::state::{Notice, Screen};
    use crate::store::StoreKey;
    use crate::update::INVALID_LOGIN;

    struct Harness {
        store: Arc<MemoryStore>,
        bio: Arc<ScriptedBiometrics>,
        driver: Driver,
    }

    impl Harness {
        fn new(store: MemoryStore, enrolled: bool) -> Self {
            let store = Arc::new(store);
            let bio = Arc::new(ScriptedBiometrics::new(enrolled));
            let services = Services::new(
                Arc::<MemoryStore>::clone(&store),
                Arc::<ScriptedBiometrics>::clone(&bio),
                Arc::new(FixedVerifier::default()),
            );
            Self {
                store,
                bio,
                driver: Driver::mounted(services),
            }
        }

        fn state(&self) -> &AppState {
            self.driver.state()
        }

        fn type_into(&mut self, form: Form, email: &str, password: &str) {
            for (field, value) in [
                (CredentialField::Email, email),
                (CredentialField::Password, password),
            ] {
                self.driver.dispatch(Event::Edit {
                    form,
                    field,
                    edit: TextEdit::Set(value.to_string()),
                });
            }
        }

        fn password_login(&mut self) {
            self.type_into(Form::Login, "test", "123");
            self.driver.dispatch(Event::SubmitLogin);
        }

        fn enable_biometrics(&mut self, email: &str, password: &str) {
            self.driver.dispatch(Event::ToggleBiometrics);
            self.type_into(Form::Modal, email, password);
            self.driver.dispatch(Event::SaveModal);
        }
    }

    fn saved_store() -> MemoryStore {
        MemoryStore::with_entries([
            (StoreKey::Email, "test"),
            (StoreKey::Password, "123"),
            (StoreKey::IsEnabled, "enabled"),
        ])
    }

    #[test]
    fn test_enable_persists_all_three_keys() {
        let mut h = Harness::new(MemoryStore::new(), true);
        h.password_login();
        h.enable_biometrics("test", "123");

        let entries = h.store.entries();
        assert_eq!(entries.get(&StoreKey::Email).map(String::as_str), Some("test"));
        assert_eq!(entries.get(&StoreKey::Password).map(String::as_str), Some("123"));
        assert_eq!(
            entries.get(&StoreKey::IsEnabled).map(String::as_str),
            Some("enabled")
        );
        assert!(h.state().biometrics.enabled);
    }

    #[test]
    fn test_enable_with_wrong_pair_persists_nothing() {
        let mut h = Harness::new(MemoryStore::new(), true);
        h.password_login();
        h.enable_biometrics("test", "999");

        assert!(h.store.entries().is_empty());
        assert!(!h.state().biometrics.enabled);
        assert_eq!(h.state().error(), Some(INVALID_LOGIN));
    }

    #[test]
    fn test_disable_is_idempotent() {
        let mut h = Harness::new(saved_store(), true);
        h.driver.dispatch(Event::UsePasswordLogin);
        h.password_login();
        assert!(h.state().biometrics.enabled);

        h.driver.dispatch(Event::ToggleBiometrics);
        let once = (h.store.entries(), h.state().biometrics.clone());

        // The second toggle opens the modal instead; closing it returns to
        // the same end state.
        h.driver.dispatch(Event::ToggleBiometrics);
        h.driver.dispatch(Event::CloseModal);
        let twice = (h.store.entries(), h.state().biometrics.clone());

        assert!(once.0.is_empty());
        assert!(!once.1.enabled);
        assert_eq!(once, twice);

        // Clearing an already-empty store directly is also a no-op.
        h.driver.services().cache().clear().unwrap();
        assert!(h.store.entries().is_empty());
    }

    #[test]
    fn test_logout_round_trip_keeps_biometric_state() {
        let mut h = Harness::new(MemoryStore::new(), true);
        h.password_login();
        h.enable_biometrics("test", "123");
        let before = (h.store.entries(), h.state().biometrics.enabled);

        h.driver.dispatch(Event::Logout);
        h.driver.dispatch(Event::UsePasswordLogin);
        h.password_login();
        h.driver.dispatch(Event::Logout);

        assert_eq!((h.store.entries(), h.state().biometrics.enabled), before);
    }

    #[test]
    fn test_no_enrollment_never_opens_modal_or_touches_store() {
        let mut h = Harness::new(MemoryStore::new(), false);
        h.password_login();

        h.driver.dispatch(Event::ToggleBiometrics);

        assert_eq!(h.state().screen(), Screen::Settings);
        assert_eq!(h.state().notice, Some(Notice::no_records_for_settings()));
        assert!(h.store.entries().is_empty());
    }

    #[test]
    fn test_full_scenario() {
        let mut h = Harness::new(MemoryStore::new(), true);
        assert_eq!(h.state().screen(), Screen::LoginForm);
        assert!(!h.state().biometrics.enabled);

        h.password_login();
        assert!(h.state().session.logged_in);
        assert_eq!(h.state().screen(), Screen::Settings);

        h.enable_biometrics("test", "123");
        let entries = h.store.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[&StoreKey::IsEnabled], "enabled");
        assert!(h.state().biometrics.enabled);

        h.driver.dispatch(Event::Logout);
        assert_eq!(h.state().screen(), Screen::BiometricForm);

        h.bio.push_outcome(AuthOutcome::Success);
        h.driver.dispatch(Event::SubmitLogin);
        assert!(h.state().session.logged_in);
        assert_eq!(h.bio.prompts(), vec!["Login with Biometrics"]);
    }

    #[test]
    fn test_mount_with_saved_store_opens_bio_form() {
        let h = Harness::new(saved_store(), true);
        assert_eq!(h.state().screen(), Screen::BiometricForm);
        assert_eq!(h.state().cached, Credentials::new("test", "123"));
        assert!(h.state().biometrics.records);
    }

    #[test]
    fn test_enrollment_removed_after_mount_skips_prompt() {
        let mut h = Harness::new(saved_store(), true);
        assert_eq!(h.bio.enrollment_checks(), 1);

        h.bio.set_enrolled(false);
        h.driver.dispatch(Event::SubmitLogin);

        assert_eq!(h.bio.enrollment_checks(), 2);
        assert!(h.bio.prompts().is_empty());
        assert_eq!(h.state().notice, Some(Notice::no_records_for_login()));
        assert!(!h.state().session.logged_in);
    }

    #[test]
    fn test_store_failure_aborts_enable() {
        let mut h = Harness::new(MemoryStore::new(), true);
        h.password_login();
        h.driver.dispatch(Event::ToggleBiometrics);
        h.type_into(Form::Modal, "test", "123");

        h.store.fail_next_with("keychain locked");
        h.driver.dispatch(Event::SaveModal);

        assert!(!h.state().biometrics.enabled);
        assert_eq!(h.state().screen(), Screen::SettingsModal);
        assert!(h.state().error().is_some());
        assert!(h.state().pending.is_none());
        assert!(!h.store.entries().contains_key(&StoreKey::IsEnabled));
    }

    #[test]
    fn test_custom_prompt_reaches_authenticator() {
        let store = Arc::new(saved_store());
        let bio = Arc::new(ScriptedBiometrics::new(true));
        bio.push_outcome(AuthOutcome::Success);
        let services = Services::new(
            store,
            Arc::<ScriptedBiometrics>::clone(&bio),
            Arc::new(FixedVerifier::default()),
        )
        .with_prompt("Unlock biolock");

        let mut driver = Driver::mounted(services);
        driver.dispatch(Event::SubmitLogin);

        assert!(driver.state().session.logged_in);
        assert_eq!(bio.prompts(), vec!["Unlock biolock"]);
    }

    #[test]
    fn test_from_config_memory_backend() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Memory;
        let services = Services::from_config(&config);

        let driver = Driver::mounted(services);
        assert_eq!(driver.state().screen(), Screen::LoginForm);
        assert!(driver.state().biometrics.records);
    }
}
