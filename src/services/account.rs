//! Saved panel credentials and the Kids Mode PIN

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::store::{get_json, set_json, StoreError, StoreHandle, StoreResult};

pub const AUTH_KEY: &str = "uni_auth";
pub const KIDS_PIN_KEY: &str = "uni_kids_pin";
pub const DEFAULT_KIDS_PIN: &str = "1234";

lazy_static! {
    static ref PIN_REGEX: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
}

/// Credentials as persisted after a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCredentials {
    #[serde(rename = "u")]
    pub username: String,
    #[serde(rename = "p")]
    pub password: String,
}

#[derive(Clone)]
pub struct CredentialStore {
    store: StoreHandle,
}

impl CredentialStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn load(&self) -> StoreResult<Option<SavedCredentials>> {
        get_json(self.store.as_ref(), AUTH_KEY)
    }

    pub fn save(&self, username: &str, password: &str) -> StoreResult<()> {
        let creds = SavedCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        set_json(self.store.as_ref(), AUTH_KEY, &creds)
    }

    /// Forget credentials, e.g. after auto-login was rejected
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(AUTH_KEY)
    }
}

/// Four-digit PIN gating the exit from Kids Mode
#[derive(Clone)]
pub struct KidsPin {
    store: StoreHandle,
}

impl KidsPin {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn is_valid_format(pin: &str) -> bool {
        PIN_REGEX.is_match(pin)
    }

    /// Current PIN; the default applies until one is set
    pub fn current(&self) -> StoreResult<String> {
        Ok(self
            .store
            .get(KIDS_PIN_KEY)?
            .filter(|pin| Self::is_valid_format(pin))
            .unwrap_or_else(|| DEFAULT_KIDS_PIN.to_string()))
    }

    pub fn update(&self, pin: &str) -> StoreResult<()> {
        if !Self::is_valid_format(pin) {
            return Err(StoreError::Invalid("PIN must be exactly 4 digits".to_string()));
        }
        self.store.set(KIDS_PIN_KEY, pin)
    }

    pub fn verify(&self, attempt: &str) -> StoreResult<bool> {
        Ok(self.current()? == attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    #[test]
    fn test_credentials_round_trip() {
        let creds = CredentialStore::new(MemoryStore::handle());
        assert_eq!(creds.load().unwrap(), None);

        creds.save("user", "pass").unwrap();
        let loaded = creds.load().unwrap().unwrap();
        assert_eq!(loaded.username, "user");
        assert_eq!(loaded.password, "pass");

        creds.clear().unwrap();
        assert_eq!(creds.load().unwrap(), None);
    }

    #[test]
    fn test_credentials_wire_shape() {
        let store = MemoryStore::handle();
        CredentialStore::new(store.clone()).save("a", "b").unwrap();
        assert_eq!(
            store.get(AUTH_KEY).unwrap().as_deref(),
            Some(r#"{"u":"a","p":"b"}"#)
        );
    }

    #[test]
    fn test_kids_pin_default_and_update() {
        let pin = KidsPin::new(MemoryStore::handle());
        assert_eq!(pin.current().unwrap(), DEFAULT_KIDS_PIN);
        assert!(pin.verify("1234").unwrap());

        pin.update("0007").unwrap();
        assert!(pin.verify("0007").unwrap());
        assert!(!pin.verify("1234").unwrap());
    }

    #[test]
    fn test_kids_pin_rejects_malformed() {
        let pin = KidsPin::new(MemoryStore::handle());
        for bad in ["123", "12345", "12a4", "", " 1234"] {
            assert!(pin.update(bad).is_err(), "accepted {:?}", bad);
        }
        assert_eq!(pin.current().unwrap(), DEFAULT_KIDS_PIN);
    }
}
