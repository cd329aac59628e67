//! Registration records and their in-memory store.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inline form error when a phone number was already registered.
pub const PHONE_TAKEN: &str = "Ce numéro est déjà enregistré.";

/// Submitted registration form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    /// Registrant name.
    #[serde(default)]
    pub name: String,
    /// Registrant phone number.
    #[serde(default)]
    pub phone: String,
}

/// A completed registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registrant {
    /// Registrant name, trimmed.
    pub name: String,
    /// Registrant phone number, trimmed.
    pub phone: String,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
}

/// Thread-safe store for registrants.
#[derive(Debug, Clone, Default)]
pub struct RegistrationStore {
    inner: Arc<RwLock<Vec<Registrant>>>,
}

impl RegistrationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration.
    ///
    /// Fields are assumed valid; only uniqueness is checked here. A phone
    /// number that is already registered is rejected with an inline error.
    pub fn register(&self, name: &str, phone: &str) -> Result<Registrant, &'static str> {
        let name = name.trim();
        let phone = phone.trim();

        let mut guard = self.inner.write().unwrap();
        if guard.iter().any(|r| r.phone == phone) {
            return Err(PHONE_TAKEN);
        }
        let registrant = Registrant {
            name: name.to_string(),
            phone: phone.to_string(),
            registered_at: Utc::now(),
        };
        guard.push(registrant.clone());
        Ok(registrant)
    }

    /// Number of registrants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check if nobody registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_rejects_duplicate_phone() {
        let store = RegistrationStore::new();
        assert!(store.is_empty());

        let first = store.register("Awa Traoré", "+226 5614 1234").unwrap();
        assert_eq!(first.name, "Awa Traoré");
        assert_eq!(store.len(), 1);

        assert_eq!(
            store.register("Mariam Kaboré", "+226 5614 1234").unwrap_err(),
            PHONE_TAKEN
        );
        assert_eq!(store.len(), 1);

        assert!(store.register("Mariam Kaboré", "+226 7000 0001").is_ok());
        assert_eq!(store.len(), 2);
    }
}
