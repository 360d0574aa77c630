//! Local account store and session pointer.
//!
//! This is a convenience credential store, not a security primitive: the
//! password hash exists so plaintext never hits disk, nothing more. The
//! word/sync/drill core only depends on the `IdentityProvider` seam; the
//! rest of this module is the application-level context that fills it in,
//! with subscribe/notify instead of ambient global state.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::store::{StorageBackend, StorageError};

const SESSION_KEY: &str = "local_user";
const ACCOUNTS_KEY: &str = "registered_users";
const MIN_PASSWORD_LEN: usize = 6;

/// The one identity accessor the core consumes.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("wrong email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredCredentials {
    id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

type AuthListener = Box<dyn Fn(Option<&UserAccount>) + Send>;

pub struct AuthContext {
    backend: Arc<dyn StorageBackend>,
    listeners: Mutex<Vec<AuthListener>>,
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    let ok = !local.is_empty()
        && !domain.is_empty()
        && !local.chars().any(|c| c.is_whitespace() || c == '@')
        && !domain.chars().any(|c| c.is_whitespace() || c == '@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if ok { Ok(()) } else { Err(AuthError::InvalidEmail) }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

fn hash_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl AuthContext {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Called with the current user immediately, then on every auth change.
    pub fn subscribe(&self, listener: AuthListener) {
        listener(self.current_user().as_ref());
        self.listeners.lock().unwrap().push(listener);
    }

    fn notify(&self, user: Option<&UserAccount>) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener(user);
        }
    }

    pub fn current_user(&self) -> Option<UserAccount> {
        match self.backend.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("unreadable session entry: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("failed to read session: {e}");
                None
            }
        }
    }

    fn load_accounts(&self) -> Result<Vec<StoredCredentials>, StorageError> {
        match self.backend.get(ACCOUNTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_accounts(&self, accounts: &[StoredCredentials]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(accounts)?;
        self.backend.set(ACCOUNTS_KEY, &raw)
    }

    fn open_session(&self, creds: &StoredCredentials) -> Result<UserAccount, AuthError> {
        let name = creds
            .email
            .split('@')
            .next()
            .unwrap_or(&creds.email)
            .to_string();
        let user = UserAccount {
            id: creds.id.clone(),
            email: creds.email.clone(),
            name,
        };
        let raw = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.backend.set(SESSION_KEY, &raw)?;
        self.notify(Some(&user));
        Ok(user)
    }

    pub fn register(&self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        validate_email(email)?;
        validate_password(password)?;
        let email = email.trim().to_lowercase();

        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::EmailTaken);
        }

        let creds = StoredCredentials {
            id: fresh_user_id(),
            email: email.clone(),
            password_hash: hash_password(&email, password),
            created_at: Utc::now(),
        };
        accounts.push(creds.clone());
        self.save_accounts(&accounts)?;
        self.open_session(&creds)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        let email = email.trim().to_lowercase();
        let accounts = self.load_accounts()?;
        let creds = accounts
            .iter()
            .find(|a| a.email == email && a.password_hash == hash_password(&email, password))
            .ok_or(AuthError::InvalidCredentials)?;
        self.open_session(creds)
    }

    pub fn logout(&self) {
        if let Err(e) = self.backend.remove(SESSION_KEY) {
            log::warn!("failed to clear session: {e}");
        }
        self.notify(None);
    }
}

impl IdentityProvider for AuthContext {
    fn current_user_id(&self) -> Option<String> {
        self.current_user().map(|u| u.id)
    }
}

fn fresh_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    format!("user_{}_{}", Utc::now().timestamp_millis(), suffix)
}
