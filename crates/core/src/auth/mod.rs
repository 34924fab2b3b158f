//! Credential gate.
//!
//! Checks entered credentials against a static, read-only directory that is
//! fixed when the process starts. There is no hashing, lockout or rate
//! limiting: a failed attempt is simply reported and may be retried.

mod error;

pub use error::{AuthError, DirectoryError};

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Seed accounts available when no directory file is configured.
const BUILTIN_USERS: &[(&str, &str)] = &[
    ("letrongthien@gmail.com", "1"),
    ("user2@example.com", "123456789"),
    ("user3@example.com", "123456789"),
    ("user4@example.com", "123456789"),
    ("user5@example.com", "123456789"),
];

/// One email/password pair.
///
/// Implements `Debug` manually to redact the password.
pub struct UserCredential {
    email: String,
    password: SecretString,
}

impl UserCredential {
    /// Create a new credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The email address, exactly as stored.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password.expose_secret() == password
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Wire shape of a directory entry in a JSON credential file.
#[derive(Deserialize)]
struct CredentialRecord {
    email: String,
    password: String,
}

/// Immutable, ordered set of valid credentials.
///
/// Duplicate emails are allowed; lookup takes the first match.
#[derive(Debug, Default)]
pub struct AuthDirectory {
    users: Vec<UserCredential>,
}

impl AuthDirectory {
    /// Create a directory from an ordered list of credentials.
    #[must_use]
    pub const fn new(users: Vec<UserCredential>) -> Self {
        Self { users }
    }

    /// The seed accounts shipped with the app.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_USERS
                .iter()
                .map(|(email, password)| UserCredential::new(*email, *password))
                .collect(),
        )
    }

    /// Load a directory from a JSON array of `{"email", "password"}` objects.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Parse` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let records: Vec<CredentialRecord> = serde_json::from_str(json)?;
        Ok(Self::new(
            records
                .into_iter()
                .map(|r| UserCredential::new(r.email, r.password))
                .collect(),
        ))
    }

    /// Find the first record whose email and password both equal the input.
    ///
    /// Comparison is exact: case-sensitive, no trimming.
    #[must_use]
    pub fn lookup(&self, email: &str, password: &str) -> Option<&UserCredential> {
        self.users.iter().find(|u| u.matches(email, password))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Login gate in front of the Listing screen.
#[derive(Debug)]
pub struct AuthGate {
    directory: AuthDirectory,
}

impl AuthGate {
    /// Create a gate over the given directory.
    #[must_use]
    pub const fn new(directory: AuthDirectory) -> Self {
        Self { directory }
    }

    /// Check entered credentials.
    ///
    /// Blank fields are evaluated, not rejected beforehand: they produce
    /// `IncompleteInput` before the directory is consulted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncompleteInput` if either field is empty.
    /// Returns `AuthError::InvalidCredentials` if no record matches.
    #[instrument(skip(self, password))]
    pub fn authenticate(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            debug!("Login attempted with a blank field");
            return Err(AuthError::IncompleteInput);
        }

        match self.directory.lookup(email, password) {
            Some(user) => {
                info!(email = %user.email(), "Login succeeded");
                Ok(())
            }
            None => {
                warn!("Login rejected: no matching credentials");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(AuthDirectory::builtin())
    }
}
