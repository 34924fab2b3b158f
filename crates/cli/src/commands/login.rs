//! One-shot credential check.
//!
//! # Usage
//!
//! ```bash
//! pocket-shop login -e letrongthien@gmail.com -p 1
//! ```

use std::io::{self, Write};

use pocket_shop_core::auth::{AuthError, AuthGate};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::catalog::{self, CatalogError};
use crate::config::ShopConfig;

/// Errors that can occur during a credential check.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Directory(#[from] CatalogError),

    #[error("Login rejected: {0}")]
    Rejected(#[from] AuthError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Check an email/password pair against the configured directory.
///
/// # Errors
///
/// Returns `LoginError::Rejected` when the pair is incomplete or unknown.
pub async fn check(config: &ShopConfig, email: &str, password: String) -> Result<(), LoginError> {
    let password = SecretString::from(password);
    let directory = catalog::load_directory(config.users_path.as_deref()).await?;
    let gate = AuthGate::new(directory);

    gate.authenticate(email, password.expose_secret())?;

    writeln!(io::stdout(), "credentials accepted for {email}")?;
    Ok(())
}
