//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! folio-cli admin create -u jane
//! folio-cli admin set-password -u jane -p 'correct horse battery staple'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_PASSWORD` - Password to use instead of `-p`

use rand::Rng;
use rand::distr::Alphanumeric;

use folio_server::services::auth::AuthService;

use super::{CliError, connect};

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 24;

/// Create a new admin account.
///
/// # Errors
///
/// Returns `CliError::Auth` if the username is invalid or taken, or the
/// password is too short.
pub async fn create(username: &str, password: Option<String>) -> Result<i32, CliError> {
    let pool = connect().await?;
    let (password, generated) = password_or_generated(password);

    let user = AuthService::new(&pool).create_admin(username, &password).await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );
    if generated {
        print_generated(&password);
    }

    Ok(user.id.as_i32())
}

/// Replace an admin's password.
///
/// # Errors
///
/// Returns `CliError::Auth` if the admin does not exist or the password is
/// too short.
pub async fn set_password(username: &str, password: Option<String>) -> Result<(), CliError> {
    let pool = connect().await?;
    let (password, generated) = password_or_generated(password);

    AuthService::new(&pool).reset_password(username, &password).await?;

    tracing::info!("Password updated for {username}");
    if generated {
        print_generated(&password);
    }
    Ok(())
}

fn password_or_generated(password: Option<String>) -> (String, bool) {
    match password.filter(|p| !p.is_empty()) {
        Some(password) => (password, false),
        None => (generate_password(), true),
    }
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

#[allow(clippy::print_stdout)]
fn print_generated(password: &str) {
    println!("Generated password (shown once): {password}");
}
