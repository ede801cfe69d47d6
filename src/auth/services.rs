use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::{
    auth::{
        dto::{RegisterRequest, SignInRequest},
        repo::RepoError,
        repo_types::{NewAccount, UserRecord},
    },
    error::AppError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Blank strings count as missing.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// Passwords are taken verbatim; only an empty one is missing.
fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

struct Registration {
    name: String,
    email: String,
    password: String,
}

fn validate_registration(req: RegisterRequest) -> Result<Registration, AppError> {
    let name = present(req.name).ok_or_else(|| AppError::validation("Name is required."))?;
    let email = present(req.email)
        .map(|e| normalize_email(&e))
        .ok_or_else(|| AppError::validation("Email is required."))?;
    if !is_valid_email(&email) {
        return Err(AppError::validation("Email is invalid."));
    }
    let password =
        non_empty(req.password).ok_or_else(|| AppError::validation("Password is required."))?;

    Ok(Registration {
        name: name.trim().to_string(),
        email,
        password,
    })
}

async fn hash_blocking(st: &AppState, password: String) -> Result<String, AppError> {
    let hasher = st.hasher.clone();
    let hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
        .await
        .context("join hash task")??;
    Ok(hash)
}

/// Validates input, hashes the password and creates both rows in one transaction.
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<UserRecord, AppError> {
    let reg = validate_registration(req)?;
    let password_hash = hash_blocking(st, reg.password).await?;

    let account = NewAccount {
        name: reg.name,
        email: reg.email,
        password_hash,
        joined: OffsetDateTime::now_utc(),
    };

    match st.store.create_account(account).await {
        Ok(user) => {
            info!(user_id = user.id, email = %user.email, "user registered");
            Ok(user)
        }
        Err(RepoError::Duplicate) => {
            warn!("email already registered");
            Err(AppError::DuplicateCredential)
        }
        Err(RepoError::Database(e)) => {
            error!(error = %e, "create account failed");
            Err(AppError::DuplicateCredential)
        }
    }
}

/// Unknown email and wrong password both yield `InvalidCredentials`.
pub async fn sign_in(st: &AppState, req: SignInRequest) -> Result<UserRecord, AppError> {
    let (Some(email), Some(password)) = (present(req.email), non_empty(req.password)) else {
        return Err(AppError::MissingCredentials);
    };
    let email = normalize_email(&email);

    let stored = st.store.find_password_hash(&email).await.map_err(|e| {
        error!(error = %e, "find login failed");
        AppError::InvalidCredentials
    })?;

    let hasher = st.hasher.clone();
    let matched = tokio::task::spawn_blocking(move || match stored {
        Some(hash) => hasher.verify_password(&password, &hash),
        None => {
            hasher.burn_verification(&password);
            Ok(false)
        }
    })
    .await
    .context("join verify task")??;

    if !matched {
        debug!("sign-in rejected");
        return Err(AppError::InvalidCredentials);
    }

    match st.store.find_user_by_email(&email).await {
        Ok(Some(user)) => {
            info!(user_id = user.id, "user signed in");
            Ok(user)
        }
        Ok(None) => {
            error!(email = %email, "login row has no matching user row");
            Err(AppError::InvalidCredentials)
        }
        Err(e) => {
            error!(error = %e, "find user failed");
            Err(AppError::InvalidCredentials)
        }
    }
}
