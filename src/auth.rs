use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::config::Config;

/// An authenticated session issued at login.
///
/// Replaces an ambient "logged in" flag: every guarded request must present
/// a token that maps to an unexpired session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub expires_at: SystemTime,
}

lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, Session>> = RwLock::new(HashMap::new());
}

const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Checks submitted credentials against the configured account.
///
/// The password is verified against the Argon2 PHC hash from the
/// configuration; no plaintext credential lives in the binary.
pub fn verify_login(config: &Config, username: &str, password: &str) -> Result<bool, String> {
    if username != config.admin_user {
        return Ok(false);
    }
    verify_password(password, &config.admin_password_hash)
}

/// Hashes a password with Argon2id, producing a PHC string suitable for
/// `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    match argon2.hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(_) => Err("Password hashing failed".to_string()),
    }
}

fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(_) => return Err("Invalid password hash format".to_string()),
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false), // Password didn't match
    }
}

/// Creates a new session for an authenticated user and returns its token.
pub fn create_session(username: &str) -> String {
    let session_id = Uuid::new_v4().to_string();
    let expires_at = SystemTime::now() + Duration::from_secs(SESSION_DURATION);

    let session = Session {
        user_id: username.to_string(),
        expires_at,
    };

    let mut sessions = SESSIONS.write().unwrap();
    sessions.insert(session_id.clone(), session);

    session_id
}

/// Returns the username behind a token when the session is still valid.
pub fn validate_session(session_id: &str) -> Option<String> {
    let sessions = SESSIONS.read().unwrap();

    if let Some(session) = sessions.get(session_id) {
        if session.expires_at > SystemTime::now() {
            return Some(session.user_id.clone());
        }
    }

    None
}

/// Drops a session at logout.
pub fn end_session(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap();
    sessions.remove(session_id);
}

/// Authentication middleware guarding all functional routes.
///
/// A request without a valid session cookie is redirected to the login
/// page; a valid one gets the username inserted into request extensions.
pub async fn require_auth(
    jar: CookieJar,
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Some(username) = validate_session(session_cookie.value()) {
            request.extensions_mut().insert(username);
            return next.run(request).await;
        }
    }

    Redirect::to("/login").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_with_hash(hash: String) -> Config {
        Config {
            addr: "127.0.0.1:0".to_string(),
            sheet_source: "sales.csv".to_string(),
            data_dir: PathBuf::from("database"),
            reports_dir: PathBuf::from("reports"),
            admin_user: "admin".to_string(),
            admin_password_hash: hash,
            smtp: None,
        }
    }

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn login_checks_username_and_password() {
        let config = config_with_hash(hash_password("hunter2").unwrap());

        assert!(verify_login(&config, "admin", "hunter2").unwrap());
        assert!(!verify_login(&config, "admin", "hunter3").unwrap());
        assert!(!verify_login(&config, "intruder", "hunter2").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let config = config_with_hash("not-a-phc-string".to_string());
        assert!(verify_login(&config, "admin", "anything").is_err());
    }

    #[test]
    fn sessions_validate_until_ended() {
        let token = create_session("admin");
        assert_eq!(validate_session(&token), Some("admin".to_string()));

        end_session(&token);
        assert_eq!(validate_session(&token), None);
        assert_eq!(validate_session("unknown-token"), None);
    }
}
