use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Session, User};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub struct Signup<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Registers a user. The confirmation check happens before anything is
/// hashed or written.
pub fn signup(conn: &Connection, input: &Signup<'_>) -> Result<i64, AppError> {
    if input.password != input.confirm_password {
        return Err(AppError::Validation("Passwords do not match".into()));
    }

    if queries::get_user_by_email(conn, input.email)?.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let hash = hash_password(input.password)?;
    let user_id = queries::create_user(conn, input.name, input.email, &hash).map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email is already registered".into())
        } else {
            e.into()
        }
    })?;

    tracing::info!(user_id, email = %input.email, "user registered");
    Ok(user_id)
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Checks credentials and opens a session. Unknown email is NotFound, a wrong
/// password is Unauthorized.
pub fn login(
    conn: &Connection,
    email: &str,
    password: &str,
    ttl_hours: i64,
) -> Result<(User, Session), AppError> {
    let user = queries::get_user_by_email(conn, email)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!(email = %email, "login rejected: wrong password");
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let session = issue_session(conn, user.id, ttl_hours)?;
    tracing::info!(user_id = user.id, "login successful");
    Ok((user, session))
}

pub fn issue_session(conn: &Connection, user_id: i64, ttl_hours: i64) -> Result<Session, AppError> {
    let expired = queries::expire_old_sessions(conn)?;
    if expired > 0 {
        tracing::debug!(expired, "purged expired sessions");
    }

    let now = Utc::now().naive_utc();
    let session = Session {
        token: uuid::Uuid::new_v4().to_string(),
        user_id,
        created_at: now,
        expires_at: now + Duration::hours(ttl_hours),
    };
    queries::create_session(conn, &session)?;
    Ok(session)
}

/// Looks up a bearer token. Expired sessions are deleted and treated as absent.
pub fn resolve_session(conn: &Connection, token: &str) -> Result<Option<Session>, AppError> {
    let Some(session) = queries::get_session(conn, token)? else {
        return Ok(None);
    };

    if session.is_expired(Utc::now().naive_utc()) {
        queries::delete_session(conn, token)?;
        return Ok(None);
    }

    Ok(Some(session))
}

pub fn logout(conn: &Connection, session: &Session) -> Result<(), AppError> {
    queries::delete_session(conn, &session.token)?;
    tracing::info!(user_id = session.user_id, "logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn signup_input<'a>(email: &'a str, password: &'a str, confirm: &'a str) -> Signup<'a> {
        Signup {
            name: "Sam Okafor",
            email,
            password,
            confirm_password: confirm,
        }
    }

    #[test]
    fn hash_is_salted_and_verifiable() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("hunter22", &a).unwrap());
        assert!(!verify_password("hunter23", &a).unwrap());
    }

    #[test]
    fn mismatched_confirmation_writes_nothing() {
        let conn = setup_db();
        let err = signup(&conn, &signup_input("sam@example.com", "abc", "abd")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(queries::get_user_by_email(&conn, "sam@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn duplicate_email_conflicts() {
        let conn = setup_db();
        signup(&conn, &signup_input("sam@example.com", "pw", "pw")).unwrap();
        let err = signup(&conn, &signup_input("sam@example.com", "pw", "pw")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn login_outcomes() {
        let conn = setup_db();
        signup(&conn, &signup_input("sam@example.com", "pw", "pw")).unwrap();

        let (user, session) = login(&conn, "sam@example.com", "pw", 24).unwrap();
        assert_eq!(session.user_id, user.id);

        let err = login(&conn, "sam@example.com", "nope", 24).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = login(&conn, "ghost@example.com", "pw", 24).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn sessions_resolve_until_logout() {
        let conn = setup_db();
        let user_id = signup(&conn, &signup_input("sam@example.com", "pw", "pw")).unwrap();
        let session = issue_session(&conn, user_id, 1).unwrap();

        let resolved = resolve_session(&conn, &session.token).unwrap().unwrap();
        assert_eq!(resolved.user_id, user_id);

        logout(&conn, &session).unwrap();
        assert!(resolve_session(&conn, &session.token).unwrap().is_none());
    }

    #[test]
    fn expired_session_is_dropped() {
        let conn = setup_db();
        let user_id = signup(&conn, &signup_input("sam@example.com", "pw", "pw")).unwrap();
        let now = Utc::now().naive_utc();
        let stale = Session {
            token: "stale-token".to_string(),
            user_id,
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::minutes(1),
        };
        queries::create_session(&conn, &stale).unwrap();

        assert!(resolve_session(&conn, "stale-token").unwrap().is_none());
        assert!(queries::get_session(&conn, "stale-token").unwrap().is_none());
    }
}
