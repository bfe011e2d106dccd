//! Mock login against the bundled user list.
//!
//! Credentials are compared as plain strings. This is a stand-in for a real
//! identity provider and offers no security whatsoever.
use thiserror::Error;

use crate::repository::{LoadError, Repository, SessionStore};
use crate::user::SessionUser;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("stored session is unreadable: {0}")]
    CorruptSession(#[source] serde_json::Error),
    #[error("session store failed: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AuthError {
    fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }
}

/// Check credentials and remember the user in `store`.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] for unknown credentials or a
/// banned account, and a load or store error if a collaborator fails.
pub fn login<R, S>(repo: &R, store: &S, email: &str, password: &str) -> Result<SessionUser, AuthError>
where
    R: Repository + ?Sized,
    S: SessionStore + ?Sized,
{
    let users = repo.list_users().inspect_err(|err| {
        log::error!("login error: {err}");
    })?;
    let Some(user) = users
        .into_iter()
        .find(|user| user.email == email && user.password == password)
    else {
        log::debug!("no account matches {email}");
        return Err(AuthError::InvalidCredentials);
    };
    if user.banned {
        log::debug!("refusing banned account {}", user.uid);
        return Err(AuthError::InvalidCredentials);
    }

    let session = SessionUser::from(user);
    let record = serde_json::to_string(&session).map_err(AuthError::CorruptSession)?;
    store.write(&record).map_err(AuthError::store)?;
    log::debug!("logged in {}", session.uid);
    Ok(session)
}

/// Forget the logged-in user.
///
/// # Errors
///
/// Returns an error if the store cannot be cleared.
pub fn logout<S>(store: &S) -> Result<(), AuthError>
where
    S: SessionStore + ?Sized,
{
    store.clear().map_err(AuthError::store)
}

/// Decode the logged-in user, if any.
///
/// # Errors
///
/// Returns an error if the store cannot be read or holds a malformed record.
pub fn current_user<S>(store: &S) -> Result<Option<SessionUser>, AuthError>
where
    S: SessionStore + ?Sized,
{
    let Some(record) = store.read().map_err(AuthError::store)? else {
        return Ok(None);
    };
    serde_json::from_str(&record)
        .map(Some)
        .map_err(AuthError::CorruptSession)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CampusData;
    use crate::repository::{MemorySessionStore, StaticRepository};

    fn repo_with_banned_user() -> StaticRepository {
        let mut data = CampusData::load_from_static();
        data.users[1].banned = true;
        StaticRepository::new(data)
    }

    #[test]
    fn login_stores_session_without_password() {
        let repo = StaticRepository::bundled();
        let store = MemorySessionStore::new();
        let user = login(&repo, &store, "aditi@usf.edu", "aditi123").unwrap();
        assert_eq!(user.uid, "user_001");

        let record = store.read().unwrap().unwrap();
        assert!(!record.contains("aditi123"));
        assert_eq!(current_user(&store).unwrap(), Some(user));

        logout(&store).unwrap();
        assert_eq!(current_user(&store).unwrap(), None);
    }

    #[test]
    fn wrong_password_and_banned_accounts_fail() {
        let repo = repo_with_banned_user();
        let store = MemorySessionStore::new();
        assert!(matches!(
            login(&repo, &store, "aditi@usf.edu", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&repo, &store, "riya@usf.edu", "riya123"),
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn corrupt_record_is_reported() {
        let store = MemorySessionStore::new();
        store.write("not json").unwrap();
        assert!(matches!(
            current_user(&store),
            Err(AuthError::CorruptSession(_))
        ));
    }
}
