use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        error::AuthError,
        password::{dummy_hash, hash_password_blocking, verify_password_blocking},
        repo_types::User,
    },
    storage::UserStore,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration, login and listing over a [`UserStore`].
///
/// Mutations go through `write_lock`, so two registrations in the same
/// process cannot both pass the uniqueness check. Reads never take it.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    write_lock: Arc<Mutex<()>>,
}

struct NewUser {
    username: String,
    email: String,
    password: String,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// Identity fields are compared and stored without surrounding whitespace.
fn identity(field: Option<String>) -> Option<String> {
    non_empty(field.map(|v| v.trim().to_string()))
}

fn validate_registration(req: RegisterRequest) -> Result<NewUser, AuthError> {
    let username = identity(req.username);
    let email = identity(req.email);
    let password = non_empty(req.password);

    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(AuthError::MissingFields);
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(NewUser {
        username,
        email,
        password,
    })
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<PublicUser, AuthError> {
        let new = validate_registration(req).map_err(|e| {
            warn!(error = %e, "registration rejected");
            e
        })?;

        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load().await?;

        if users.iter().any(|u| u.conflicts_with(&new.username, &new.email)) {
            warn!(username = %new.username, email = %new.email, "username or email already registered");
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = hash_password_blocking(new.password)
            .await
            .map_err(AuthError::Hashing)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            email: new.email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        self.store.save(&users).await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user.into())
    }

    pub async fn login(&self, req: LoginRequest) -> Result<PublicUser, AuthError> {
        let identifier = identity(req.username);
        let password = non_empty(req.password);
        let (Some(identifier), Some(password)) = (identifier, password) else {
            warn!("login without credentials");
            return Err(AuthError::MissingCredentials);
        };

        let users = self.store.load().await?;
        let found = users.into_iter().find(|u| u.matches_identifier(&identifier));

        let Some(user) = found else {
            // Burn one verification so a miss is not faster than a wrong password.
            let dummy = dummy_hash().map_err(AuthError::Hashing)?.to_string();
            let _ = verify_password_blocking(password, dummy).await;
            warn!(identifier = %identifier, "login unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let ok = verify_password_blocking(password, user.password_hash.clone())
            .await
            .map_err(AuthError::Hashing)?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, username = %user.username, "user logged in");
        Ok(user.into())
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, AuthError> {
        let users = self.store.load().await?;
        debug!(count = users.len(), "listing users");
        Ok(users.into_iter().map(PublicUser::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AuthService::new(store.clone()), store)
    }

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let (svc, store) = service();
        let user = svc
            .register(register_req("ana", "ana@x.com", "secret1"))
            .await
            .expect("register");
        assert_eq!(user.username, "ana");
        assert_eq!(user.email, "ana@x.com");

        let stored = store.load().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, user.id);
        assert_ne!(stored[0].password_hash, "secret1");
        assert!(!stored[0].password_hash.contains("secret1"));
    }

    #[tokio::test]
    async fn register_trims_identity_fields() {
        let (svc, _) = service();
        let user = svc
            .register(register_req("  ana ", " ana@x.com\n", "secret1"))
            .await
            .unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(user.email, "ana@x.com");
    }

    #[tokio::test]
    async fn login_trims_identifier() {
        let (svc, _) = service();
        let created = svc
            .register(register_req(" ana ", "ana@x.com ", "secret1"))
            .await
            .unwrap();

        let by_name = svc.login(login_req(" ana ", "secret1")).await.unwrap();
        let by_email = svc.login(login_req("ana@x.com ", "secret1")).await.unwrap();
        assert_eq!(by_name, created);
        assert_eq!(by_email, created);

        // the password is taken verbatim
        let err = svc.login(login_req("ana", " secret1 ")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn blank_login_identifier_is_missing() {
        let (svc, _) = service();
        let err = svc.login(login_req("   ", "secret1")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn register_requires_every_field() {
        let (svc, store) = service();
        let cases = [
            RegisterRequest {
                username: None,
                ..register_req("", "ana@x.com", "secret1")
            },
            register_req("ana", "", "secret1"),
            register_req("ana", "ana@x.com", ""),
            register_req("   ", "ana@x.com", "secret1"),
        ];
        for req in cases {
            let err = svc.register(req).await.unwrap_err();
            assert!(matches!(err, AuthError::MissingFields), "got {err:?}");
        }
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_checked_before_password_length() {
        let (svc, _) = service();
        let err = svc.register(register_req("", "ana@x.com", "123")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
    }

    #[tokio::test]
    async fn short_password_rejected_without_mutation() {
        let (svc, store) = service();
        let err = svc
            .register(register_req("ana", "ana@x.com", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordTooShort { min: 6 }));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn password_length_counts_characters() {
        let (svc, _) = service();
        svc.register(register_req("ana", "ana@x.com", "ññññññ"))
            .await
            .expect("six multibyte chars pass");
        // five characters, ten bytes
        let err = svc
            .register(register_req("bob", "bob@x.com", "ñññññ"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordTooShort { .. }));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let (svc, store) = service();
        svc.register(register_req("ana", "ana@x.com", "secret1"))
            .await
            .unwrap();

        let same_name = svc
            .register(register_req("ana", "other@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(same_name, AuthError::AlreadyRegistered));

        let same_email = svc
            .register(register_req("other", "ana@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(same_email, AuthError::AlreadyRegistered));

        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_registrations_admit_one() {
        let (svc, store) = service();
        let a = svc.clone();
        let b = svc.clone();
        let (ra, rb) = tokio::join!(
            a.register(register_req("ana", "ana@x.com", "secret1")),
            b.register(register_req("ana", "ana2@x.com", "secret1")),
        );
        assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_by_username_or_email() {
        let (svc, _) = service();
        let created = svc
            .register(register_req("ana", "ana@x.com", "secret1"))
            .await
            .unwrap();

        let by_name = svc.login(login_req("ana", "secret1")).await.unwrap();
        let by_email = svc.login(login_req("ana@x.com", "secret1")).await.unwrap();
        assert_eq!(by_name, created);
        assert_eq!(by_email, created);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let (svc, _) = service();
        svc.register(register_req("ana", "ana@x.com", "secret1"))
            .await
            .unwrap();

        let wrong = svc.login(login_req("ana", "wrong")).await.unwrap_err();
        let unknown = svc.login(login_req("nobody", "secret1")).await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (svc, _) = service();
        let err = svc
            .login(LoginRequest {
                username: Some("ana".into()),
                password: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn listing_is_sanitized_and_stable() {
        let (svc, _) = service();
        svc.register(register_req("ana", "ana@x.com", "secret1"))
            .await
            .unwrap();
        svc.register(register_req("bob", "bob@x.com", "secret2"))
            .await
            .unwrap();

        let first = svc.list_users().await.unwrap();
        let second = svc.list_users().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
            ["ana", "bob"]
        );
    }
}
