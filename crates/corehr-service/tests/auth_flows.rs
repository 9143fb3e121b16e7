//! Service-level tests for the session and recovery flows, run against
//! the in-memory credential store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use corehr_auth::password::{PasswordHasher, PasswordValidator};
use corehr_auth::token::TokenService;
use corehr_auth::twofactor::TwoFactorService;
use corehr_core::config::auth::AuthConfig;
use corehr_core::error::ErrorKind;
use corehr_core::result::AppResult;
use corehr_core::traits::{CredentialStore, Notifier};
use corehr_database::MemoryCredentialStore;
use corehr_entity::user::{NewUser, UserRole};
use corehr_service::auth::{AuthService, PasswordRecoveryService};

/// Notifier that records every delivery instead of sending it.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_password_reset(&self, to: &str, name: &str, link: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), name.to_string(), link.to_string()));
        Ok(())
    }
}

struct Fixture {
    store: Arc<MemoryCredentialStore>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    auth: AuthService,
    recovery: PasswordRecoveryService,
    notifier: Arc<RecordingNotifier>,
}

fn test_config() -> AuthConfig {
    AuthConfig {
        // Small Argon2 cost keeps the suite fast.
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..AuthConfig::default()
    }
}

fn fixture() -> Fixture {
    let config = test_config();
    let store = Arc::new(MemoryCredentialStore::new());
    let tokens = Arc::new(TokenService::new(&config));
    let hasher = Arc::new(PasswordHasher::new(&config).unwrap());
    let validator = PasswordValidator::new(&config);
    let two_factor = Arc::new(TwoFactorService::new(
        &config,
        Arc::clone(&store) as Arc<dyn CredentialStore>,
    ));
    let notifier = Arc::new(RecordingNotifier::default());

    let auth = AuthService::new(
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        Arc::clone(&tokens),
        Arc::clone(&hasher),
        validator.clone(),
        Arc::clone(&two_factor),
    );
    let recovery = PasswordRecoveryService::new(
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        Arc::clone(&tokens),
        Arc::clone(&hasher),
        validator,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        "http://localhost:3000".to_string(),
    );

    Fixture {
        store,
        tokens,
        hasher,
        auth,
        recovery,
        notifier,
    }
}

impl Fixture {
    async fn create_user(&self, email: &str, password: &str, role: UserRole) -> Uuid {
        let user = self
            .store
            .create(&NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: self.hasher.hash(password).unwrap(),
                role,
                is_active: true,
                employee_id: None,
            })
            .await
            .unwrap();
        user.id
    }
}

#[tokio::test]
async fn test_login_returns_tokens_with_stored_role() {
    let fx = fixture();
    fx.create_user("admin@x.com", "admin123", UserRole::Admin).await;

    let outcome = fx.auth.login("admin@x.com", "admin123").await.unwrap();

    assert!(!outcome.requires_two_factor);
    let tokens = outcome.tokens.expect("tokens issued");

    let claims = fx.tokens.verify_access_token(&tokens.access_token).unwrap();
    assert_eq!(claims.role, UserRole::Admin);
    assert_eq!(claims.email, "admin@x.com");

    // The refresh token is tracked server-side.
    assert!(fx
        .store
        .find_by_refresh_token(&tokens.refresh_token)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_login_failures_share_error_shape() {
    let fx = fixture();
    fx.create_user("known@x.com", "Correct1!", UserRole::Employee).await;

    let wrong_password = fx.auth.login("known@x.com", "Wrong1!").await.unwrap_err();
    let unknown_email = fx.auth.login("nobody@x.com", "Wrong1!").await.unwrap_err();

    // No account-existence oracle: same kind, same message.
    assert_eq!(wrong_password.kind, ErrorKind::Authentication);
    assert_eq!(unknown_email.kind, ErrorKind::Authentication);
    assert_eq!(wrong_password.message, unknown_email.message);
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let fx = fixture();
    let user_id = fx.create_user("gone@x.com", "Correct1!", UserRole::Employee).await;
    fx.store
        .update(
            user_id,
            &corehr_entity::user::UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = fx.auth.login("gone@x.com", "Correct1!").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_refresh_rotation_is_single_use() {
    let fx = fixture();
    fx.create_user("rotate@x.com", "Correct1!", UserRole::Employee).await;

    let outcome = fx.auth.login("rotate@x.com", "Correct1!").await.unwrap();
    let r1 = outcome.tokens.unwrap().refresh_token;

    let pair = fx.auth.refresh(&r1).await.unwrap();
    let r2 = pair.refresh_token.clone();
    assert_ne!(r1, r2);

    // The second use of r1 is reuse: rejected, nothing issued, and the
    // user's outstanding sessions are revoked.
    let err = fx.auth.refresh(&r1).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(fx.store.refresh_tokens().is_empty());

    // r2 was revoked by the reuse response.
    let err = fx.auth.refresh(&r2).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_logout_then_refresh_fails() {
    let fx = fixture();
    fx.create_user("logout@x.com", "Correct1!", UserRole::Employee).await;

    let outcome = fx.auth.login("logout@x.com", "Correct1!").await.unwrap();
    let refresh_token = outcome.tokens.unwrap().refresh_token;

    fx.auth.logout(&refresh_token).await.unwrap();
    // Logout is idempotent.
    fx.auth.logout(&refresh_token).await.unwrap();

    let err = fx.auth.refresh(&refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_register_then_login() {
    let fx = fixture();

    let (user, tokens) = fx
        .auth
        .register("New Person", "new@x.com", "Fresh123!")
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Employee);
    assert!(!tokens.access_token.is_empty());

    let outcome = fx.auth.login("new@x.com", "Fresh123!").await.unwrap();
    assert!(outcome.tokens.is_some());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let fx = fixture();
    fx.create_user("taken@x.com", "Correct1!", UserRole::Employee).await;

    let err = fx
        .auth
        .register("Someone", "taken@x.com", "Fresh123!")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // No second row was created.
    let page = fx
        .store
        .list(&corehr_core::types::pagination::PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let fx = fixture();
    let err = fx
        .auth
        .register("Weak", "weak@x.com", "abc12345")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

mod two_factor {
    use super::*;
    use totp_rs::{Algorithm, Secret, TOTP};

    fn totp_for(secret: &str, email: &str) -> TOTP {
        TOTP::new(
            Algorithm::SHA1,
            6,
            1,
            30,
            Secret::Encoded(secret.to_string()).to_bytes().unwrap(),
            Some("CoreHR".to_string()),
            email.to_string(),
        )
        .unwrap()
    }

    fn now_secs() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[tokio::test]
    async fn test_setup_then_verify_enables_two_factor() {
        let fx = fixture();
        let config = test_config();
        let two_factor = TwoFactorService::new(
            &config,
            Arc::clone(&fx.store) as Arc<dyn CredentialStore>,
        );
        let user_id = fx.create_user("totp@x.com", "Correct1!", UserRole::Employee).await;

        let enrollment = two_factor.setup(user_id).await.unwrap();
        assert!(enrollment.otpauth_url.starts_with("otpauth://totp/"));
        assert!(!enrollment.qr_code.is_empty());

        // Enrollment is not complete until a code is verified.
        let user = fx.store.find_by_id(user_id).await.unwrap().unwrap();
        assert!(!user.two_factor_enabled);
        assert!(user.two_factor_secret.is_some());

        let code = totp_for(&enrollment.secret, "totp@x.com")
            .generate_current()
            .unwrap();
        let outcome = fx.auth.verify_two_factor(user_id, &code).await.unwrap();
        assert!(outcome.verified);
        assert!(outcome.tokens.is_some());

        let user = fx.store.find_by_id(user_id).await.unwrap().unwrap();
        assert!(user.two_factor_enabled);

        // Subsequent logins withhold tokens until the second factor.
        let outcome = fx.auth.login("totp@x.com", "Correct1!").await.unwrap();
        assert!(outcome.requires_two_factor);
        assert!(outcome.tokens.is_none());
    }

    #[tokio::test]
    async fn test_adjacent_step_accepted_distant_step_rejected() {
        let fx = fixture();
        let config = test_config();
        let two_factor = TwoFactorService::new(
            &config,
            Arc::clone(&fx.store) as Arc<dyn CredentialStore>,
        );
        let user_id = fx.create_user("skew@x.com", "Correct1!", UserRole::Employee).await;

        let enrollment = two_factor.setup(user_id).await.unwrap();
        let totp = totp_for(&enrollment.secret, "skew@x.com");

        // One step behind falls inside the ±1 window.
        let previous = totp.generate(now_secs() - 30);
        assert!(two_factor.verify(user_id, &previous).await.unwrap());

        // Four steps behind does not.
        let stale = totp.generate(now_secs() - 120);
        assert!(!two_factor.verify(user_id, &stale).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_without_setup_is_not_configured() {
        let fx = fixture();
        let config = test_config();
        let two_factor = TwoFactorService::new(
            &config,
            Arc::clone(&fx.store) as Arc<dyn CredentialStore>,
        );
        let user_id = fx.create_user("nosetup@x.com", "Correct1!", UserRole::Employee).await;

        let err = two_factor.verify(user_id, "123456").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}

mod recovery {
    use super::*;

    fn token_from_link(link: &str) -> String {
        link.split("token=").nth(1).unwrap().to_string()
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_succeeds_silently() {
        let fx = fixture();

        fx.recovery.forgot_password("nobody@x.com").await.unwrap();

        assert!(fx.notifier.sent().is_empty());
        assert!(fx.store.reset_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_keeps_one_active_token() {
        let fx = fixture();
        fx.create_user("forgot@x.com", "Correct1!", UserRole::Employee).await;

        fx.recovery.forgot_password("forgot@x.com").await.unwrap();
        fx.recovery.forgot_password("forgot@x.com").await.unwrap();

        assert_eq!(fx.notifier.sent().len(), 2);
        // The second request invalidated the first token.
        assert_eq!(fx.store.reset_tokens().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_password_consumes_token() {
        let fx = fixture();
        fx.create_user("reset@x.com", "Correct1!", UserRole::Employee).await;

        fx.recovery.forgot_password("reset@x.com").await.unwrap();
        let link = fx.notifier.sent()[0].2.clone();
        let token = token_from_link(&link);

        // Weak replacement is rejected before anything is consumed.
        let err = fx.recovery.reset_password(&token, "weak").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        fx.recovery.reset_password(&token, "Newpass1!").await.unwrap();

        let outcome = fx.auth.login("reset@x.com", "Newpass1!").await.unwrap();
        assert!(outcome.tokens.is_some());

        // The token is single-use.
        let err = fx
            .recovery
            .reset_password(&token, "Another1!")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_garbage_reset_token_rejected() {
        let fx = fixture();
        let err = fx
            .recovery
            .reset_password("garbage", "Newpass1!")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_change_password_checks_current() {
        let fx = fixture();
        let user_id = fx.create_user("change@x.com", "Current1!", UserRole::Employee).await;

        let err = fx
            .recovery
            .change_password(user_id, "Wrong1!", "Newpass1!")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = fx
            .recovery
            .change_password(user_id, "Current1!", "Current1!")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        fx.recovery
            .change_password(user_id, "Current1!", "Newpass1!")
            .await
            .unwrap();

        let outcome = fx.auth.login("change@x.com", "Newpass1!").await.unwrap();
        assert!(outcome.tokens.is_some());
    }
}
