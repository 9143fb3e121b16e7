//! Integration tests for the authentication HTTP surface.

mod common;

use http::StatusCode;
use serde_json::json;

use corehr_entity::user::UserRole;

#[tokio::test]
async fn test_login_success() {
    let app = common::TestApp::new();
    app.create_user("admin@x.com", "admin123", UserRole::Admin)
        .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "admin@x.com", "password": "admin123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["requires_two_factor"], json!(false));
    assert_eq!(data["user"]["role"], json!("ADMIN"));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = common::TestApp::new();
    app.create_user("known@x.com", "Correct1!", UserRole::Employee)
        .await;

    let wrong_password = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "known@x.com", "password": "nope" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "ghost@x.com", "password": "nope" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let app = common::TestApp::new();
    app.create_user("rotate@x.com", "Correct1!", UserRole::Employee)
        .await;
    let (_, refresh_token) = app.login("rotate@x.com", "Correct1!").await;

    let first = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert!(first.body["data"]["access_token"].is_string());

    let second = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(second.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_refresh_token() {
    let app = common::TestApp::new();
    app.create_user("logout@x.com", "Correct1!", UserRole::Employee)
        .await;
    let (_, refresh_token) = app.login("logout@x.com", "Correct1!").await;

    let response = app
        .request(
            "POST",
            "/auth/logout",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let refreshed = app
        .request(
            "POST",
            "/auth/refresh-token",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = common::TestApp::new();
    app.create_user("me@x.com", "Correct1!", UserRole::Hr).await;

    let anonymous = app.request("GET", "/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let (access_token, _) = app.login("me@x.com", "Correct1!").await;
    let me = app
        .request("GET", "/auth/me", None, Some(&access_token))
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], json!("me@x.com"));
}

#[tokio::test]
async fn test_forgot_password_never_reveals_accounts() {
    let app = common::TestApp::new();
    app.create_user("real@x.com", "Correct1!", UserRole::Employee)
        .await;

    let for_real = app
        .request(
            "POST",
            "/auth/forgot-password",
            Some(json!({ "email": "real@x.com" })),
            None,
        )
        .await;
    let for_ghost = app
        .request(
            "POST",
            "/auth/forgot-password",
            Some(json!({ "email": "ghost@x.com" })),
            None,
        )
        .await;

    assert_eq!(for_real.status, StatusCode::OK);
    assert_eq!(for_ghost.status, StatusCode::OK);
    assert_eq!(for_real.body, for_ghost.body);
}

#[tokio::test]
async fn test_change_password_round_trip() {
    let app = common::TestApp::new();
    app.create_user("change@x.com", "Current1!", UserRole::Employee)
        .await;
    let (access_token, _) = app.login("change@x.com", "Current1!").await;

    let wrong = app
        .request(
            "POST",
            "/auth/change-password",
            Some(json!({ "current_password": "Wrong1!!", "new_password": "Updated1!" })),
            Some(&access_token),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let changed = app
        .request(
            "POST",
            "/auth/change-password",
            Some(json!({ "current_password": "Current1!", "new_password": "Updated1!" })),
            Some(&access_token),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    app.login("change@x.com", "Updated1!").await;
}

#[tokio::test]
async fn test_register_and_duplicate_conflict() {
    let app = common::TestApp::new();

    let created = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "name": "New", "email": "new@x.com", "password": "Fresh123!" })),
            None,
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert!(created.body["data"]["access_token"].is_string());

    let duplicate = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "name": "Again", "email": "new@x.com", "password": "Fresh123!" })),
            None,
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

mod two_factor {
    use super::*;
    use totp_rs::{Algorithm, Secret, TOTP};

    fn code_for(secret: &str, email: &str) -> String {
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
        .generate_current()
        .unwrap()
    }

    #[tokio::test]
    async fn test_setup_then_verify_issues_session() {
        let app = common::TestApp::new();
        let user_id = app
            .create_user("totp@x.com", "Correct1!", UserRole::Employee)
            .await;
        let (access_token, _) = app.login("totp@x.com", "Correct1!").await;

        let setup = app
            .request("POST", "/auth/2fa/setup", None, Some(&access_token))
            .await;
        assert_eq!(setup.status, StatusCode::OK);
        let secret = setup.body["data"]["secret"].as_str().unwrap().to_string();
        assert!(setup.body["data"]["otpauth_url"]
            .as_str()
            .unwrap()
            .starts_with("otpauth://totp/"));

        let verify = app
            .request(
                "POST",
                "/auth/2fa/verify",
                Some(json!({
                    "user_id": user_id,
                    "token": code_for(&secret, "totp@x.com"),
                })),
                None,
            )
            .await;
        assert_eq!(verify.status, StatusCode::OK);
        assert_eq!(verify.body["data"]["verified"], json!(true));
        assert!(verify.body["data"]["access_token"].is_string());

        // Two-factor is now enabled: login withholds tokens.
        let login = app
            .request(
                "POST",
                "/auth/login",
                Some(json!({ "email": "totp@x.com", "password": "Correct1!" })),
                None,
            )
            .await;
        assert_eq!(login.status, StatusCode::OK);
        assert_eq!(login.body["data"]["requires_two_factor"], json!(true));
        assert!(login.body["data"]["access_token"].is_null());
        assert!(login.body["data"]["refresh_token"].is_null());
    }

    #[tokio::test]
    async fn test_wrong_code_is_not_verified() {
        let app = common::TestApp::new();
        let user_id = app
            .create_user("badcode@x.com", "Correct1!", UserRole::Employee)
            .await;
        let (access_token, _) = app.login("badcode@x.com", "Correct1!").await;

        app.request("POST", "/auth/2fa/setup", None, Some(&access_token))
            .await;

        let verify = app
            .request(
                "POST",
                "/auth/2fa/verify",
                Some(json!({ "user_id": user_id, "token": "000000" })),
                None,
            )
            .await;
        assert_eq!(verify.status, StatusCode::OK);
        assert_eq!(verify.body["data"]["verified"], json!(false));
        assert!(verify.body["data"]["access_token"].is_null());
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn test_user_listing_requires_elevated_role() {
        let app = common::TestApp::new();
        app.create_user("worker@x.com", "Correct1!", UserRole::Employee)
            .await;
        app.create_user("people@x.com", "Correct1!", UserRole::Hr)
            .await;

        let (worker_token, _) = app.login("worker@x.com", "Correct1!").await;
        let denied = app
            .request("GET", "/auth/users", None, Some(&worker_token))
            .await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let (hr_token, _) = app.login("people@x.com", "Correct1!").await;
        let allowed = app
            .request("GET", "/auth/users", None, Some(&hr_token))
            .await;
        assert_eq!(allowed.status, StatusCode::OK);
        assert_eq!(allowed.body["data"]["total"], json!(2));
    }

    #[tokio::test]
    async fn test_role_change_is_admin_only() {
        let app = common::TestApp::new();
        let target = app
            .create_user("target@x.com", "Correct1!", UserRole::Employee)
            .await;
        app.create_user("people@x.com", "Correct1!", UserRole::Hr)
            .await;
        app.create_user("root@x.com", "Correct1!", UserRole::Admin)
            .await;

        let (hr_token, _) = app.login("people@x.com", "Correct1!").await;
        let denied = app
            .request(
                "PATCH",
                &format!("/auth/users/{target}/role"),
                Some(json!({ "role": "MANAGER" })),
                Some(&hr_token),
            )
            .await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let (admin_token, _) = app.login("root@x.com", "Correct1!").await;
        let changed = app
            .request(
                "PATCH",
                &format!("/auth/users/{target}/role"),
                Some(json!({ "role": "MANAGER" })),
                Some(&admin_token),
            )
            .await;
        assert_eq!(changed.status, StatusCode::OK);
        assert_eq!(changed.body["data"]["role"], json!("MANAGER"));
    }

    #[tokio::test]
    async fn test_deactivation_revokes_sessions() {
        let app = common::TestApp::new();
        let target = app
            .create_user("victim@x.com", "Correct1!", UserRole::Employee)
            .await;
        app.create_user("root@x.com", "Correct1!", UserRole::Admin)
            .await;

        let (_, victim_refresh) = app.login("victim@x.com", "Correct1!").await;
        let (admin_token, _) = app.login("root@x.com", "Correct1!").await;

        let deactivated = app
            .request(
                "PATCH",
                &format!("/auth/users/{target}/status"),
                Some(json!({ "is_active": false })),
                Some(&admin_token),
            )
            .await;
        assert_eq!(deactivated.status, StatusCode::OK);

        let refreshed = app
            .request(
                "POST",
                "/auth/refresh-token",
                Some(json!({ "refresh_token": victim_refresh })),
                None,
            )
            .await;
        assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
    }
}
