//! Integration tests for bearer-secret authorization.

use mailgate_core::error::ErrorKind;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_secret_file_whitespace_is_ignored() {
    let app = TestApp::with_secret("  padded-secret \r\n").await;
    assert!(app.authorizer.authorize("Bearer padded-secret").is_ok());
    assert!(app.authorizer.authorize("Bearer   padded-secret \r\n").is_err());
}

#[tokio::test]
async fn test_every_rejection_is_unauthorized() {
    let app = TestApp::new().await;

    for header in [None, Some(""), Some("Basic x"), Some("Bearer wrong")] {
        let err = app
            .authorizer
            .authorize_call("fetch-emails", header)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.kind.http_status(), 401);
    }
}

#[tokio::test]
async fn test_health_check_needs_no_secret() {
    let app = TestApp::new().await;
    assert!(app.authorizer.authorize_call("health", None).is_ok());
}

#[tokio::test]
async fn test_session_token_is_not_a_bearer_secret() {
    let app = TestApp::new().await;
    let token = app.manager.login("a@x.com", "pw").await.unwrap();

    let err = app
        .authorizer
        .authorize(&format!("Bearer {token}"))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}
