//! Integration tests for the session lifecycle over the local record store.

use chrono::Utc;

use mailgate_auth::{CredentialRequest, SecretStore};
use mailgate_core::error::ErrorKind;
use mailgate_core::types::RecordKey;

use crate::helpers::TestApp;

const DAY: i64 = 24 * 60 * 60;

#[tokio::test]
async fn test_login_resolve_logout() {
    let app = TestApp::new().await;
    let token = app.manager.login("a@x.com", "pw").await.unwrap();

    let request = CredentialRequest::from_parts(Some(&token), None, None).unwrap();
    let credentials = app.manager.resolve(&request).await.unwrap();
    assert_eq!(credentials.email, "a@x.com");
    assert_eq!(credentials.password.as_str(), "pw");

    assert!(app.manager.logout(&token).await.unwrap());
    let err = app.manager.resolve(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.kind.http_status(), 400);
}

#[tokio::test]
async fn test_record_file_is_hash_named_and_encrypted() {
    let app = TestApp::new().await;
    let token = app.manager.login("a@x.com", "hunter2").await.unwrap();

    let key = RecordKey::for_token(&token);
    assert_eq!(app.session_files(), vec![format!("{key}.session")]);

    let path = std::path::Path::new(&app.config.storage.sessions_dir).join(format!("{key}.session"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("hunter2"));
    assert!(!contents.contains(&token));

    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["email"], "a@x.com");
    assert_eq!(json["created"], json["last_access"]);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[tokio::test]
async fn test_sessions_survive_restart() {
    let app = TestApp::new().await;
    let token = app.manager.login("a@x.com", "pw").await.unwrap();

    let app = app.restart().await;
    let credentials = app
        .manager
        .resolve(&CredentialRequest::Session(token))
        .await
        .unwrap();
    assert_eq!(credentials.password.as_str(), "pw");
}

#[tokio::test]
async fn test_rotated_secret_invalidates_tokens() {
    let app = TestApp::new().await;
    let token = app.manager.login("a@x.com", "pw").await.unwrap();

    SecretStore::from_config(&app.config.auth)
        .generate(true)
        .await
        .unwrap();
    let app = app.restart().await;

    let err = app
        .manager
        .resolve(&CredentialRequest::Session(token.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    // The record is still on disk but can no longer be decrypted.
    let err = app.sessions.get(&token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Decryption);
    assert_eq!(err.kind.http_status(), 400);
}

#[tokio::test]
async fn test_token_and_record_expire_independently() {
    let app = TestApp::new().await;
    let now = Utc::now().timestamp();

    // Token 31 days old, record touched recently: token check fails first.
    let old_token = app.codec.issue_at("a@x.com", now - 31 * DAY).unwrap();
    app.sessions
        .create_at(&old_token, "a@x.com", "pw", now)
        .await
        .unwrap();
    let err = app
        .manager
        .resolve(&CredentialRequest::Session(old_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    // Fresh token, record idle for 31 days: the sweep removes it.
    let fresh_token = app.codec.issue_at("b@x.com", now).unwrap();
    app.sessions
        .create_at(&fresh_token, "b@x.com", "pw", now - 31 * DAY)
        .await
        .unwrap();
    assert_eq!(app.sessions.sweep_expired().await.unwrap(), 1);

    let err = app
        .manager
        .resolve(&CredentialRequest::Session(fresh_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.sessions.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_resolve_refreshes_last_access() {
    let app = TestApp::new().await;
    let now = Utc::now().timestamp();
    let token = app.codec.issue_at("a@x.com", now).unwrap();
    app.sessions
        .create_at(&token, "a@x.com", "pw", now - 10 * DAY)
        .await
        .unwrap();

    app.manager
        .resolve(&CredentialRequest::Session(token))
        .await
        .unwrap();

    let summaries = app.sessions.list().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].last_access.timestamp() >= now);
    assert_eq!(summaries[0].created.timestamp(), now - 10 * DAY);
}

#[tokio::test]
async fn test_concurrent_resolves_share_one_record() {
    let app = TestApp::new().await;
    let token = app.manager.login("a@x.com", "pw").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let manager = app.manager.clone();
        let request = CredentialRequest::Session(token.clone());
        handles.push(tokio::spawn(async move { manager.resolve(&request).await }));
    }
    for handle in handles {
        let credentials = handle.await.unwrap().unwrap();
        assert_eq!(credentials.email, "a@x.com");
    }

    assert_eq!(app.session_files().len(), 1);
}
