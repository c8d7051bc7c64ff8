mod common;

use common::{json_body, TestApp, PASSWORD};
use pww_backend::store::CatalogStore;
use serde_json::json;

#[tokio::test]
async fn obtain_refresh_and_verify() {
    let app = TestApp::new();
    app.user("mario", false, false, &[]).await;

    let res = app.post("/api/token/", json!({ "username": "mario", "password": PASSWORD })).await;
    assert_eq!(res.status().as_u16(), 200);
    let pair = json_body(res).await;
    let access = pair["access"].as_str().unwrap().to_string();
    let refresh = pair["refresh"].as_str().unwrap().to_string();

    let res = app.post("/api/token/refresh/", json!({ "refresh": refresh })).await;
    assert_eq!(res.status().as_u16(), 200);
    assert!(json_body(res).await["access"].is_string());

    let res = app.post("/api/token/verify/", json!({ "token": access })).await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await, json!({}));
}

#[tokio::test]
async fn wrong_password_is_401() {
    let app = TestApp::new();
    app.user("mario", false, false, &[]).await;

    for body in [
        json!({ "username": "mario", "password": "nope" }),
        json!({ "username": "luigi", "password": PASSWORD }),
    ] {
        let res = app.post("/api/token/", body).await;
        assert_eq!(res.status().as_u16(), 401);
        assert_eq!(json_body(res).await["error"], "No active account found with the given credentials");
    }
}

#[tokio::test]
async fn inactive_user_cannot_log_in() {
    let app = TestApp::new();
    let id = app.user("mario", false, false, &[]).await;
    app.store.set_user_active(id, false).await.unwrap();

    let res = app.post("/api/token/", json!({ "username": "mario", "password": PASSWORD })).await;
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(json_body(res).await["error"], "No active account found with the given credentials");
}

#[tokio::test]
async fn malformed_login_body_is_a_field_error() {
    let app = TestApp::new();
    let res = app.send_raw("POST", "/api/token/", "{\"username\": ").await;
    assert_eq!(res.status().as_u16(), 400);
    let body = json_body(res).await;
    assert_eq!(body["error"], "Invalid input");
    assert!(body["fields"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn missing_credentials_are_field_errors() {
    let app = TestApp::new();
    let res = app.post("/api/token/", json!({ "username": "" })).await;
    assert_eq!(res.status().as_u16(), 400);
    let fields = json_body(res).await["fields"].clone();
    assert_eq!(fields["username"][0], "This field may not be blank.");
    assert_eq!(fields["password"][0], "This field is required.");
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let app = TestApp::new();
    app.user("mario", false, false, &[]).await;
    let access = app.login("mario").await;

    let res = app.post("/api/token/refresh/", json!({ "refresh": access })).await;
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn garbage_token_fails_verification() {
    let app = TestApp::new();
    let res = app.post("/api/token/verify/", json!({ "token": "not.a.jwt" })).await;
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(json_body(res).await["code"], "unauthorized");
}
