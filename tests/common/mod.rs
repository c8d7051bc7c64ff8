#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pww_backend::build_app;
use pww_backend::config::JwtConfig;
use pww_backend::models::user::NewUser;
use pww_backend::state::AppState;
use pww_backend::store::{CatalogStore, MemoryStore};

pub const PASSWORD: &str = "pww-password-1";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), JwtConfig::new("test-secret"));
        Self { router: build_app(state), store }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// Sends `body` verbatim as JSON, for payloads that are not valid JSON.
    pub async fn send_raw(&self, method: &str, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send("GET", uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.send("POST", uri, Some(body), None).await
    }

    /// Creates an active user with a cheap bcrypt cost.
    pub async fn user(&self, username: &str, is_staff: bool, is_superuser: bool, permissions: &[&str]) -> i64 {
        self.store
            .insert_user(&NewUser {
                username: username.into(),
                password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
                is_staff,
                is_superuser,
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            })
            .await
            .unwrap()
            .id
    }

    /// Logs in through the token endpoint and returns the access token.
    pub async fn login(&self, username: &str) -> String {
        let res = self.post("/api/token/", json!({ "username": username, "password": PASSWORD })).await;
        assert_eq!(res.status().as_u16(), 200);
        json_body(res).await["access"].as_str().unwrap().to_string()
    }

    pub async fn create_azienda(&self, nome: &str, partita_iva: &str) -> i64 {
        let res = self.post("/api/aziende/create/", azienda_json(nome, partita_iva)).await;
        assert_eq!(res.status().as_u16(), 201);
        json_body(res).await["id"].as_i64().unwrap()
    }

    pub async fn create_software(&self, body: Value) -> i64 {
        let res = self.post("/api/software/create/", body).await;
        assert_eq!(res.status().as_u16(), 201);
        json_body(res).await["id"].as_i64().unwrap()
    }
}

pub fn azienda_json(nome: &str, partita_iva: &str) -> Value {
    json!({
        "nome": nome,
        "partita_iva": partita_iva,
        "sede": "Redmond, WA",
        "email": "info@example.com",
        "sito_web": "https://www.example.com",
        "data_fondazione": "1975-04-04"
    })
}

pub fn software_json(nome: &str, azienda: i64, prezzo: &str, gratuito: bool) -> Value {
    json!({
        "nome": nome,
        "versione": "1.0",
        "descrizione": "Strumento di sviluppo",
        "azienda": azienda,
        "prezzo": prezzo,
        "gratuito": gratuito,
        "data_rilascio": "2024-01-15"
    })
}

pub async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
