//! Backend falso para los tests de integración
//!
//! Servidor axum en un puerto efímero que registra cada request y responde
//! con el envoltorio `{ ok, data, msg }` configurado por ruta.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use flota_admin::session::MemoryTokenStore;
use flota_admin::{ApiClient, AppConfig, Session};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(String, String), Reply>,
    requests: Vec<Recorded>,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Inner::default()));
        let router = Router::new().fallback(handle).with_state(inner.clone());
        let base_url = serve(router).await;
        Self { base_url, inner }
    }

    fn set(&self, method: &str, path: &str, reply: Reply) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert((method.to_string(), path.to_string()), reply);
    }

    /// `{ ok: true, data }` con 200
    pub fn ok(&self, method: &str, path: &str, data: Value) {
        self.set(method, path, Reply::Json(StatusCode::OK, json!({ "ok": true, "data": data })));
    }

    /// Respuesta JSON arbitraria
    pub fn json(&self, method: &str, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.set(method, path, Reply::Json(status, body));
    }

    /// `{ ok: false, msg }` con 400
    pub fn reject(&self, method: &str, path: &str, msg: &str) {
        self.json(method, path, 400, json!({ "ok": false, "msg": msg }));
    }

    pub fn text(&self, method: &str, path: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        self.set(method, path, Reply::Text(status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn client(&self, session: Session) -> ApiClient {
        client_for(&self.base_url, session)
    }
}

pub fn client_for(base_url: &str, session: Session) -> ApiClient {
    ApiClient::new(&AppConfig::for_base_url(base_url), session).unwrap()
}

pub fn logged_in(token: &str) -> Session {
    Session::new(Arc::new(MemoryTokenStore::with_token(token)))
}

/// Levantar un router en 127.0.0.1 con puerto libre; devuelve la URL base
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn handle(
    State(inner): State<Arc<Mutex<Inner>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        token: headers
            .get("x-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    };

    let reply = {
        let mut inner = inner.lock().unwrap();
        let key = (recorded.method.clone(), recorded.path.clone());
        inner.requests.push(recorded);
        inner.routes.get(&key).cloned()
    };

    match reply {
        Some(Reply::Json(status, body)) => (status, Json(body)).into_response(),
        Some(Reply::Text(status, body)) => (status, body).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "ok": false, "msg": "Ruta no encontrada" })),
        )
            .into_response(),
    }
}
