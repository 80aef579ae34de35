//! Cliente HTTP del backend de flota
//!
//! Único punto de salida hacia la API REST: agrega el token de la sesión,
//! interpreta el envoltorio `{ ok, data, msg, errores }` y detecta la
//! invalidación de sesión. No hay reintentos ni timeouts propios.

use http::{Method, StatusCode};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::environment::AppConfig;
use crate::models::envelope::Envelope;
use crate::session::Session;
use crate::utils::errors::{ApiError, ApiResult};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_header: String,
    session_expired_messages: Vec<String>,
    session: Session,
}

impl ApiClient {
    /// Crear el cliente con la sesión inyectada
    pub fn new(config: &AppConfig, session: Session) -> ApiResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header: config.auth_header.clone(),
            session_expired_messages: config
                .session_expired_messages
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    /// Enviar y convertir `data` al tipo pedido
    pub async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let envelope = self.send(method, path, body).await?;
        let data = envelope.data.unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// Enviar y devolver el envoltorio crudo. Un `ok: false` se devuelve
    /// siempre como `ApiError::Rejected`.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Envelope<Value>> {
        let url = self.url(path);
        debug!("🌐 {} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.session.token().await {
            request = request.header(self.auth_header.as_str(), token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: Envelope<Value> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                if status == StatusCode::UNAUTHORIZED {
                    self.session.invalidate().await;
                    return Err(ApiError::SessionExpired);
                }
                if !status.is_success() {
                    warn!("❌ {} {} -> HTTP {}", method, url, status);
                    return Err(ApiError::Http { status });
                }
                return Err(ApiError::Decode(e));
            }
        };

        if status == StatusCode::UNAUTHORIZED || self.is_session_expired(envelope.message()) {
            warn!("⚠️ {} {} -> sesión inválida", method, url);
            self.session.invalidate().await;
            return Err(ApiError::SessionExpired);
        }

        if !envelope.ok {
            let message = envelope.message().unwrap_or_default().to_string();
            debug!("🚫 {} {} rechazado: {}", method, url, message);
            return Err(ApiError::Rejected {
                status,
                message,
                errors: envelope.errores.unwrap_or_default(),
            });
        }

        Ok(envelope)
    }

    fn is_session_expired(&self, message: Option<&str>) -> bool {
        let Some(message) = message else {
            return false;
        };
        let message = message.to_lowercase();
        self.session_expired_messages
            .iter()
            .any(|marker| message.contains(marker.as_str()))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Codificar un segmento de path con datos del usuario
pub fn segment(value: impl ToString) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}
