//! Servicio de autenticación
//!
//! Login, validación del token persistido y logout. El token queda en la
//! `Session` inyectada en el cliente HTTP.

use http::StatusCode;
use serde_json::Value;
use tracing::{info, warn};
use validator::Validate;

use crate::clients::{segment, ApiClient};
use crate::models::user::{Credentials, LoginData, User};
use crate::services::entity::Entity;
use crate::utils::errors::{ApiError, ApiResult};

pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// POST /user/login; guarda el token y devuelve el operador si vino
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Option<User>> {
        credentials.validate()?;

        let data: LoginData = match self.api.post("/user/login", credentials).await {
            Ok(data) => data,
            // en el login un 401 son credenciales inválidas, no una sesión vencida
            Err(ApiError::SessionExpired) => {
                return Err(ApiError::Rejected {
                    status: StatusCode::UNAUTHORIZED,
                    message: "Email o contraseña incorrectos".to_string(),
                    errors: Vec::new(),
                })
            }
            Err(e) => return Err(e),
        };

        self.api.session().set_token(&data.token).await?;
        info!("🔐 Login correcto para {}", credentials.email);

        match data.user {
            Some(user) => Ok(Some(User::from_backend(user)?)),
            None => Ok(None),
        }
    }

    /// GET /user/token/validate/{token}. Un token rechazado invalida la sesión.
    pub async fn validate(&self) -> ApiResult<bool> {
        let Some(token) = self.api.session().token().await else {
            return Ok(false);
        };

        let path = format!("/user/token/validate/{}", segment(&token));
        match self.api.get::<Value>(&path).await {
            Ok(_) => Ok(true),
            Err(ApiError::SessionExpired) => Ok(false),
            Err(ApiError::Rejected { message, .. }) => {
                warn!("⚠️ Token rechazado: {}", message);
                self.api.session().invalidate().await;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn logout(&self) {
        self.api.session().logout().await;
    }
}
