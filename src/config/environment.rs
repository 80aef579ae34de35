//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: URL del backend,
//! header de autenticación, persistencia del token y exportaciones.

use std::env;
use std::path::PathBuf;

use crate::utils::errors::{ApiError, ApiResult};

const DEFAULT_SESSION_EXPIRED_MESSAGES: &str = "Token no válido,Token expirado,Sesión expirada";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub api_base_url: String,
    pub auth_header: String,
    pub token_path: PathBuf,
    pub session_expired_messages: Vec<String>,
    pub export_dir: PathBuf,
    // Comprobante PDF
    pub pdf_fonts_dir: PathBuf,
    pub pdf_font_family: String,
    pub pdf_logo_left: Option<String>,
    pub pdf_logo_right: Option<String>,
    // Credenciales del operador (solo binario)
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    /// Leer la configuración de las variables de entorno del proceso
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construir la configuración a partir de una función de búsqueda
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = get("API_BASE_URL")
            .ok_or_else(|| ApiError::Config("API_BASE_URL must be set".to_string()))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "API_BASE_URL must be an http(s) URL, got '{}'",
                api_base_url
            )));
        }

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            auth_header: get("AUTH_HEADER").unwrap_or_else(|| "x-token".to_string()),
            token_path: PathBuf::from(get("TOKEN_PATH").unwrap_or_else(|| ".flota_token".to_string())),
            session_expired_messages: get("SESSION_EXPIRED_MESSAGES")
                .unwrap_or_else(|| DEFAULT_SESSION_EXPIRED_MESSAGES.to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            export_dir: PathBuf::from(get("EXPORT_DIR").unwrap_or_else(|| "exports".to_string())),
            pdf_fonts_dir: PathBuf::from(get("PDF_FONTS_DIR").unwrap_or_else(|| "fonts".to_string())),
            pdf_font_family: get("PDF_FONT_FAMILY").unwrap_or_else(|| "LiberationSans".to_string()),
            pdf_logo_left: get("PDF_LOGO_LEFT"),
            pdf_logo_right: get("PDF_LOGO_RIGHT"),
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
        })
    }

    /// Configuración mínima apuntando a una URL dada (tests y herramientas)
    pub fn for_base_url(api_base_url: &str) -> Self {
        Self {
            environment: "test".to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            auth_header: "x-token".to_string(),
            token_path: PathBuf::from(".flota_token"),
            session_expired_messages: DEFAULT_SESSION_EXPIRED_MESSAGES
                .split(',')
                .map(str::to_string)
                .collect(),
            export_dir: PathBuf::from("exports"),
            pdf_fonts_dir: PathBuf::from("fonts"),
            pdf_font_family: "LiberationSans".to_string(),
            pdf_logo_left: None,
            pdf_logo_right: None,
            admin_email: None,
            admin_password: None,
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
