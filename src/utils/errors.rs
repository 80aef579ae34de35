//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del cliente
//! y su conversión a mensajes para el operador (toasts).

use http::StatusCode;
use thiserror::Error;

/// Mensaje genérico para fallas de red o de procesamiento
pub const CONNECTION_PROBLEM: &str = "Hubo un problema al conectar con el servidor";

/// Errores principales del cliente
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP error: {status}")]
    Http { status: StatusCode },

    #[error("Rejected by backend: {message}")]
    Rejected {
        status: StatusCode,
        message: String,
        errors: Vec<String>,
    },

    #[error("Session expired")]
    SessionExpired,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled by the operator")]
    Cancelled,

    #[error("Export error: {0}")]
    Export(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    /// Texto que se muestra al operador en la notificación
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Http { .. } => {
                CONNECTION_PROBLEM.to_string()
            }
            ApiError::Rejected { message, errors, .. } => {
                if !message.trim().is_empty() {
                    message.clone()
                } else if let Some(first) = errors.first() {
                    first.clone()
                } else {
                    "La operación fue rechazada".to_string()
                }
            }
            ApiError::SessionExpired => "La sesión expiró, ingresá nuevamente".to_string(),
            ApiError::Validation(e) => crate::utils::validation::field_messages(e)
                .into_values()
                .next()
                .unwrap_or_else(|| "Hay campos con errores".to_string()),
            ApiError::InvalidTransition(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Cancelled => "Operación cancelada".to_string(),
            ApiError::Export(msg) => format!("No se pudo exportar: {}", msg),
            ApiError::Config(msg) => format!("Configuración inválida: {}", msg),
            ApiError::Storage(_) => "No se pudo guardar la sesión".to_string(),
        }
    }

    /// Status HTTP asociado, si se conoce
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(e) => e.status(),
            ApiError::Http { status } => Some(*status),
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Verdadero si la falla es de red/parseo y no una respuesta de negocio
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Http { .. }
        )
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type ApiResult<T> = Result<T, ApiError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("{} con id '{}' no encontrado", resource, id))
}

/// Función helper para crear errores de transición inválida
pub fn transition_error(message: &str) -> ApiError {
    ApiError::InvalidTransition(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_prefers_msg_then_first_error() {
        let err = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "Patente duplicada".to_string(),
            errors: vec!["otro".to_string()],
        };
        assert_eq!(err.user_message(), "Patente duplicada");

        let err = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: String::new(),
            errors: vec!["El email ya existe".to_string()],
        };
        assert_eq!(err.user_message(), "El email ya existe");
    }

    #[test]
    fn test_transport_like_errors_use_generic_message() {
        let err = ApiError::Http {
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(err.user_message(), CONNECTION_PROBLEM);
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn test_session_expired_maps_to_unauthorized() {
        assert_eq!(
            ApiError::SessionExpired.status(),
            Some(StatusCode::UNAUTHORIZED)
        );
    }
}
