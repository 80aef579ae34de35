//! Modelo de User (operador del sistema)
//!
//! La contraseña es de solo escritura: viaja en los formularios pero nunca
//! forma parte del modelo de lectura.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "wire::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "wire::string")]
    pub firstname: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub lastname: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub email: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }

    /// Formulario de edición (sin contraseña)
    pub fn to_form(&self) -> UserForm {
        UserForm {
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            email: self.email.clone(),
        }
    }
}

/// Edición de operador: mismas reglas que el alta, salvo la contraseña
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    #[validate(length(min = 1, max = 100))]
    pub firstname: String,
    #[validate(length(min = 1, max = 100))]
    pub lastname: String,
    #[validate(email)]
    pub email: String,
}

/// Alta de operador
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 1, max = 100))]
    pub firstname: String,
    #[validate(length(min = 1, max = 100))]
    pub lastname: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
}

/// Credenciales de login
#[derive(Debug, Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Respuesta del login: token + operador
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(default, alias = "usuario")]
    pub user: Option<serde_json::Value>,
}
