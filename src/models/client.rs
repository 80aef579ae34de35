//! Modelo de Client
//!
//! Un cliente es una persona (nombre + DNI) o una empresa
//! (razón social + CUIT). El discriminador decide qué campos se usan.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::wire;
use crate::utils::validation::{validate_cuit, validate_dni, validate_phone};

/// Tipo de cliente
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    #[serde(alias = "persona", alias = "PERSONA", alias = "fisica")]
    Person,
    #[serde(alias = "empresa", alias = "EMPRESA", alias = "juridica")]
    Company,
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::Person => f.write_str("Persona"),
            ClientType::Company => f.write_str("Empresa"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(deserialize_with = "wire::id")]
    pub id: i64,
    #[serde(default)]
    pub client_type: ClientType,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub legal_name: Option<String>,
    #[serde(default, deserialize_with = "wire::string")]
    pub dni_cuit: String,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub email: Option<String>,
}

impl Client {
    /// Nombre para mostrar: nombre o razón social según el tipo
    pub fn display_name(&self) -> &str {
        let preferred = match self.client_type {
            ClientType::Person => self.name.as_deref().or(self.legal_name.as_deref()),
            ClientType::Company => self.legal_name.as_deref().or(self.name.as_deref()),
        };
        preferred.unwrap_or("")
    }

    /// Formulario de edición precargado
    pub fn to_form(&self) -> ClientForm {
        ClientForm {
            client_type: self.client_type,
            name: self.name.clone(),
            legal_name: self.legal_name.clone(),
            dni_cuit: self.dni_cuit.clone(),
            phone: self.phone.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
        }
    }
}

/// Formulario de alta/edición de cliente
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_client_identity", skip_on_field_errors = false))]
pub struct ClientForm {
    pub client_type: ClientType,
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub dni_cuit: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(email(message = "El email no es válido"))]
    pub email: String,
}

impl ClientForm {
    pub fn new(client_type: ClientType) -> Self {
        Self {
            client_type,
            ..Default::default()
        }
    }

    /// Cambiar el tipo de cliente. Siempre limpia nombre, razón social y
    /// documento, aunque el tipo no cambie.
    pub fn set_type(&mut self, client_type: ClientType) {
        self.client_type = client_type;
        self.name = None;
        self.legal_name = None;
        self.dni_cuit.clear();
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }
}

fn message(code: &'static str, text: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(text));
    error
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Exactamente uno de {nombre, razón social} según el tipo, y documento acorde
fn validate_client_identity(form: &ClientForm) -> Result<(), ValidationError> {
    match form.client_type {
        ClientType::Person => {
            if is_blank(&form.name) {
                return Err(message("name", "El nombre es obligatorio"));
            }
            if !is_blank(&form.legal_name) {
                return Err(message("legal_name", "Una persona no lleva razón social"));
            }
            validate_dni(&form.dni_cuit)
        }
        ClientType::Company => {
            if is_blank(&form.legal_name) {
                return Err(message("legal_name", "La razón social es obligatoria"));
            }
            if !is_blank(&form.name) {
                return Err(message("name", "Una empresa no lleva nombre de persona"));
            }
            validate_cuit(&form.dni_cuit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> ClientForm {
        ClientForm {
            client_type: ClientType::Person,
            name: Some("Ana Gómez".to_string()),
            legal_name: None,
            dni_cuit: "30123456".to_string(),
            phone: "1134567890".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    #[test]
    fn test_person_document_length() {
        assert!(person().validate().is_ok());

        let mut seven = person();
        seven.dni_cuit = "3012345".to_string();
        assert!(seven.can_submit());

        let mut eleven = person();
        eleven.dni_cuit = "20301234569".to_string();
        assert!(eleven.validate().is_err());
    }

    #[test]
    fn test_company_requires_eleven_digits() {
        let mut form = ClientForm::new(ClientType::Company);
        form.legal_name = Some("Transportes SA".to_string());
        form.dni_cuit = "30712345678".to_string();
        form.phone = "3514567890".to_string();
        form.email = "admin@transportes.com".to_string();
        assert!(form.validate().is_ok());

        form.dni_cuit = "30123456".to_string();
        let errors = form.validate().unwrap_err();
        let messages = crate::utils::validation::field_messages(&errors);
        assert_eq!(messages["__all__"], "El CUIT debe tener 11 dígitos");
    }

    #[test]
    fn test_type_switch_reset_is_idempotent() {
        let mut form = person();
        form.set_type(ClientType::Company);
        let once = form.clone();
        form.set_type(ClientType::Company);

        assert_eq!(form, once);
        assert!(form.name.is_none());
        assert!(form.legal_name.is_none());
        assert!(form.dni_cuit.is_empty());
        // contacto se conserva
        assert_eq!(form.phone, "1134567890");
    }

    #[test]
    fn test_email_and_phone_are_checked() {
        let mut form = person();
        form.email = "no-es-email".to_string();
        form.phone = "123".to_string();
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn test_display_name_follows_type() {
        let client = Client {
            id: 1,
            client_type: ClientType::Company,
            name: None,
            legal_name: Some("Logística SRL".to_string()),
            dni_cuit: "30712345678".to_string(),
            phone: None,
            email: None,
        };
        assert_eq!(client.display_name(), "Logística SRL");
        assert_eq!(client.to_form().legal_name.as_deref(), Some("Logística SRL"));
    }
}
