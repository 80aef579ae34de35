//! Utilidades de validación
//!
//! Este módulo contiene los validadores de campos de los formularios
//! y la conversión de errores a mensajes por campo.

use std::borrow::Cow;
use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

lazy_static! {
    /// Patente: 2 letras + 3 dígitos + 2 letras (ej. AB123CD)
    pub static ref PATENTE_RE: Regex = Regex::new(r"^[A-Z]{2}\d{3}[A-Z]{2}$").unwrap();
    static ref DIGITS_RE: Regex = Regex::new(r"^\d+$").unwrap();
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Validar formato de patente
pub fn validate_patente(value: &str) -> Result<(), ValidationError> {
    if !PATENTE_RE.is_match(value) {
        let mut error = error_with_message(
            "patente",
            "La patente debe tener el formato AA123AA",
        );
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar DNI de persona física (7 u 8 dígitos)
pub fn validate_dni(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !DIGITS_RE.is_match(value) || !(7..=8).contains(&len) {
        return Err(error_with_message("dni", "El DNI debe tener 7 u 8 dígitos"));
    }
    Ok(())
}

/// Validar CUIT de empresa (11 dígitos)
pub fn validate_cuit(value: &str) -> Result<(), ValidationError> {
    if !DIGITS_RE.is_match(value) || value.len() != 11 {
        return Err(error_with_message("cuit", "El CUIT debe tener 11 dígitos"));
    }
    Ok(())
}

/// Validar teléfono (exactamente 10 dígitos)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !DIGITS_RE.is_match(value) || value.len() != 10 {
        let mut error = error_with_message("phone", "El teléfono debe tener 10 dígitos");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("required", "Campo obligatorio"));
    }
    Ok(())
}

/// Mensajes en línea por campo, listos para mostrar debajo de cada input.
///
/// Los errores de esquema (validaciones cruzadas) quedan bajo `__all__`.
/// Solo se conserva el primer mensaje de cada campo.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut messages = BTreeMap::new();
    collect_messages(errors, "", &mut messages);
    messages
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    let text = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&first.code));
                    out.entry(key).or_insert(text);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &key, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{}[{}]", key, index), out);
                }
            }
        }
    }
}

fn default_message(code: &str) -> String {
    match code {
        "email" => "El email no es válido".to_string(),
        "length" => "Longitud inválida".to_string(),
        "range" => "Valor fuera de rango".to_string(),
        "required" => "Campo obligatorio".to_string(),
        other => format!("Valor inválido ({})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_patente() {
        assert!(validate_patente("AB123CD").is_ok());
        assert!(validate_patente("AF876QA").is_ok());

        let err = validate_patente("AB12CD").unwrap_err();
        assert_eq!(err.code, "patente");
        assert!(validate_patente("ab123cd").is_err());
        assert!(validate_patente("AB123CDE").is_err());
    }

    #[test]
    fn test_validate_documents() {
        assert!(validate_dni("1234567").is_ok());
        assert!(validate_dni("12345678").is_ok());
        assert!(validate_dni("123456").is_err());
        assert!(validate_dni("123456789").is_err());
        assert!(validate_dni("12a4567").is_err());

        assert!(validate_cuit("20123456789").is_ok());
        assert!(validate_cuit("2012345678").is_err());
        assert!(validate_cuit("20-12345678-9").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("1134567890").is_ok());
        assert!(validate_phone("113456789").is_err());
        assert!(validate_phone("11345678901").is_err());
    }

    #[test]
    fn test_field_messages_uses_custom_message() {
        let mut errors = ValidationErrors::new();
        errors.add("plate", validate_patente("X").unwrap_err());
        errors.add("phone", ValidationError::new("length"));

        let messages = field_messages(&errors);
        assert_eq!(messages["plate"], "La patente debe tener el formato AA123AA");
        assert_eq!(messages["phone"], "Longitud inválida");
    }
}
