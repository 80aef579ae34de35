//! Envoltorio uniforme de las respuestas del backend
//!
//! Toda respuesta tiene la forma `{ ok, data?, msg?, errores? }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub ok: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub errores: Option<Vec<String>>,
}

impl<T> Envelope<T> {
    /// Mensaje principal: `msg` o, en su defecto, el primer elemento de `errores`
    pub fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                self.errores
                    .as_ref()
                    .and_then(|e| e.first())
                    .map(String::as_str)
            })
    }
}
