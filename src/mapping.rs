//! Tablas de traducción de nombres de campos
//!
//! El backend habla snake_case en castellano y los modelos de vista usan
//! camelCase. Cada entidad declara su tabla una sola vez acá; las tablas se
//! verifican (sin nombres duplicados) la primera vez que se usan.

use lazy_static::lazy_static;
use serde_json::{Map, Value};

/// Tabla declarativa `(nombre_ui, nombre_backend)` de una entidad
#[derive(Debug)]
pub struct FieldMap {
    entity: &'static str,
    pairs: &'static [(&'static str, &'static str)],
}

impl FieldMap {
    /// Construir y verificar la tabla
    pub fn checked(entity: &'static str, pairs: &'static [(&'static str, &'static str)]) -> Self {
        let map = Self { entity, pairs };
        if let Err(e) = map.check() {
            panic!("{}", e);
        }
        map
    }

    /// Ningún nombre de UI ni de backend puede repetirse
    pub fn check(&self) -> Result<(), String> {
        for (i, (ui, backend)) in self.pairs.iter().enumerate() {
            for (other_ui, other_backend) in &self.pairs[i + 1..] {
                if ui == other_ui {
                    return Err(format!("{}: campo UI duplicado '{}'", self.entity, ui));
                }
                if backend == other_backend {
                    return Err(format!("{}: campo backend duplicado '{}'", self.entity, backend));
                }
            }
        }
        Ok(())
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn pairs(&self) -> &'static [(&'static str, &'static str)] {
        self.pairs
    }

    pub fn backend_name(&self, ui: &str) -> Option<&'static str> {
        self.pairs.iter().find(|(u, _)| *u == ui).map(|(_, b)| *b)
    }

    pub fn ui_name(&self, backend: &str) -> Option<&'static str> {
        self.pairs.iter().find(|(_, b)| *b == backend).map(|(u, _)| *u)
    }

    /// Renombrar las claves de un objeto del backend a nombres de UI.
    /// Las claves desconocidas se conservan tal cual.
    pub fn to_ui(&self, value: Value) -> Value {
        self.rename(value, |key| self.ui_name(key))
    }

    /// Renombrar las claves de un objeto de UI a nombres del backend
    pub fn to_backend(&self, value: Value) -> Value {
        self.rename(value, |key| self.backend_name(key))
    }

    fn rename<F>(&self, value: Value, lookup: F) -> Value
    where
        F: Fn(&str) -> Option<&'static str>,
    {
        match value {
            Value::Object(fields) => {
                let mut renamed = Map::with_capacity(fields.len());
                for (key, v) in fields {
                    let target = lookup(&key).map(str::to_string).unwrap_or(key);
                    renamed.insert(target, v);
                }
                Value::Object(renamed)
            }
            other => other,
        }
    }
}

lazy_static! {
    pub static ref VEHICLE_FIELDS: FieldMap = FieldMap::checked(
        "vehiculo",
        &[
            ("id", "id_vehiculo"),
            ("internalNumber", "numero_interno"),
            ("plate", "patente"),
            ("brand", "marca"),
            ("model", "modelo"),
            ("acquisitionDate", "fecha_adquisicion"),
            ("status", "estado"),
            ("insuranceCompany", "aseguradora"),
            ("policyNumber", "numero_poliza"),
            ("policyExpiry", "vencimiento_poliza"),
            ("responsible", "responsable"),
            ("ministry", "ministerio"),
        ],
    );
    pub static ref CLIENT_FIELDS: FieldMap = FieldMap::checked(
        "cliente",
        &[
            ("id", "id_cliente"),
            ("clientType", "tipo_cliente"),
            ("name", "nombre"),
            ("legalName", "razon_social"),
            ("dniCuit", "dni_cuit"),
            ("phone", "telefono"),
            ("email", "email"),
        ],
    );
    pub static ref USER_FIELDS: FieldMap = FieldMap::checked(
        "usuario",
        &[
            ("id", "id_usuario"),
            ("firstname", "nombre"),
            ("lastname", "apellido"),
            ("email", "email"),
            ("password", "password"),
        ],
    );
    pub static ref INVOICE_FIELDS: FieldMap = FieldMap::checked(
        "factura",
        &[
            ("date", "fecha"),
            ("number", "numero"),
            ("amount", "monto"),
            ("paid", "pagada"),
            ("notes", "observaciones"),
            ("month", "mes"),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_tables_are_consistent() {
        for map in [&*VEHICLE_FIELDS, &*CLIENT_FIELDS, &*USER_FIELDS, &*INVOICE_FIELDS] {
            assert!(map.check().is_ok(), "{}", map.entity());
        }
    }

    #[test]
    fn test_duplicate_ui_name_is_rejected() {
        static DUPLICATED: &[(&str, &str)] = &[("email", "email"), ("email", "correo")];
        let map = FieldMap {
            entity: "cliente",
            pairs: DUPLICATED,
        };
        assert!(map.check().unwrap_err().contains("email"));
    }

    #[test]
    fn test_rename_both_directions() {
        let backend = json!({
            "id_cliente": 7,
            "tipo_cliente": "persona",
            "razon_social": null,
            "extra": "se conserva"
        });

        let ui = CLIENT_FIELDS.to_ui(backend.clone());
        assert_eq!(ui["id"], 7);
        assert_eq!(ui["clientType"], "persona");
        assert_eq!(ui["extra"], "se conserva");
        assert!(ui.get("tipo_cliente").is_none());

        assert_eq!(CLIENT_FIELDS.to_backend(ui), backend);
    }

    #[test]
    fn test_non_objects_pass_through() {
        assert_eq!(VEHICLE_FIELDS.to_ui(json!([1, 2])), json!([1, 2]));
    }
}
