//! Modelo de Delivery (entrega)
//!
//! Una entrega vincula un vehículo con un cliente. Está ABIERTA mientras no
//! tenga fecha de devolución y pasa a CERRADA una única vez, al registrar la
//! devolución. Los datos de entrega (y el inventario) no se modifican después.

use chrono::NaiveDate;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::models::inventory::Inventory;
use crate::models::wire::{self, parse_date_str, ZERO_DATE};
use crate::utils::errors::{transition_error, ApiResult};
use crate::utils::validation::{validate_dni, validate_not_empty};

/// Estado del ciclo de vida de una entrega
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Open,
    Closed,
}

/// Una entrega sigue abierta si la fecha de devolución falta, está vacía o
/// es la fecha cero `0000-00-00`.
pub fn is_open_return_date(return_date: Option<&str>) -> bool {
    match return_date {
        None => true,
        Some(raw) => raw.trim().is_empty() || raw.trim() == ZERO_DATE,
    }
}

/// Fila tal como la devuelve el backend (snake_case, a veces camelCase)
#[derive(Debug, Clone, Deserialize)]
pub struct RawDelivery {
    #[serde(alias = "id", alias = "idEntrega", deserialize_with = "wire::id")]
    pub id_entrega: i64,
    #[serde(default, alias = "vehiculo_id", alias = "idVehiculo", alias = "vehiculoId")]
    pub id_vehiculo: Option<Value>,
    #[serde(default, alias = "cliente_id", alias = "idCliente", alias = "clienteId")]
    pub id_cliente: Option<Value>,
    #[serde(default, deserialize_with = "wire::string")]
    pub marca: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub modelo: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub patente: String,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub designacion: Option<String>,
    #[serde(
        default,
        alias = "nombre_cliente",
        alias = "clienteNombre",
        deserialize_with = "wire::string"
    )]
    pub cliente: String,
    #[serde(default, alias = "entregaNombre", deserialize_with = "wire::string")]
    pub entrega_nombre: String,
    #[serde(default, alias = "entregaDni", deserialize_with = "wire::string")]
    pub entrega_dni: String,
    #[serde(default, alias = "recibeNombre", deserialize_with = "wire::string")]
    pub recibe_nombre: String,
    #[serde(default, alias = "recibeDni", deserialize_with = "wire::string")]
    pub recibe_dni: String,
    #[serde(default, alias = "fechaEntrega", deserialize_with = "wire::optional_string")]
    pub fecha_entrega: Option<String>,
    #[serde(default, alias = "lugarEntrega", deserialize_with = "wire::string")]
    pub lugar_entrega: String,
    #[serde(default, alias = "kmEntrega", deserialize_with = "wire::optional_u32")]
    pub km_entrega: Option<u32>,
    #[serde(
        default,
        alias = "nivel_combustible",
        alias = "nivelCombustible",
        deserialize_with = "wire::optional_string"
    )]
    pub combustible: Option<String>,
    #[serde(
        default,
        alias = "fechaDevolucion",
        alias = "returnDate",
        deserialize_with = "wire::optional_string"
    )]
    pub fecha_devolucion: Option<String>,
    #[serde(default, alias = "lugarDevolucion", deserialize_with = "wire::optional_string")]
    pub lugar_devolucion: Option<String>,
    #[serde(default, alias = "kmDevolucion", deserialize_with = "wire::optional_u32")]
    pub km_devolucion: Option<u32>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub observaciones: Option<String>,
    /// Columnas restantes: flags del inventario
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Datos del vehículo anidados en la vista
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleData {
    pub brand: String,
    pub model: String,
    pub plate: String,
    pub designation: Option<String>,
}

/// Datos capturados al entregar el vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handover {
    pub deliverer: String,
    pub deliverer_document: String,
    pub receiver: String,
    pub receiver_document: String,
    pub date: Option<NaiveDate>,
    pub place: String,
    pub odometer: Option<u32>,
    pub fuel_level: Option<String>,
}

/// Datos de la devolución; vacíos mientras la entrega está abierta
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnInfo {
    pub date: Option<NaiveDate>,
    pub place: Option<String>,
    pub odometer: Option<u32>,
}

/// Modelo de vista de una entrega
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryView {
    pub id: i64,
    pub vehicle_id: Option<i64>,
    pub client_id: Option<i64>,
    pub vehicle_data: VehicleData,
    /// "marca modelo" para los listados
    pub vehicle_label: String,
    pub client_name: String,
    pub handover: Handover,
    pub return_info: ReturnInfo,
    /// Decidido sobre la fecha cruda: una fecha con formato desconocido
    /// igual cierra la entrega aunque no se pueda mostrar
    pub closed: bool,
    pub notes: Option<String>,
    pub inventory: Inventory,
}

fn optional_id(value: &Option<Value>) -> Option<i64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<RawDelivery> for DeliveryView {
    fn from(raw: RawDelivery) -> Self {
        let inventory = Inventory::from_row(&raw.extra);
        let vehicle_label = format!("{} {}", raw.marca, raw.modelo).trim().to_string();
        let closed = !is_open_return_date(raw.fecha_devolucion.as_deref());
        let return_date = if closed {
            raw.fecha_devolucion.as_deref().and_then(parse_date_str)
        } else {
            None
        };

        Self {
            id: raw.id_entrega,
            vehicle_id: optional_id(&raw.id_vehiculo),
            client_id: optional_id(&raw.id_cliente),
            vehicle_data: VehicleData {
                brand: raw.marca,
                model: raw.modelo,
                plate: raw.patente,
                designation: raw.designacion,
            },
            vehicle_label,
            client_name: raw.cliente,
            handover: Handover {
                deliverer: raw.entrega_nombre,
                deliverer_document: raw.entrega_dni,
                receiver: raw.recibe_nombre,
                receiver_document: raw.recibe_dni,
                date: raw.fecha_entrega.as_deref().and_then(parse_date_str),
                place: raw.lugar_entrega,
                odometer: raw.km_entrega,
                fuel_level: raw.combustible,
            },
            return_info: ReturnInfo {
                date: return_date,
                place: raw.lugar_devolucion,
                odometer: raw.km_devolucion,
            },
            closed,
            notes: raw.observaciones,
            inventory,
        }
    }
}

impl DeliveryView {
    /// Normalizar una fila cruda del backend
    pub fn from_raw_value(value: Value) -> ApiResult<Self> {
        let raw: RawDelivery = serde_json::from_value(value)?;
        Ok(raw.into())
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    pub fn status(&self) -> DeliveryStatus {
        if self.is_open() {
            DeliveryStatus::Open
        } else {
            DeliveryStatus::Closed
        }
    }

    /// La acción "registrar devolución" solo se ofrece en entregas abiertas
    pub fn can_register_return(&self) -> bool {
        self.is_open()
    }

    /// Verificar que la devolución sea aplicable a esta entrega
    pub fn check_return(&self, patch: &ReturnPatch) -> ApiResult<()> {
        if !self.is_open() {
            return Err(transition_error("La entrega ya fue finalizada"));
        }
        if let Some(handover_date) = self.handover.date {
            if patch.return_date < handover_date {
                return Err(transition_error(
                    "La fecha de devolución no puede ser anterior a la de entrega",
                ));
            }
        }
        if let Some(handover_km) = self.handover.odometer {
            if patch.return_odometer < handover_km {
                return Err(transition_error(
                    "El kilometraje de devolución no puede ser menor al de entrega",
                ));
            }
        }
        Ok(())
    }

    /// Aplicar una devolución ya confirmada por el backend
    pub fn apply_return(&mut self, patch: &ReturnPatch) {
        self.return_info = ReturnInfo {
            date: Some(patch.return_date),
            place: Some(patch.return_place.clone()),
            odometer: Some(patch.return_odometer),
        };
        self.closed = true;
        self.notes = patch.notes.clone();
    }

    /// Kilómetros recorridos, si la entrega está cerrada
    pub fn distance(&self) -> Option<u32> {
        let start = self.handover.odometer?;
        let end = self.return_info.odometer?;
        end.checked_sub(start)
    }
}

/// Campos que se pueden escribir al cerrar una entrega: nada más
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct ReturnPatch {
    #[serde(rename = "fecha_devolucion")]
    pub return_date: NaiveDate,
    #[serde(rename = "lugar_devolucion")]
    #[validate(custom = "validate_not_empty")]
    pub return_place: String,
    #[serde(rename = "km_devolucion")]
    pub return_odometer: u32,
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
}

/// Alta de una entrega: datos de entrega + inventario
#[derive(Debug, Clone, Validate)]
pub struct NewDelivery {
    pub vehicle_id: i64,
    pub client_id: i64,
    #[validate(custom = "validate_not_empty")]
    pub deliverer: String,
    #[validate(custom = "validate_dni")]
    pub deliverer_document: String,
    #[validate(custom = "validate_not_empty")]
    pub receiver: String,
    #[validate(custom = "validate_dni")]
    pub receiver_document: String,
    pub date: NaiveDate,
    #[validate(custom = "validate_not_empty")]
    pub place: String,
    pub odometer: u32,
    #[validate(custom = "validate_not_empty")]
    pub fuel_level: String,
    pub notes: Option<String>,
    pub inventory: Inventory,
}

impl NewDelivery {
    /// Cuerpo del POST con nombres del backend e inventario en `0/1`
    pub fn to_payload(&self) -> Value {
        let mut row = self.inventory.to_row();
        row.insert("id_vehiculo".into(), Value::from(self.vehicle_id));
        row.insert("id_cliente".into(), Value::from(self.client_id));
        row.insert("entrega_nombre".into(), Value::from(self.deliverer.clone()));
        row.insert("entrega_dni".into(), Value::from(self.deliverer_document.clone()));
        row.insert("recibe_nombre".into(), Value::from(self.receiver.clone()));
        row.insert("recibe_dni".into(), Value::from(self.receiver_document.clone()));
        row.insert(
            "fecha_entrega".into(),
            Value::from(self.date.format("%Y-%m-%d").to_string()),
        );
        row.insert("lugar_entrega".into(), Value::from(self.place.clone()));
        row.insert("km_entrega".into(), Value::from(self.odometer));
        row.insert("combustible".into(), Value::from(self.fuel_level.clone()));
        row.insert(
            "observaciones".into(),
            self.notes.clone().map(Value::from).unwrap_or(Value::Null),
        );
        Value::Object(row)
    }
}

/// Las únicas dos escrituras posibles sobre una entrega
#[derive(Debug, Clone)]
pub enum DeliveryPatch {
    Opening(NewDelivery),
    Closing { id: i64, fields: ReturnPatch },
}

impl DeliveryPatch {
    pub fn method(&self) -> Method {
        match self {
            DeliveryPatch::Opening(_) => Method::POST,
            DeliveryPatch::Closing { .. } => Method::PATCH,
        }
    }

    pub fn path(&self) -> String {
        match self {
            DeliveryPatch::Opening(_) => "/entrega".to_string(),
            DeliveryPatch::Closing { id, .. } => format!("/entrega/{}/finalizar", id),
        }
    }

    pub fn payload(&self) -> ApiResult<Value> {
        match self {
            DeliveryPatch::Opening(new) => Ok(new.to_payload()),
            DeliveryPatch::Closing { fields, .. } => Ok(serde_json::to_value(fields)?),
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        match self {
            DeliveryPatch::Opening(new) => new.validate()?,
            DeliveryPatch::Closing { fields, .. } => fields.validate()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::{InventoryItem, INVENTORY_SIZE};
    use serde_json::json;

    fn raw_row(return_date: Value) -> Value {
        json!({
            "id_entrega": 10,
            "id_vehiculo": "3",
            "id_cliente": 5,
            "marca": "Ford",
            "modelo": "Ranger",
            "patente": "AF876QA",
            "designacion": "Camioneta 4x4",
            "cliente": "Ana Gómez",
            "entrega_nombre": "Luis Díaz",
            "entrega_dni": "20111222",
            "recibe_nombre": "Ana Gómez",
            "recibe_dni": "30123456",
            "fecha_entrega": "2025-02-10",
            "lugar_entrega": "Base central",
            "km_entrega": "12000",
            "combustible": "3/4",
            "fecha_devolucion": return_date,
            "lugar_devolucion": null,
            "km_devolucion": null,
            "observaciones": "",
            "matafuego": 1,
            "rueda_auxilio": 1,
            "espejos_laterales": 0
        })
    }

    #[test]
    fn test_is_open_return_date() {
        assert!(is_open_return_date(None));
        assert!(is_open_return_date(Some("")));
        assert!(is_open_return_date(Some("0000-00-00")));
        assert!(!is_open_return_date(Some("2025-03-01")));
    }

    #[test]
    fn test_normalize_open_delivery() {
        let view = DeliveryView::from_raw_value(raw_row(json!("0000-00-00"))).unwrap();

        assert_eq!(view.id, 10);
        assert_eq!(view.vehicle_id, Some(3));
        assert_eq!(view.vehicle_label, "Ford Ranger");
        assert_eq!(view.vehicle_data.plate, "AF876QA");
        assert_eq!(view.handover.odometer, Some(12000));
        assert_eq!(view.handover.date, NaiveDate::from_ymd_opt(2025, 2, 10));
        assert!(view.notes.is_none());
        assert!(view.inventory.checked(InventoryItem::FireExtinguisher));
        assert!(!view.inventory.checked(InventoryItem::SideMirrors));
        assert_eq!(view.status(), DeliveryStatus::Open);
        assert!(view.can_register_return());
    }

    #[test]
    fn test_camel_case_payload_is_accepted() {
        let view = DeliveryView::from_raw_value(json!({
            "id": "11",
            "vehiculoId": 4,
            "marca": "Fiat",
            "modelo": "Cronos",
            "fechaDevolucion": "2025-03-01",
            "kmDevolucion": 15000
        }))
        .unwrap();

        assert_eq!(view.id, 11);
        assert_eq!(view.vehicle_id, Some(4));
        assert_eq!(view.status(), DeliveryStatus::Closed);
        assert!(!view.can_register_return());
        assert_eq!(view.inventory.count_checked(), 0);
    }

    #[test]
    fn test_unparseable_return_date_still_closes() {
        let view = DeliveryView::from_raw_value(raw_row(json!("01/03/2025"))).unwrap();

        assert_eq!(view.status(), DeliveryStatus::Closed);
        assert!(!view.can_register_return());
        assert!(view.return_info.date.is_none());
        assert!(view.check_return(&return_patch("2025-03-01", 15000)).is_err());
    }

    #[test]
    fn test_missing_return_date_is_open() {
        let mut row = raw_row(Value::Null);
        row.as_object_mut().unwrap().remove("fecha_devolucion");
        let view = DeliveryView::from_raw_value(row).unwrap();
        assert!(view.is_open());
    }

    fn return_patch(date: &str, km: u32) -> ReturnPatch {
        ReturnPatch {
            return_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            return_place: "Base central".to_string(),
            return_odometer: km,
            notes: Some("Sin novedades".to_string()),
        }
    }

    #[test]
    fn test_return_patch_has_only_return_fields() {
        let patch = DeliveryPatch::Closing {
            id: 10,
            fields: return_patch("2025-03-01", 15000),
        };
        let payload = patch.payload().unwrap();
        let keys: Vec<&str> = payload.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys.len(), 4);
        for key in ["fecha_devolucion", "lugar_devolucion", "km_devolucion", "observaciones"] {
            assert!(keys.contains(&key), "falta {}", key);
        }
        for item in InventoryItem::ALL {
            assert!(payload.get(item.key()).is_none());
        }
        assert_eq!(payload["fecha_devolucion"], json!("2025-03-01"));
        assert_eq!(patch.method(), Method::PATCH);
        assert_eq!(patch.path(), "/entrega/10/finalizar");
    }

    #[test]
    fn test_apply_return_closes_once() {
        let mut view = DeliveryView::from_raw_value(raw_row(json!(""))).unwrap();
        let patch = return_patch("2025-03-01", 15000);

        assert!(view.check_return(&patch).is_ok());
        let inventory_before = view.inventory;
        let handover_before = view.handover.clone();
        view.apply_return(&patch);

        assert_eq!(view.status(), DeliveryStatus::Closed);
        assert_eq!(view.distance(), Some(3000));
        assert_eq!(view.inventory, inventory_before);
        assert_eq!(view.handover, handover_before);

        let err = view.check_return(&patch).unwrap_err();
        assert!(err.user_message().contains("ya fue finalizada"));
    }

    #[test]
    fn test_check_return_rejects_inconsistent_data() {
        let view = DeliveryView::from_raw_value(raw_row(json!(null))).unwrap();
        assert!(view.check_return(&return_patch("2025-01-01", 15000)).is_err());
        assert!(view.check_return(&return_patch("2025-03-01", 11000)).is_err());
    }

    #[test]
    fn test_opening_payload() {
        let mut inventory = Inventory::default();
        inventory.set(InventoryItem::Keys, true);
        let new = NewDelivery {
            vehicle_id: 3,
            client_id: 5,
            deliverer: "Luis Díaz".to_string(),
            deliverer_document: "20111222".to_string(),
            receiver: "Ana Gómez".to_string(),
            receiver_document: "30123456".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            place: "Base central".to_string(),
            odometer: 12000,
            fuel_level: "3/4".to_string(),
            notes: None,
            inventory,
        };
        assert!(new.validate().is_ok());

        let patch = DeliveryPatch::Opening(new);
        let payload = patch.payload().unwrap();
        assert_eq!(payload["llaves"], json!(1));
        assert_eq!(payload["gato"], json!(0));
        assert_eq!(payload["fecha_entrega"], json!("2025-02-10"));
        assert_eq!(payload.as_object().unwrap().len(), INVENTORY_SIZE + 11);
        assert_eq!(patch.method(), Method::POST);
    }
}
