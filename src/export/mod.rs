//! Exportaciones
//!
//! Los listados se exportan a CSV y Excel a partir de una configuración
//! declarativa de columnas: encabezado visible y ruta del campo en la
//! representación JSON del registro (`handover.date`, `vehicleData.plate`).
//! El comprobante de entrega se genera en PDF.

pub mod csv;
pub mod pdf;
pub mod xlsx;

use serde::Serialize;
use serde_json::Value;

use crate::utils::errors::ApiResult;

pub use self::csv::{read_csv, to_csv, write_csv};
pub use self::pdf::{inventory_bands, DeliveryReceipt, ReceiptImage};
pub use self::xlsx::write_xlsx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportColumn {
    pub header: &'static str,
    pub field: &'static str,
}

impl ExportColumn {
    pub const fn new(header: &'static str, field: &'static str) -> Self {
        Self { header, field }
    }
}

pub const CLIENT_COLUMNS: &[ExportColumn] = &[
    ExportColumn::new("ID", "id"),
    ExportColumn::new("Tipo", "clientType"),
    ExportColumn::new("Nombre", "name"),
    ExportColumn::new("Razón social", "legalName"),
    ExportColumn::new("DNI/CUIT", "dniCuit"),
    ExportColumn::new("Teléfono", "phone"),
    ExportColumn::new("Email", "email"),
];

pub const VEHICLE_COLUMNS: &[ExportColumn] = &[
    ExportColumn::new("ID", "id"),
    ExportColumn::new("Nro. interno", "internalNumber"),
    ExportColumn::new("Patente", "plate"),
    ExportColumn::new("Marca", "brand"),
    ExportColumn::new("Modelo", "model"),
    ExportColumn::new("Fecha adquisición", "acquisitionDate"),
    ExportColumn::new("Estado", "status"),
    ExportColumn::new("Aseguradora", "insuranceCompany"),
    ExportColumn::new("Póliza", "policyNumber"),
    ExportColumn::new("Vencimiento póliza", "policyExpiry"),
    ExportColumn::new("Responsable", "responsible"),
    ExportColumn::new("Ministerio", "ministry"),
];

pub const DELIVERY_COLUMNS: &[ExportColumn] = &[
    ExportColumn::new("ID", "id"),
    ExportColumn::new("Vehículo", "vehicleLabel"),
    ExportColumn::new("Patente", "vehicleData.plate"),
    ExportColumn::new("Cliente", "clientName"),
    ExportColumn::new("Fecha entrega", "handover.date"),
    ExportColumn::new("Lugar entrega", "handover.place"),
    ExportColumn::new("Km entrega", "handover.odometer"),
    ExportColumn::new("Fecha devolución", "returnInfo.date"),
    ExportColumn::new("Lugar devolución", "returnInfo.place"),
    ExportColumn::new("Km devolución", "returnInfo.odometer"),
    ExportColumn::new("Observaciones", "notes"),
];

/// Filas de texto listas para escribir, una por registro
pub fn rows<T: Serialize>(records: &[T], columns: &[ExportColumn]) -> ApiResult<Vec<Vec<String>>> {
    records
        .iter()
        .map(|record| {
            let value = serde_json::to_value(record)?;
            Ok(columns
                .iter()
                .map(|column| cell_text(lookup(&value, column.field)))
                .collect())
        })
        .collect()
}

pub fn headers(columns: &[ExportColumn]) -> Vec<&'static str> {
    columns.iter().map(|c| c.header).collect()
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "Sí".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_fields_are_resolved() {
        let record = json!({
            "id": 7,
            "handover": { "date": "2025-03-01", "odometer": 15000 },
            "returnInfo": { "date": null },
            "notes": null
        });
        let columns = [
            ExportColumn::new("ID", "id"),
            ExportColumn::new("Fecha", "handover.date"),
            ExportColumn::new("Km", "handover.odometer"),
            ExportColumn::new("Devolución", "returnInfo.date"),
            ExportColumn::new("Notas", "notes"),
            ExportColumn::new("Falta", "no.existe"),
        ];

        let rows = rows(&[record], &columns).unwrap();
        assert_eq!(rows, vec![vec!["7", "2025-03-01", "15000", "", "", ""]]);
    }

    #[test]
    fn test_presets_have_unique_headers() {
        for columns in [CLIENT_COLUMNS, VEHICLE_COLUMNS, DELIVERY_COLUMNS] {
            let mut seen = std::collections::HashSet::new();
            assert!(columns.iter().all(|c| seen.insert(c.header)));
        }
    }
}
