//! Modelo de facturación mensual por vehículo
//!
//! Para cada par (vehículo, año) hay exactamente 12 casilleros, uno por mes,
//! que pueden estar vacíos.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapping::INVOICE_FIELDS;
use crate::models::wire;
use crate::utils::errors::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
        Month::Julio,
        Month::Agosto,
        Month::Septiembre,
        Month::Octubre,
        Month::Noviembre,
        Month::Diciembre,
    ];

    /// Número de mes 1..=12
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Month> {
        Month::ALL.get(n.checked_sub(1)? as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Month::Enero => "enero",
            Month::Febrero => "febrero",
            Month::Marzo => "marzo",
            Month::Abril => "abril",
            Month::Mayo => "mayo",
            Month::Junio => "junio",
            Month::Julio => "julio",
            Month::Agosto => "agosto",
            Month::Septiembre => "septiembre",
            Month::Octubre => "octubre",
            Month::Noviembre => "noviembre",
            Month::Diciembre => "diciembre",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = ApiError;

    /// Acepta el nombre en castellano (sin importar mayúsculas) o el número
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        if let Ok(n) = trimmed.parse::<u32>() {
            return Month::from_number(n)
                .ok_or_else(|| ApiError::NotFound(format!("mes '{}'", s)));
        }
        let normalized = if trimmed == "setiembre" { "septiembre".to_string() } else { trimmed };
        Month::ALL
            .into_iter()
            .find(|m| m.name() == normalized)
            .ok_or_else(|| ApiError::NotFound(format!("mes '{}'", s)))
    }
}

/// Factura de un mes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "wire::decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "wire::flag")]
    pub paid: bool,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub notes: Option<String>,
}

impl Invoice {
    /// Un casillero sin número ni monto se considera vacío
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.amount.is_zero() && self.date.is_none()
    }

    /// Cuerpo del PATCH con nombres del backend
    pub fn to_backend(&self) -> ApiResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("paid".to_string(), Value::from(u8::from(self.paid)));
        }
        Ok(INVOICE_FIELDS.to_backend(value))
    }
}

/// Libro de facturas de un vehículo para un año
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceBook {
    pub vehicle_id: i64,
    pub year: i32,
    months: BTreeMap<Month, Option<Invoice>>,
}

impl InvoiceBook {
    /// Libro vacío con los 12 meses
    pub fn new(vehicle_id: i64, year: i32) -> Self {
        Self {
            vehicle_id,
            year,
            months: Month::ALL.into_iter().map(|m| (m, None)).collect(),
        }
    }

    /// Armar el libro a partir de las filas del backend (una por mes cargado)
    pub fn from_rows(vehicle_id: i64, year: i32, rows: Vec<Value>) -> ApiResult<Self> {
        let mut book = Self::new(vehicle_id, year);
        for row in rows {
            let ui = INVOICE_FIELDS.to_ui(row);
            let month = match ui.get("month") {
                Some(Value::String(s)) => s.parse::<Month>()?,
                Some(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|n| Month::from_number(n as u32))
                    .ok_or_else(|| ApiError::NotFound(format!("mes '{}'", n)))?,
                _ => continue,
            };
            let invoice: Invoice = serde_json::from_value(ui)?;
            book.set(month, if invoice.is_empty() { None } else { Some(invoice) });
        }
        Ok(book)
    }

    pub fn get(&self, month: Month) -> Option<&Invoice> {
        self.months.get(&month).and_then(Option::as_ref)
    }

    pub fn set(&mut self, month: Month, invoice: Option<Invoice>) {
        self.months.insert(month, invoice);
    }

    /// Los 12 casilleros en orden
    pub fn slots(&self) -> impl Iterator<Item = (Month, Option<&Invoice>)> {
        self.months.iter().map(|(m, i)| (*m, i.as_ref()))
    }

    pub fn total_paid(&self) -> Decimal {
        self.slots()
            .filter_map(|(_, i)| i)
            .filter(|i| i.paid)
            .map(|i| i.amount)
            .sum()
    }

    pub fn total_pending(&self) -> Decimal {
        self.slots()
            .filter_map(|(_, i)| i)
            .filter(|i| !i.paid)
            .map(|i| i.amount)
            .sum()
    }
}
