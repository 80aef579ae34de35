//! Deserializadores tolerantes para los payloads del backend
//!
//! El backend no es consistente: fechas vacías o `0000-00-00`, números que
//! llegan como strings y booleanos codificados como `0/1`.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Fecha "sin valor" que devuelve el backend (columna DATE en cero)
pub const ZERO_DATE: &str = "0000-00-00";

/// Interpretar un valor de fecha; vacío y `0000-00-00` equivalen a ausente
pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with(ZERO_DATE) {
        return None;
    }
    // "2025-03-01" o "2025-03-01T00:00:00.000Z"
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Interpretar un flag `0/1`, `"0"/"1"`, `true/false`; cualquier otra cosa es `false`
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "si" | "sí"),
        _ => false,
    }
}

pub fn parse_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_date_value))
}

pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_string))
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string(deserializer)?.unwrap_or_default())
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_flag).unwrap_or(false))
}

pub fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_u32))
}

/// Montos: `null` o vacío valen cero; números y strings numéricos se parsean
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match &value {
        None | Some(Value::Null) => Some(Decimal::ZERO),
        Some(Value::String(s)) if s.trim().is_empty() => Some(Decimal::ZERO),
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Some(_) => None,
    }
    .ok_or_else(|| serde::de::Error::custom(format!("monto inválido: {:?}", value)))
}

/// Ids numéricos que a veces llegan como string
pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| serde::de::Error::custom(format!("id inválido: {}", value)))
}
