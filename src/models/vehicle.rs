//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle (modelo de vista de la flota) y
//! el formulario de alta. Los nombres de campo del backend se traducen con
//! `mapping::VEHICLE_FIELDS`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::wire;
use crate::utils::validation::{validate_not_empty, validate_patente};

/// Estado del vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    #[serde(alias = "DISPONIBLE", alias = "disponible")]
    Available,
    #[serde(alias = "ALQUILADO", alias = "alquilado")]
    Rented,
    #[serde(alias = "NO_DISPONIBLE", alias = "no_disponible")]
    Unavailable,
    #[serde(alias = "MANTENIMIENTO", alias = "mantenimiento")]
    Maintenance,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::Available,
        VehicleStatus::Rented,
        VehicleStatus::Unavailable,
        VehicleStatus::Maintenance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "Disponible",
            VehicleStatus::Rented => "Alquilado",
            VehicleStatus::Unavailable => "No disponible",
            VehicleStatus::Maintenance => "Mantenimiento",
        }
    }
}

impl Default for VehicleStatus {
    fn default() -> Self {
        VehicleStatus::Available
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vehículo de la flota, con nombres de campo de UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(deserialize_with = "wire::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub internal_number: Option<String>,
    pub plate: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub brand: String,
    #[serde(default, deserialize_with = "wire::string")]
    pub model: String,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub acquisition_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub insurance_company: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub policy_number: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub policy_expiry: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub responsible: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub ministry: Option<String>,
}

impl Vehicle {
    /// Texto "marca modelo" usado en los listados
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }

    /// Póliza vencida respecto de una fecha de referencia
    pub fn insurance_expired(&self, today: NaiveDate) -> bool {
        self.policy_expiry.map(|d| d < today).unwrap_or(false)
    }
}

/// Formulario de alta de vehículo
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleForm {
    #[validate(custom = "validate_not_empty")]
    pub internal_number: String,

    #[validate(custom = "validate_patente")]
    pub plate: String,

    #[validate(length(min = 2, max = 100))]
    pub brand: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    pub acquisition_date: Option<NaiveDate>,

    pub status: VehicleStatus,

    #[validate(length(min = 2, max = 100))]
    pub insurance_company: Option<String>,

    pub policy_number: Option<String>,

    pub policy_expiry: Option<NaiveDate>,

    pub responsible: Option<String>,

    pub ministry: Option<String>,
}

impl VehicleForm {
    /// Normaliza la patente a mayúsculas sin espacios antes de validar
    pub fn normalize(&mut self) {
        self.plate = self
            .plate
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_uppercase();
    }
}
