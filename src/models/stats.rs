//! Estadísticas del tablero
//!
//! El backend calcula los agregados; acá solo se tipan.

use serde::{Deserialize, Serialize};

use crate::models::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default, alias = "total_vehiculos", alias = "vehiculos", deserialize_with = "wire::optional_u32")]
    pub total_vehicles: Option<u32>,
    #[serde(default, alias = "disponibles", deserialize_with = "wire::optional_u32")]
    pub available: Option<u32>,
    #[serde(default, alias = "alquilados", deserialize_with = "wire::optional_u32")]
    pub rented: Option<u32>,
    #[serde(default, alias = "mantenimiento", deserialize_with = "wire::optional_u32")]
    pub maintenance: Option<u32>,
    #[serde(default, alias = "total_clientes", alias = "clientes", deserialize_with = "wire::optional_u32")]
    pub total_clients: Option<u32>,
    #[serde(default, alias = "entregas_activas", deserialize_with = "wire::optional_u32")]
    pub active_deliveries: Option<u32>,
}

/// Punto de la serie del gráfico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(alias = "mes", alias = "name", alias = "label")]
    pub label: String,
    #[serde(alias = "total", alias = "cantidad", alias = "value")]
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_accept_backend_names() {
        let stats: Stats = serde_json::from_value(json!({
            "total_vehiculos": "12",
            "disponibles": 7,
            "alquilados": 4,
            "entregas_activas": 4
        }))
        .unwrap();
        assert_eq!(stats.total_vehicles, Some(12));
        assert_eq!(stats.rented, Some(4));
        assert!(stats.total_clients.is_none());
    }

    #[test]
    fn test_chart_point_aliases() {
        let points: Vec<ChartPoint> =
            serde_json::from_value(json!([{ "mes": "enero", "total": 3 }])).unwrap();
        assert_eq!(points[0].label, "enero");
        assert_eq!(points[0].value, 3.0);
    }
}
