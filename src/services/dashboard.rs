//! Tablero principal
//!
//! Pide en paralelo vehículos, clientes, entregas y estadísticas. Cada
//! porción es independiente: si una falla las demás se muestran igual.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use tracing::{debug, warn};

use crate::clients::ApiClient;
use crate::models::{ChartPoint, Client, DeliveryView, Stats, Vehicle, VehicleStatus};
use crate::services::entity::fetch_all;
use crate::utils::errors::{ApiError, ApiResult};

pub struct DashboardSnapshot {
    pub vehicles: ApiResult<Vec<Vehicle>>,
    pub clients: ApiResult<Vec<Client>>,
    pub deliveries: ApiResult<Vec<DeliveryView>>,
    pub stats: ApiResult<Stats>,
}

impl DashboardSnapshot {
    /// Cantidad de vehículos por estado (todos los estados presentes)
    pub fn fleet_summary(&self) -> BTreeMap<VehicleStatus, usize> {
        let mut summary: BTreeMap<VehicleStatus, usize> =
            VehicleStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        if let Ok(vehicles) = &self.vehicles {
            for vehicle in vehicles {
                *summary.entry(vehicle.status).or_insert(0) += 1;
            }
        }
        summary
    }

    pub fn open_deliveries(&self) -> usize {
        self.deliveries
            .as_ref()
            .map(|d| d.iter().filter(|d| d.is_open()).count())
            .unwrap_or(0)
    }

    /// Vehículos con la póliza vencida a la fecha indicada
    pub fn expired_insurance(&self, today: NaiveDate) -> Vec<&Vehicle> {
        self.vehicles
            .as_ref()
            .map(|v| v.iter().filter(|v| v.insurance_expired(today)).collect())
            .unwrap_or_default()
    }

    /// Errores de las porciones que fallaron
    pub fn errors(&self) -> Vec<&ApiError> {
        let mut errors = Vec::new();
        if let Err(e) = &self.vehicles {
            errors.push(e);
        }
        if let Err(e) = &self.clients {
            errors.push(e);
        }
        if let Err(e) = &self.deliveries {
            errors.push(e);
        }
        if let Err(e) = &self.stats {
            errors.push(e);
        }
        errors
    }
}

pub struct Dashboard {
    api: ApiClient,
}

impl Dashboard {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fan-out de las cuatro consultas y fan-in de los resultados
    pub async fn load(&self) -> DashboardSnapshot {
        let (vehicles, clients, deliveries, stats) = futures::join!(
            fetch_all::<Vehicle>(&self.api),
            fetch_all::<Client>(&self.api),
            fetch_all::<DeliveryView>(&self.api),
            self.api.get::<Stats>("/stats"),
        );

        let snapshot = DashboardSnapshot {
            vehicles,
            clients,
            deliveries,
            stats,
        };
        for error in snapshot.errors() {
            warn!("❌ Porción del tablero sin datos: {}", error);
        }
        debug!("📊 Tablero cargado");
        snapshot
    }

    /// GET /stats/chart
    pub async fn load_chart(&self) -> ApiResult<Vec<ChartPoint>> {
        self.api.get("/stats/chart").await
    }
}
