//! Administración de flota de alquiler
//!
//! Cliente del backend REST: vehículos, clientes, entregas con inventario,
//! facturación mensual, tablero y exportaciones (CSV, Excel y PDF).

pub mod clients;
pub mod config;
pub mod export;
pub mod mapping;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use clients::ApiClient;
pub use config::AppConfig;
pub use session::Session;
pub use utils::{ApiError, ApiResult};
