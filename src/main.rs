use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use flota_admin::export::{self, DeliveryReceipt};
use flota_admin::models::{Client, Credentials, DeliveryView, Vehicle};
use flota_admin::services::entity::fetch_all;
use flota_admin::services::{AuthService, Dashboard, DeliveryService, TracingNotifier};
use flota_admin::session::FileTokenStore;
use flota_admin::{ApiClient, AppConfig, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚗 Flota Admin - Administración de alquiler de vehículos");
    info!("=======================================================");

    let config = AppConfig::from_env().context("Configuración inválida")?;
    info!("🌐 Backend: {} ({})", config.api_base_url, config.environment);

    let session = Session::new(Arc::new(FileTokenStore::new(&config.token_path)));
    let api = ApiClient::new(&config, session.clone())?;
    let auth = AuthService::new(api.clone());

    if !auth.validate().await? {
        let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
            error!("❌ Sin sesión válida y sin ADMIN_EMAIL/ADMIN_PASSWORD configurados");
            return Err(anyhow::anyhow!("No hay sesión iniciada"));
        };
        let credentials = Credentials {
            email: email.clone(),
            password: password.clone(),
        };
        auth.login(&credentials)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    let command = std::env::args().nth(1).unwrap_or_else(|| "resumen".to_string());
    match command.as_str() {
        "resumen" => summary(&api).await,
        "exportar" => export_lists(&api, &config).await,
        "recibo" => {
            let id: i64 = std::env::args()
                .nth(2)
                .context("Uso: flota-admin recibo <id_entrega>")?
                .parse()
                .context("El id de entrega debe ser numérico")?;
            receipt(&api, &config, id).await
        }
        other => Err(anyhow::anyhow!(
            "Comando desconocido '{}'. Usar: resumen | exportar | recibo <id>",
            other
        )),
    }
}

async fn summary(api: &ApiClient) -> Result<()> {
    let snapshot = Dashboard::new(api.clone()).load().await;

    info!("📊 Estado de la flota:");
    for (status, count) in snapshot.fleet_summary() {
        info!("   {:<14} {}", status.label(), count);
    }
    if let Ok(clients) = &snapshot.clients {
        info!("👥 Clientes: {}", clients.len());
    }
    info!("📦 Entregas abiertas: {}", snapshot.open_deliveries());
    let expired = snapshot.expired_insurance(chrono::Local::now().date_naive());
    if !expired.is_empty() {
        warn!("🛡️ {} vehículos con la póliza vencida", expired.len());
        for vehicle in expired {
            info!("   {} {}", vehicle.plate, vehicle.display_name());
        }
    }
    if let Ok(stats) = &snapshot.stats {
        info!("📈 Estadísticas del backend: {:?}", stats);
    }

    let errors = snapshot.errors();
    if !errors.is_empty() {
        warn!("⚠️ {} porciones del tablero no se pudieron cargar", errors.len());
    }
    Ok(())
}

async fn export_lists(api: &ApiClient, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(&config.export_dir)?;
    let dir = &config.export_dir;

    let clients: Vec<Client> = fetch_all(api).await?;
    export::write_csv(&dir.join("clientes.csv"), &clients, export::CLIENT_COLUMNS)?;
    export::write_xlsx(&dir.join("clientes.xlsx"), "Clientes", &clients, export::CLIENT_COLUMNS)?;

    let vehicles: Vec<Vehicle> = fetch_all(api).await?;
    export::write_csv(&dir.join("vehiculos.csv"), &vehicles, export::VEHICLE_COLUMNS)?;
    export::write_xlsx(&dir.join("vehiculos.xlsx"), "Vehículos", &vehicles, export::VEHICLE_COLUMNS)?;

    let deliveries: Vec<DeliveryView> = fetch_all(api).await?;
    export::write_csv(&dir.join("entregas.csv"), &deliveries, export::DELIVERY_COLUMNS)?;
    export::write_xlsx(&dir.join("entregas.xlsx"), "Entregas", &deliveries, export::DELIVERY_COLUMNS)?;

    info!("✅ Exportaciones guardadas en {}", dir.display());
    Ok(())
}

async fn receipt(api: &ApiClient, config: &AppConfig, id: i64) -> Result<()> {
    let mut service = DeliveryService::new(api.clone(), Arc::new(TracingNotifier));
    let delivery = service.get(id).await?;

    std::fs::create_dir_all(&config.export_dir)?;
    let path = config.export_dir.join(format!("entrega_{}.pdf", id));
    DeliveryReceipt::from_config(config).render(&delivery, &path)?;
    Ok(())
}
