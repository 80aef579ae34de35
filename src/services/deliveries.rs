//! Servicio de entregas
//!
//! Las entregas se leen con el controlador genérico pero solo se escriben
//! con `DeliveryPatch`: alta (datos de entrega + inventario) o cierre
//! (datos de devolución). No existe reapertura.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::clients::{segment, ApiClient};
use crate::models::delivery::{DeliveryPatch, DeliveryView, NewDelivery, ReturnPatch};
use crate::services::collection::CollectionController;
use crate::services::notifications::Notifier;
use crate::utils::errors::ApiResult;

pub struct DeliveryService {
    api: ApiClient,
    deliveries: CollectionController<DeliveryView>,
}

impl DeliveryService {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            deliveries: CollectionController::new(api.clone(), notifier),
            api,
        }
    }

    pub fn deliveries(&self) -> &CollectionController<DeliveryView> {
        &self.deliveries
    }

    /// Búsqueda sobre el listado; la única operación mutable expuesta
    pub fn search(&mut self, term: &str) -> &[DeliveryView] {
        self.deliveries.search(term)
    }

    pub async fn load(&mut self) -> ApiResult<()> {
        self.deliveries.load().await
    }

    /// Entregas que todavía esperan la devolución
    pub fn open_deliveries(&self) -> Vec<&DeliveryView> {
        self.deliveries.items().iter().filter(|d| d.is_open()).collect()
    }

    /// GET /entrega/{id}, normalizado; actualiza la copia local
    pub async fn get(&mut self, id: i64) -> ApiResult<DeliveryView> {
        let path = format!("/entrega/{}", segment(id));
        let raw: Value = self.api.get(&path).await?;
        let view = DeliveryView::from_raw_value(raw)?;
        self.deliveries.replace_local(view.clone());
        Ok(view)
    }

    /// Registrar una nueva entrega; el backend marca el vehículo como alquilado
    pub async fn open(&mut self, delivery: NewDelivery) -> ApiResult<()> {
        let patch = DeliveryPatch::Opening(delivery);
        match self.submit(&patch).await {
            Ok(()) => {
                self.deliveries.notifier().success("Entrega registrada correctamente");
                self.deliveries.load().await
            }
            Err(e) => {
                self.deliveries.notifier().error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Registrar la devolución de una entrega abierta
    pub async fn close(&mut self, id: i64, fields: ReturnPatch) -> ApiResult<DeliveryView> {
        let current = match self.deliveries.find(id).cloned() {
            Some(view) => view,
            None => self.get(id).await?,
        };

        if let Err(e) = current.check_return(&fields) {
            self.deliveries.notifier().error(&e.user_message());
            return Err(e);
        }

        let patch = DeliveryPatch::Closing {
            id,
            fields: fields.clone(),
        };
        match self.submit(&patch).await {
            Ok(()) => {
                let mut closed = current;
                closed.apply_return(&fields);
                self.deliveries.replace_local(closed.clone());
                info!("🔒 Entrega {} finalizada", id);
                self.deliveries.notifier().success("Devolución registrada correctamente");
                Ok(closed)
            }
            Err(e) => {
                self.deliveries.notifier().error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Enviar una escritura ya construida
    pub async fn submit(&self, patch: &DeliveryPatch) -> ApiResult<()> {
        patch.validate()?;
        let payload = patch.payload()?;
        self.api
            .send(patch.method(), &patch.path(), Some(&payload))
            .await?;
        Ok(())
    }
}
