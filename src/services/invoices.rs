//! Facturación mensual por vehículo

use std::sync::Arc;

use serde_json::Value;

use crate::clients::{segment, ApiClient};
use crate::models::invoice::{Invoice, InvoiceBook, Month};
use crate::services::notifications::Notifier;
use crate::utils::errors::ApiResult;

pub struct InvoiceService {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl InvoiceService {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Libro del año con los 12 meses, cargados o vacíos
    pub async fn load(&self, vehicle_id: i64, year: i32) -> ApiResult<InvoiceBook> {
        let path = format!("/facturas/{}/{}", segment(vehicle_id), segment(year));
        let rows: Option<Vec<Value>> = self.api.get(&path).await?;
        InvoiceBook::from_rows(vehicle_id, year, rows.unwrap_or_default())
    }

    /// Guardar la factura de un mes; el libro cambia solo si el backend confirma
    pub async fn save(&self, book: &mut InvoiceBook, month: Month, invoice: Invoice) -> ApiResult<()> {
        let path = format!(
            "/factura/{}/{}/{}",
            segment(book.vehicle_id),
            segment(book.year),
            month.name()
        );
        let payload = invoice.to_backend()?;

        match self.api.patch::<_, Value>(&path, &payload).await {
            Ok(_) => {
                book.set(month, Some(invoice));
                self.notifier
                    .success(&format!("Factura de {} guardada", month.name()));
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }
}
