//! Controlador genérico de colecciones
//!
//! Mismo patrón para vehículos, clientes, usuarios y entregas:
//! listado del servidor -> búsqueda -> edición en modal -> PATCH -> refresco
//! local. El estado local solo cambia después de que el backend confirma,
//! salvo en `save_optimistic`, que revierte si el backend rechaza.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use validator::Validate;

use crate::clients::{segment, ApiClient};
use crate::services::entity::{fetch_all, form_payload, Creatable, Deletable, Editable, Entity};
use crate::services::notifications::{Confirmer, Notifier};
use crate::utils::errors::{not_found_error, ApiError, ApiResult};

pub struct CollectionController<E: Entity> {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    server_list: Vec<E>,
    search_term: String,
    filtered: Vec<E>,
    editing: Option<E>,
}

impl<E: Entity> CollectionController<E> {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            server_list: Vec::new(),
            search_term: String::new(),
            filtered: Vec::new(),
            editing: None,
        }
    }

    /// Listado completo tal como llegó del servidor
    pub fn items(&self) -> &[E] {
        &self.server_list
    }

    /// Listado filtrado por el término de búsqueda actual
    pub fn filtered(&self) -> &[E] {
        &self.filtered
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn editing(&self) -> Option<&E> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut E> {
        self.editing.as_mut()
    }

    pub fn find(&self, id: i64) -> Option<&E> {
        self.server_list.iter().find(|r| r.id() == id)
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Traer el listado del servidor y reaplicar la búsqueda
    pub async fn load(&mut self) -> ApiResult<()> {
        match fetch_all::<E>(&self.api).await {
            Ok(items) => {
                debug!("📋 {} registros de {}", items.len(), E::NAME);
                self.set_items(items);
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Reemplazar el listado (p. ej. con datos traídos por el tablero)
    pub fn set_items(&mut self, items: Vec<E>) {
        self.server_list = items;
        self.refilter();
    }

    /// Filtrar por subcadena, sin distinguir mayúsculas, sobre todos los
    /// campos visibles de cada registro. Un término vacío devuelve todo.
    pub fn search(&mut self, term: &str) -> &[E] {
        self.search_term = term.to_string();
        self.refilter();
        &self.filtered
    }

    fn refilter(&mut self) {
        let needle = self.search_term.trim().to_lowercase();
        self.filtered = if needle.is_empty() {
            self.server_list.clone()
        } else {
            self.server_list
                .iter()
                .filter(|record| record_matches(*record, &needle))
                .cloned()
                .collect()
        };
    }

    /// Copiar el registro al buffer de edición (abre el modal)
    pub fn begin_edit(&mut self, id: i64) -> ApiResult<&mut E> {
        let record = self
            .find(id)
            .cloned()
            .ok_or_else(|| not_found_error(E::NAME, &id.to_string()))?;
        Ok(self.editing.insert(record))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Incorporar un registro confirmado por el backend
    pub fn replace_local(&mut self, record: E) {
        match self.server_list.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => self.server_list.push(record),
        }
        self.refilter();
    }

    fn remove_local(&mut self, id: i64) {
        self.server_list.retain(|r| r.id() != id);
        self.refilter();
    }
}

impl<E: Creatable> CollectionController<E> {
    /// Alta desde un formulario validado; luego se recarga el listado
    pub async fn create<F: Serialize + Validate>(&mut self, form: &F) -> ApiResult<()> {
        let result = async {
            let payload = form_payload(E::field_map(), form)?;
            self.api.post::<_, Value>(E::ITEM_PATH, &payload).await
        }
        .await;

        match result {
            Ok(_) => {
                info!("➕ {} creado", E::NAME);
                self.notifier.success(&format!("{} creado correctamente", E::NAME));
                self.load().await
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }
}

impl<E: Editable> CollectionController<E> {
    /// PATCH del registro; el listado local cambia solo si el backend confirma
    pub async fn save(&mut self, record: E) -> ApiResult<()> {
        match self.send_patch(&record).await {
            Ok(()) => {
                self.replace_local(record);
                self.editing = None;
                self.notifier.success(&format!("{} actualizado correctamente", E::NAME));
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Guardar lo que está en el buffer de edición
    pub async fn save_editing(&mut self) -> ApiResult<()> {
        let record = self
            .editing
            .clone()
            .ok_or_else(|| ApiError::NotFound("No hay registro en edición".to_string()))?;
        self.save(record).await
    }

    /// Variante optimista: aplica el cambio antes de confirmar y lo revierte
    /// si el backend lo rechaza.
    pub async fn save_optimistic(&mut self, record: E) -> ApiResult<()> {
        let previous = self.find(record.id()).cloned();
        self.replace_local(record.clone());

        match self.send_patch(&record).await {
            Ok(()) => {
                self.editing = None;
                self.notifier.success(&format!("{} actualizado correctamente", E::NAME));
                Ok(())
            }
            Err(e) => {
                match previous {
                    Some(previous) => self.replace_local(previous),
                    None => self.remove_local(record.id()),
                }
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    async fn send_patch(&self, record: &E) -> ApiResult<()> {
        record.validate_edit()?;
        let path = format!("{}/{}", E::ITEM_PATH, segment(record.id()));
        let payload = record.to_backend()?;
        self.api.patch::<_, Value>(&path, &payload).await?;
        Ok(())
    }
}

impl<E: Deletable> CollectionController<E> {
    /// Borrar previa confirmación del operador. Si no confirma no se envía
    /// nada y se devuelve `Cancelled`.
    pub async fn delete(&mut self, id: i64, confirmer: &dyn Confirmer) -> ApiResult<()> {
        let prompt = format!("¿Eliminar {} #{}?", E::NAME.to_lowercase(), id);
        if !confirmer.confirm(&prompt).await {
            return Err(ApiError::Cancelled);
        }

        let path = format!("{}/{}", E::ITEM_PATH, segment(id));
        match self.api.delete::<Value>(&path).await {
            Ok(_) => {
                self.remove_local(id);
                if self.editing.as_ref().map(|r| r.id()) == Some(id) {
                    self.editing = None;
                }
                self.notifier.success(&format!("{} eliminado correctamente", E::NAME));
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }
}

/// Verdadero si algún campo de texto o numérico contiene `needle` (ya en
/// minúsculas). Los booleanos y nulos no son texto visible y se ignoran.
pub fn record_matches<T: Serialize>(record: &T, needle: &str) -> bool {
    match serde_json::to_value(record) {
        Ok(value) => value_matches(&value, needle),
        Err(_) => false,
    }
}

fn value_matches(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|v| value_matches(v, needle)),
        Value::Object(fields) => fields.values().any(|v| value_matches(v, needle)),
        Value::Bool(_) | Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::Vehicle;
    use crate::services::notifications::NotificationQueue;
    use crate::session::Session;
    use serde_json::json;

    fn controller() -> CollectionController<Vehicle> {
        let api = ApiClient::new(&AppConfig::for_base_url("http://127.0.0.1:9"), Session::in_memory())
            .unwrap();
        let mut controller = CollectionController::new(api, Arc::new(NotificationQueue::default()));
        controller.set_items(vec![
            Vehicle::from_backend(json!({ "id_vehiculo": 1, "patente": "AF876QA", "marca": "Ford", "modelo": "Ranger", "numero_interno": 101 })).unwrap(),
            Vehicle::from_backend(json!({ "id_vehiculo": 2, "patente": "AB123CD", "marca": "Toyota", "modelo": "Hilux", "ministerio": "Salud" })).unwrap(),
            Vehicle::from_backend(json!({ "id_vehiculo": 3, "patente": "AC555ZZ", "marca": "Fiat", "modelo": "Cronos", "ministerio": "Educación" })).unwrap(),
        ]);
        controller
    }

    fn ids(records: &[Vehicle]) -> Vec<i64> {
        records.iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let mut c = controller();
        assert_eq!(ids(c.search("")), vec![1, 2, 3]);
        assert_eq!(ids(c.search("   ")), vec![1, 2, 3]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_fields() {
        let mut c = controller();
        assert_eq!(ids(c.search("ford")), vec![1]);
        assert_eq!(ids(c.search("af876")), vec![1]);
        assert_eq!(ids(c.search("SALUD")), vec![2]);
        assert_eq!(ids(c.search("101")), vec![1]);
        assert!(c.search("inexistente").is_empty());
    }

    #[test]
    fn test_search_is_idempotent() {
        let mut c = controller();
        let first = ids(c.search("o"));
        let second = ids(c.search("o"));
        assert_eq!(first, second);
        assert_eq!(c.search_term(), "o");
    }

    #[test]
    fn test_booleans_are_not_searchable_text() {
        assert!(!record_matches(&json!({ "pagada": true }), "true"));
        assert!(record_matches(&json!({ "anidado": { "nombre": "Ana" } }), "ana"));
    }

    #[test]
    fn test_begin_edit_clones_record() {
        let mut c = controller();
        c.begin_edit(2).unwrap().brand = "Otra".to_string();

        assert_eq!(c.editing().unwrap().brand, "Otra");
        assert_eq!(c.find(2).unwrap().brand, "Toyota");

        c.cancel_edit();
        assert!(c.editing().is_none());
        assert!(c.begin_edit(99).is_err());
    }

    #[test]
    fn test_replace_local_keeps_filter() {
        let mut c = controller();
        c.search("toyota");
        let mut updated = c.find(2).unwrap().clone();
        updated.brand = "Renault".to_string();
        c.replace_local(updated);

        assert!(c.filtered().is_empty());
        assert_eq!(c.find(2).unwrap().brand, "Renault");
    }
}
