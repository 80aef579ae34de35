mod common;

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use common::{client_for, logged_in, serve};
use flota_admin::models::{
    DeliveryStatus, Inventory, InventoryItem, NewDelivery, ReturnPatch, Vehicle, VehicleStatus,
};
use flota_admin::services::{CollectionController, DeliveryService, NotificationQueue};
use flota_admin::ApiError;

/// Backend con estado: una entrega alquila el vehículo y el cierre lo libera
#[derive(Default)]
struct Fleet {
    vehicle_status: String,
    deliveries: Vec<Value>,
    closings: Vec<Value>,
}

type Shared = Arc<Mutex<Fleet>>;

async fn list_vehicles(State(fleet): State<Shared>) -> Json<Value> {
    let fleet = fleet.lock().unwrap();
    Json(json!({
        "ok": true,
        "data": [{
            "id_vehiculo": 1,
            "patente": "AF876QA",
            "marca": "Ford",
            "modelo": "Ranger",
            "estado": fleet.vehicle_status
        }]
    }))
}

async fn list_deliveries(State(fleet): State<Shared>) -> Json<Value> {
    let fleet = fleet.lock().unwrap();
    Json(json!({ "ok": true, "data": fleet.deliveries }))
}

async fn open_delivery(State(fleet): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut fleet = fleet.lock().unwrap();
    let id = fleet.deliveries.len() as i64 + 1;

    let mut row = body.as_object().cloned().unwrap_or_default();
    row.insert("id_entrega".into(), json!(id));
    row.insert("marca".into(), json!("Ford"));
    row.insert("modelo".into(), json!("Ranger"));
    row.insert("patente".into(), json!("AF876QA"));
    row.insert("cliente".into(), json!("Ana Gómez"));
    row.insert("fecha_devolucion".into(), json!("0000-00-00"));
    fleet.deliveries.push(Value::Object(row));
    fleet.vehicle_status = "RENTED".to_string();

    Json(json!({ "ok": true, "data": { "id_entrega": id } }))
}

async fn close_delivery(
    State(fleet): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut fleet = fleet.lock().unwrap();
    fleet.closings.push(body.clone());

    let Some(row) = fleet
        .deliveries
        .iter_mut()
        .find(|d| d["id_entrega"] == json!(id))
    else {
        return Json(json!({ "ok": false, "msg": "Entrega inexistente" }));
    };
    for (key, value) in body.as_object().cloned().unwrap_or_default() {
        row[key.as_str()] = value;
    }
    fleet.vehicle_status = "AVAILABLE".to_string();

    Json(json!({ "ok": true, "msg": "Entrega finalizada" }))
}

async fn start_fleet() -> (String, Shared) {
    let fleet: Shared = Arc::new(Mutex::new(Fleet {
        vehicle_status: "AVAILABLE".to_string(),
        ..Default::default()
    }));
    let router = Router::new()
        .route("/vehiculos", get(list_vehicles))
        .route("/entregas", get(list_deliveries))
        .route("/entrega", post(open_delivery))
        .route("/entrega/:id/finalizar", patch(close_delivery))
        .with_state(fleet.clone());
    (serve(router).await, fleet)
}

fn new_delivery() -> NewDelivery {
    let mut inventory = Inventory::complete();
    inventory.set(InventoryItem::SideMirrors, false);

    NewDelivery {
        vehicle_id: 1,
        client_id: 5,
        deliverer: "Luis Díaz".to_string(),
        deliverer_document: "20111222".to_string(),
        receiver: "Ana Gómez".to_string(),
        receiver_document: "30123456".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
        place: "Base central".to_string(),
        odometer: 12000,
        fuel_level: "3/4".to_string(),
        notes: None,
        inventory,
    }
}

fn return_patch(date: NaiveDate, odometer: u32) -> ReturnPatch {
    ReturnPatch {
        return_date: date,
        return_place: "Base central".to_string(),
        return_odometer: odometer,
        notes: Some("Sin novedades".to_string()),
    }
}

#[tokio::test]
async fn test_delivery_lifecycle_rents_and_releases_vehicle() {
    let (base_url, fleet) = start_fleet().await;
    let api = client_for(&base_url, logged_in("t"));
    let queue = Arc::new(NotificationQueue::default());
    let mut vehicles: CollectionController<Vehicle> =
        CollectionController::new(api.clone(), queue.clone());
    let mut service = DeliveryService::new(api, queue.clone());

    vehicles.load().await.unwrap();
    assert_eq!(vehicles.items()[0].plate, "AF876QA");
    assert_eq!(vehicles.items()[0].status, VehicleStatus::Available);

    // Entrega
    service.open(new_delivery()).await.unwrap();
    vehicles.load().await.unwrap();
    assert_eq!(vehicles.items()[0].status, VehicleStatus::Rented);

    assert_eq!(service.search("af876").len(), 1);
    assert!(service.search("inexistente").is_empty());

    let open = service.open_deliveries();
    assert_eq!(open.len(), 1);
    let id = open[0].id;
    assert_eq!(open[0].status(), DeliveryStatus::Open);
    assert!(!open[0].inventory.checked(InventoryItem::SideMirrors));
    assert_eq!(open[0].inventory.count_checked(), 34);

    // Devolución
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let closed = service.close(id, return_patch(date, 15000)).await.unwrap();
    assert_eq!(closed.status(), DeliveryStatus::Closed);
    assert_eq!(closed.return_info.date, Some(date));
    assert_eq!(closed.distance(), Some(3000));

    let closing = fleet.lock().unwrap().closings[0].clone();
    let mut keys: Vec<&String> = closing.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["fecha_devolucion", "km_devolucion", "lugar_devolucion", "observaciones"]
    );
    assert_eq!(closing["fecha_devolucion"], "2025-03-01");
    assert_eq!(closing["km_devolucion"], 15000);

    vehicles.load().await.unwrap();
    assert_eq!(vehicles.items()[0].status, VehicleStatus::Available);

    service.load().await.unwrap();
    assert!(service.open_deliveries().is_empty());
    assert_eq!(
        service.deliveries().find(id).unwrap().status(),
        DeliveryStatus::Closed
    );

    // No hay reapertura ni doble cierre
    let err = service.close(id, return_patch(date, 16000)).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition(_)));
    assert_eq!(fleet.lock().unwrap().closings.len(), 1);
}

#[tokio::test]
async fn test_return_cannot_precede_handover() {
    let (base_url, fleet) = start_fleet().await;
    let api = client_for(&base_url, logged_in("t"));
    let mut service = DeliveryService::new(api, Arc::new(NotificationQueue::default()));
    service.open(new_delivery()).await.unwrap();
    let id = service.open_deliveries()[0].id;

    let early = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let err = service.close(id, return_patch(early, 15000)).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition(_)));

    let late = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let err = service.close(id, return_patch(late, 11000)).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidTransition(_)));

    assert!(fleet.lock().unwrap().closings.is_empty());
    assert_eq!(fleet.lock().unwrap().vehicle_status, "RENTED");
}

#[tokio::test]
async fn test_invalid_delivery_form_is_not_sent() {
    let (base_url, fleet) = start_fleet().await;
    let api = client_for(&base_url, logged_in("t"));
    let mut service = DeliveryService::new(api, Arc::new(NotificationQueue::default()));

    let mut delivery = new_delivery();
    delivery.receiver_document = "12".to_string();
    let err = service.open(delivery).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(fleet.lock().unwrap().deliveries.is_empty());
}
