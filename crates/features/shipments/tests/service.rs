use serde_json::json;
use std::sync::Arc;
use tport_database::Database;
use tport_event_bus::EventBus;
use tport_shipments::{
    CreateShipmentRequest, LocationUpdateRequest, ShipmentCreated, ShipmentError, ShipmentRepository,
    ShipmentService, ShipmentStatus, ShipmentStatusChanged, UpdateShipmentRequest,
};

async fn service(events: EventBus) -> ShipmentService {
    let database = Database::builder()
        .url("mem://")
        .session("tport", "shipments")
        .migrations(tport_shipments::MIGRATIONS.iter().copied())
        .init()
        .await
        .unwrap();
    ShipmentService::new(ShipmentRepository::new(database), events)
}

fn create_request(body: serde_json::Value) -> CreateShipmentRequest {
    serde_json::from_value(body).unwrap()
}

fn update_request(body: serde_json::Value) -> UpdateShipmentRequest {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn create_assigns_ids_and_first_history_entry() {
    let events = EventBus::new();
    let mut created = events.consume::<ShipmentCreated>(4).unwrap();
    let service = service(events).await;

    let shipment = service
        .create(create_request(json!({
            "origin": {"city": "Lagos", "coordinates": {"lat": 6.5, "lng": 3.4}},
            "receiver": {"name": "Ada", "email": " ada@example.com "},
            "packageName": "Laptop"
        })))
        .await
        .unwrap();

    assert_eq!(shipment.id.len(), 12);
    assert!(shipment.tracking_id.starts_with("TRANS"));
    assert_eq!(shipment.status, ShipmentStatus::Pending);
    assert_eq!(shipment.receiver.email, "ada@example.com");
    assert_eq!(shipment.package.name, "Laptop");
    assert_eq!(shipment.tracking_history.len(), 1);
    assert_eq!(shipment.tracking_history[0].location, "Lagos");
    assert_eq!(shipment.tracking_history[0].notes, "Shipment created");

    let stored = service.get(&shipment.id).await.unwrap();
    assert_eq!(stored, shipment);

    let event = created.recv().await.unwrap();
    assert_eq!(event.shipment.tracking_id, shipment.tracking_id);
}

#[tokio::test]
async fn origin_without_city_is_labelled_origin() {
    let service = service(EventBus::new()).await;
    let shipment = service.create(create_request(json!({"status": "processing"}))).await.unwrap();

    assert_eq!(shipment.status, ShipmentStatus::Processing);
    assert_eq!(shipment.tracking_history[0].location, "Origin");
    assert_eq!(shipment.tracking_history[0].status, ShipmentStatus::Processing);
}

#[tokio::test]
async fn unknown_status_on_create_is_rejected() {
    let service = service(EventBus::new()).await;
    let err = service.create(create_request(json!({"status": "lost"}))).await.unwrap_err();
    assert!(matches!(err, ShipmentError::Validation { ref message, .. } if message == "Invalid status: lost"));
}

#[tokio::test]
async fn list_is_newest_first_and_filters_by_status() {
    let service = service(EventBus::new()).await;
    let first = service.create(create_request(json!({}))).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = service.create(create_request(json!({"status": "in-transit"}))).await.unwrap();

    let all = service.list(None).await.unwrap();
    let ids: Vec<_> = all.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);

    let in_transit = service.list(Some("In Transit")).await.unwrap();
    assert_eq!(in_transit.len(), 1);
    assert_eq!(in_transit[0].id, second.id);

    assert!(matches!(service.list(Some("nope")).await, Err(ShipmentError::Validation { .. })));
}

#[tokio::test]
async fn stats_count_every_status() {
    let service = service(EventBus::new()).await;
    for status in ["pending", "pending", "delivered"] {
        service.create(create_request(json!({"status": status}))).await.unwrap();
    }

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.count(ShipmentStatus::Pending), 2);
    assert_eq!(stats.count(ShipmentStatus::Delivered), 1);
    assert_eq!(stats.count(ShipmentStatus::OnHold), 0);
}

#[tokio::test]
async fn status_change_appends_history_and_publishes() {
    let events = EventBus::new();
    let mut changed = events.consume::<ShipmentStatusChanged>(4).unwrap();
    let service = service(events).await;
    let shipment = service.create(create_request(json!({}))).await.unwrap();

    let updated = service
        .update(
            &shipment.id,
            update_request(json!({
                "status": "in-transit",
                "currentLocation": {"name": "Abuja Hub"},
                "currentCoordinates": {"lat": 9.07, "lng": 7.4}
            })),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ShipmentStatus::InTransit);
    assert_eq!(updated.tracking_history.len(), 2);
    let entry = &updated.tracking_history[1];
    assert_eq!(entry.location, "Abuja Hub");
    assert_eq!(entry.notes, "Status changed to in-transit");
    assert_eq!(entry.coordinates.unwrap().lat, Some(9.07));
    assert!(updated.last_updated >= shipment.last_updated);

    let event = changed.recv().await.unwrap();
    assert_eq!(event.previous, ShipmentStatus::Pending);
    assert_eq!(event.current, ShipmentStatus::InTransit);
    assert_eq!(event.location.as_deref(), Some("Abuja Hub"));
}

#[tokio::test]
async fn field_update_without_status_keeps_history() {
    let service = service(EventBus::new()).await;
    let shipment = service.create(create_request(json!({}))).await.unwrap();

    let updated = service
        .update(&shipment.id, update_request(json!({"destination": {"city": "Accra"}, "notes": "ignored"})))
        .await
        .unwrap();

    assert_eq!(updated.destination.city, "Accra");
    assert_eq!(updated.status, ShipmentStatus::Pending);
    assert_eq!(updated.tracking_history.len(), 1);
}

#[tokio::test]
async fn terminal_status_cannot_be_left() {
    let service = service(EventBus::new()).await;
    let shipment = service.create(create_request(json!({"status": "delivered"}))).await.unwrap();

    let err = service.update(&shipment.id, update_request(json!({"status": "pending"}))).await.unwrap_err();
    assert!(matches!(err, ShipmentError::Conflict { .. }));

    let restated = service.update(&shipment.id, update_request(json!({"status": "delivered"}))).await.unwrap();
    assert_eq!(restated.tracking_history.len(), 2);
}

#[tokio::test]
async fn concurrent_status_changes_keep_every_history_entry() {
    let service = Arc::new(service(EventBus::new()).await);
    let shipment = service.create(create_request(json!({}))).await.unwrap();

    let mut tasks = Vec::new();
    for status in ["processing", "in-transit", "on-hold", "out-for-delivery"] {
        let service = Arc::clone(&service);
        let id = shipment.id.clone();
        tasks.push(tokio::spawn(async move {
            service.update(&id, update_request(json!({"status": status}))).await
        }));
    }
    let succeeded = {
        let mut count = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                count += 1;
            }
        }
        count
    };

    let stored = service.get(&shipment.id).await.unwrap();
    assert_eq!(stored.tracking_history.len(), 1 + succeeded);
    assert_eq!(stored.tracking_history.last().unwrap().status, stored.status);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_location_and_status_updates_never_surface_storage_errors() {
    let service = Arc::new(service(EventBus::new()).await);
    let shipment = service.create(create_request(json!({}))).await.unwrap();
    let statuses = ["processing", "in-transit", "on-hold", "out-for-delivery"];

    let mut tasks = Vec::new();
    for i in 0..20_u32 {
        let service = Arc::clone(&service);
        let id = shipment.id.clone();
        let status = statuses[i as usize % statuses.len()];
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                let request: LocationUpdateRequest =
                    serde_json::from_value(json!({"lat": 6.0 + f64::from(i) / 10.0, "lng": 3.4})).unwrap();
                service.update_location(&id, &request).await
            } else {
                service.update(&id, update_request(json!({"status": status}))).await
            }
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(ShipmentError::Conflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let stored = service.get(&shipment.id).await.unwrap();
    assert!(succeeded > 0);
    assert_eq!(stored.tracking_history.len(), 1 + succeeded);
}

#[tokio::test]
async fn location_update_records_current_status() {
    let service = service(EventBus::new()).await;
    let shipment = service.create(create_request(json!({"status": "in-transit"}))).await.unwrap();

    let request: LocationUpdateRequest =
        serde_json::from_value(json!({"lat": 7.1, "lng": 4.2, "locationName": "Ibadan"})).unwrap();
    let updated = service.update_location(&shipment.id, &request).await.unwrap();

    let location = updated.current_location.unwrap();
    assert_eq!(location.name.as_deref(), Some("Ibadan"));
    assert_eq!(location.coordinates.lng, Some(4.2));
    let entry = updated.tracking_history.last().unwrap();
    assert_eq!(entry.status, ShipmentStatus::InTransit);
    assert_eq!(entry.location, "Ibadan");
    assert_eq!(entry.notes, "Location updated");

    let unnamed: LocationUpdateRequest = serde_json::from_value(json!({"lat": 7.2, "lng": 4.3})).unwrap();
    let updated = service.update_location(&shipment.id, &unnamed).await.unwrap();
    assert_eq!(updated.tracking_history.last().unwrap().location, "Current Location");
    assert_eq!(updated.current_location.unwrap().name, None);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let service = service(EventBus::new()).await;
    let location: LocationUpdateRequest = serde_json::from_value(json!({"lat": 1, "lng": 1})).unwrap();

    assert!(matches!(service.get("missing").await, Err(ShipmentError::NotFound { .. })));
    assert!(matches!(service.get("migration:x").await, Err(ShipmentError::NotFound { .. })));
    assert!(matches!(
        service.update("missing", update_request(json!({"status": "processing"}))).await,
        Err(ShipmentError::NotFound { .. })
    ));
    assert!(matches!(
        service.update("missing", update_request(json!({"origin": {"city": "X"}}))).await,
        Err(ShipmentError::NotFound { .. })
    ));
    assert!(matches!(service.update_location("missing", &location).await, Err(ShipmentError::NotFound { .. })));
    assert!(matches!(service.delete("missing").await, Err(ShipmentError::NotFound { .. })));
}

#[tokio::test]
async fn delete_removes_the_document() {
    let service = service(EventBus::new()).await;
    let shipment = service.create(create_request(json!({}))).await.unwrap();

    service.delete(&shipment.id).await.unwrap();
    assert!(matches!(service.get(&shipment.id).await, Err(ShipmentError::NotFound { .. })));
    assert!(matches!(service.delete(&shipment.id).await, Err(ShipmentError::NotFound { .. })));
}

#[tokio::test]
async fn tracking_lookup_ignores_case() {
    let service = service(EventBus::new()).await;
    let shipment = service.create(create_request(json!({}))).await.unwrap();

    let view = service.track(&shipment.tracking_id.to_lowercase()).await.unwrap();
    assert_eq!(view.id, shipment.id);

    let err = service.track("TRANSNOPE").await.unwrap_err();
    assert!(matches!(err, ShipmentError::NotFound { ref message, .. } if message == "Tracking ID not found"));
}
