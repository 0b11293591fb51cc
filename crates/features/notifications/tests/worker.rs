use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;
use tport_database::Database;
use tport_domain::config::ApiConfig;
use tport_domain::recipients::RecipientSet;
use tport_event_bus::EventBus;
use tport_kernel::server::ApiState;
use tport_notifications::Notifications;
use tport_shipments::{ShipmentRepository, ShipmentService};

struct Harness {
    state: ApiState,
    shipments: ShipmentService,
}

async fn harness(configure: impl FnOnce(&mut ApiConfig)) -> Harness {
    let mut config = ApiConfig::default();
    config.tracking.base_url = "https://track.example.com/t".to_owned();
    configure(&mut config);

    let database = Database::builder()
        .url("mem://")
        .session("tport", "notifications")
        .migrations(tport_shipments::MIGRATIONS.iter().copied())
        .init()
        .await
        .unwrap();
    let events = EventBus::new();
    let slice = tport_notifications::init(&config, &events).unwrap();
    let shipments = ShipmentService::new(ShipmentRepository::new(database.clone()), events.clone());
    let state = ApiState::builder().config(config).db(database).events(events).register_slice(slice).build().unwrap();
    Harness { state, shipments }
}

impl Harness {
    fn notifications(&self) -> &Notifications {
        self.state.try_get_slice::<Notifications>().unwrap()
    }

    async fn settle(&self) -> Vec<tport_mailer::MailMessage> {
        self.state.events.shutdown();
        assert!(self.notifications().worker.drain(Duration::from_secs(5)).await);
        self.notifications().mailer.preview().unwrap().messages()
    }
}

fn create(body: Value) -> tport_shipments::CreateShipmentRequest {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn created_and_status_events_reach_the_receiver() {
    let harness = harness(|_| {}).await;
    let shipment = harness
        .shipments
        .create(create(json!({
            "receiver": {"name": "Ada", "email": "ada@example.com"},
            "sender": {"email": "ops@example.com"}
        })))
        .await
        .unwrap();
    harness
        .shipments
        .update(&shipment.id, serde_json::from_value(json!({"status": "in-transit"})).unwrap())
        .await
        .unwrap();

    let sent = harness.settle().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.to == ["ada@example.com"]));

    // The two event queues drain independently, so delivery order is not fixed.
    let created = sent.iter().find(|m| m.subject.starts_with("Shipment Created")).unwrap();
    assert_eq!(created.subject, format!("Shipment Created: {}", shipment.tracking_id));
    let link = format!("https://track.example.com/t/{}", shipment.tracking_id);
    assert!(created.text.as_deref().unwrap().contains(&link));

    let changed = sent.iter().find(|m| m.subject.starts_with("Shipment Status Update")).unwrap();
    assert!(changed.text.as_deref().unwrap().starts_with("Hello Ada,"));
}

#[tokio::test]
async fn configured_roles_decide_recipients() {
    let harness = harness(|config| config.notifications.notify = RecipientSet::ALL).await;
    harness
        .shipments
        .create(create(json!({"receiver": {"email": ""}, "sender": {"email": "ops@example.com"}})))
        .await
        .unwrap();

    let sent = harness.settle().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ["ops@example.com"]);
}

#[tokio::test]
async fn disabled_notifications_register_no_consumer() {
    let harness = harness(|config| config.notifications.enabled = false).await;
    assert!(!harness.notifications().worker.is_running());

    harness.shipments.create(create(json!({"receiver": {"email": "ada@example.com"}}))).await.unwrap();
    assert!(harness.settle().await.is_empty());
}

#[tokio::test]
async fn test_email_route_reports_provider() {
    let harness = harness(|_| {}).await;
    let (router, _) = tport_notifications::router().split_for_parts();
    let app: Router = router.with_state(harness.state.clone());

    let request = |body: Value| {
        Request::post("/admin/api/notifications/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app.clone().oneshot(request(json!({"to": "qa@example.com"}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["data"]["provider"], "preview");
    assert_eq!(body["message"], "Test email sent");

    let response = app.oneshot(request(json!({"to": "  "}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let preview = harness.notifications().mailer.preview().unwrap().messages();
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].subject, "Test Email from Transportify");
}
