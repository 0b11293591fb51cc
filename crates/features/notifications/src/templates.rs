//! Email bodies for shipment notifications. Text and HTML carry the same facts; every value
//! interpolated into HTML is escaped.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use tport_domain::constants::PRODUCT_NAME;
use tport_shipments::{Contact, Shipment, ShipmentStatusChanged};

/// Subject plus both bodies of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// `<base_url>/<tracking id>`, tolerating a trailing slash on the base.
#[must_use]
pub fn track_url(base_url: &str, tracking_id: &str) -> String {
    format!("{}/{tracking_id}", base_url.trim_end_matches('/'))
}

#[must_use]
pub fn shipment_created(shipment: &Shipment, base_url: &str) -> EmailContent {
    let url = track_url(base_url, &shipment.tracking_id);
    let estimated = shipment.estimated_delivery_date.map_or_else(|| "N/A".to_owned(), format_date);
    let rows = [
        ("Tracking ID", shipment.tracking_id.clone()),
        ("Status", shipment.status.to_string()),
        ("Estimated Delivery", estimated),
        ("Origin", or_dash(shipment.origin.summary())),
        ("Destination", or_dash(shipment.destination.summary())),
    ];

    EmailContent {
        subject: format!("Shipment Created: {}", shipment.tracking_id),
        text: text_body("Hello,", "A new shipment has been created.", &rows, &url),
        html: html_body("Hello,", "A new shipment has been created.", &rows, &url),
    }
}

/// Greets `recipient` by name, falling back to "Customer".
#[must_use]
pub fn status_changed(event: &ShipmentStatusChanged, recipient: &Contact, base_url: &str) -> EmailContent {
    let shipment = &event.shipment;
    let url = track_url(base_url, &shipment.tracking_id);
    let location = event
        .location
        .as_deref()
        .filter(|l| !l.trim().is_empty() && *l != "Unknown")
        .or_else(|| shipment.current_location.as_ref().and_then(|l| l.name.as_deref()))
        .unwrap_or("Not specified");
    let rows = [
        ("Tracking ID", shipment.tracking_id.clone()),
        ("New Status", event.current.to_string()),
        ("Current Location", location.to_owned()),
        ("Last Updated", format_time(shipment.last_updated)),
    ];

    let name = recipient.name.trim();
    let greeting = format!("Hello {},", if name.is_empty() { "Customer" } else { name });
    let intro = "Your shipment status has been updated.";

    EmailContent {
        subject: format!("Shipment Status Update: {}", shipment.tracking_id),
        text: text_body(&greeting, intro, &rows, &url),
        html: html_body(&greeting, intro, &rows, &url),
    }
}

/// Fixed message used to check the mail chain end to end.
#[must_use]
pub fn test_email() -> EmailContent {
    let text = format!(
        "This is a test email from {PRODUCT_NAME}.\n\nIf you received it, outbound email is configured correctly."
    );
    let html = format!(
        "<p>This is a test email from <strong>{PRODUCT_NAME}</strong>.</p>\
         <p>If you received it, outbound email is configured correctly.</p>"
    );
    EmailContent { subject: format!("Test Email from {PRODUCT_NAME}"), text, html }
}

/// Minimal HTML escaping for text nodes and quoted attributes.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn text_body(greeting: &str, intro: &str, rows: &[(&str, String)], url: &str) -> String {
    let mut body = format!("{greeting}\n\n{intro}\n\n");
    for (label, value) in rows {
        let _ = writeln!(body, "{label}: {value}");
    }
    let _ = write!(body, "\nTrack your shipment: {url}\n\nThe {PRODUCT_NAME} Team");
    body
}

fn html_body(greeting: &str, intro: &str, rows: &[(&str, String)], url: &str) -> String {
    let mut body = format!("<p>{}</p><p>{}</p><table>", escape(greeting), escape(intro));
    for (label, value) in rows {
        let _ = write!(body, "<tr><th align=\"left\">{label}</th><td>{}</td></tr>", escape(value));
    }
    let url = escape(url);
    let _ = write!(
        body,
        "</table><p><a href=\"{url}\">Track your shipment</a></p><p>The {PRODUCT_NAME} Team</p>"
    );
    body
}

fn format_date(value: DateTime<Utc>) -> String {
    value.format("%B %-d, %Y").to_string()
}

fn format_time(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_owned() } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tport_shipments::{CurrentLocation, Place, ShipmentStatus};

    fn shipment() -> Shipment {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        Shipment {
            id: "abc".into(),
            tracking_id: "TRANSM1X2Y3ABCDEF".into(),
            status: ShipmentStatus::Pending,
            estimated_delivery_date: Some(Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap()),
            created_at: at,
            last_updated: at,
            origin: Place { city: "Lagos".into(), country: "Nigeria".into(), ..Place::default() },
            destination: Place { city: "Accra".into(), ..Place::default() },
            sender: Contact::default(),
            receiver: Contact { name: "Ada <b>".into(), email: "ada@example.com".into(), ..Contact::default() },
            package: tport_shipments::PackageDetails::default(),
            current_location: None,
            tracking_history: Vec::new(),
        }
    }

    #[test]
    fn created_email_lists_route_and_link() {
        let email = shipment_created(&shipment(), "https://track.example.com/track/");

        assert_eq!(email.subject, "Shipment Created: TRANSM1X2Y3ABCDEF");
        assert!(email.text.starts_with("Hello,\n\nA new shipment has been created."));
        assert!(email.text.contains("Estimated Delivery: June 30, 2025\n"));
        assert!(email.text.contains("Origin: Lagos, Nigeria\n"));
        assert!(email.text.contains("Track your shipment: https://track.example.com/track/TRANSM1X2Y3ABCDEF"));
        assert!(email.html.contains("href=\"https://track.example.com/track/TRANSM1X2Y3ABCDEF\""));
    }

    #[test]
    fn missing_delivery_date_reads_na() {
        let mut shipment = shipment();
        shipment.estimated_delivery_date = None;
        assert!(shipment_created(&shipment, "https://x").text.contains("Estimated Delivery: N/A\n"));
    }

    #[test]
    fn status_email_escapes_html_and_falls_back() {
        let mut shipment = shipment();
        shipment.status = ShipmentStatus::OnHold;
        let receiver = shipment.receiver.clone();
        let event = ShipmentStatusChanged {
            shipment,
            previous: ShipmentStatus::Pending,
            current: ShipmentStatus::OnHold,
            location: Some("Unknown".into()),
        };

        let email = status_changed(&event, &receiver, "https://x");
        assert_eq!(email.subject, "Shipment Status Update: TRANSM1X2Y3ABCDEF");
        assert!(email.text.starts_with("Hello Ada <b>,"));
        assert!(email.text.contains("New Status: on-hold\n"));
        assert!(email.text.contains("Current Location: Not specified\n"));
        assert!(email.text.contains("Last Updated: 2025-06-01 09:30 UTC\n"));
        assert!(email.html.contains("Hello Ada &lt;b&gt;,"));
        assert!(!email.html.contains("<b>"));
    }

    #[test]
    fn status_email_uses_stored_location_and_generic_greeting() {
        let mut shipment = shipment();
        shipment.current_location = Some(CurrentLocation { name: Some("Tema Port".into()), ..Default::default() });
        let event = ShipmentStatusChanged {
            shipment,
            previous: ShipmentStatus::Pending,
            current: ShipmentStatus::InTransit,
            location: None,
        };

        let email = status_changed(&event, &Contact::default(), "https://x");
        assert!(email.text.starts_with("Hello Customer,"));
        assert!(email.text.contains("Current Location: Tema Port\n"));
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
