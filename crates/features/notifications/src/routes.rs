use crate::Notifications;
use crate::error::NotificationError;
use crate::templates;
use tport_domain::constants::TAG_NOTIFICATIONS;
use tport_kernel::prelude::*;
use tport_mailer::MailMessage;
use tracing::instrument;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model(deny_unknown_fields = false)]
pub struct TestEmailRequest {
    /// Recipient address
    pub to: String,
}

#[api_model]
pub struct TestEmailResponse {
    /// Transport that accepted the message (`smtp`, `mailersend` or `preview`)
    pub provider: String,
}

/// Mount behind the admin guard.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(send_test_email))
}

#[api_handler(
    post,
    path = "/admin/api/notifications/test",
    request_body = TestEmailRequest,
    responses(
        (status = OK, description = "Accepted by a transport", body = ApiResponse<TestEmailResponse>),
        (status = BAD_REQUEST, description = "Missing recipient", body = MessageResponse),
    ),
    tag = TAG_NOTIFICATIONS,
)]
#[instrument(skip_all)]
pub(crate) async fn send_test_email(
    Slice(notifications): Slice<Notifications>,
    ApiJson(request): ApiJson<TestEmailRequest>,
) -> Result<ApiResponse<TestEmailResponse>, ApiError> {
    let to = request.to.trim();
    if to.is_empty() {
        return Err(NotificationError::Validation { message: "Recipient email is required".into(), context: None }.into());
    }

    let content = templates::test_email();
    let message = MailMessage::new(content.subject).to(to).text(content.text).html(content.html);
    let delivery = notifications.mailer.send(&message).await.map_err(NotificationError::from)?;

    let body = TestEmailResponse { provider: delivery.provider.to_owned() };
    Ok(ApiResponse::ok(body).with_message("Test email sent"))
}
