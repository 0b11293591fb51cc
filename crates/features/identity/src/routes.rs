use crate::Identity;
use crate::session::AdminSession;
use axum::Json;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use tport_domain::constants::{SESSION_COOKIE, TAG_AUTH};
use tport_kernel::prelude::*;
use tracing::{info, instrument, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model(deny_unknown_fields = false)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[api_model]
pub struct SessionUser {
    pub username: String,
}

#[api_model]
pub struct LoginResponse {
    pub user: SessionUser,
    /// Same JWT that is set in the `token` cookie
    pub token: String,
}

#[api_model]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(check_auth))
}

#[api_handler(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Session cookie set", body = ApiResponse<LoginResponse>),
        (status = UNAUTHORIZED, description = "Invalid credentials", body = MessageResponse),
    ),
    tag = TAG_AUTH,
)]
#[instrument(skip_all, fields(username = %request.username))]
pub(crate) async fn login(
    Slice(identity): Slice<Identity>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    if !identity.credentials.verify(&request.username, &request.password) {
        warn!("Rejected admin login");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let issued = identity.tokens.issue(&request.username)?;
    let cookie = Cookie::build((SESSION_COOKIE, issued.token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(issued.ttl_seconds))
        .secure(identity.cookie_secure);

    info!("Admin logged in");
    let body = LoginResponse { user: SessionUser { username: request.username }, token: issued.token };
    Ok((jar.add(cookie), ApiResponse::ok(body).with_message("Login successful")))
}

#[api_handler(
    post,
    path = "/admin/logout",
    responses((status = OK, description = "Session cookie cleared", body = MessageResponse)),
    tag = TAG_AUTH,
)]
pub(crate) async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), ApiResponse::success("Logout successful"))
}

#[api_handler(
    get,
    path = "/admin/check-auth",
    responses((status = OK, description = "Session state, never an error", body = CheckAuthResponse)),
    tag = TAG_AUTH,
)]
pub(crate) async fn check_auth(session: Result<AdminSession, ApiError>) -> Json<CheckAuthResponse> {
    Json(match session {
        Ok(session) => CheckAuthResponse {
            authenticated: true,
            user: Some(SessionUser { username: session.username }),
            reason: None,
        },
        Err(err) => CheckAuthResponse {
            authenticated: false,
            user: None,
            reason: Some(err.public_message().to_owned()),
        },
    })
}
