use std::borrow::Cow;
use tport_kernel::server::ApiError;

#[tport_derive::tport_error]
pub enum IdentityError {
    /// Unusable authentication settings.
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Credentials rejected or no token presented.
    #[error("Identity auth error{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Token failed to encode, decode or validate.
    #[error("Token error{}: {source}", format_context(.context))]
    Token { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Auth { message, context } => Self::Unauthorized { message, context },
            IdentityError::Token { source, .. } => Self::Unauthorized {
                message: "Invalid token".into(),
                context: Some(source.to_string().into()),
            },
            other => Self::Internal { message: other.to_string().into(), context: None },
        }
    }
}
