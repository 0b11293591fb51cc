use std::borrow::Cow;

#[tport_derive::tport_error]
pub enum MailError {
    #[error("Invalid message{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid address{}: {source}", format_context(.context))]
    Address { source: lettre::address::AddressError, context: Option<Cow<'static, str>> },

    #[error("Message build error{}: {source}", format_context(.context))]
    Build { source: lettre::error::Error, context: Option<Cow<'static, str>> },

    #[error("SMTP error{}: {source}", format_context(.context))]
    Smtp { source: lettre::transport::smtp::Error, context: Option<Cow<'static, str>> },

    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Provider rejected message{}: {message}", format_context(.context))]
    Provider { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal mailer error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
