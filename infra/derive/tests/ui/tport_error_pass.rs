use std::borrow::Cow;
use tport_derive::tport_error;

#[tport_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    let io: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
    io.context("Reading manifest")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading manifest): boom");

    let internal: DemoError = "unexpected".into();
    assert!(matches!(internal, DemoError::Internal { .. }));

    let not_found: Result<(), DemoError> =
        Err(DemoError::NotFound { message: "shipment".into(), context: None });
    let err = not_found.context("Lookup").unwrap_err();
    assert_eq!(err.to_string(), "Not found (Lookup): shipment");
}
