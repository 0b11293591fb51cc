#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the tracking service crates.
//!
//! * [`tport_error`] turns an enum into a `thiserror` error with a `.context(..)` extension.
//! * [`api_model`] / [`api_handler`] keep DTOs and Axum handlers consistent with the `OpenAPI` docs.
//! * [`tport_slice`] wraps feature state into a cheaply clonable, registrable slice handle.
//! * [`main`] bootstraps the configured Tokio runtime.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the specialized Tokio runtime.
///
/// Transforms an `async fn main` into a plain `fn main` that builds the runtime described by
/// the selected profile (`high_performance`, `memory_efficient` or `default`).
///
/// ```rust,ignore
/// #[tport_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines a request/response DTO.
///
/// Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when missing, applies
/// `rename_all = "camelCase"` and `deny_unknown_fields` unless overridden.
///
/// ```rust,ignore
/// #[api_model(deny_unknown_fields = false)]
/// pub struct LoginRequest {
///     pub username: String,
///     pub password: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an Axum handler with the `OpenAPI` document.
///
/// Accepts the regular `utoipa::path` arguments.
///
/// ```rust,ignore
/// #[api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Defines a domain error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, SourceError>` of every variant carrying a source.
/// * `From<SourceError>` for variants with a source field.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant is present.
/// * A private `format_context` helper usable from the `#[error(..)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. Variants with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[tport_error]
/// pub enum StoreError {
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn tport_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Defines a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` wraps it in an `Arc`, derefs to it and
/// implements `tport_kernel::domain::registry::FeatureSlice`.
///
/// ```rust,ignore
/// #[tport_derive::tport_slice]
/// pub struct Shipments {
///     pub service: ShipmentService,
/// }
///
/// let slice = Shipments::new(ShipmentsInner { service });
/// ```
#[proc_macro_attribute]
pub fn tport_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
