use std::borrow::Cow;

#[tport_derive::tport_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

const MAX_KEY_LEN: usize = 64;

/// Utilities for safe resource handling and ID validation.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Validates a record ID taken from a request path against a specific table and returns the
    /// bare record key.
    ///
    /// Accepts `shipment:abc` or `abc`. Rejects IDs that name another table (e.g. a
    /// `migration:..` ID sent to a shipment endpoint) and keys outside `[A-Za-z0-9_-]`.
    ///
    /// # Errors
    /// Returns an error if the table does not match or the key is malformed.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id_ref = id.as_ref().trim();
        let table_ref = expected_table.as_ref();

        let key = match id_ref.split_once(':') {
            Some((table, key)) if table == table_ref => key,
            Some((table, _)) => {
                return Err(ResourceGuardError::Validation {
                    message: format!("Expected '{table_ref}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            }
            None => id_ref,
        };

        if key.is_empty()
            || key.len() > MAX_KEY_LEN
            || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ResourceGuardError::Validation {
                message: format!("'{id_ref}' is not a valid {table_ref} key").into(),
                context: None,
            });
        }

        Ok(key.to_owned())
    }
}
