use http::StatusCode;

/// Mapping from a domain error to its HTTP representation
///
/// The chat surface speaks the OpenAI error dialect: a status code, a
/// machine-readable `type` string and a message safe to show the caller.
/// Feature crates implement this on their error enums (the chat router's
/// `RouterError`, the admin surface's `ServerError`) and the handler layer
/// renders the triple into the JSON error body, so the enums themselves
/// never touch axum.
pub trait HttpError: std::error::Error {
    /// Status code this error answers with
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}
