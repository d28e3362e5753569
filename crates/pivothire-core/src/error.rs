use http::StatusCode;

/// Domain errors that know how to present themselves over HTTP
///
/// Feature crates implement this for their error enums; rendering the
/// actual response body is left to the handler layer.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to show to end users
    fn client_message(&self) -> String;
}
