//! Logging utilities with request context support.

tokio::task_local! {
    /// Task-local storage for the current request ID.
    ///
    /// This allows log lines emitted anywhere in a request's pipeline to
    /// carry a unique request ID without threading it through every call.
    pub static REQUEST_ID: String;
}

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
