//! Helpers for reading error responses

use std::fmt::Display;

/// Body of a rejected response, for error reports.
///
/// A body that cannot be read is replaced by a placeholder naming the failure.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    body_or_placeholder(response.text().await)
}

fn body_or_placeholder<E: Display>(body: Result<String, E>) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read response body");
            format!("<unreadable body: {}>", e)
        }
    }
}
