//! Request identification.
//!
//! Every request gets an `x-request-id` (UUID v4) unless the client sent
//! one; the id is echoed on the response and recorded in trace spans.

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}
