//! Per-request trace identifiers and request/response logging.
//!
//! Every request gets a fresh UUID attached to a tracing span, so all log
//! lines emitted while handling it carry the same `trace_id`. The id is
//! echoed back in the `x-trace-id` response header for correlation from the
//! client side. Purely observational; nothing downstream consumes it.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use roster_core::TRACE_ID_HEADER;
use tracing::Instrument;
use uuid::Uuid;

pub async fn trace_request(req: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let span = tracing::info_span!("request", trace_id = %trace_id);
    async move {
        let started = Instant::now();
        tracing::info!(%method, %path, "Request received");

        let mut response = next.run(req).await;

        if let Ok(value) = HeaderValue::try_from(trace_id.to_string()) {
            response.headers_mut().insert(TRACE_ID_HEADER, value);
        }
        tracing::info!(
            %method,
            %path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request complete"
        );

        response
    }
    .instrument(span)
    .await
}
