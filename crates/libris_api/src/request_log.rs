use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

/// Logs one line per request. Query strings are not logged.
pub(crate) async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=api status={} method={} path={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        started.elapsed().as_millis()
    );
    response
}
