//! HTTP 요청 metrics middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 수집 대상에서 제외하는 경로 (Prometheus scrape 자체).
const EXCLUDED_PATHS: &[&str] = &["/metrics"];

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// 각 요청에 대해 다음 메트릭을 기록합니다:
/// - `http_requests_total`: 총 요청 수 (method, path 라벨)
/// - `http_responses_total`: 총 응답 수 (method, path, status 라벨)
/// - `http_request_duration_seconds`: 요청 처리 시간 히스토그램
///
/// 경로의 UUID/숫자 세그먼트는 `:id`로 정규화해 라벨 수를 제한합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    if EXCLUDED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    record_http_request(&method, &path);

    let response = next.run(request).await;

    let status = response.status();
    record_http_response(&method, &path, status.as_u16());
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    if status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), "Request completed with server error");
    }

    response
}
