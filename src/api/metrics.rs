use actix_web::HttpResponse;
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static WEBHOOK_COUNT: AtomicU64 = AtomicU64::new(0);
static WEBHOOK_REJECTED_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_webhook_count() {
    WEBHOOK_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_webhook_rejected_count() {
    WEBHOOK_REJECTED_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn request_count() -> u64 {
    REQUEST_COUNT.load(Ordering::Relaxed)
}

pub fn error_count() -> u64 {
    ERROR_COUNT.load(Ordering::Relaxed)
}

pub fn webhook_count() -> u64 {
    WEBHOOK_COUNT.load(Ordering::Relaxed)
}

pub fn webhook_rejected_count() -> u64 {
    WEBHOOK_REJECTED_COUNT.load(Ordering::Relaxed)
}

fn render() -> String {
    format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP http_errors_total Total number of HTTP responses with status >= 400\n\
         # TYPE http_errors_total counter\n\
         http_errors_total {}\n\
         \n\
         # HELP webhook_events_total Total number of webhook deliveries received\n\
         # TYPE webhook_events_total counter\n\
         webhook_events_total {}\n\
         \n\
         # HELP webhook_rejected_total Webhook deliveries rejected before processing\n\
         # TYPE webhook_rejected_total counter\n\
         webhook_rejected_total {}\n",
        request_count(),
        error_count(),
        webhook_count(),
        webhook_rejected_count(),
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text counters", body = String, content_type = "text/plain")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(text: &str, name: &str) -> u64 {
        text.lines()
            .find_map(|line| line.strip_prefix(&format!("{} ", name)))
            .and_then(|value| value.parse().ok())
            .unwrap()
    }

    #[test]
    fn test_counters_are_rendered() {
        let before = render();
        increment_webhook_count();
        increment_webhook_rejected_count();
        let after = render();

        for name in [
            "http_requests_total",
            "http_errors_total",
            "webhook_events_total",
            "webhook_rejected_total",
        ] {
            assert!(counter(&after, name) >= counter(&before, name));
        }
        assert!(counter(&after, "webhook_events_total") > counter(&before, "webhook_events_total"));
        assert!(counter(&after, "webhook_rejected_total") > counter(&before, "webhook_rejected_total"));
    }
}
