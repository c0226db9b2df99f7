use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Collapses record ids into `{id}` to keep label cardinality bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_uuid_like(segment) || is_prefixed_id(segment) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

/// `user-3`, `proj-1718000000000`, `proj-ahmed-1`, `quiz-2` and bare numbers.
fn is_prefixed_id(s: &str) -> bool {
    match s.rsplit_once('-') {
        Some((prefix, tail)) => {
            !prefix.is_empty() && !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit())
        }
        None => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/v1/quizzes/550e8400-e29b-41d4-a716-446655440000/attempts"),
            "/api/v1/quizzes/{id}/attempts"
        );
        assert_eq!(
            normalize_path("/api/v1/projects/proj-ahmed-1/comments"),
            "/api/v1/projects/{id}/comments"
        );
        assert_eq!(
            normalize_path("/api/v1/tasks/task-1718000000000/toggle"),
            "/api/v1/tasks/{id}/toggle"
        );
        assert_eq!(
            normalize_path("/api/v1/notifications/read-all"),
            "/api/v1/notifications/read-all"
        );
        assert_eq!(normalize_path("/health"), "/health");
    }

    #[test]
    fn test_is_prefixed_id() {
        assert!(is_prefixed_id("user-3"));
        assert!(is_prefixed_id("123"));
        assert!(!is_prefixed_id("read-all"));
        assert!(!is_prefixed_id("-1"));
        assert!(!is_prefixed_id(""));
    }
}
