/// Allow-list CORS middleware
///
/// - `Access-Control-Allow-Origin` echoes the request's `Origin` only when it
///   is in the configured allow-list (and then adds `Vary: Origin`); other
///   origins get no allow-origin header at all
/// - allowed methods, headers and credentials are always advertised
/// - every `OPTIONS` request is answered here with `204 No Content` and never
///   reaches the router
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, Router};
/// use taskboard_api::{app::AppState, middleware::cors::cors_layer};
///
/// # fn example(state: AppState) {
/// let app: Router = Router::new()
///     .layer(middleware::from_fn_with_state(state.clone(), cors_layer))
///     .with_state(state);
/// # }
/// ```

use crate::app::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// Applies the CORS policy and short-circuits `OPTIONS`
pub async fn cors_layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(
        response.headers_mut(),
        origin.as_ref(),
        &state.config.api.cors_origins,
    );

    response
}

/// Writes the CORS headers for a request from `origin`
pub fn apply_cors_headers(
    headers: &mut HeaderMap,
    origin: Option<&HeaderValue>,
    allowed_origins: &[String],
) {
    if let Some(origin) = origin.filter(|o| is_allowed(o, allowed_origins)) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

fn is_allowed(origin: &HeaderValue, allowed_origins: &[String]) -> bool {
    match origin.to_str() {
        Ok(origin) => !origin.is_empty() && allowed_origins.iter().any(|a| a == origin),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![
            "http://localhost:5173".to_string(),
            "http://192.19.22.203:5173".to_string(),
        ]
    }

    #[test]
    fn test_allowed_origin_is_reflected() {
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("http://localhost:5173");

        apply_cors_headers(&mut headers, Some(&origin), &allowed());

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
        assert_eq!(headers[header::VARY], "Origin");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
    }

    #[test]
    fn test_unknown_origin_is_omitted() {
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("http://evil.example");

        apply_cors_headers(&mut headers, Some(&origin), &allowed());

        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(headers.get(header::VARY).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_missing_origin_still_advertises_methods() {
        let mut headers = HeaderMap::new();

        apply_cors_headers(&mut headers, None, &allowed());

        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
    }
}
