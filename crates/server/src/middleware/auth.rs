use axum::{
    Json,
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// API Key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// Check a presented key; auth passes when no key is configured
    fn allows(&self, presented: Option<&str>) -> bool {
        match &self.api_key {
            Some(expected) => presented == Some(expected.as_str()),
            None => true,
        }
    }
}

/// Middleware enforcing the `X-API-Key` header when a key is configured
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let auth = request.extensions().get::<ApiKeyAuth>().cloned();
    let presented = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if let Some(auth) = auth {
        if !auth.allows(presented.as_deref()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid or missing API key"})),
            )
                .into_response();
        }
    }

    next.run(request).await
}
