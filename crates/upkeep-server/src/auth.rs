use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Header carrying the shared secret when one is configured.
pub const TOKEN_HEADER: &str = "x-upkeep-token";

#[derive(Clone)]
pub struct AuthState {
    pub token: Option<String>,
}

/// The panel is local tooling: browsers send an Origin on cross-origin
/// requests, so any non-local Origin is rejected outright. Requests without
/// an Origin (curl, same-origin) pass the origin check.
fn is_local_origin(origin: Option<&str>) -> bool {
    let Some(origin) = origin else {
        return true;
    };
    origin.starts_with("http://localhost")
        || origin.starts_with("http://127.0.0.1")
        || origin.starts_with("http://[::1]")
        || origin.starts_with("http://[::]")
}

/// Gate every request behind the local-origin check and, when configured,
/// the shared token header. Failures get a plain-text 403.
pub async fn auth_middleware(State(auth): State<AuthState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok());
    if !is_local_origin(origin) {
        return forbidden();
    }

    if let Some(token) = &auth.token {
        let presented = req
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(token.as_str()) {
            return forbidden();
        }
    }

    next.run(req).await
}

fn forbidden() -> Response {
    Response::builder()
        .status(403)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Body::from("Forbidden"))
        .expect("infallible: all header values are valid ASCII")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
