//! API server setup and configuration.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{
    BridgeError, Result,
    core::config::{BridgeConfig, ServerConfig},
    engine::OcrEngine,
};

use super::{
    handlers::{health_handler, ocr_handler},
    types::ApiState,
};

/// Create the API router with default server settings.
///
/// The engine must already be constructed; it is shared by every request.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use ocr_bridge::{api::create_router, engine::{OcrEngine, Page}};
///
/// struct NoText;
///
/// impl OcrEngine for NoText {
///     fn name(&self) -> &str { "no-text" }
///     fn predict(&self, _: &image::RgbImage) -> ocr_bridge::Result<Vec<Page>> { Ok(vec![]) }
/// }
///
/// let router = create_router(Arc::new(NoText));
/// ```
pub fn create_router(engine: Arc<dyn OcrEngine>) -> Router {
    create_router_with_config(engine, &ServerConfig::default())
}

/// Create the API router with explicit server settings (CORS origins, body limit).
pub fn create_router_with_config(engine: Arc<dyn OcrEngine>, config: &ServerConfig) -> Router {
    let state = ApiState::new(engine);

    Router::new()
        .route("/ocr", post(ocr_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(config.max_request_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_request_body_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer.
///
/// With no explicit origins every origin is allowed, which is what the
/// browser extension client relies on.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<_> = origins
        .iter()
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if parsed.is_empty() {
        if !origins.is_empty() {
            tracing::warn!("CORS origins configured but none are valid header values, allowing all origins");
        }
        tracing::debug!("CORS configured to allow all origins");
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        tracing::info!("CORS configured with {} explicit allowed origin(s)", parsed.len());
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server with an already constructed engine.
///
/// Binds `config.server.host:config.server.port` (hostnames such as
/// `localhost` are resolved) and serves until the process is stopped.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use ocr_bridge::{BridgeConfig, api::serve};
/// # use ocr_bridge::engine::{OcrEngine, Page};
/// # struct NoText;
/// # impl OcrEngine for NoText {
/// #     fn name(&self) -> &str { "no-text" }
/// #     fn predict(&self, _: &image::RgbImage) -> ocr_bridge::Result<Vec<Page>> { Ok(vec![]) }
/// # }
///
/// #[tokio::main]
/// async fn main() -> ocr_bridge::Result<()> {
///     let config = BridgeConfig::default();
///     serve(&config, Arc::new(NoText)).await
/// }
/// ```
pub async fn serve(config: &BridgeConfig, engine: Arc<dyn OcrEngine>) -> Result<()> {
    config.validate()?;

    let server = &config.server;
    let app = create_router_with_config(engine, server);

    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .map_err(BridgeError::Io)?;

    let addr = listener.local_addr().map_err(BridgeError::Io)?;
    tracing::info!("OCR bridge listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| BridgeError::Other(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Page;
    use image::RgbImage;

    struct NoText;

    impl OcrEngine for NoText {
        fn name(&self) -> &str {
            "no-text"
        }

        fn predict(&self, _image: &RgbImage) -> Result<Vec<Page>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_create_router() {
        let _router = create_router(Arc::new(NoText));
    }

    #[test]
    fn test_create_router_with_explicit_origins() {
        let config = ServerConfig {
            cors_origins: vec!["https://app.example.com".to_string()],
            ..ServerConfig::default()
        };
        let _router = create_router_with_config(Arc::new(NoText), &config);
    }

    #[test]
    fn test_cors_layer_falls_back_on_invalid_origins() {
        let _layer = cors_layer(&["bad\norigin".to_string()]);
        let _layer = cors_layer(&[]);
    }

    #[tokio::test]
    async fn test_serve_rejects_invalid_config() {
        let mut config = BridgeConfig::default();
        config.server.port = 0;
        let err = serve(&config, Arc::new(NoText)).await.unwrap_err();
        assert!(matches!(err, BridgeError::Validation { .. }));
    }
}
