use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nutricare_api::{config::Config, router, AppState};

/// True for local development origins, the configured base URL, and any of
/// its subdomains.
fn origin_allowed(origin: &str, base: &str) -> bool {
    if origin.starts_with("http://localhost") || origin.starts_with("http://127.0.0.1") {
        return true;
    }
    if origin == base {
        return true;
    }
    if let Some(idx) = base.find("://") {
        let after_scheme = &base[idx + 3..];
        let domain = after_scheme.split('/').next().unwrap_or(after_scheme);
        let domain_clean = domain.split(':').next().unwrap_or(domain);
        if origin.contains(&format!(".{domain_clean}")) {
            return true;
        }
    }
    false
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(config.clone())?;

    match state.plans.backend_tag() {
        Some(tag) => info!("Plan store connected ({tag})"),
        None => info!("FIREBASE_DATABASE_URL not set — saved plans unavailable"),
    }
    if state.advice.is_configured() {
        info!("Advice service configured (model {})", config.gemini_model);
    } else {
        info!("GEMINI_API_KEY not set — AI answers disabled");
    }

    let base_url = config.app_base_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &base_url))
                .unwrap_or(false)
        }));

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    info!("NutriCare+ API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::origin_allowed;

    #[test]
    fn cors_origins() {
        let base = "https://nutricare.app";
        assert!(origin_allowed("http://localhost:5173", base));
        assert!(origin_allowed("https://nutricare.app", base));
        assert!(origin_allowed("https://www.nutricare.app", base));
        assert!(!origin_allowed("https://evil.example", base));
    }
}
