mod config;
mod draft;
mod enhance;
mod errors;
mod persistence;
mod preview;
mod render;
mod routes;
mod session;
mod state;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::draft::ResumeDraft;
use crate::enhance::{Enhancer, LlmEnhancer};
use crate::persistence::{load_draft, DraftStore, FileDraftStore};
use crate::render::{HttpRenderSink, RenderSink};
use crate::routes::build_router;
use crate::session::EditorSession;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeForge v{}", env!("CARGO_PKG_VERSION"));

    // Draft store + auto-restore of the last saved draft
    let store: Arc<dyn DraftStore> = Arc::new(FileDraftStore::new(&config.draft_dir));
    let draft = match load_draft(store.as_ref()) {
        Ok(Some(draft)) => {
            info!("Restored saved draft from {}", config.draft_dir.display());
            draft
        }
        Ok(None) => ResumeDraft::new(),
        Err(e) => {
            warn!("Could not restore saved draft, starting empty: {e}");
            ResumeDraft::new()
        }
    };
    let session = EditorSession::new(draft, config.wizard_total_steps);

    // Enhancement backend
    let enhancer = LlmEnhancer::new(config.ai_provider, config.ai_api_key())?;
    let status = enhancer.status();
    info!(
        "AI provider: {} (model: {}, configured: {})",
        status.provider, status.model, status.configured
    );
    if !status.configured {
        warn!("No API key for {}; enhancement requests will fail", status.provider);
    }

    // Optional render sink
    let render_sink: Option<Arc<dyn RenderSink>> = match &config.render_sink_url {
        Some(url) => {
            info!("Render sink: {url}");
            Some(Arc::new(HttpRenderSink::new(url.clone())?))
        }
        None => {
            info!("No render sink configured; finalize returns the payload only");
            None
        }
    };

    let state = AppState {
        session: Arc::new(Mutex::new(session)),
        store,
        enhancer: Arc::new(enhancer),
        render_sink,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
