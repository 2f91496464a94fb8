use std::sync::Arc;

use tokio::sync::Mutex;

use crate::enhance::Enhancer;
use crate::persistence::DraftStore;
use crate::render::RenderSink;
use crate::session::EditorSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one editing session this process serves. Every mutation goes through this lock,
    /// so no two edits ever interleave.
    pub session: Arc<Mutex<EditorSession>>,
    pub store: Arc<dyn DraftStore>,
    /// Pluggable enhancement backend. Default: `LlmEnhancer` for the configured provider.
    pub enhancer: Arc<dyn Enhancer>,
    /// `None` when no `RENDER_SINK_URL` is configured; finalize then only returns the payload.
    pub render_sink: Option<Arc<dyn RenderSink>>,
}
