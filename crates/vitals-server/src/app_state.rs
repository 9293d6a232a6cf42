//! Shared application state: the composition root.
//!
//! Owns the metrics registry and the record handler. The handler named in
//! config is resolved exactly once here; there is no runtime lookup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vitals_core::metrics::Registry;

use crate::config::{HandlerKind, ServerConfig};
use crate::handlers::{MagicHandler, RecordHandler};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Arc<Registry>,
    handler: Arc<dyn RecordHandler>,
    draining: AtomicBool,
}

impl AppState {
    /// Build state with the handler named in the config.
    pub fn new(cfg: ServerConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let handler: Arc<dyn RecordHandler> = match cfg.handler {
            HandlerKind::Magic => Arc::new(MagicHandler::new(Arc::clone(&registry))),
        };
        Self::assemble(cfg, registry, handler)
    }

    /// Build state around an externally supplied handler (embedders, tests).
    pub fn with_handler(
        cfg: ServerConfig,
        registry: Arc<Registry>,
        handler: Arc<dyn RecordHandler>,
    ) -> Self {
        Self::assemble(cfg, registry, handler)
    }

    fn assemble(cfg: ServerConfig, registry: Arc<Registry>, handler: Arc<dyn RecordHandler>) -> Self {
        tracing::info!(handler = handler.name(), "record handler selected");
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                handler,
                draining: AtomicBool::new(false),
            }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    pub fn handler(&self) -> &Arc<dyn RecordHandler> {
        &self.inner.handler
    }

    /// Mark draining; `/readyz` turns 503 so load balancers stop routing.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
