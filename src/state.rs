use std::sync::Arc;

use crate::database::store::{AuditSink, DataStore};

/// Shared application state handed to handlers and middleware.
///
/// Both collaborators sit behind trait objects so tests can swap in the
/// in-memory store without touching the router.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }
}
