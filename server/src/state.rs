//! Application state shared across handlers.

use std::sync::Arc;

use medledger_chat::ChatGateway;
use medledger_core::{LedgerStore, RecordLifecycle};
use medledger_query::QueryEngine;

use crate::auth::UserRegistry;

/// Everything a handler needs, cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub lifecycle: Arc<RecordLifecycle>,
    pub query: QueryEngine,
    pub chat: ChatGateway,
    pub users: Arc<UserRegistry>,
}

impl AppState {
    /// Wire the full component stack on top of `store`.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        let lifecycle = Arc::new(RecordLifecycle::new(Arc::clone(&store)));
        let query = QueryEngine::new(Arc::clone(&store));
        let chat = ChatGateway::new(query.clone());
        Self {
            store,
            lifecycle,
            query,
            chat,
            users: Arc::new(UserRegistry::new()),
        }
    }
}
