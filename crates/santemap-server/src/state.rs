use std::sync::Arc;

use santemap_assistant::AssistantGateway;
use santemap_directory::FacilityCatalog;
use santemap_records::RecordStore;

/// Shared application state accessible from all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-only facility catalog, shared across all requests.
    pub catalog: Arc<FacilityCatalog>,
    /// Patient-record store.
    pub store: RecordStore,
    /// Client for the external AI completion gateway.
    pub assistant: Arc<AssistantGateway>,
}
