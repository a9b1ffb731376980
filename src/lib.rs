pub mod api;
pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod providers;
pub mod query;

use std::sync::Arc;

use providers::ProviderBackend;

/// Application state that will be shared across handlers. The provider
/// backend is selected once at startup; handlers only see the trait object.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ProviderBackend>,
}
