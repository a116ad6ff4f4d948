use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use taskconnect::auth::CredentialAuthority;
use taskconnect::marketplace::{InMemoryMarketplace, MarketplaceService};
use taskconnect::reporting::PlainNarrator;

/// Marketplace wiring used by the binary: process-local store and the plain narrator.
pub(crate) type LocalMarketplace = MarketplaceService<InMemoryMarketplace, PlainNarrator>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn local_marketplace(credentials: CredentialAuthority) -> LocalMarketplace {
    MarketplaceService::new(
        Arc::new(InMemoryMarketplace::default()),
        Arc::new(PlainNarrator),
        credentials,
    )
}
