use auth_identity::AuthStrategy;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Purge expired sessions once. Lookups already treat them as absent, so
/// this only reclaims memory or records.
pub async fn sweep_once(auth: &dyn AuthStrategy) -> usize {
    let purged = auth.purge_expired().await;
    debug!(purged, auth_type = %auth.auth_type(), "Session sweep finished");
    purged
}

/// Run [`sweep_once`] every `every` until the task is aborted.
pub fn spawn_sweeper(auth: Arc<dyn AuthStrategy>, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting session sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep_once(auth.as_ref()).await;
        }
    })
}
