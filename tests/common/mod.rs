// Common test helpers for integration tests

use std::sync::Arc;
use std::time::Duration;

use paywatch::ui::RecordingSurface;
use paywatch::{AppContainer, ContainerBuilder};

/// Container on the in-memory store with a recording surface, started.
pub async fn started_container() -> (AppContainer, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::new());
    let container = ContainerBuilder::build_test(surface.clone())
        .await
        .expect("Failed to build container");
    container.start().await.expect("Failed to start container");
    (container, surface)
}

/// Let the listener tasks drain their pending notifications.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(60)).await;
}
