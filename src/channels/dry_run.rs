use crate::channels::traits::Dispatcher;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Dispatcher that only logs what it would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunDispatcher;

#[async_trait]
impl Dispatcher for DryRunDispatcher {
    fn id(&self) -> &'static str {
        "dry_run"
    }

    async fn send_image(
        &self,
        image: &Path,
        caption: &str,
        recipient: &str,
    ) -> anyhow::Result<()> {
        info!(
            recipient,
            image = %image.display(),
            "dry run, not sending:\n{caption}"
        );
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}
