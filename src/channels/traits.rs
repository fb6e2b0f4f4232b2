use async_trait::async_trait;
use std::path::Path;

/// Outbound delivery contract. New messaging backends only need to
/// implement this trait.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Stable backend identifier (e.g. `whatsapp`, `dry_run`).
    fn id(&self) -> &'static str;

    /// Deliver `image` with `caption` to `recipient`.
    async fn send_image(&self, image: &Path, caption: &str, recipient: &str)
    -> anyhow::Result<()>;

    /// Best-effort check that the backend is reachable and configured.
    async fn health_check(&self) -> anyhow::Result<bool>;
}
