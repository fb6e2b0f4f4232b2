//! The puzzle delivery job.
//!
//! One cycle: resolve a puzzle, fetch its image, build the caption,
//! dispatch, then delete the downloaded image. Every failure is logged and
//! folded into the returned [`JobReport`]; nothing propagates to the
//! scheduler.

use crate::caption::format_caption;
use crate::channels::Dispatcher;
use crate::config::BotConfig;
use crate::board_image::{ImageRetriever, RetrievedImage, is_temporary_image};
use crate::puzzle::{PuzzleLedger, PuzzleOrigin, PuzzleSource};
use crate::scheduler::{Clock, ScheduledJob};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Delivery outcome of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed(String),
}

/// Everything that happened during one job cycle.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub origin: PuzzleOrigin,
    pub image: RetrievedImage,
    pub caption: String,
    pub delivery: DeliveryStatus,
    /// Whether a downloaded temporary image was deleted afterwards.
    pub cleaned_up: bool,
}

impl JobReport {
    pub fn delivered(&self) -> bool {
        self.delivery == DeliveryStatus::Sent
    }
}

/// Resolves, renders, and delivers one puzzle per run.
pub struct PuzzleJob {
    source: PuzzleSource,
    images: ImageRetriever,
    dispatcher: Arc<dyn Dispatcher>,
    recipient: String,
    clock: Arc<dyn Clock>,
}

impl PuzzleJob {
    pub fn new(
        source: PuzzleSource,
        images: ImageRetriever,
        dispatcher: Arc<dyn Dispatcher>,
        recipient: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            images,
            dispatcher,
            recipient: recipient.into(),
            clock,
        }
    }

    /// Wire a job from configuration.
    pub fn from_config(
        config: &BotConfig,
        ledger: Arc<dyn PuzzleLedger>,
        dispatcher: Arc<dyn Dispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            PuzzleSource::new(&config.feed, ledger),
            ImageRetriever::new(&config.image, config.feed.timeout_secs),
            dispatcher,
            config.dispatch.recipient.clone(),
            clock,
        )
    }

    /// Run one cycle and report what happened.
    pub async fn run_once(&self) -> JobReport {
        info!("running puzzle job at {}", self.clock.now());

        let resolution = self.source.resolve().await;
        let image = self.images.retrieve(resolution.record.image.as_deref()).await;
        let caption = format_caption(&resolution.record, &self.clock.now());

        info!(
            "sending via {} at {}",
            self.dispatcher.id(),
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        );
        let delivery = match self
            .dispatcher
            .send_image(image.path(), &caption, &self.recipient)
            .await
        {
            Ok(()) => {
                info!("message sent successfully");
                DeliveryStatus::Sent
            }
            Err(e) => {
                error!("error sending message: {e:#}");
                DeliveryStatus::Failed(format!("{e:#}"))
            }
        };

        let cleaned_up = remove_temporary_image(&image).await;

        JobReport {
            origin: resolution.origin,
            image,
            caption,
            delivery,
            cleaned_up,
        }
    }
}

/// Delete `image` if it was downloaded this cycle and carries the temporary
/// naming convention. The fallback image is never touched. Errors are
/// logged and ignored.
async fn remove_temporary_image(image: &RetrievedImage) -> bool {
    let RetrievedImage::Downloaded(path) = image else {
        return false;
    };
    if !is_temporary_image(path) {
        return false;
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("removed {}", path.display());
            true
        }
        Err(e) => {
            warn!("could not remove {}: {e}", path.display());
            false
        }
    }
}

#[async_trait]
impl ScheduledJob for PuzzleJob {
    fn name(&self) -> &str {
        "puzzle job"
    }

    async fn run(&self) {
        let report = self.run_once().await;
        if !report.delivered() {
            warn!("puzzle job finished without delivery");
        }
    }
}
