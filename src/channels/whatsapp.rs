use crate::channels::traits::Dispatcher;
use crate::config::WhatsAppConfig;
use async_trait::async_trait;
use image::ImageFormat;
use serde::Deserialize;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// WhatsApp Business Cloud API dispatcher.
///
/// Delivery is two requests: the image is uploaded as media, then an
/// `image` message referencing the media ID is sent with the caption.
/// The Cloud API accepts only JPEG and PNG, so other formats (the board
/// renderer serves GIF) are re-encoded as PNG before upload.
#[derive(Clone)]
pub struct WhatsAppDispatcher {
    access_token: String,
    phone_number_id: String,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    id: String,
}

/// Image bytes ready for the media endpoint.
#[derive(Debug)]
pub struct UploadImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

impl WhatsAppDispatcher {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            access_token: config.access_token.clone(),
            phone_number_id: config.phone_number_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{path}", self.api_base, self.phone_number_id)
    }

    fn check_credentials(&self) -> anyhow::Result<()> {
        if self.access_token.trim().is_empty() {
            anyhow::bail!("whatsapp access token is empty");
        }
        if self.phone_number_id.trim().is_empty() {
            anyhow::bail!("whatsapp phone_number_id is empty");
        }
        Ok(())
    }

    async fn upload_media(&self, upload: UploadImage) -> anyhow::Result<String> {
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)?;
        let form = reqwest::multipart::Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", upload.mime)
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint("media"))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("whatsapp media upload failed ({status}): {body}");
        }

        let media: MediaUploadResponse = response.json().await?;
        debug!("uploaded whatsapp media {}", media.id);
        Ok(media.id)
    }
}

/// Read `path` and convert it to a format the Cloud API accepts.
///
/// Decoding and re-encoding run on the blocking pool.
pub async fn prepare_upload(path: &Path) -> anyhow::Result<UploadImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read image {}: {e}", path.display()))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("puzzle")
        .to_owned();

    match image::guess_format(&bytes) {
        Ok(ImageFormat::Jpeg) => Ok(UploadImage {
            bytes,
            mime: "image/jpeg",
            file_name: format!("{stem}.jpg"),
        }),
        Ok(ImageFormat::Png) => Ok(UploadImage {
            bytes,
            mime: "image/png",
            file_name: format!("{stem}.png"),
        }),
        _ => {
            let png = tokio::task::spawn_blocking(move || reencode_as_png(&bytes))
                .await
                .map_err(|e| anyhow::anyhow!("image re-encode task failed: {e}"))?
                .map_err(|e| anyhow::anyhow!("unsupported image {}: {e}", path.display()))?;
            Ok(UploadImage {
                bytes: png,
                mime: "image/png",
                file_name: format!("{stem}.png"),
            })
        }
    }
}

fn reencode_as_png(bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let mut png = Cursor::new(Vec::new());
    decoded.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

#[async_trait]
impl Dispatcher for WhatsAppDispatcher {
    fn id(&self) -> &'static str {
        "whatsapp"
    }

    async fn send_image(
        &self,
        image: &Path,
        caption: &str,
        recipient: &str,
    ) -> anyhow::Result<()> {
        self.check_credentials()?;
        let to = recipient.trim();
        let to = to.strip_prefix('+').unwrap_or(to);
        if to.is_empty() {
            anyhow::bail!("whatsapp recipient is empty");
        }

        let upload = prepare_upload(image).await?;
        let media_id = self.upload_media(upload).await?;

        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "image",
            "image": {
                "id": media_id,
                "caption": caption
            }
        });
        let response = self
            .client
            .post(self.endpoint("messages"))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("whatsapp send failed ({status}): {body}");
        }

        info!("whatsapp message accepted for {to}");
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        if self.check_credentials().is_err() {
            return Ok(false);
        }
        let url = format!("{}/{}", self.api_base, self.phone_number_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}
