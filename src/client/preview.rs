use crate::models::ReferenceImage;

/// Encodes the image as a data URL on the blocking pool.
pub async fn data_url(image: ReferenceImage) -> Option<String> {
    match tokio::task::spawn_blocking(move || image.to_data_url()).await {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("Preview encoding failed: {}", e);
            None
        }
    }
}
