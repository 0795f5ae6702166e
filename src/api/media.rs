// src/api/media.rs

use reqwest::Client;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::error::AppError;

/// Result of a successful upload at the media service.
#[derive(Debug, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

/// Uploads an image to the external media service.
///
/// The service stores the file under `folder/<random uuid>`, scales it down
/// to fit within `max_width` x `max_height` and answers with the public URL
/// plus an opaque id used later for deletion.
pub async fn upload(
    client: &Client,
    base_url: Option<&str>,
    file_name: &str,
    bytes: Vec<u8>,
    folder: &str,
    max_width: u32,
    max_height: u32,
) -> Result<UploadedImage, AppError> {
    let base = media_base_url(base_url)?;
    let endpoint = base
        .join("upload")
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let public_id = format!("{}/{}", folder, Uuid::new_v4());

    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
    let form = reqwest::multipart::Form::new()
        .part("file", part)
        .text("public_id", public_id)
        .text("folder", folder.to_owned())
        .text("max_width", max_width.to_string())
        .text("max_height", max_height.to_string());

    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Media service unreachable: {}", e);
            AppError::InternalServerError(format!("Media service unreachable: {}", e))
        })?;

    if !response.status().is_success() {
        return Err(AppError::InternalServerError(format!(
            "Media service rejected upload: {}",
            response.status()
        )));
    }

    let uploaded: UploadedImage = response
        .json()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Bad media service reply: {}", e)))?;

    Ok(uploaded)
}

/// Deletes a previously uploaded image by its public id.
///
/// Callers that remove a database row alongside treat failures here as
/// non-fatal and only log them, matching how the storefront always had
/// orphaned images on the hosting side rather than dangling rows.
pub async fn delete(
    client: &Client,
    base_url: Option<&str>,
    public_id: &str,
) -> Result<(), AppError> {
    if public_id.is_empty() {
        return Ok(());
    }

    let base = media_base_url(base_url)?;
    let endpoint = base
        .join(&format!("images/{}", public_id))
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let response = client.delete(endpoint).send().await.map_err(|e| {
        AppError::InternalServerError(format!("Media service unreachable: {}", e))
    })?;

    if !response.status().is_success() {
        return Err(AppError::InternalServerError(format!(
            "Media service rejected delete: {}",
            response.status()
        )));
    }

    Ok(())
}

fn media_base_url(base_url: Option<&str>) -> Result<Url, AppError> {
    let raw = base_url.ok_or_else(|| {
        AppError::InternalServerError("MEDIA_API_URL is not configured".to_string())
    })?;

    // A trailing slash matters for Url::join; normalize so "https://x/api"
    // and "https://x/api/" behave the same.
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized)
        .map_err(|e| AppError::InternalServerError(format!("MEDIA_API_URL is invalid: {}", e)))
}
