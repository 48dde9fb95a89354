use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde_json::json;
use uuid::Uuid;

use crate::{
    adapter::GenerationAdapter,
    error::{GenerationError, Result},
    models::{GenerateResponse, GenerationMode, GenerationRequest, ReferenceImage},
};

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn generate(
    adapter: web::Data<GenerationAdapter>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let request_id = Uuid::new_v4();
    let mut kind = "unknown";

    let outcome = match read_generation_request(payload).await {
        Ok(request) => {
            if let Ok(mode) = request.mode.parse::<GenerationMode>() {
                kind = mode.media_kind().as_str();
            }
            log::info!(
                "[req:{}] generate type={} kind={} prompt_len={} image={}",
                request_id,
                request.mode,
                kind,
                request.prompt.len(),
                request.image.is_some()
            );
            adapter.handle(request).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            log::info!("[req:{}] {} output {}", request_id, kind, result.media_url);
            Ok(HttpResponse::Ok().json(GenerateResponse::from(result)))
        }
        Err(e) => {
            log::error!("[req:{}] generation error: {}", request_id, e);
            Err(e)
        }
    }
}

/// Collects the `type`, `prompt`, `duration` and `image` parts. Other parts are skipped.
pub async fn read_generation_request(mut payload: Multipart) -> Result<GenerationRequest> {
    let mut request = GenerationRequest::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| GenerationError::Request(format!("Invalid form data: {}", e)))?;

        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();
        let file_name = field
            .content_disposition()
            .get_filename()
            .map(String::from);
        let mime_type = field.content_type().map(|mime| mime.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| GenerationError::Request(format!("Invalid form data: {}", e)))?;
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "type" => request.mode = String::from_utf8_lossy(&bytes).into_owned(),
            "prompt" => request.prompt = String::from_utf8_lossy(&bytes).into_owned(),
            "duration" => request.duration = Some(String::from_utf8_lossy(&bytes).into_owned()),
            // A file input left empty still posts a zero-length part.
            "image" if !bytes.is_empty() => {
                let mut image = ReferenceImage::new(
                    bytes,
                    mime_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                );
                image.file_name = file_name;
                request.image = Some(image);
            }
            _ => log::trace!("Skipping form field {:?}", name),
        }
    }

    Ok(request)
}
