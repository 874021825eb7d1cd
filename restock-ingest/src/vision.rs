//! Optional Google Cloud Vision client (feature `vision`).
//!
//! Real OCR stays an external collaborator; this is only the thin HTTP call
//! that fetches detected text for `crate::receipt::extract_line_items`.

use anyhow::{Context, Result, bail};
use serde_json::json;

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Run TEXT_DETECTION on a base64-encoded image and return the raw text.
///
/// Accepts plain base64 or a `data:image/...;base64,` URL.
pub async fn fetch_receipt_text(api_key: &str, image_base64: &str) -> Result<String> {
    let content = image_base64
        .split_once(";base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(image_base64);

    let body = json!({
        "requests": [{
            "image": { "content": content },
            "features": [{ "type": "TEXT_DETECTION", "maxResults": 1 }],
        }]
    });

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{ANNOTATE_URL}?key={api_key}"))
        .json(&body)
        .send()
        .await
        .context("vision request failed")?;

    if !resp.status().is_success() {
        bail!("vision request failed with status {}", resp.status());
    }

    let payload: serde_json::Value = resp.json().await.context("vision response not json")?;
    let text = payload["responses"][0]["textAnnotations"][0]["description"]
        .as_str()
        .map(str::to_string);

    match text {
        Some(t) if !t.is_empty() => Ok(t),
        _ => bail!("no text detected in image"),
    }
}
