//! API Client

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Create a subscription checkout session and return the hosted page URL.
pub async fn create_checkout(email: &str) -> Result<String, String> {
    let client = reqwest::Client::new();

    let body = serde_json::json!({
        "email": email,
        // metadata needed to provision the download after success
        "metadata": { "_note": "cv_download_request" }
    });

    let response = client
        .post("/create-checkout-session")
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let ok = response.status().is_success();
    let data: CheckoutSessionResponse = response.json().await.map_err(|e| e.to_string())?;

    match data.url {
        Some(url) if ok => Ok(url),
        _ => Err(data
            .message
            .unwrap_or_else(|| "Failed to create checkout session".into())),
    }
}
