use std::error::Error;
use std::time::Instant;

use log::{error, info};
use reqwest::Method;
use reqwest_middleware::RequestBuilder;

use crate::api::models::ApiResponse;
use crate::error::{AuthError, Result};

/// Sends a request and reads its body into an [`ApiResponse`].
///
/// Non-2xx statuses become [`AuthError::Status`]. Retries, where wanted,
/// are handled by middleware on the client the builder came from.
pub async fn execute_request(
    request_builder: RequestBuilder,
    method: Method,
    url: &str,
) -> Result<ApiResponse> {
    info!("Sending {} request to {}", method.as_str(), url);
    let start_time = Instant::now();

    let response = match request_builder.send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed HTTP request to {}: {}", url, e);
            if let Some(source) = e.source() {
                error!("Error source: {:?}", source);
            }
            if let reqwest_middleware::Error::Reqwest(inner) = &e {
                if inner.is_timeout() {
                    error!("Request timed out");
                }
                if inner.is_connect() {
                    error!("Connection error");
                }
            }
            return Err(AuthError::Middleware(e));
        }
    };

    let status = response.status();
    info!(
        "Got response from {} after {:?} with status {}",
        url,
        start_time.elapsed(),
        status
    );

    let text = response.text().await?;
    if !status.is_success() {
        error!("{} {} failed with status {}: {}", method, url, status, text);
        return Err(AuthError::Status {
            code: status.as_u16(),
            body: text,
        });
    }

    Ok(ApiResponse::from_text(status.as_u16(), &text))
}
