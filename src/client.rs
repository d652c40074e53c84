//! The analysis client forwards a staged image to the analysis service. It is
//! the only code that talks to the network

use crate::error::{ClientError, Result};
use crate::protocol::{AnalysisRequest, AnalysisResult};
use crate::selection::SelectedImage;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,

    /// Where analysis requests are POSTed
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        AnalysisClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Send one image to the analysis service. There is no timeout: this
    /// waits until the transport settles
    #[tracing::instrument(skip_all, fields(image = image.name()))]
    pub async fn analyze(&self, image: &SelectedImage) -> Result<AnalysisResult> {
        let request = AnalysisRequest {
            image: image.encode().await?,
        };
        debug!("posting {request:?} to {}", self.endpoint);

        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let body = response.bytes().await?;
        let result: AnalysisResult = serde_json::from_slice(&body)?;
        info!(
            "analysis service returned {} labels and {} faces",
            result.labels.as_ref().map_or(0, Vec::len),
            result.faces.as_ref().map_or(0, Vec::len)
        );

        Ok(result)
    }
}
