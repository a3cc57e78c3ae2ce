//! Minimal client for the InfluxDB v2 write api.

use reqwest::{StatusCode, header::InvalidHeaderValue};
use tracing::instrument;

mod point;

pub use point::Point;


/// The path of the v2 write endpoint
const WRITE_PATH: &str = "/api/v2/write";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error from reqwest: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Invalid auth token header value")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
    #[error("Point for measurement {0} has no fields")]
    EmptyPoint(String),
    #[error("Write rejected with status {status}: {body}")]
    WriteRejected { status: StatusCode, body: String },
}

#[derive(Clone, Debug)]
pub struct Client {
    url: String,
    org: String,
    client: reqwest::Client,
}

impl Client {
    /// Creates a client authenticated with the provided api token.
    /// `verify_ssl = false` accepts invalid certificates from the server.
    pub fn new(url: &str, token: &str, org: &str, verify_ssl: bool) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Token {token}").parse()?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            org: org.to_string(),
            client,
        })
    }

    /// Writes a single point into the bucket.
    /// Returns once the server has acknowledged the write.
    #[instrument(err, skip(self), fields(url = %self.url, org = %self.org))]
    pub async fn write(&self, bucket: &str, point: &Point) -> Result<(), Error> {
        if point.is_empty() {
            return Err(Error::EmptyPoint(point.measurement().to_string()));
        }

        let response = self
            .client
            .post(format!("{}{}", self.url, WRITE_PATH))
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", bucket),
                ("precision", "ns"),
            ])
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(point.to_line_protocol())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::WriteRejected { status, body });
        }

        Ok(())
    }
}
