//! Blocking HTTP client for the Astra server API.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct ProbeClient {
    base_url: String,
    client: Client,
}

impl ProbeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn health(&self) -> Result<Value> {
        self.get("/health", &[])
    }

    pub fn analyze(&self, text: &str) -> Result<Value> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "text": text }))
            .send()
            .with_context(|| format!("POST {} failed", url))?;
        read_json(response)
    }

    pub fn nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_m: Option<i64>,
        categories: Option<&str>,
    ) -> Result<Value> {
        let mut params = vec![("lat", lat.to_string()), ("lon", lon.to_string())];
        if let Some(radius_m) = radius_m {
            params.push(("radius_m", radius_m.to_string()));
        }
        if let Some(categories) = categories {
            params.push(("categories", categories.to_string()));
        }
        self.get("/nearby", &params)
    }

    pub fn route(&self, start: (f64, f64), end: (f64, f64), profile: &str) -> Result<Value> {
        let params = [
            ("start_lat", start.0.to_string()),
            ("start_lon", start.1.to_string()),
            ("end_lat", end.0.to_string()),
            ("end_lon", end.1.to_string()),
            ("profile", profile.to_string()),
        ];
        self.get("/route", &params)
    }

    fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .with_context(|| format!("GET {} failed", url))?;
        read_json(response)
    }
}

/// Parse the body as JSON regardless of status; the API reports failures
/// in-band with `ok: false`.
fn read_json(response: reqwest::blocking::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().context("failed to read response body")?;
    serde_json::from_str(&text)
        .with_context(|| format!("HTTP {} returned non-JSON body: {}", status, text))
}
