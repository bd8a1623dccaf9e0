//! Data-fetch collaborator for the spreadsheet backend.
//!
//! Issues a single `Find` action against a table and hands the ingested records
//! to the caller. There is no retry: a failed call is reported once and the
//! caller decides what to show.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::{Url, blocking::Client};
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

use crate::{config::ApiConfig, record::{self, Record}};

const ACCESS_KEY_HEADER: &str = "ApplicationAccessKey";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("missing API credential: {0}")]
    MissingCredential(&'static str),
}

pub struct TableClient {
    http: Client,
    base_url: String,
    app_id: String,
    access_key: String,
    locale: String,
    timezone: String,
}

impl TableClient {
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let app_id = api
            .app_id
            .clone()
            .ok_or(FetchError::MissingCredential("app_id"))?;
        let access_key = api
            .access_key
            .clone()
            .ok_or(FetchError::MissingCredential("access_key"))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Building HTTP client")?;
        Ok(Self {
            http,
            base_url: api.base_url.clone(),
            app_id,
            access_key,
            locale: api.locale.clone(),
            timezone: api.timezone.clone(),
        })
    }

    /// `{base}/apps/{app_id}/tables/{table}/Action`, with each segment percent-encoded.
    pub fn action_url(&self, table: &str) -> Result<Url, FetchError> {
        action_url(&self.base_url, &self.app_id, table)
    }

    pub fn request_body(&self) -> JsonValue {
        find_request_body(&self.locale, &self.timezone)
    }

    pub fn fetch_table(&self, table: &str) -> Result<Vec<Record>> {
        let url = self.action_url(table)?;
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .json(&self.request_body())
            .send()
            .with_context(|| format!("Requesting table '{table}'"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: JsonValue = response
            .json()
            .with_context(|| format!("Decoding response body for table '{table}'"))?;
        let records = record::records_from_json(&body, table);
        info!("Fetched {} record(s) from table '{table}'", records.len());
        Ok(records)
    }
}

pub fn action_url(base_url: &str, app_id: &str, table: &str) -> Result<Url, FetchError> {
    let mut url =
        Url::parse(base_url).map_err(|_| FetchError::InvalidBaseUrl(base_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidBaseUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(["apps", app_id, "tables", table, "Action"]);
    Ok(url)
}

pub fn find_request_body(locale: &str, timezone: &str) -> JsonValue {
    json!({
        "Action": "Find",
        "Properties": {
            "Locale": locale,
            "Timezone": timezone,
        },
        "Rows": [],
    })
}
