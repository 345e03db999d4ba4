//! Source tables served over HTTP, e.g. from a static file host.

use anyhow::{Context, Result};
use async_trait::async_trait;
use polars::prelude::DataFrame;
use reqwest::Url;
use tracing::debug;

use crate::fetch::{HttpClient, fetch_bytes};
use crate::parser::parse_table;
use crate::services::DataSource;

/// Fetches `<base_url>/<identifier>` and parses it as CSV.
pub struct HttpSource<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> HttpSource<C> {
    pub fn new(client: C, base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid base URL '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Full URL of `identifier`, percent-encoded.
    pub fn url_for(&self, identifier: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base URL '{}' cannot have a path", self.base_url))?
            .pop_if_empty()
            .push(identifier);
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> DataSource for HttpSource<C> {
    async fn get_data(&self, identifier: &str) -> Result<DataFrame> {
        let url = self.url_for(identifier)?;
        match fetch_bytes(&self.client, url.as_str()).await? {
            Some(bytes) => {
                parse_table(&bytes).with_context(|| format!("failed to parse response from {url}"))
            }
            None => {
                debug!(url = %url, "Source not found");
                Ok(DataFrame::empty())
            }
        }
    }
}
