//! Overpass API implementation of [`CorridorFetcher`].
//!
//! Issues one POST per bounding box. Retries and endpoint fallback are left
//! to callers; the request timeout comes from [`RouterConfig`].

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use crate::config::RouterConfig;
use crate::corridor::{BoundingBox, CorridorFetcher};
use crate::error::{Error, Result};
use crate::feature::{FeatureCollection, WaterwayKind};

const USER_AGENT: &str = concat!("waterway-lib/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body kept in [`Error::UpstreamStatus`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl OverpassClient {
    pub fn new(config: &RouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.overpass_url.clone(),
            timeout: config.fetch_timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Overpass QL selecting every navigable waterway way inside `bbox`.
    pub fn build_query(&self, bbox: BoundingBox) -> String {
        build_query(bbox, self.timeout)
    }

    async fn fetch_bbox(&self, bbox: BoundingBox, label: &str) -> Result<FeatureCollection> {
        let query = self.build_query(bbox);
        debug!(label, %bbox, endpoint = self.endpoint.as_str(), "requesting waterway geometry");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let collection = FeatureCollection::from_overpass_json(&body)?;
        debug!(label, features = collection.len(), "received waterway geometry");
        Ok(collection)
    }
}

impl CorridorFetcher for OverpassClient {
    fn fetch<'a>(
        &'a self,
        bbox: BoundingBox,
        label: &'a str,
    ) -> BoxFuture<'a, Result<FeatureCollection>> {
        Box::pin(self.fetch_bbox(bbox, label))
    }
}

fn build_query(bbox: BoundingBox, timeout: Duration) -> String {
    let kinds = WaterwayKind::ALL
        .iter()
        .map(|kind| kind.tag_value())
        .chain(std::iter::once("navigation-channel"))
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "[out:json][timeout:{}];way[\"waterway\"~\"^({})$\"]({});out geom;",
        timeout.as_secs().max(1),
        kinds,
        bbox
    )
}
