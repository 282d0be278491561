//! CRS name resolvers
//!
//! A resolver turns a CRS name that is not yet in the registry into a
//! descriptor. Resolution is the only step of a reprojection that may
//! suspend: the HTTP resolver waits on the network, bounded by a timeout.

use std::time::Duration;

use async_trait::async_trait;
use log::info;

use crate::coordinate::{epsg_code_from_name, CrsDescriptor};
use crate::document::errors::{ReprojError, ReprojResult};

/// Default base URL for EPSG lookups
pub const DEFAULT_EPSG_IO_URL: &str = "https://epsg.io";

/// Default network timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Produces descriptors for CRS names the registry does not know
#[async_trait]
pub trait CrsResolver: Send + Sync {
    /// Resolve `name`, failing with `UnresolvedCrs` when it cannot
    async fn resolve_by_name(&self, name: &str) -> ReprojResult<CrsDescriptor>;
}

/// Resolver used when network lookup is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineResolver;

#[async_trait]
impl CrsResolver for OfflineResolver {
    async fn resolve_by_name(&self, name: &str) -> ReprojResult<CrsDescriptor> {
        Err(ReprojError::unresolved(name, "not in registry and network lookup is disabled"))
    }
}

/// Resolver that fetches proj4 definitions over HTTP
///
/// Only EPSG names (`EPSG:3006`, `urn:ogc:def:crs:EPSG::3006`) can be looked
/// up; the definition is read from `<base_url>/<code>.proj4`.
#[derive(Debug, Clone)]
pub struct EpsgIoResolver {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for EpsgIoResolver {
    fn default() -> Self {
        Self::new(DEFAULT_EPSG_IO_URL, DEFAULT_TIMEOUT)
    }
}

impl EpsgIoResolver {
    /// Create a resolver for `base_url` giving up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        EpsgIoResolver {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// URL queried for `code`
    pub fn definition_url(&self, code: u32) -> String {
        format!("{}/{}.proj4", self.base_url, code)
    }

    /// Network timeout for a single lookup
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_definition(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("{} returned HTTP {}", url, status));
        }

        response
            .text()
            .await
            .map_err(|e| format!("reading response from {} failed: {}", url, e))
    }
}

#[async_trait]
impl CrsResolver for EpsgIoResolver {
    async fn resolve_by_name(&self, name: &str) -> ReprojResult<CrsDescriptor> {
        let code = epsg_code_from_name(name)
            .ok_or_else(|| ReprojError::unresolved(name, "only EPSG names can be looked up online"))?;
        let url = self.definition_url(code);
        info!("Looking up {} at {}", name, url);

        let body = match tokio::time::timeout(self.timeout, self.fetch_definition(&url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(reason)) => return Err(ReprojError::unresolved(name, reason)),
            Err(_) => {
                return Err(ReprojError::unresolved(
                    name,
                    format!("lookup timed out after {} ms", self.timeout.as_millis()),
                ))
            },
        };

        let definition = body.trim();
        if definition.is_empty() {
            return Err(ReprojError::unresolved(name, format!("{} returned an empty definition", url)));
        }

        CrsDescriptor::from_definition(definition)
            .map_err(|e| ReprojError::unresolved(name, e.to_string()))
    }
}
