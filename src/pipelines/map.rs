use crate::api::MapRequest;
use crate::crawler::guard;
use crate::output::format_map_result;
use crate::pipelines::Pipelines;
use crate::{ConfigError, Result};
use tokio_util::sync::CancellationToken;

impl Pipelines {
    /// Map request for `url` built from the configured defaults
    pub fn map_request(&self, url: impl Into<String>, search: impl Into<String>) -> MapRequest {
        let defaults = &self.config.map;
        MapRequest {
            url: url.into(),
            search: search.into(),
            ignore_sitemap: defaults.ignore_sitemap,
            sitemap_only: defaults.sitemap_only,
            include_subdomains: defaults.include_subdomains,
            limit: defaults.limit,
        }
    }

    /// Lists the URLs of a site, optionally filtered by a search term
    pub async fn map(&self, request: &MapRequest, cancel: &CancellationToken) -> Result<String> {
        if request.url.trim().is_empty() {
            return Err(ConfigError::InvalidUrl("map URL cannot be empty".to_string()).into());
        }

        tracing::info!("Mapping {}", request.url);
        let links = guard(cancel, self.client().map(request)).await?;
        tracing::debug!("Map of {} found {} link(s)", request.url, links.len());

        Ok(format_map_result(&request.url, &request.search, &links))
    }
}
