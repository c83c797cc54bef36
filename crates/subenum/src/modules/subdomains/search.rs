//! Pagination loop shared by the search-engine modules.
//!
//! Each page: build the query (excluding hosts already found) or follow the
//! previous page's next link, fetch it, extract candidates, then stop on a
//! blocking page, on the page ceiling, on a missing next link or after
//! repeated identical pages. Otherwise sleep and fetch the next page.

use super::{EnumContext, Harvest};
use crate::config::EngineTuning;
use crate::modules::{http_get_text, Module};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::form_urlencoded;

/// Identical consecutive pages tolerated before giving up.
const MAX_STALLED_PAGES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Pages fetched at most, 0 means unlimited.
    pub max_pages: u32,
    /// Found hosts echoed back into the exclusion clause at most.
    pub max_domains: usize,
    pub delay: Duration,
}

impl SearchParams {
    pub fn tuned(mut self, tuning: &EngineTuning) -> Self {
        if let Some(max_pages) = tuning.max_pages {
            self.max_pages = max_pages;
        }
        if let Some(max_domains) = tuning.max_domains {
            self.max_domains = max_domains;
        }
        if let Some(delay) = tuning.delay {
            self.delay = delay;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Blocked,
    Exhausted,
    Failed,
}

#[async_trait]
pub trait SearchEngine: Module + Send + Sync {
    fn params(&self) -> &SearchParams;

    fn build_query(&self, domain: &str, found: &[String]) -> String;

    /// Full URL of the given page (0 based) for an unencoded query.
    fn page_url(&self, query: &str, page: u32) -> String;

    async fn issue_request(&self, http_client: &Client, url: &str) -> Result<String> {
        http_get_text(http_client, url, &self.name()).await
    }

    /// Hosts linked from a page, before the subdomain and duplicate checks.
    fn extract_candidates(&self, body: &str) -> Vec<String>;

    fn detect_blocking(&self, _body: &str) -> bool {
        false
    }

    /// Engines paging through "next" links instead of offsets return true
    /// and provide `next_page_url`. A page without a next link ends the run.
    fn follows_links(&self) -> bool {
        false
    }

    fn next_page_url(&self, _body: &str) -> Option<String> {
        None
    }

    fn throttle_delay(&self) -> Duration {
        self.params().delay
    }
}

// region:        --- Query helpers

pub fn encode_query(query: &str) -> String {
    form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Fills `{query}` and `{page_no}` in a URL template.
pub fn fill_template(template: &str, query: &str, page_no: u32) -> String {
    template
        .replace("{query}", &encode_query(query))
        .replace("{page_no}", &page_no.to_string())
}

/// `base` followed by ` <prefix><host>` for at most `limit` found hosts.
pub fn exclusion_query(base: String, prefix: &str, found: &[String], limit: usize) -> String {
    found.iter().take(limit).fold(base, |mut query, host| {
        query.push(' ');
        query.push_str(prefix);
        query.push_str(host);
        query
    })
}

// endregion:     --- Query helpers

#[instrument(name = "paginate", level = "info", fields(module = %engine.name()), skip_all)]
pub async fn paginate<E>(engine: &E, ctx: &EnumContext) -> Result<Vec<String>>
where
    E: SearchEngine + ?Sized,
{
    let params = engine.params().clone();
    let mut harvest = Harvest::new(ctx, engine.name());
    let mut previous: Option<Vec<String>> = None;
    let mut stalled = 0;
    let mut page: u32 = 0;
    let mut next_url: Option<String> = None;

    let stop = loop {
        let url = match next_url.take() {
            Some(url) => url,
            None => {
                let query = engine.build_query(ctx.domain.as_str(), harvest.found());
                engine.page_url(&query, page)
            }
        };

        let body = match engine.issue_request(&ctx.http_client, &url).await {
            Ok(body) => body,
            Err(err) => {
                warn!("Page {} failed: {}", page, err);
                break Stop::Failed;
            }
        };

        let links = engine.extract_candidates(&body);
        for host in &links {
            harvest.offer(host).await;
        }
        debug!("Page {}: {} links, {} hosts so far", page, links.len(), harvest.found().len());

        if engine.detect_blocking(&body) {
            info!("{} is probably blocking our requests", engine.name());
            ctx.sink
                .error(&engine.name(), "probably blocking our requests, stopping");
            break Stop::Blocked;
        }

        page += 1;
        if params.max_pages != 0 && page >= params.max_pages {
            break Stop::Exhausted;
        }

        if engine.follows_links() {
            match engine.next_page_url(&body) {
                Some(url) => next_url = Some(url),
                None => break Stop::Exhausted,
            }
        }

        if previous.as_ref() == Some(&links) {
            stalled += 1;
            if stalled >= MAX_STALLED_PAGES {
                break Stop::Exhausted;
            }
        } else {
            stalled = 0;
        }
        previous = Some(links);

        sleep(engine.throttle_delay()).await;
    };

    info!("Stopped ({:?}) after {} pages, {} hosts", stop, page, harvest.found().len());
    Ok(harvest.into_found())
}

// region:        --- Tests


// endregion:     --- Tests
