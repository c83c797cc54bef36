pub mod alienvault;
pub mod ask;
pub mod baidu;
pub mod bing;
pub mod crtsh;
pub mod dnsdumpster;
pub mod duckduckgo;
pub mod google;
pub mod netcraft;
pub mod passivedns;
pub mod search;
pub mod threatcrowd;
pub mod virustotal;
pub mod web_archive;
pub mod yahoo;

use super::Module;
use crate::model::Domain;
use crate::output::OutputSink;
use crate::results::SharedResults;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use reqwest::{Client, Url};
use std::sync::Arc;
use tracing::trace;

/// Everything an engine needs for one run.
#[derive(Clone)]
pub struct EnumContext {
    pub http_client: Client,
    pub domain: Domain,
    pub results: SharedResults,
    pub sink: Arc<dyn OutputSink>,
}

#[async_trait]
pub trait SubdomainModule: Module + Send + Sync {
    /// Returns the engine's own deduplicated list. Hosts are also pushed to
    /// the shared results as soon as they are found, so an `Err` still keeps
    /// what was collected before it.
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>>;
}

// region:        --- Harvest

/// Per-engine list of accepted hosts, in discovery order.
pub struct Harvest<'a> {
    ctx: &'a EnumContext,
    source: String,
    found: Vec<String>,
}

impl<'a> Harvest<'a> {
    pub fn new(ctx: &'a EnumContext, source: String) -> Self {
        Self {
            ctx,
            source,
            found: Vec::new(),
        }
    }

    /// Accepts a candidate host if it is a strict subdomain of the target
    /// and not already in the list. Returns whether it was added.
    pub async fn offer(&mut self, candidate: &str) -> bool {
        let host = candidate.trim().trim_end_matches('.').to_ascii_lowercase();
        if !self.ctx.domain.owns(&host) || self.found.contains(&host) {
            return false;
        }

        trace!("Collecting: {:?}", host);
        self.ctx.sink.discovery(&self.source, &host);
        self.ctx.results.insert(host.clone()).await;
        self.found.push(host);
        true
    }

    pub fn found(&self) -> &[String] {
        &self.found
    }

    pub fn into_found(self) -> Vec<String> {
        self.found
    }
}

// endregion:     --- Harvest

// region:        --- Link helpers

pub fn strip_tags(text: &str) -> String {
    regex!(r"<[^>]*>").replace_all(text, "").into_owned()
}

pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
        .replace("&amp;", "&")
}

/// Bare host of a scraped link. Markup and entities are removed first and a
/// missing scheme is assumed to be http.
pub fn host_of(link: &str) -> Option<String> {
    let link = decode_entities(&strip_tags(link));
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let link = if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if let Some(rest) = link.strip_prefix("//") {
        format!("http://{}", rest)
    } else {
        format!("http://{}", link)
    };

    Url::parse(&link)
        .ok()?
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

// endregion:     --- Link helpers

// region:        --- Tests


// endregion:     --- Tests
