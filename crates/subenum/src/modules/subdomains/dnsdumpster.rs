use super::{EnumContext, Harvest, SubdomainModule};
use crate::dns::{self, live_hosts};
use crate::modules::{response_text, Module};
use crate::pool::ProbePool;
use crate::scan::RESOLVE_DNS_CONCURRENCY;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use reqwest::header::REFERER;
use tracing::{debug, instrument, warn};

// region:        --- Module info

pub struct DnsDumpster {
    base_url: String,
}

impl DnsDumpster {
    pub fn new() -> Self {
        Self {
            base_url: "https://dnsdumpster.com/".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for DnsDumpster {
    fn name(&self) -> String {
        "DNSdumpster".to_string()
    }

    fn description(&self) -> String {
        "Use dnsdumpster.com host records, kept only if they resolve".to_string()
    }
}

// endregion:     --- Module info

fn csrf_token(page: &str) -> Option<String> {
    regex!(r#"(?s)<input type="hidden" name="csrfmiddlewaretoken" value="(.*?)">"#)
        .captures(page)
        .map(|cap| cap[1].trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Hosts of the "Host Records" table, first occurrence order.
fn host_records(page: &str) -> Vec<String> {
    let Some(table) = regex!(r#"(?s)<a name="hostanchor"></a>Host Records.*?<table.*?>(.*?)</table>"#)
        .captures(page)
    else {
        return Vec::new();
    };

    let mut hosts: Vec<String> = Vec::new();
    for cap in regex!(r#"(?s)<td class="col-md-4">(.*?)<br>"#).captures_iter(&table[1]) {
        let host = cap[1].trim().to_string();
        if !host.is_empty() && !hosts.contains(&host) {
            hosts.push(host);
        }
    }
    hosts
}

#[async_trait]
impl SubdomainModule for DnsDumpster {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let res = ctx
            .http_client
            .get(&self.base_url)
            .header(REFERER, "https://dnsdumpster.com")
            .send()
            .await?;
        let landing = response_text(res, &self.name()).await?;

        let Some(token) = csrf_token(&landing) else {
            warn!("Could not retrieve CSRF token");
            ctx.sink.error(&self.name(), "could not retrieve CSRF token");
            return Ok(Vec::new());
        };

        let params = [("csrfmiddlewaretoken", token.as_str()), ("targetip", ctx.domain.as_str())];
        let res = ctx
            .http_client
            .post(&self.base_url)
            .header(REFERER, "https://dnsdumpster.com")
            .form(&params)
            .send()
            .await?;
        let results = response_text(res, &self.name()).await?;

        let candidates: Vec<String> = host_records(&results)
            .into_iter()
            .filter(|host| ctx.domain.owns(host))
            .collect();
        debug!("{} candidates to validate", candidates.len());

        let pool = ProbePool::new(RESOLVE_DNS_CONCURRENCY);
        let live = if candidates.is_empty() {
            Vec::new()
        } else {
            live_hosts(&pool, &dns::public_resolver(), candidates).await
        };

        let mut harvest = Harvest::new(ctx, self.name());
        for host in &live {
            harvest.offer(host).await;
        }

        debug!("{} collected", harvest.found().len());
        Ok(harvest.into_found())
    }
}

// region:        --- Tests


// endregion:     --- Tests
