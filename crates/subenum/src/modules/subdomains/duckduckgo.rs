use super::search::{exclusion_query, fill_template, paginate, SearchEngine, SearchParams};
use super::{decode_entities, host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::Module;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use reqwest::Url;
use std::time::Duration;

// region:        --- Module info

pub struct DuckDuckGo {
    base_url: String,
    params: SearchParams,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com/html/?q={query}".to_string(),
            params: SearchParams {
                max_pages: 10,
                max_domains: 11,
                delay: Duration::from_secs(2),
            },
        }
    }

    pub fn tuned(mut self, tuning: &EngineTuning) -> Self {
        self.params = self.params.tuned(tuning);
        self
    }
}

impl Module for DuckDuckGo {
    fn name(&self) -> String {
        "DuckDuckGo".to_string()
    }

    fn description(&self) -> String {
        "Search the html.duckduckgo.com endpoint".to_string()
    }
}

// endregion:     --- Module info

/// Result links go through a `/l/?uddg=<target>` redirect, keep the target.
fn unwrap_redirect(link: &str) -> String {
    let decoded = decode_entities(link);
    let absolute = match decoded.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => decoded.clone(),
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(decoded)
}

impl SearchEngine for DuckDuckGo {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    fn build_query(&self, domain: &str, found: &[String]) -> String {
        let base = format!("site:{domain} -www.{domain}");
        exclusion_query(base, "-", found, self.params.max_domains.saturating_sub(2))
    }

    /// The html endpoint has no page parameter, new results come from the
    /// exclusion clause alone.
    fn page_url(&self, query: &str, page: u32) -> String {
        fill_template(&self.base_url, query, page)
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        let titles = regex!(r#"<a class="result__a".*?href="(.*?)""#).captures_iter(body);
        let urls = regex!(r#"<a class="result__url".*?href="(.*?)""#).captures_iter(body);

        titles
            .chain(urls)
            .filter_map(|cap| host_of(&unwrap_redirect(&cap[1])))
            .collect()
    }

    fn detect_blocking(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        body.contains("error") || body.contains("blocked")
    }
}

#[async_trait]
impl SubdomainModule for DuckDuckGo {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_redirect_links() {
        let page = r#"<a class="result__a" rel="nofollow" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fvpn.example.com%2Flogin&amp;rut=abc">VPN</a>
<a class="result__url" href="https://status.example.com/">status.example.com</a>"#;
        assert_eq!(
            DuckDuckGo::new().extract_candidates(page),
            vec!["vpn.example.com".to_string(), "status.example.com".to_string()]
        );
    }

    #[test]
    fn error_pages_are_blocking() {
        let ddg = DuckDuckGo::new();
        assert!(ddg.detect_blocking("<div>Request BLOCKED</div>"));
        assert!(!ddg.detect_blocking("<div>results</div>"));
    }
}

// endregion:     --- Tests
