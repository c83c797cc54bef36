use super::search::{exclusion_query, fill_template, paginate, SearchEngine, SearchParams};
use super::{host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::Module;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use std::time::Duration;

// region:        --- Module info

pub struct Google {
    base_url: String,
    params: SearchParams,
}

impl Google {
    pub fn new() -> Self {
        Self {
            base_url: "https://google.com/search?q={query}&btnG=Search&hl=en-US&biw=&bih=&gbv=1&start={page_no}&filter=0".to_string(),
            params: SearchParams {
                max_pages: 20,
                max_domains: 11,
                delay: Duration::from_secs(5),
            },
        }
    }

    pub fn tuned(mut self, tuning: &EngineTuning) -> Self {
        self.params = self.params.tuned(tuning);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for Google {
    fn name(&self) -> String {
        "Google".to_string()
    }

    fn description(&self) -> String {
        "Search google.com with site: queries".to_string()
    }
}

// endregion:     --- Module info

impl SearchEngine for Google {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    fn build_query(&self, domain: &str, found: &[String]) -> String {
        let base = format!("site:{domain} -www.{domain}");
        exclusion_query(base, "-", found, self.params.max_domains.saturating_sub(2))
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        fill_template(&self.base_url, query, page * 10)
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        regex!(r"<cite.*?>(.*?)</cite>")
            .captures_iter(body)
            .filter_map(|cap| host_of(&regex!(r"<span.*>").replace_all(&cap[1], "")))
            .collect()
    }

    fn detect_blocking(&self, body: &str) -> bool {
        body.contains("Our systems have detected unusual traffic")
    }
}

#[async_trait]
impl SubdomainModule for Google {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::subdomains::tests::context;
    use crate::modules::subdomains::Harvest;

    const PAGE: &str = r#"<div><cite class="x">https://mail.example.com<span> › inbox</span></cite>
<cite>docs.example.com</cite><cite>example.com</cite><cite>other.org</cite></div>"#;

    #[test]
    fn query_excludes_found_hosts() {
        let google = Google::new();
        assert_eq!(
            google.build_query("example.com", &[]),
            "site:example.com -www.example.com"
        );

        let found: Vec<String> = (0..20).map(|i| format!("h{i}.example.com")).collect();
        let query = google.build_query("example.com", &found);
        // 11 max domains, root and www are already part of the query
        assert_eq!(query.matches(" -h").count(), 9);
    }

    #[test]
    fn page_offsets_count_results() {
        let google = Google::new().with_base_url("https://g/?q={query}&start={page_no}");
        assert_eq!(google.page_url("site:x.com", 3), "https://g/?q=site%3Ax.com&start=30");
    }

    #[tokio::test]
    async fn extraction_is_idempotent() {
        let google = Google::new();
        let (ctx, _) = context("example.com");
        let mut harvest = Harvest::new(&ctx, google.name());

        for _ in 0..2 {
            for link in google.extract_candidates(PAGE) {
                harvest.offer(&link).await;
            }
        }

        assert_eq!(harvest.found(), ["mail.example.com", "docs.example.com"]);
    }

    #[test]
    fn detects_unusual_traffic_page() {
        let google = Google::new();
        assert!(google.detect_blocking("<p>Our systems have detected unusual traffic from</p>"));
        assert!(!google.detect_blocking(PAGE));
    }
}

// endregion:     --- Tests
