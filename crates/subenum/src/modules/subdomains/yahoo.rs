use super::search::{exclusion_query, fill_template, paginate, SearchEngine, SearchParams};
use super::{host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::Module;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use std::time::Duration;

// region:        --- Module info

pub struct Yahoo {
    base_url: String,
    params: SearchParams,
}

impl Yahoo {
    pub fn new() -> Self {
        Self {
            base_url: "https://search.yahoo.com/search?p={query}&b={page_no}".to_string(),
            params: SearchParams {
                max_pages: 20,
                max_domains: 10,
                delay: Duration::ZERO,
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

impl Module for Yahoo {
    fn name(&self) -> String {
        "Yahoo".to_string()
    }

    fn description(&self) -> String {
        "Search search.yahoo.com with site: queries".to_string()
    }
}

// endregion:     --- Module info

impl SearchEngine for Yahoo {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    fn build_query(&self, domain: &str, found: &[String]) -> String {
        let base = format!("site:{domain} -domain:www.{domain}");
        exclusion_query(base, "-domain:", found, self.params.max_domains)
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        fill_template(&self.base_url, query, page * 10)
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        let spans = regex!(r#"<span class=" fz-.*? fw-m fc-12th wr-bw.*?">(.*?)</span>"#)
            .captures_iter(body);
        let cites = regex!(r#"<span class="txt"><span class=" cite fw-xl fz-15px">(.*?)</span>"#)
            .captures_iter(body);

        spans
            .chain(cites)
            .filter_map(|cap| {
                let link = regex!(r"<(/)?b>").replace_all(&cap[1], "");
                host_of(&link)
            })
            .collect()
    }
}

#[async_trait]
impl SubdomainModule for Yahoo {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_domain_operator() {
        let found = vec!["a.example.com".to_string()];
        assert_eq!(
            Yahoo::new().build_query("example.com", &found),
            "site:example.com -domain:www.example.com -domain:a.example.com"
        );
    }

    #[test]
    fn extracts_bold_highlighted_links() {
        let page = r#"<span class=" fz-ms fw-m fc-12th wr-bw lh-17">www.<b>news</b>.example.com</span>
<span class="txt"><span class=" cite fw-xl fz-15px">https://api.example.com/v1</span>"#;
        assert_eq!(
            Yahoo::new().extract_candidates(page),
            vec!["www.news.example.com".to_string(), "api.example.com".to_string()]
        );
    }
}

// endregion:     --- Tests
