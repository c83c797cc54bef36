use super::search::{exclusion_query, fill_template, paginate, SearchEngine, SearchParams};
use super::{host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::Module;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use std::time::Duration;

// region:        --- Module info

pub struct Ask {
    base_url: String,
    params: SearchParams,
}

impl Ask {
    pub fn new() -> Self {
        Self {
            base_url: "http://www.ask.com/web?q={query}&page={page_no}&qid=8&rf=1&qsrc=0&o=0&l=dir".to_string(),
            params: SearchParams {
                max_pages: 20,
                max_domains: 11,
                delay: Duration::ZERO,
            },
        }
    }

    pub fn tuned(mut self, tuning: &EngineTuning) -> Self {
        self.params = self.params.tuned(tuning);
        self
    }
}

impl Module for Ask {
    fn name(&self) -> String {
        "Ask".to_string()
    }

    fn description(&self) -> String {
        "Search ask.com with site: queries".to_string()
    }
}

// endregion:     --- Module info

impl SearchEngine for Ask {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    fn build_query(&self, domain: &str, found: &[String]) -> String {
        let base = format!("site:{domain} -www.{domain}");
        exclusion_query(base, "-", found, self.params.max_domains)
    }

    /// Ask counts pages from 1.
    fn page_url(&self, query: &str, page: u32) -> String {
        fill_template(&self.base_url, query, page + 1)
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        regex!(r#"<p class="web-result-url">(.*?)</p>"#)
            .captures_iter(body)
            .filter_map(|cap| host_of(&cap[1]))
            .collect()
    }
}

#[async_trait]
impl SubdomainModule for Ask {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests


// endregion:     --- Tests
