use super::search::{exclusion_query, fill_template, paginate, SearchEngine, SearchParams};
use super::{host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::Module;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use std::time::Duration;

// region:        --- Module info

pub struct Baidu {
    base_url: String,
    params: SearchParams,
}

impl Baidu {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.baidu.com/s?pn={page_no}&wd={query}&oq={query}".to_string(),
            params: SearchParams {
                max_pages: 20,
                max_domains: 2,
                delay: Duration::from_secs(2),
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

impl Module for Baidu {
    fn name(&self) -> String {
        "Baidu".to_string()
    }

    fn description(&self) -> String {
        "Search baidu.com with site: queries".to_string()
    }
}

// endregion:     --- Module info

impl SearchEngine for Baidu {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    fn build_query(&self, domain: &str, found: &[String]) -> String {
        let base = format!("site:{domain} -site:www.{domain}");
        exclusion_query(base, "-site:", found, self.params.max_domains)
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        fill_template(&self.base_url, query, page * 10)
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        // the visible url is split across tags and padded with &nbsp;
        regex!(r#"<a[^>]*?class="c-showurl"[^>]*?>(.*?)</a>"#)
            .captures_iter(body)
            .filter_map(|cap| host_of(&cap[1].replace("&nbsp;", "")))
            .collect()
    }
}

#[async_trait]
impl SubdomainModule for Baidu {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests


// endregion:     --- Tests
