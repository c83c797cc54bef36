use super::search::{exclusion_query, fill_template, paginate, SearchEngine, SearchParams};
use super::{host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::Module;
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use std::time::Duration;

// region:        --- Module info

pub struct Bing {
    base_url: String,
    params: SearchParams,
}

impl Bing {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.bing.com/search?q={query}&go=Submit&first={page_no}".to_string(),
            params: SearchParams {
                max_pages: 20,
                max_domains: 30,
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

impl Module for Bing {
    fn name(&self) -> String {
        "Bing".to_string()
    }

    fn description(&self) -> String {
        "Search bing.com with domain: queries".to_string()
    }
}

// endregion:     --- Module info

impl SearchEngine for Bing {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    fn build_query(&self, domain: &str, found: &[String]) -> String {
        let base = format!("domain:{domain} -www.{domain}");
        exclusion_query(base, "-", found, self.params.max_domains)
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        fill_template(&self.base_url, query, page * 10)
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        let results = regex!(r#"<li class="b_algo"><h2><a href="(.*?)""#).captures_iter(body);
        let titles = regex!(r#"<div class="b_title"><h2><a href="(.*?)""#).captures_iter(body);

        results
            .chain(titles)
            .filter_map(|cap| host_of(&cap[1]))
            .collect()
    }
}

#[async_trait]
impl SubdomainModule for Bing {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::subdomains::tests::context;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn extracts_both_result_layouts() {
        let page = r#"<li class="b_algo"><h2><a href="https://shop.example.com/cart">Shop</a></h2></li>
<div class="b_title"><h2><a href="http://blog.example.com:8080/">Blog</a></h2></div>"#;
        assert_eq!(
            Bing::new().extract_candidates(page),
            vec!["shop.example.com".to_string(), "blog.example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn second_page_excludes_first_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("first", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<li class="b_algo"><h2><a href="https://a.example.com/">A</a></h2></li>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("first", "10"))
            .and(query_param("q", "domain:example.com -www.example.com -a.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<li class="b_algo"><h2><a href="https://b.example.com/">B</a></h2></li>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let bing = Bing::new()
            .with_base_url(format!("{}/search?q={{query}}&first={{page_no}}", server.uri()))
            .tuned(&EngineTuning {
                max_pages: Some(2),
                ..EngineTuning::default()
            });

        let found = bing.enumerate(&ctx).await.unwrap();
        assert_eq!(found, vec!["a.example.com".to_string(), "b.example.com".to_string()]);
    }
}

// endregion:     --- Tests
