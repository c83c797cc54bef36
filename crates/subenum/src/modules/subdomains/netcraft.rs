use super::search::{fill_template, paginate, SearchEngine, SearchParams};
use super::{decode_entities, host_of, EnumContext, SubdomainModule};
use crate::config::EngineTuning;
use crate::modules::{http_request, response_text, Module};
use crate::Result;
use async_trait::async_trait;
use lazy_regex::regex;
use reqwest::header::COOKIE;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};
use url::form_urlencoded;

const CHALLENGE_COOKIE: &str = "netcraft_js_verification_challenge";
const RESPONSE_COOKIE: &str = "netcraft_js_verification_response";

// region:        --- Module info

pub struct Netcraft {
    base_url: String,
    params: SearchParams,
}

impl Netcraft {
    pub fn new() -> Self {
        Self {
            base_url: "https://searchdns.netcraft.com/?restriction=site+ends+with&host={query}"
                .to_string(),
            params: SearchParams {
                max_pages: 20,
                max_domains: 0,
                delay: Duration::from_secs(1),
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

impl Module for Netcraft {
    fn name(&self) -> String {
        "Netcraft".to_string()
    }

    fn description(&self) -> String {
        "Search the searchdns.netcraft.com site listing".to_string()
    }
}

// endregion:     --- Module info

/// Answer to the javascript challenge: sha1 hex digest of the unquoted
/// challenge cookie.
fn challenge_response(challenge: &str) -> String {
    // unquote only, a literal `+` is not a space here
    let escaped = challenge.replace('+', "%2B");
    let unquoted: String = form_urlencoded::parse(format!("v={}", escaped).as_bytes())
        .map(|(_, value)| value.into_owned())
        .collect();
    sha1_smol::Sha1::from(unquoted.as_bytes()).digest().to_string()
}

#[async_trait]
impl SearchEngine for Netcraft {
    fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Netcraft lists every known host of a suffix, no exclusions needed.
    fn build_query(&self, domain: &str, _found: &[String]) -> String {
        domain.to_string()
    }

    fn page_url(&self, query: &str, _page: u32) -> String {
        fill_template(&self.base_url, query, 0)
    }

    async fn issue_request(&self, http_client: &Client, url: &str) -> Result<String> {
        let res = http_request(http_client, url).await?;
        let challenge = res
            .cookies()
            .find(|cookie| cookie.name() == CHALLENGE_COOKIE)
            .map(|cookie| cookie.value().to_string());

        let Some(challenge) = challenge else {
            return response_text(res, &self.name()).await;
        };

        debug!("Answering the verification challenge");
        let cookies = format!(
            "{}={}; {}={}",
            CHALLENGE_COOKIE,
            challenge,
            RESPONSE_COOKIE,
            challenge_response(&challenge)
        );
        let res = http_client.get(url).header(COOKIE, cookies).send().await?;
        response_text(res, &self.name()).await
    }

    fn extract_candidates(&self, body: &str) -> Vec<String> {
        regex!(r#"<a class="results-table__host" href="(.*?)""#)
            .captures_iter(body)
            .filter_map(|cap| host_of(&cap[1]))
            .collect()
    }

    fn follows_links(&self) -> bool {
        true
    }

    fn next_page_url(&self, body: &str) -> Option<String> {
        let link = regex!(r#"<a[^>]*?href="([^"]*?)"[^>]*?>\s*Next Page"#i).captures(body)?;
        let link = decode_entities(&link[1]);
        match Url::parse(&self.base_url).and_then(|base| base.join(&link)) {
            Ok(url) => Some(url.to_string()),
            Err(err) => {
                warn!("Invalid next page link {:?}: {}", link, err);
                None
            }
        }
    }
}

#[async_trait]
impl SubdomainModule for Netcraft {
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        paginate(self, ctx).await
    }
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::subdomains::tests::context;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn challenge_response_is_sha1_of_unquoted_value() {
        assert_eq!(
            challenge_response("abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(challenge_response("a%62c"), challenge_response("abc"));
    }

    #[tokio::test]
    async fn follows_next_page_links_until_the_last_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("from", "21"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a class="results-table__host" href="http://b.example.com/">b</a>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("host", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a class="results-table__host" href="http://a.example.com/">a</a>
<a class="results-table__host" href="https://other.net/">x</a>
<a href="?restriction=site+ends+with&amp;host=example.com&amp;from=21">Next Page</a>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let netcraft = Netcraft::new()
            .with_base_url(format!("{}/?restriction=site+ends+with&host={{query}}", server.uri()))
            .tuned(&EngineTuning {
                delay: Some(Duration::ZERO),
                ..EngineTuning::default()
            });

        let found = netcraft.enumerate(&ctx).await.unwrap();
        assert_eq!(found, vec!["a.example.com".to_string(), "b.example.com".to_string()]);
    }

    #[tokio::test]
    async fn answers_the_verification_challenge() {
        let server = MockServer::start().await;
        let expected = format!(
            "{}=abc; {}={}",
            CHALLENGE_COOKIE,
            RESPONSE_COOKIE,
            challenge_response("abc")
        );
        Mock::given(method("GET"))
            .and(header("cookie", expected.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a class="results-table__host" href="http://a.example.com/">a</a>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", format!("{}=abc; Path=/", CHALLENGE_COOKIE).as_str())
                    .set_body_string("verifying your browser"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let netcraft =
            Netcraft::new().with_base_url(format!("{}/?host={{query}}", server.uri()));

        let found = netcraft.enumerate(&ctx).await.unwrap();
        assert_eq!(found, vec!["a.example.com".to_string()]);
    }
}

// endregion:     --- Tests
