use super::{EnumContext, Harvest, SubdomainModule};
use crate::modules::{http_get_text, Module};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// `links.next` pages followed at most.
const MAX_PAGES: usize = 10;

// region:        --- Module info

pub struct VirusTotal {
    base_url: String,
}

impl VirusTotal {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.virustotal.com/ui/domains".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for VirusTotal {
    fn name(&self) -> String {
        "Virustotal".to_string()
    }

    fn description(&self) -> String {
        "Use the VirusTotal domain relationships listing".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
struct SubdomainPage {
    #[serde(default)]
    data: Vec<SubdomainObject>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct SubdomainObject {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    next: Option<String>,
}

#[async_trait]
impl SubdomainModule for VirusTotal {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let mut url = format!("{}/{}/subdomains", self.base_url, ctx.domain);
        let mut harvest = Harvest::new(ctx, self.name());

        for _ in 0..MAX_PAGES {
            let body = http_get_text(&ctx.http_client, &url, &self.name()).await?;
            let page = match serde_json::from_str::<SubdomainPage>(&body) {
                Ok(page) => page,
                Err(err) => {
                    warn!("Unexpected listing: {}", err);
                    break;
                }
            };

            for object in &page.data {
                harvest.offer(&object.id).await;
            }

            match page.links.next {
                Some(next) if next != url => url = next,
                _ => break,
            }
        }

        debug!("{} collected", harvest.found().len());
        Ok(harvest.into_found())
    }
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::subdomains::tests::context;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn follows_next_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/example.com/subdomains"))
            .and(query_param("cursor", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "id": "b.example.com", "type": "domain" }],
                "links": {}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/example.com/subdomains"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "id": "a.example.com", "type": "domain" },
                    { "id": "example.com", "type": "domain" }
                ],
                "links": { "next": format!("{}/example.com/subdomains?cursor=2", server.uri()) }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = VirusTotal::new()
            .with_base_url(server.uri())
            .enumerate(&ctx)
            .await
            .unwrap();

        assert_eq!(found, vec!["a.example.com".to_string(), "b.example.com".to_string()]);
    }

    #[tokio::test]
    async fn rejected_request_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let result = VirusTotal::new().with_base_url(server.uri()).enumerate(&ctx).await;
        assert!(matches!(result, Err(crate::Error::InvalidHttpResponse(_))));
    }
}

// endregion:     --- Tests
