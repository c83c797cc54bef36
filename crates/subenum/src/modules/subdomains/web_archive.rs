use super::{EnumContext, Harvest, SubdomainModule};
use crate::modules::{http_request, Module};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument, trace};

// region:        --- Module info

pub struct WebArchive {
    base_url: String,
}

impl WebArchive {
    pub fn new() -> Self {
        Self {
            base_url: "https://web.archive.org".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for WebArchive {
    fn name(&self) -> String {
        "Web Archive".to_string()
    }

    fn description(&self) -> String {
        "Use web.archive.org captured URLs".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
struct WebArchiveResponse(Vec<Vec<String>>);

#[async_trait]
impl SubdomainModule for WebArchive {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let url = format!(
            "{}/cdx/search/cdx?url={}&output=json&matchType=domain&fl=original&collapse=urlkey",
            self.base_url, ctx.domain
        );
        let res = http_request(&ctx.http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let archived_urls: Vec<String> = match res.json::<WebArchiveResponse>().await {
            Ok(rows) => rows.0.into_iter().flatten().collect(),
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        let mut harvest = Harvest::new(ctx, self.name());
        // the first row is the `original` header
        for url in archived_urls.iter().filter(|url| *url != "original") {
            match Url::parse(url) {
                Ok(parsed) => {
                    if let Some(host) = parsed.host_str() {
                        harvest.offer(host).await;
                    }
                }
                Err(_) => trace!("Skipping url: {:?}", url),
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
    async fn hosts_of_archived_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cdx/search/cdx"))
            .and(query_param("url", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                ["original"],
                ["http://example.com/"],
                ["https://old.example.com:443/index.html"],
                ["not a url"],
                ["http://old.example.com/about"]
            ])))
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = WebArchive::new()
            .with_base_url(server.uri())
            .enumerate(&ctx)
            .await
            .unwrap();

        assert_eq!(found, vec!["old.example.com".to_string()]);
    }
}

// endregion:     --- Tests
