use super::{EnumContext, Harvest, SubdomainModule};
use crate::modules::{http_get_text, Module};
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

// region:        --- Module info

pub struct PassiveDns {
    base_url: String,
}

impl PassiveDns {
    pub fn new() -> Self {
        Self {
            base_url: "https://api.sublist3r.com/search.php".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for PassiveDns {
    fn name(&self) -> String {
        "PassiveDNS".to_string()
    }

    fn description(&self) -> String {
        "Use the passive DNS search API".to_string()
    }
}

// endregion:     --- Module info

#[async_trait]
impl SubdomainModule for PassiveDns {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let url = format!("{}?domain={}", self.base_url, ctx.domain);
        let body = http_get_text(&ctx.http_client, &url, &self.name()).await?;

        let mut harvest = Harvest::new(ctx, self.name());
        match serde_json::from_str::<Vec<String>>(&body) {
            Ok(hosts) => {
                for host in &hosts {
                    harvest.offer(host).await;
                }
            }
            Err(err) => warn!("Unexpected search result: {}", err),
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
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_host_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("domain", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                "ns1.example.com",
                "NS1.example.com.",
                "example.com",
                "mx.example.org"
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = PassiveDns::new()
            .with_base_url(server.uri())
            .enumerate(&ctx)
            .await
            .unwrap();

        assert_eq!(found, vec!["ns1.example.com".to_string()]);
    }

    #[tokio::test]
    async fn malformed_payload_yields_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = PassiveDns::new()
            .with_base_url(server.uri())
            .enumerate(&ctx)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}

// endregion:     --- Tests
