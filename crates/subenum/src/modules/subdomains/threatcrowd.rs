use super::{EnumContext, Harvest, SubdomainModule};
use crate::modules::{http_get_text, Module};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

// region:        --- Module info

pub struct ThreatCrowd {
    base_url: String,
}

impl ThreatCrowd {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.threatcrowd.org/searchApi/v2/domain/report/".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for ThreatCrowd {
    fn name(&self) -> String {
        "ThreatCrowd".to_string()
    }

    fn description(&self) -> String {
        "Use the ThreatCrowd domain report API".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
struct DomainReport {
    #[serde(default)]
    subdomains: Vec<String>,
}

#[async_trait]
impl SubdomainModule for ThreatCrowd {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let url = format!("{}?domain={}", self.base_url, ctx.domain);
        let body = http_get_text(&ctx.http_client, &url, &self.name()).await?;

        let mut harvest = Harvest::new(ctx, self.name());
        match serde_json::from_str::<DomainReport>(&body) {
            Ok(report) => {
                for subdomain in &report.subdomains {
                    harvest.offer(subdomain).await;
                }
            }
            Err(err) => warn!("Unexpected report: {}", err),
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
    async fn reads_subdomains_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("domain", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response_code": "1",
                "subdomains": [" ftp.example.com ", "example.com", "ftp.example.com", "x.test"]
            })))
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = ThreatCrowd::new()
            .with_base_url(format!("{}/report/", server.uri()))
            .enumerate(&ctx)
            .await
            .unwrap();

        assert_eq!(found, vec!["ftp.example.com".to_string()]);
    }

    #[tokio::test]
    async fn unexpected_shape_yields_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"subdomains\": 42}"))
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = ThreatCrowd::new()
            .with_base_url(server.uri())
            .enumerate(&ctx)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}

// endregion:     --- Tests
