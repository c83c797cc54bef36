use super::{EnumContext, Harvest, SubdomainModule};
use crate::modules::{http_get_text, Module};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

// region:        --- Module info

pub struct AlienVault {
    base_url: String,
}

impl AlienVault {
    pub fn new() -> Self {
        Self {
            base_url: "https://otx.alienvault.com/api/v1/indicators/domain".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for AlienVault {
    fn name(&self) -> String {
        "AlienVault OTX".to_string()
    }

    fn description(&self) -> String {
        "Use AlienVault OTX passive DNS records".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
struct PassiveDns {
    #[serde(default)]
    passive_dns: Vec<PassiveDnsRecord>,
}

#[derive(Debug, Deserialize)]
struct PassiveDnsRecord {
    hostname: Option<String>,
}

#[async_trait]
impl SubdomainModule for AlienVault {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let url = format!("{}/{}/passive_dns", self.base_url, ctx.domain);
        let body = http_get_text(&ctx.http_client, &url, &self.name()).await?;

        let mut harvest = Harvest::new(ctx, self.name());
        match serde_json::from_str::<PassiveDns>(&body) {
            Ok(data) => {
                for hostname in data.passive_dns.iter().filter_map(|r| r.hostname.as_deref()) {
                    harvest.offer(hostname).await;
                }
            }
            Err(err) => warn!("Unexpected passive DNS payload: {}", err),
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
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_passive_dns_hostnames() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/example.com/passive_dns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "passive_dns": [
                    { "hostname": "vpn.example.com", "address": "10.0.0.1" },
                    { "address": "10.0.0.2" },
                    { "hostname": "VPN.example.com" },
                    { "hostname": "cdn.other.net" }
                ]
            })))
            .mount(&server)
            .await;

        let (ctx, _) = context("example.com");
        let found = AlienVault::new()
            .with_base_url(server.uri())
            .enumerate(&ctx)
            .await
            .unwrap();

        assert_eq!(found, vec!["vpn.example.com".to_string()]);
    }
}

// endregion:     --- Tests
