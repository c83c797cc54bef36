use super::{EnumContext, Harvest, SubdomainModule};
use crate::modules::{http_request, Module};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

// region:        --- Module info

pub struct CrtSh {
    base_url: String,
}

impl CrtSh {
    pub fn new() -> Self {
        Self {
            base_url: "https://crt.sh".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Module for CrtSh {
    fn name(&self) -> String {
        "SSL Certificates".to_string()
    }

    fn description(&self) -> String {
        "Use crt.sh certificate transparency logs".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
pub struct CrtShEntry {
    pub name_value: String,
}

/// Names of every certificate entry, wildcards skipped and mailbox names
/// reduced to their host part.
fn entry_names(entries: Vec<CrtShEntry>) -> Vec<String> {
    entries
        .into_iter()
        .flat_map(|entry| {
            entry
                .name_value
                .split('\n')
                .map(|name| name.trim().to_string())
                .collect::<Vec<String>>()
        })
        .filter(|name| !name.contains('*'))
        .map(|name| match name.split_once('@') {
            Some((_, host)) => host.to_string(),
            None => name,
        })
        .collect()
}

#[async_trait]
impl SubdomainModule for CrtSh {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, ctx: &EnumContext) -> Result<Vec<String>> {
        let url = format!("{}/?q=%25.{}&output=json", self.base_url, ctx.domain);
        let res = http_request(&ctx.http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let entries: Vec<CrtShEntry> = match res.json().await {
            Ok(entries) => entries,
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        let mut harvest = Harvest::new(ctx, self.name());
        for name in entry_names(entries) {
            harvest.offer(&name).await;
        }

        debug!("{} collected", harvest.found().len());
        Ok(harvest.into_found())
    }
}

// region:        --- Tests


// endregion:     --- Tests
