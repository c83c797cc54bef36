pub mod subdomains;

use self::subdomains::alienvault::AlienVault;
use self::subdomains::ask::Ask;
use self::subdomains::baidu::Baidu;
use self::subdomains::bing::Bing;
use self::subdomains::crtsh::CrtSh;
use self::subdomains::dnsdumpster::DnsDumpster;
use self::subdomains::duckduckgo::DuckDuckGo;
use self::subdomains::google::Google;
use self::subdomains::netcraft::Netcraft;
use self::subdomains::passivedns::PassiveDns;
use self::subdomains::threatcrowd::ThreatCrowd;
use self::subdomains::virustotal::VirusTotal;
use self::subdomains::web_archive::WebArchive;
use self::subdomains::yahoo::Yahoo;
use self::subdomains::SubdomainModule;
use crate::config::{Config, EngineTuning};
use crate::{Error, Result};
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

pub trait Module {
    fn name(&self) -> String;
    fn description(&self) -> String;
}

// region:        --- Registry

/// Identity of an engine. Several registry keys may share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Google,
    Bing,
    Yahoo,
    Ask,
    Baidu,
    Netcraft,
    DuckDuckGo,
    CrtSh,
    ThreatCrowd,
    VirusTotal,
    PassiveDns,
    AlienVault,
    DnsDumpster,
    WebArchive,
}

/// Lower-case key to engine identity, in default run order.
pub const ENGINE_REGISTRY: &[(&str, EngineKind)] = &[
    ("google", EngineKind::Google),
    ("bing", EngineKind::Bing),
    ("yahoo", EngineKind::Yahoo),
    ("ask", EngineKind::Ask),
    ("baidu", EngineKind::Baidu),
    ("netcraft", EngineKind::Netcraft),
    ("duckduckgo", EngineKind::DuckDuckGo),
    ("ssl", EngineKind::CrtSh),
    ("threatcrowd", EngineKind::ThreatCrowd),
    ("virustotal", EngineKind::VirusTotal),
    ("passivedns", EngineKind::PassiveDns),
    ("alienvault", EngineKind::AlienVault),
    ("otx", EngineKind::AlienVault),
    ("dnsdumpster", EngineKind::DnsDumpster),
    ("webarchive", EngineKind::WebArchive),
];

impl EngineKind {
    pub fn lookup(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        ENGINE_REGISTRY
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    /// Every identity once, in registry order.
    pub fn all() -> Vec<Self> {
        collapse(ENGINE_REGISTRY.iter().map(|(_, kind)| *kind))
    }

    pub fn keys(self) -> Vec<&'static str> {
        ENGINE_REGISTRY
            .iter()
            .filter(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn build(self, tuning: &EngineTuning) -> Box<dyn SubdomainModule> {
        match self {
            Self::Google => Box::new(Google::new().tuned(tuning)),
            Self::Bing => Box::new(Bing::new().tuned(tuning)),
            Self::Yahoo => Box::new(Yahoo::new().tuned(tuning)),
            Self::Ask => Box::new(Ask::new().tuned(tuning)),
            Self::Baidu => Box::new(Baidu::new().tuned(tuning)),
            Self::Netcraft => Box::new(Netcraft::new().tuned(tuning)),
            Self::DuckDuckGo => Box::new(DuckDuckGo::new().tuned(tuning)),
            Self::CrtSh => Box::new(CrtSh::new()),
            Self::ThreatCrowd => Box::new(ThreatCrowd::new()),
            Self::VirusTotal => Box::new(VirusTotal::new()),
            Self::PassiveDns => Box::new(PassiveDns::new()),
            Self::AlienVault => Box::new(AlienVault::new()),
            Self::DnsDumpster => Box::new(DnsDumpster::new()),
            Self::WebArchive => Box::new(WebArchive::new()),
        }
    }
}

fn collapse(kinds: impl IntoIterator<Item = EngineKind>) -> Vec<EngineKind> {
    let mut unique = Vec::new();
    for kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    unique
}

/// Resolves which engines run. A CLI list overrides the configuration; an
/// empty outcome falls back to every engine.
pub fn select_engines(cli: Option<&str>, config: Option<&Config>) -> Vec<EngineKind> {
    let selected = match (cli, config) {
        (Some(list), _) => collapse(list.split(',').filter_map(|key| {
            let kind = EngineKind::lookup(key);
            if kind.is_none() && !key.trim().is_empty() {
                warn!("Unknown engine {:?}, skipped", key.trim());
            }
            kind
        })),
        (None, Some(config)) if config.engines.is_some() => collapse(
            ENGINE_REGISTRY
                .iter()
                .filter_map(|(_, kind)| enabled_in(*kind, config).then_some(*kind)),
        ),
        _ => EngineKind::all(),
    };

    if selected.is_empty() {
        warn!("No engines enabled. Using all engines by default.");
        return EngineKind::all();
    }
    debug!("Engines selected: {:?}", selected);
    selected
}

/// An identity is enabled when none of its keys is configured, or when any
/// configured key enables it.
fn enabled_in(kind: EngineKind, config: &Config) -> bool {
    let flags: Vec<bool> = kind
        .keys()
        .into_iter()
        .filter_map(|key| config.engine(key))
        .map(|engine| engine.enabled)
        .collect();
    flags.is_empty() || flags.contains(&true)
}

/// Config overrides for an identity, from the first of its keys that has any.
pub fn tuning_for(kind: EngineKind, config: Option<&Config>) -> EngineTuning {
    config
        .and_then(|config| kind.keys().into_iter().find_map(|key| config.engine(key)))
        .map(EngineTuning::from)
        .unwrap_or_default()
}

pub fn build_engines(kinds: &[EngineKind], config: Option<&Config>) -> Vec<Box<dyn SubdomainModule>> {
    kinds
        .iter()
        .map(|kind| kind.build(&tuning_for(*kind, config)))
        .collect()
}

pub fn display_all() {
    println!("\nSubdomain engines");
    for kind in EngineKind::all() {
        let module = kind.build(&EngineTuning::default());
        println!(
            "- {:25}{:30}{}",
            kind.keys().join(", "),
            module.name(),
            module.description()
        );
    }
}

// endregion:     --- Registry

// region:        --- HTTP requests

#[instrument(name = "HTTP_request", level = "info", skip_all, fields(url = url))]
pub async fn http_request(http_client: &Client, url: &str) -> Result<Response> {
    info!("Sending request");
    match http_client.get(url).send().await {
        Ok(res) => {
            info!("Receive with status: {}", res.status());
            debug!("Response: {:?}", res);
            Ok(res)
        }
        Err(err) => {
            warn!("Reason: {}", err);
            Err(Error::Reqwest(err))
        }
    }
}

/// Body of a successful, non-empty response.
pub async fn response_text(res: Response, source: &str) -> Result<String> {
    if !res.status().is_success() {
        return Err(Error::InvalidHttpResponse(format!(
            "{}: status {}",
            source,
            res.status()
        )));
    }

    let body = res.text().await?;
    if body.trim().is_empty() {
        return Err(Error::InvalidHttpResponse(format!("{}: empty body", source)));
    }
    Ok(body)
}

pub async fn http_get_text(http_client: &Client, url: &str, source: &str) -> Result<String> {
    let res = http_request(http_client, url).await?;
    response_text(res, source).await
}

// endregion:     --- HTTP requests

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config(entries: &[(&str, bool)]) -> Config {
        let engines: HashMap<String, EngineConfig> = entries
            .iter()
            .map(|(key, enabled)| {
                (
                    key.to_string(),
                    EngineConfig {
                        enabled: *enabled,
                        ..EngineConfig::default()
                    },
                )
            })
            .collect();
        Config {
            engines: Some(engines),
        }
    }

    #[test]
    fn aliases_share_an_identity() {
        assert_eq!(EngineKind::lookup("otx"), Some(EngineKind::AlienVault));
        assert_eq!(EngineKind::lookup(" AlienVault "), Some(EngineKind::AlienVault));
        assert_eq!(EngineKind::AlienVault.keys(), vec!["alienvault", "otx"]);
        assert_eq!(EngineKind::all().len(), ENGINE_REGISTRY.len() - 1);
    }

    #[test]
    fn every_source_key_resolves() {
        for key in [
            "google", "bing", "yahoo", "ask", "baidu", "netcraft", "duckduckgo", "ssl",
            "threatcrowd", "virustotal", "passivedns", "alienvault", "dnsdumpster", "webarchive",
        ] {
            assert!(EngineKind::lookup(key).is_some(), "{key}");
        }
        let selected = select_engines(Some("virustotal,passivedns,baidu,netcraft"), None);
        assert_eq!(
            selected,
            vec![
                EngineKind::VirusTotal,
                EngineKind::PassiveDns,
                EngineKind::Baidu,
                EngineKind::Netcraft
            ]
        );
        let names: Vec<String> = build_engines(&selected, None)
            .iter()
            .map(|module| module.name())
            .collect();
        assert_eq!(names, ["Virustotal", "PassiveDNS", "Baidu", "Netcraft"]);
    }

    #[test]
    fn config_aliases_instantiate_once() {
        let config = config(&[("alienvault", true), ("otx", true)]);
        let selected = select_engines(None, Some(&config));
        let otx = selected
            .iter()
            .filter(|kind| **kind == EngineKind::AlienVault)
            .count();
        assert_eq!(otx, 1);
        assert_eq!(build_engines(&selected, Some(&config)).len(), selected.len());
    }

    #[test]
    fn config_disables_engines() {
        let config = config(&[("google", false), ("Bing", false)]);
        let selected = select_engines(None, Some(&config));
        assert!(!selected.contains(&EngineKind::Google));
        assert!(!selected.contains(&EngineKind::Bing));
        assert!(selected.contains(&EngineKind::Yahoo));
    }

    #[test]
    fn disabling_one_alias_disables_the_engine() {
        let disabled = config(&[("alienvault", false)]);
        assert!(!select_engines(None, Some(&disabled)).contains(&EngineKind::AlienVault));

        let mixed = config(&[("alienvault", false), ("otx", true)]);
        assert!(select_engines(None, Some(&mixed)).contains(&EngineKind::AlienVault));
    }

    #[test]
    fn cli_overrides_config() {
        let config = config(&[("google", false)]);
        let selected = select_engines(Some("Google, otx,alienvault,nope"), Some(&config));
        assert_eq!(selected, vec![EngineKind::Google, EngineKind::AlienVault]);
    }

    #[test]
    fn empty_selection_falls_back_to_all() {
        let keys: Vec<(&str, bool)> = ENGINE_REGISTRY.iter().map(|(key, _)| (*key, false)).collect();
        let config = config(&keys);
        assert_eq!(select_engines(None, Some(&config)), EngineKind::all());
        assert_eq!(select_engines(Some("nope"), None), EngineKind::all());
        assert_eq!(select_engines(None, None), EngineKind::all());
    }

    #[test]
    fn tuning_follows_aliases() {
        let mut config = config(&[]);
        config.engines.as_mut().unwrap().insert(
            "otx".to_string(),
            EngineConfig {
                delay_ms: Some(10),
                ..EngineConfig::default()
            },
        );
        let tuning = tuning_for(EngineKind::AlienVault, Some(&config));
        assert_eq!(tuning.delay, Some(Duration::from_millis(10)));
        assert_eq!(tuning_for(EngineKind::Google, Some(&config)), EngineTuning::default());
    }
}

// endregion:     --- Tests
