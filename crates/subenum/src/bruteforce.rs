use crate::dns::{self, resolves, DnsResolver, PUBLIC_NAMESERVERS};
use crate::model::Domain;
use crate::output::OutputSink;
use crate::pool::ProbePool;
use crate::Result;
use async_trait::async_trait;
use hickory_resolver::proto::rr::RecordType;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const BRUTEFORCE_SOURCE: &str = "Bruteforce";

/// Everything the dictionary brute-forcer needs for one target.
#[derive(Debug, Clone)]
pub struct BruteforceRequest {
    pub target: Domain,
    pub record_type: RecordType,
    pub wordlist: PathBuf,
    pub resolvers: PathBuf,
    pub workers: usize,
    /// Print every validated host on stdout.
    pub output: bool,
    /// Print every validated host as a JSON line on stdout.
    pub json_output: bool,
    /// Hosts already found by the engines, not probed again.
    pub known: HashSet<String>,
    pub verbose: bool,
}

#[async_trait]
pub trait Bruteforce: Send + Sync {
    async fn bruteforce(&self, request: BruteforceRequest) -> Result<HashSet<String>>;
}

#[derive(Serialize)]
struct JsonLine<'a> {
    host: &'a str,
    record_type: String,
}

// region:        --- Wordlist

/// `word.target` candidates resolved through a bounded pool.
pub struct WordlistBruteforce {
    sink: Arc<dyn OutputSink>,
}

impl WordlistBruteforce {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }
}

fn candidates(wordlist: &str, target: &Domain, known: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    wordlist
        .lines()
        .map(|word| word.trim().trim_matches('.').to_ascii_lowercase())
        .filter(|word| !word.is_empty() && !word.starts_with('#'))
        .map(|word| format!("{}.{}", word, target))
        .filter(|host| !known.contains(host))
        .filter(|host| seen.insert(host.clone()))
        .collect()
}

fn nameservers(resolvers: &str) -> Vec<IpAddr> {
    resolvers
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                warn!("Invalid resolver {:?}, skipped", line);
                None
            }
        })
        .collect()
}

fn resolver_for(request: &BruteforceRequest) -> DnsResolver {
    let listed = match fs::read_to_string(&request.resolvers) {
        Ok(content) => nameservers(&content),
        Err(err) => {
            warn!("Could not read resolvers {:?}: {}", request.resolvers, err);
            Vec::new()
        }
    };

    if listed.is_empty() {
        dns::new_resolver(&PUBLIC_NAMESERVERS)
    } else {
        dns::new_resolver(&listed)
    }
}

#[async_trait]
impl Bruteforce for WordlistBruteforce {
    #[instrument(name = "bruteforce", level = "info", skip_all, fields(target = %request.target))]
    async fn bruteforce(&self, request: BruteforceRequest) -> Result<HashSet<String>> {
        let wordlist = fs::read_to_string(&request.wordlist)?;
        let hosts = candidates(&wordlist, &request.target, &request.known);
        let pool = ProbePool::new(request.workers);
        info!("{} candidates, {} workers", hosts.len(), pool.capacity());

        let dns_resolver = resolver_for(&request);
        let record_type = request.record_type;

        let live: Vec<String> = pool
            .run(hosts, |host| {
                let dns_resolver = Arc::clone(&dns_resolver);
                async move { resolves(&dns_resolver, &host, record_type).await.then_some(host) }
            })
            .await
            .into_iter()
            .flatten()
            .collect();

        for host in &live {
            if request.verbose {
                self.sink.discovery(BRUTEFORCE_SOURCE, host);
            }
            if request.output {
                println!("{}", host);
            }
            if request.json_output {
                let line = JsonLine {
                    host,
                    record_type: record_type.to_string(),
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }

        debug!("{} hosts resolved", live.len());
        Ok(live.into_iter().collect())
    }
}

// endregion:     --- Wordlist

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::RecordingSink;
    use crate::Error;

    #[test]
    fn candidates_skip_known_and_comments() {
        let target = Domain::parse("example.com").unwrap();
        let known: HashSet<String> = ["www.example.com".to_string()].into_iter().collect();

        let hosts = candidates("www\n# comment\nMail\n\nmail\n.dev.\n", &target, &known);
        assert_eq!(hosts, vec!["mail.example.com".to_string(), "dev.example.com".to_string()]);
    }

    #[test]
    fn nameservers_ignore_invalid_lines() {
        let ips = nameservers("8.8.8.8\n  \nnot-an-ip\n2606:4700:4700::1111\n");
        assert_eq!(ips.len(), 2);
    }

    #[tokio::test]
    async fn missing_wordlist_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = BruteforceRequest {
            target: Domain::parse("example.com").unwrap(),
            record_type: RecordType::A,
            wordlist: dir.path().join("missing.txt"),
            resolvers: dir.path().join("resolvers.txt"),
            workers: 4,
            output: false,
            json_output: false,
            known: HashSet::new(),
            verbose: false,
        };

        let bruteforcer = WordlistBruteforce::new(Arc::new(RecordingSink::default()));
        assert!(matches!(bruteforcer.bruteforce(request).await, Err(Error::File(_))));
    }
}

// endregion:     --- Tests
