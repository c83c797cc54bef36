use crate::bruteforce::{Bruteforce, BruteforceRequest, WordlistBruteforce};
use crate::config::load_config;
use crate::model::Domain;
use crate::modules::subdomains::{EnumContext, SubdomainModule};
use crate::modules::{build_engines, select_engines, Module};
use crate::output::{OutputSink, Summary};
use crate::pool::ProbePool;
use crate::results::SharedResults;
use crate::utils::write_lines;
use crate::{merge, ports, Result};
use hickory_resolver::proto::rr::RecordType;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info, instrument, trace, warn};

// region:        --- Constants

// timeouts
const HTTP_REQUEST_TIMEOUT_MS: u64 = 25000;
pub const RESOLVE_DNS_TIMEOUT_MS: u64 = 4000;
pub const SOCKET_CON_TIMEOUT_MS: u64 = 2000;

// concurrency numbers
pub const RESOLVE_DNS_CONCURRENCY: usize = 70;
const PORT_SCAN_CONCURRENCY: usize = 20;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0";

// endregion:     --- Constants

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub domain: String,
    /// Comma separated engine keys, overrides the config file.
    pub engines: Option<String>,
    pub config: Option<PathBuf>,
    pub bruteforce: bool,
    pub threads: usize,
    pub wordlist: PathBuf,
    pub resolvers: PathBuf,
    pub ports: Option<Vec<u16>>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

/// One engine's own list, as returned when its task joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReport {
    pub name: String,
    pub found: Vec<String>,
}

// region:        --- Scan main function

#[tokio::main]
#[instrument(name = "scan", level = "info", skip_all)]
pub async fn scan(options: ScanOptions, sink: Arc<dyn OutputSink>) -> Result<Vec<String>> {
    let domain = Domain::parse(&options.domain)?;
    info!("Enumerating subdomains now for {}", domain);
    let scan_start = Instant::now();

    // the config file is only read when it can matter
    let config = if options.config.is_some() || options.engines.is_none() {
        load_config(options.config.as_deref())
    } else {
        None
    };
    let kinds = select_engines(options.engines.as_deref(), config.as_ref());
    let modules = build_engines(&kinds, config.as_ref());
    let engine_names: Vec<String> = modules.iter().map(|module| module.name()).collect();

    let ctx = EnumContext {
        http_client: http_client()?,
        domain: domain.clone(),
        results: SharedResults::new(),
        sink: Arc::clone(&sink),
    };

    run_engines(modules, &ctx).await;
    let search = ctx.results.snapshot().await;

    let bruteforce = if options.bruteforce {
        let request = BruteforceRequest {
            target: domain.clone(),
            record_type: RecordType::A,
            wordlist: options.wordlist.clone(),
            resolvers: options.resolvers.clone(),
            workers: options.threads,
            output: false,
            json_output: false,
            known: search.clone(),
            verbose: options.verbose,
        };
        scan_bruteforce(&WordlistBruteforce::new(Arc::clone(&sink)), request, sink.as_ref()).await
    } else {
        HashSet::new()
    };

    let elapsed = scan_start.elapsed();
    let hosts = merge::merge(&search, &bruteforce);
    info!("{} unique subdomains", hosts.len());

    if let Some(path) = &options.output {
        info!("Saving results to file: {:?}", path);
        write_lines(path, &hosts)?;
    }

    if let Some(port_list) = &options.ports {
        info!("Start port scan now for the following ports: {:?}", port_list);
        let pool = ProbePool::new(PORT_SCAN_CONCURRENCY);
        let records = ports::scan_hosts(&pool, hosts.clone(), port_list, ports::default_timeout()).await;
        for record in &records {
            sink.open_ports(record);
        }
    } else {
        sink.results(&hosts);
    }

    sink.summary(&Summary {
        total: hosts.len(),
        search_count: search.len(),
        bruteforce_count: bruteforce.len(),
        bruteforce_enabled: options.bruteforce,
        engine_names,
        elapsed,
    });

    Ok(hosts)
}

// endregion:     --- Scan main function

// region:        --- Scan subfunctions

fn http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));

    let http_client = Client::builder()
        .timeout(Duration::from_millis(HTTP_REQUEST_TIMEOUT_MS))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .build()?;
    debug!("HTTP Client created: {:?}", http_client);
    Ok(http_client)
}

/// Runs every engine on its own task and waits for all of them. Failures
/// and panics stay inside their task and count as an empty list. Hosts are
/// also in `ctx.results`, which is the authoritative merge.
#[instrument(name = "engines", level = "info", skip_all)]
pub async fn run_engines(modules: Vec<Box<dyn SubdomainModule>>, ctx: &EnumContext) -> Vec<EngineReport> {
    let total = modules.len();
    let mut tasks = JoinSet::new();
    let mut names: HashMap<Id, String> = HashMap::with_capacity(total);

    for module in modules {
        let ctx = ctx.clone();
        let name = module.name();
        let handle = tasks.spawn(async move {
            let name = module.name();
            let found = match module.enumerate(&ctx).await {
                Ok(found) => found,
                Err(err) => {
                    error!("subdomains/{}: {}", name, err);
                    ctx.sink.error(&name, &err.to_string());
                    Vec::new()
                }
            };
            EngineReport { name, found }
        });
        names.insert(handle.id(), name);
    }
    info!("{} engines launched", total);

    let mut reports = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => {
                debug!("{}: {} found", report.name, report.found.len());
                reports.push(report);
            }
            Err(err) => {
                let name = names.remove(&err.id()).unwrap_or_else(|| "Unknown".to_string());
                error!("subdomains/{}: task aborted: {}", name, err);
                ctx.sink.error(&name, "engine task aborted");
                reports.push(EngineReport {
                    name,
                    found: Vec::new(),
                });
            }
        }
        ctx.sink.progress(total - tasks.len(), total);
    }

    info!("{} subdomains from engines", ctx.results.len().await);
    reports
}

async fn scan_bruteforce(
    bruteforcer: &dyn Bruteforce,
    request: BruteforceRequest,
    sink: &dyn OutputSink,
) -> HashSet<String> {
    info!("Starting bruteforce module now");
    match bruteforcer.bruteforce(request).await {
        Ok(hosts) => {
            trace!("{:?}", hosts);
            hosts
        }
        Err(err) => {
            warn!("Bruteforce failed: {}", err);
            sink.error("Bruteforce", &err.to_string());
            HashSet::new()
        }
    }
}

// endregion:     --- Scan subfunctions

// region:        --- Tests


// endregion:     --- Tests
