use crate::pool::ProbePool;
use crate::scan::RESOLVE_DNS_TIMEOUT_MS;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use std::net::{IpAddr, Ipv4Addr};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, instrument, trace};

pub type DnsResolver = Arc<TokioAsyncResolver>;

/// Resolvers used to decide whether a host is live.
pub const PUBLIC_NAMESERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
];

pub fn new_resolver(nameservers: &[IpAddr]) -> DnsResolver {
    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_millis(RESOLVE_DNS_TIMEOUT_MS);
    opts.attempts = 1;
    debug!("DNS resolver options: {:?}", opts);

    let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
    let config = ResolverConfig::from_parts(None, vec![], group);
    let dns_resolver = TokioAsyncResolver::tokio(config, opts);

    debug!("DNS resolver created with {} nameservers", nameservers.len());
    Arc::new(dns_resolver)
}

pub fn public_resolver() -> DnsResolver {
    new_resolver(&PUBLIC_NAMESERVERS)
}

pub async fn resolves(dns_resolver: &DnsResolver, host: &str, record_type: RecordType) -> bool {
    match dns_resolver.lookup(host, record_type).await {
        Ok(lookup) => {
            trace!("{} resolved: {:?}", host, lookup.records().len());
            lookup.iter().next().is_some()
        }
        Err(err) => {
            trace!("{} not resolved: {}", host, err);
            false
        }
    }
}

/// Keeps the hosts that have an A record, in input order. Unresolvable
/// hosts are dropped silently.
#[instrument(name = "validate", level = "info", skip_all)]
pub async fn live_hosts(pool: &ProbePool, dns_resolver: &DnsResolver, hosts: Vec<String>) -> Vec<String> {
    let candidates = hosts.len();
    let live: Vec<String> = pool
        .run(hosts, |host| {
            let dns_resolver = Arc::clone(dns_resolver);
            async move {
                resolves(&dns_resolver, &host, RecordType::A)
                    .await
                    .then_some(host)
            }
        })
        .await
        .into_iter()
        .flatten()
        .collect();

    info!("{}/{} hosts resolved", live.len(), candidates);
    live
}
