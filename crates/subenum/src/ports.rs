use crate::model::OpenPortRecord;
use crate::pool::ProbePool;
use crate::scan::SOCKET_CON_TIMEOUT_MS;
use crate::{Error, Result};
use futures::{stream, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

/// Parses a comma separated port list, keeping the caller's order.
pub fn parse_ports(list: &str) -> Result<Vec<u16>> {
    let mut ports = Vec::new();
    for raw in list.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
        let port: u16 = raw
            .parse()
            .map_err(|_| Error::InvalidPort(raw.to_string()))?;
        if port == 0 {
            return Err(Error::InvalidPort(raw.to_string()));
        }
        if !ports.contains(&port) {
            ports.push(port);
        }
    }

    if ports.is_empty() {
        return Err(Error::InvalidPort(list.to_string()));
    }
    Ok(ports)
}

/// Probes every host on every port, one permit per host. Only hosts with at
/// least one open port are returned, in input order.
#[instrument(name = "ports", level = "info", skip_all)]
pub async fn scan_hosts(
    pool: &ProbePool,
    hosts: Vec<String>,
    ports: &[u16],
    timeout: Duration,
) -> Vec<OpenPortRecord> {
    let records = probe_hosts(pool, hosts, ports, move |host, port| async move {
        scan_port(&host, port, timeout).await
    })
    .await;

    info!("{} hosts with open ports", records.len());
    records
}

pub fn default_timeout() -> Duration {
    Duration::from_millis(SOCKET_CON_TIMEOUT_MS)
}

/// A host holds its permit for all of its ports, which are tried one after
/// another, so at most `pool.capacity()` connects are ever in flight.
async fn probe_hosts<C, Fut>(
    pool: &ProbePool,
    hosts: Vec<String>,
    ports: &[u16],
    connect: C,
) -> Vec<OpenPortRecord>
where
    C: Fn(String, u16) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    pool.run(hosts, |host| {
        let ports = ports.to_vec();
        let connect = connect.clone();
        async move { scan_host(host, ports, connect).await }
    })
    .await
    .into_iter()
    .flatten()
    .collect()
}

async fn scan_host<C, Fut>(host: String, ports: Vec<u16>, connect: C) -> Option<OpenPortRecord>
where
    C: Fn(String, u16) -> Fut,
    Fut: Future<Output = bool>,
{
    // `filter_map` polls one port at a time, in the given order
    let open: Vec<u16> = stream::iter(ports)
        .filter_map(|port| {
            let probe = connect(host.clone(), port);
            async move { probe.await.then_some(port) }
        })
        .collect()
        .await;

    if open.is_empty() {
        debug!("{}: no open port", host);
        None
    } else {
        Some(OpenPortRecord { host, ports: open })
    }
}

async fn scan_port(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

// region:        --- Tests


// endregion:     --- Tests
