use std::cmp::Ordering;
use std::collections::HashSet;

/// Labels read from the top-level domain leftwards. A trailing `www` label
/// is moved to a flag so that `www.<name>` sorts right after `<name>` and
/// before its other children.
pub fn sorting_key(host: &str) -> (Vec<&str>, u8) {
    let mut labels: Vec<&str> = host.split('.').rev().collect();
    if labels.last() == Some(&"www") {
        labels.pop();
        (labels, 1)
    } else {
        (labels, 0)
    }
}

pub fn sort_hosts(hosts: &mut [String]) {
    hosts.sort_by(|a, b| match sorting_key(a).cmp(&sorting_key(b)) {
        Ordering::Equal => a.cmp(b),
        other => other,
    });
}

/// Union of search and brute-force results in canonical order.
pub fn merge(search: &HashSet<String>, bruteforce: &HashSet<String>) -> Vec<String> {
    let mut hosts: Vec<String> = search.union(bruteforce).cloned().collect();
    sort_hosts(&mut hosts);
    hosts
}

// region:        --- Tests


// endregion:     --- Tests
