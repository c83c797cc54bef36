use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cross-task set of discovered subdomains. Every engine writes into it as
/// soon as it finds a host; it is read once all writers are done.
#[derive(Debug, Clone, Default)]
pub struct SharedResults {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl SharedResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the host was already present.
    pub async fn insert(&self, host: String) -> bool {
        self.inner.lock().await.insert(host)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        self.inner.lock().await.clone()
    }
}

// region:        --- Tests


// endregion:     --- Tests
