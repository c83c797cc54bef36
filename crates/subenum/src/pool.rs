use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::error;

/// Fixed-size permit pool. Every probe runs on its own task but only
/// `capacity` of them are past the permit at any instant.
#[derive(Debug, Clone)]
pub struct ProbePool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ProbePool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Runs `probe` over every item and returns the outputs in input order.
    /// A panicking probe is logged and left out.
    pub async fn run<I, F, Fut, T>(&self, items: I, probe: F) -> Vec<T>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handles: Vec<JoinHandle<Option<T>>> = items
            .into_iter()
            .map(|item| {
                let permits = Arc::clone(&self.permits);
                let probe = probe(item);
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok()?;
                    Some(probe.await)
                })
            })
            .collect();

        let mut outputs = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Some(output)) => outputs.push(output),
                Ok(None) => {}
                Err(err) => error!("Probe task failed: {}", err),
            }
        }
        outputs
    }
}

// region:        --- Tests


// endregion:     --- Tests
