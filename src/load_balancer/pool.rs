//! Round-robin backend selection.
//!
//! # Responsibilities
//! - Hold the ordered backend list for one load-balanced service
//! - Pick the next healthy backend per request
//!
//! # Algorithm
//! A monotonically increasing atomic counter picks the starting index; from
//! there up to N successive indices are probed and the first healthy one
//! wins. If the scan exhausts all N candidates the caller answers 502.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::load_balancer::backend::Backend;

/// Ordered backends plus the rotation counter for one service.
#[derive(Debug)]
pub struct LoadBalancer {
    backends: Vec<Arc<Backend>>,
    counter: AtomicU64,
}

impl LoadBalancer {
    pub fn new(backends: Vec<Arc<Backend>>) -> Self {
        Self {
            backends,
            counter: AtomicU64::new(0),
        }
    }

    /// Select the next healthy backend, scanning at most N candidates.
    ///
    /// Returns `None` when every backend is unhealthy; the scan never blocks
    /// or waits for a recovery.
    pub fn select(&self) -> Option<Arc<Backend>> {
        let n = self.backends.len();
        if n == 0 {
            return None;
        }

        let start = self.counter.fetch_add(1, Ordering::Relaxed) as usize % n;
        for offset in 0..n {
            let backend = &self.backends[(start + offset) % n];
            if backend.is_healthy() {
                return Some(backend.clone());
            }
        }
        None
    }

    /// All backends, in declaration order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn backends(n: usize) -> Vec<Arc<Backend>> {
        (0..n)
            .map(|i| {
                let url = Url::parse(&format!("http://127.0.0.1:{}", 9000 + i)).unwrap();
                Arc::new(Backend::new(url))
            })
            .collect()
    }

    #[test]
    fn test_round_robin_fairness() {
        let backends = backends(3);
        let lb = LoadBalancer::new(backends.clone());

        let mut hits = vec![0usize; 3];
        for _ in 0..12 {
            let selected = lb.select().unwrap();
            let idx = backends
                .iter()
                .position(|b| b.url == selected.url)
                .unwrap();
            hits[idx] += 1;
        }

        assert_eq!(hits, vec![4, 4, 4]);
    }

    #[test]
    fn test_starts_at_first_backend_and_alternates() {
        let backends = backends(2);
        let lb = LoadBalancer::new(backends.clone());

        let order: Vec<_> = (0..4).map(|_| lb.select().unwrap().url.clone()).collect();
        assert_eq!(order[0], backends[0].url);
        assert_eq!(order[1], backends[1].url);
        assert_eq!(order[2], backends[0].url);
        assert_eq!(order[3], backends[1].url);
    }

    #[test]
    fn test_unhealthy_backend_is_skipped() {
        let backends = backends(3);
        backends[1].set_healthy(false);
        let lb = LoadBalancer::new(backends.clone());

        for _ in 0..9 {
            let selected = lb.select().unwrap();
            assert_ne!(selected.url, backends[1].url);
        }
    }

    #[test]
    fn test_all_unhealthy_yields_none() {
        let backends = backends(2);
        for b in &backends {
            b.set_healthy(false);
        }
        let lb = LoadBalancer::new(backends);

        assert!(lb.select().is_none());
    }

    #[test]
    fn test_recovered_backend_reenters_rotation() {
        let backends = backends(2);
        backends[0].set_healthy(false);
        let lb = LoadBalancer::new(backends.clone());

        assert_eq!(lb.select().unwrap().url, backends[1].url);

        backends[0].set_healthy(true);
        let seen: Vec<_> = (0..2).map(|_| lb.select().unwrap().url.clone()).collect();
        assert!(seen.contains(&backends[0].url));
    }
}
