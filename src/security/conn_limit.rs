//! Concurrent-connection and queue limiting.
//!
//! Both limiters are try-acquire: a request that cannot take a permit is
//! answered 503 immediately, never queued. Permits are RAII guards, so a
//! panicking handler still releases its slot.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::net::ClientAddr;
use crate::observability::metrics;

/// Per-IP bounded semaphores, created lazily and never evicted. The map lock
/// is held only to fetch the semaphore; acquisition happens outside it.
pub struct ConnLimiter {
    semaphores: Mutex<HashMap<IpAddr, Arc<Semaphore>>>,
    limit: usize,
}

impl ConnLimiter {
    pub fn new(limit: usize) -> Self {
        Self {
            semaphores: Mutex::new(HashMap::new()),
            limit,
        }
    }

    pub fn try_acquire(&self, ip: IpAddr) -> Option<OwnedSemaphorePermit> {
        let semaphore = {
            let mut semaphores = self.semaphores.lock().expect("conn limiter mutex poisoned");
            semaphores
                .entry(ip)
                .or_insert_with(|| Arc::new(Semaphore::new(self.limit)))
                .clone()
        };

        semaphore.try_acquire_owned().ok()
    }
}

pub async fn conn_limit_middleware(
    State(limiter): State<Arc<ConnLimiter>>,
    ConnectInfo(addr): ConnectInfo<ClientAddr>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.try_acquire(addr.ip()) {
        Some(_permit) => next.run(request).await,
        None => {
            tracing::warn!(client = %addr.ip(), "Connection limit exceeded");
            metrics::record_admission_rejected("conn");
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response()
        }
    }
}

/// One process-wide semaphore capping total in-flight work.
pub struct QueueLimiter {
    slots: Semaphore,
}

impl QueueLimiter {
    pub fn new(size: usize) -> Self {
        Self {
            slots: Semaphore::new(size),
        }
    }
}

pub async fn queue_limit_middleware(
    State(limiter): State<Arc<QueueLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.slots.try_acquire() {
        Ok(_permit) => next.run(request).await,
        Err(_) => {
            tracing::warn!("Request queue full");
            metrics::record_admission_rejected("queue");
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conn_limiter_caps_per_ip() {
        let limiter = ConnLimiter::new(2);
        let ip: IpAddr = "1.1.1.1".parse().unwrap();

        let p1 = limiter.try_acquire(ip);
        let p2 = limiter.try_acquire(ip);
        assert!(p1.is_some());
        assert!(p2.is_some());
        assert!(limiter.try_acquire(ip).is_none());

        drop(p1);
        assert!(limiter.try_acquire(ip).is_some());
    }

    #[test]
    fn test_conn_limiter_ips_are_independent() {
        let limiter = ConnLimiter::new(1);
        let a: IpAddr = "1.1.1.1".parse().unwrap();
        let b: IpAddr = "2.2.2.2".parse().unwrap();

        let _pa = limiter.try_acquire(a).unwrap();
        assert!(limiter.try_acquire(b).is_some());
    }
}
