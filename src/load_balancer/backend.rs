//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream origin
//! - Carry the health flag written by the monitor and read by the selector
//!
//! # Design Decisions
//! - The flag is a relaxed atomic: a flip becomes visible eventually, and one
//!   in-flight request racing a flip is acceptable (it surfaces as a 502)
//! - Backends start healthy so traffic flows before the first probe lands
//! - Backends are never removed once constructed

use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

/// A single upstream origin.
#[derive(Debug)]
pub struct Backend {
    /// Parsed target URL, immutable after construction.
    pub url: Url,
    /// Whether the last probe saw the backend alive.
    healthy: AtomicBool,
}

impl Backend {
    /// Create a new backend, initially healthy.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            healthy: AtomicBool::new(true),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}
