//! Network reachability seam.
//!
//! The platform layer owns real reachability detection and feeds it into a
//! `NetworkMonitor`; tests flip the flag directly.

use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether a remote call is worth attempting.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Reachability flag updated by the host platform.
#[derive(Debug)]
pub struct NetworkMonitor {
    online: AtomicBool,
}

impl NetworkMonitor {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for NetworkMonitor {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}
