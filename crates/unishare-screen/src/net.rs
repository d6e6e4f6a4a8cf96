//! Host network link.
//!
//! On the target hardware the node owns its radio; on a host the operating
//! system does. [`HostNetwork`] satisfies the [`NetworkLink`] seam by
//! deferring to the host: bringing the link up is a no-op and signal
//! strength is not observable.

use async_trait::async_trait;

use unishare_core::{NetworkLink, Result};

/// Network link managed by the host operating system.
#[derive(Debug, Default)]
pub struct HostNetwork;

impl HostNetwork {
    /// Create a host-managed network link.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NetworkLink for HostNetwork {
    async fn bring_up(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_up(&self) -> bool {
        true
    }

    fn rssi(&self) -> i64 {
        0
    }
}
