//! Hardware encoder detection
//!
//! The encoder listing is queried once per detector and memoized. Hardware
//! encoding only makes renders faster, so every failure degrades to software.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::model::{HardwareCapability, HardwareKind};
use crate::ports::EnginePort;

/// Default bound on the encoder query
pub const DEFAULT_DETECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Encoder names in priority order
const ENCODER_PRIORITY: &[(&str, HardwareKind)] = &[
    ("h264_nvenc", HardwareKind::DedicatedGpu),
    ("h264_qsv", HardwareKind::IntegratedGpu),
    ("h264_vaapi", HardwareKind::PlatformGpu),
];

/// Memoized capability provider, shared by every job of the process
pub struct HardwareDetector {
    engine: Arc<dyn EnginePort>,
    timeout: Duration,
    cached: OnceCell<HardwareCapability>,
}

impl HardwareDetector {
    pub fn new(engine: Arc<dyn EnginePort>) -> Self {
        Self::with_timeout(engine, DEFAULT_DETECTION_TIMEOUT)
    }

    pub fn with_timeout(engine: Arc<dyn EnginePort>, timeout: Duration) -> Self {
        Self {
            engine,
            timeout,
            cached: OnceCell::new(),
        }
    }

    /// Detected capability; the engine is queried only on the first call.
    pub async fn detect(&self) -> HardwareCapability {
        *self
            .cached
            .get_or_init(|| async {
                match self.engine.list_encoders(self.timeout).await {
                    Ok(listing) => {
                        let capability = classify_encoders(&listing);
                        info!(
                            kind = %capability.kind,
                            available = capability.available,
                            "Hardware encoder detection finished"
                        );
                        capability
                    }
                    Err(e) => {
                        warn!("Hardware detection failed, using software encoding: {}", e);
                        HardwareCapability::software()
                    }
                }
            })
            .await
    }

    /// Capability if detection has already run
    pub fn cached(&self) -> Option<HardwareCapability> {
        self.cached.get().copied()
    }
}

/// Pick the highest-priority hardware encoder present in an encoder listing
pub fn classify_encoders(listing: &str) -> HardwareCapability {
    let listing = listing.to_lowercase();
    ENCODER_PRIORITY
        .iter()
        .find(|(name, _)| listing.contains(name))
        .map(|(_, kind)| HardwareCapability::hardware(*kind))
        .unwrap_or_else(HardwareCapability::software)
}
