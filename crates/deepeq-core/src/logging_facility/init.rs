//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    /// Filter directive applied when `RUST_LOG` is unset
    ///
    /// Per-node override and cycle decisions are logged at `trace` and only
    /// show up with an explicit `RUST_LOG=deepeq_core::diff=trace`.
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "deepeq_core=debug",
            Profile::Production | Profile::Test => "deepeq_core=info",
        }
    }

    fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once per process, typically from a test harness setup function;
/// later calls are no-ops. A subscriber installed elsewhere first is left in
/// place.
///
/// # Profiles
///
/// - **Development**: text lines with the `compare` span and its `comparison_id`
/// - **Production**: one JSON object per event
/// - **Test**: bare registry; use `init_test_capture()` to assert on events
///
/// # Example
///
/// ```
/// use deepeq_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(profile.env_filter())
                .try_init()
                .is_ok(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(profile.env_filter())
                .try_init()
                .is_ok(),
            // capture layer is installed by init_test_capture()
            Profile::Test => tracing_subscriber::registry().try_init().is_ok(),
        };
        if !installed {
            tracing::debug!(?profile, "subscriber already installed, logging profile not applied");
        }
    });
}
