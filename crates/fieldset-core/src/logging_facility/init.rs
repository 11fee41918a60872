//! Process-wide subscriber installation.

use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output profile for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines on stderr, `fieldset=debug` unless `RUST_LOG` is set.
    Development,
    /// One JSON object per event on stderr, `fieldset=info` unless `RUST_LOG` is set.
    Production,
    /// No output. Tests collect events through
    /// [`init_test_capture`](super::init_test_capture) instead.
    Test,
}

impl Profile {
    fn filter(self) -> EnvFilter {
        let fallback = match self {
            Profile::Development => "fieldset=debug",
            Profile::Production | Profile::Test => "fieldset=info",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!(
                "unknown logging profile '{other}', expected dev, prod or test"
            )),
        }
    }
}

static INSTALL: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has an effect, and a subscriber
/// installed elsewhere is never replaced.
///
/// ```
/// use fieldset_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INSTALL.call_once(|| {
        let stderr = std::io::stderr;
        let result = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_writer(stderr)
                .with_env_filter(profile.filter())
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_writer(stderr)
                .with_env_filter(profile.filter())
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        if result.is_err() {
            tracing::debug!(?profile, "keeping the subscriber that was already installed");
        }
    });
}
