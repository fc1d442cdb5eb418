//! Probe hierarchy composing timed lifecycle steps.
//!
//! Every variant owns the previous stage and invokes its `run` as a named
//! step of its own algorithm, AND-folding the outcome into its result:
//! [`BaseProbe`] records the `"init"` baseline, [`PageProbe`] adds
//! `"page_load"`, [`FormProbe`] adds `"form_submit"`. The [`Probe`] trait
//! lets callers treat all variants uniformly.
//!
//! A probe never raises for environmental reasons: navigation failures,
//! elapsed waits, and missing elements are logged and folded into the
//! returned boolean, so probes are safe to run unattended in a monitoring
//! loop. Re-running a probe re-executes the whole chain and overwrites the
//! records for its tags.
//!
//! # Example
//!
//! ```ignore
//! use gridprobe::{PageProbe, PageTarget, ProbeConfig, SessionConfig};
//!
//! let mut probe = PageProbe::new(
//!     ProbeConfig::named("probe_page_duckduckgo"),
//!     PageTarget {
//!         url: "http://duckduckgo.com".into(),
//!         expected_title: Some("DuckDuckGo".into()),
//!         expected_url: Some("https://duckduckgo.com".into()),
//!     },
//! );
//!
//! let config = SessionConfig::new("http://localhost:4444/wd/hub");
//! let ok = gridprobe::run_probe(config, &mut probe).await;
//! println!("{}", serde_json::to_string_pretty(&probe.metrics())?);
//! assert!(ok);
//! ```

mod base;
mod form;
mod page;

use std::time::Duration;

use async_trait::async_trait;
pub use base::{BaseProbe, INIT_TAG};
pub use form::{DEFAULT_SUBMIT_LOCATOR, FORM_SUBMIT_TAG, FormProbe, FormSpec};
pub use page::{PAGE_LOAD_TAG, PageProbe, PageTarget};

use crate::metrics::MetricsReport;
use crate::session::ProbeSession;

/// Identity and timing shared by every probe variant.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
	/// Name reflected in metrics and logs.
	pub name: String,
	/// Seconds to wait for a web element or page to appear.
	pub timeout: Duration,
}

impl Default for ProbeConfig {
	fn default() -> Self {
		Self {
			name: "noname".to_string(),
			timeout: Duration::from_secs(10),
		}
	}
}

impl ProbeConfig {
	/// Creates a config with the given name and default timeout.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}
}

/// Capability shared by all probe variants.
///
/// `run` executes the composed lifecycle against a session and returns
/// overall success; `metrics` snapshots the action records gathered so far.
#[async_trait]
pub trait Probe: Send {
	/// Runs the probe's composed lifecycle, returning overall success.
	async fn run(&mut self, session: &dyn ProbeSession) -> bool;

	/// Snapshot of all action records, keyed by probe name then action tag.
	fn metrics(&self) -> MetricsReport;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn probe_config_defaults_match_documented_values() {
		let config = ProbeConfig::default();
		assert_eq!(config.name, "noname");
		assert_eq!(config.timeout, Duration::from_secs(10));
	}

	#[test]
	fn named_config_keeps_default_timeout() {
		let config = ProbeConfig::named("probe_login");
		assert_eq!(config.name, "probe_login");
		assert_eq!(config.timeout, Duration::from_secs(10));
	}
}
