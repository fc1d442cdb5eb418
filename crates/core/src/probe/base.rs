use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;

use super::{Probe, ProbeConfig};
use crate::metrics::{ActionRecord, ActionTimer, MetricsReport};
use crate::session::ProbeSession;

/// Action tag recorded by the baseline step.
pub const INIT_TAG: &str = "init";

/// Baseline probe maintaining the metrics ledger.
///
/// Performs no actual check: its single step always succeeds. It exists so
/// every probe, regardless of variant, starts from a timed baseline record,
/// and it owns the ledger the variants write their own tags into.
#[derive(Debug)]
pub struct BaseProbe {
	config: ProbeConfig,
	ledger: IndexMap<String, ActionRecord>,
}

impl BaseProbe {
	pub fn new(config: ProbeConfig) -> Self {
		Self {
			config,
			ledger: IndexMap::new(),
		}
	}

	/// Probe name reflected in metrics and logs.
	pub fn name(&self) -> &str {
		&self.config.name
	}

	/// Configured wait for a web element or page to appear.
	pub fn timeout(&self) -> std::time::Duration {
		self.config.timeout
	}

	/// Writes the record for one action tag, replacing any previous record.
	pub(crate) fn record(&mut self, tag: &str, record: ActionRecord) {
		self.ledger.insert(tag.to_string(), record);
	}

	pub(crate) fn snapshot(&self) -> MetricsReport {
		MetricsReport::new(self.config.name.clone(), self.ledger.clone())
	}

	/// The `"init"` step: a timed no-op that always succeeds.
	pub(crate) fn run_init(&mut self) -> bool {
		debug!(probe = %self.config.name, tag = INIT_TAG, timeout_s = self.config.timeout.as_secs(), "probe step started");
		let timer = ActionTimer::start();
		let success = true;
		let record = timer.finish(success);
		debug!(probe = %self.config.name, tag = INIT_TAG, success, "probe step finished");
		self.record(INIT_TAG, record);
		success
	}
}

#[async_trait]
impl Probe for BaseProbe {
	async fn run(&mut self, _session: &dyn ProbeSession) -> bool {
		self.run_init()
	}

	fn metrics(&self) -> MetricsReport {
		self.snapshot()
	}
}
