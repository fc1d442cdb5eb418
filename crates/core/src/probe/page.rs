use async_trait::async_trait;
use tracing::warn;

use super::{BaseProbe, Probe, ProbeConfig};
use crate::metrics::{ActionRecord, ActionTimer, MetricsReport};
use crate::session::ProbeSession;

/// Action tag recorded by the page-load step.
pub const PAGE_LOAD_TAG: &str = "page_load";

/// Navigation target and post-load expectations.
///
/// A page load cannot be observed directly through the automation layer, so
/// success is established by the page-ready wait plus substring matches on
/// the final title and URL. A `None` expectation is an automatic pass for
/// that dimension; probes check only what they care about.
#[derive(Debug, Clone)]
pub struct PageTarget {
	/// URL to be probed.
	pub url: String,
	/// Portion of the title expected after the page loads.
	pub expected_title: Option<String>,
	/// Portion of the final URL expected after the page loads (e.g. after redirect).
	pub expected_url: Option<String>,
}

impl PageTarget {
	/// Creates a target with no title/URL expectations.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			expected_title: None,
			expected_url: None,
		}
	}
}

/// Probe that loads one page and verifies title/URL expectations.
#[derive(Debug)]
pub struct PageProbe {
	base: BaseProbe,
	target: PageTarget,
}

impl PageProbe {
	pub fn new(config: ProbeConfig, target: PageTarget) -> Self {
		Self {
			base: BaseProbe::new(config),
			target,
		}
	}

	pub fn name(&self) -> &str {
		self.base.name()
	}

	pub(crate) fn record(&mut self, tag: &str, record: ActionRecord) {
		self.base.record(tag, record);
	}

	pub(crate) fn snapshot(&self) -> MetricsReport {
		self.base.snapshot()
	}

	/// The `"page_load"` step: baseline, navigate, wait, verify.
	///
	/// Navigation failure is logged and folded into the outcome; the call
	/// itself never raises.
	pub(crate) async fn run_page(&mut self, session: &dyn ProbeSession) -> bool {
		let init_ok = self.base.run_init();

		let timer = ActionTimer::start();
		let mut page_ok = false;
		let mut title_ok = false;
		let mut url_ok = false;

		match session.navigate(&self.target.url).await {
			Ok(()) => {
				page_ok = session.wait_for_page_load().await;
				if page_ok {
					title_ok = session.check_title(self.target.expected_title.as_deref()).await;
					url_ok = session.check_url(self.target.expected_url.as_deref()).await;
				}
			}
			Err(err) => {
				warn!(probe = %self.base.name(), url = %self.target.url, error = %err, "failed to request page");
			}
		}

		let result = init_ok && page_ok && title_ok && url_ok;
		self.record(PAGE_LOAD_TAG, timer.finish(result));
		result
	}
}

#[async_trait]
impl Probe for PageProbe {
	async fn run(&mut self, session: &dyn ProbeSession) -> bool {
		self.run_page(session).await
	}

	fn metrics(&self) -> MetricsReport {
		self.snapshot()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_target_defaults_to_no_expectations() {
		let target = PageTarget::new("http://example.test");
		assert_eq!(target.url, "http://example.test");
		assert!(target.expected_title.is_none());
		assert!(target.expected_url.is_none());
	}
}
