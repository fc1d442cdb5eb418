use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::{PageProbe, PageTarget, Probe, ProbeConfig};
use crate::metrics::{ActionTimer, MetricsReport};
use crate::session::ProbeSession;

/// Action tag recorded by the form-submit step.
pub const FORM_SUBMIT_TAG: &str = "form_submit";

/// XPath used to locate the submit control when none is configured.
pub const DEFAULT_SUBMIT_LOCATOR: &str = "//input[@type='submit']";

/// Field values and post-submit expectations.
#[derive(Debug, Clone)]
pub struct FormSpec {
	/// Input values keyed by element name, filled in insertion order.
	pub fields: IndexMap<String, String>,
	/// XPath of the control that submits the form.
	pub submit_locator: String,
	/// Portion of the title expected after the form is submitted.
	pub post_submit_title: Option<String>,
	/// Portion of the final URL expected after the form is submitted.
	pub post_submit_url: Option<String>,
}

impl Default for FormSpec {
	fn default() -> Self {
		Self {
			fields: IndexMap::new(),
			submit_locator: DEFAULT_SUBMIT_LOCATOR.to_string(),
			post_submit_title: None,
			post_submit_url: None,
		}
	}
}

/// Probe that loads a form page, fills it in, submits, and verifies the result.
#[derive(Debug)]
pub struct FormProbe {
	page: PageProbe,
	form: FormSpec,
}

impl FormProbe {
	pub fn new(config: ProbeConfig, target: PageTarget, form: FormSpec) -> Self {
		Self {
			page: PageProbe::new(config, target),
			form,
		}
	}

	/// Enters every configured field value by element name.
	///
	/// A missing field marks the step failed but does not stop the loop;
	/// every field is attempted.
	async fn fill_fields(&self, session: &dyn ProbeSession) -> bool {
		let mut all_ok = true;
		for (field, value) in &self.form.fields {
			info!(probe = %self.page.name(), field = %field, "searching for input element");
			match session.find_by_name(field).await {
				Ok(element) => match element.send_keys(value).await {
					Ok(()) => debug!(field = %field, "entered field value"),
					Err(err) => {
						warn!(field = %field, error = %err, "failed to enter field value");
						all_ok = false;
					}
				},
				Err(err) => {
					warn!(field = %field, error = %err, "input element not found");
					all_ok = false;
				}
			}
		}
		all_ok
	}

	/// The `"form_submit"` step, performed only when the page stage passed.
	async fn run_form(&mut self, session: &dyn ProbeSession) -> bool {
		let page_ok = self.page.run_page(session).await;

		let timer = ActionTimer::start();
		let mut input_ok = false;
		let mut submit_found = false;
		let mut submit_ok = false;
		let mut title_ok = false;
		let mut url_ok = false;

		if page_ok {
			input_ok = self.fill_fields(session).await;

			match session.find_by_xpath(&self.form.submit_locator).await {
				Ok(submit) => {
					submit_found = true;
					info!(probe = %self.page.name(), locator = %self.form.submit_locator, "found submit element, clicking");
					match submit.click().await {
						Ok(()) => {
							submit_ok = session.wait_for_page_load().await;
							if submit_ok {
								title_ok = session.check_title(self.form.post_submit_title.as_deref()).await;
								url_ok = session.check_url(self.form.post_submit_url.as_deref()).await;
							}
						}
						Err(err) => {
							warn!(locator = %self.form.submit_locator, error = %err, "failed to click submit element");
						}
					}
				}
				Err(err) => {
					warn!(locator = %self.form.submit_locator, error = %err, "submit element not found");
				}
			}
		}

		let result = page_ok && input_ok && submit_found && submit_ok && title_ok && url_ok;
		self.page.record(FORM_SUBMIT_TAG, timer.finish(result));
		result
	}
}

#[async_trait]
impl Probe for FormProbe {
	async fn run(&mut self, session: &dyn ProbeSession) -> bool {
		self.run_form(session).await
	}

	fn metrics(&self) -> MetricsReport {
		self.page.snapshot()
	}
}
