//! Probe lifecycle tests against a scripted session.
//!
//! The fake session implements [`ProbeSession`] with scripted outcomes and a
//! call log, so the composed probe algebra (AND-folding, per-tag records,
//! failure tolerance) is exercised without a live grid.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gridprobe::{
	BaseProbe, Error, FORM_SUBMIT_TAG, FormProbe, FormSpec, INIT_TAG, PAGE_LOAD_TAG, PageElement, PageProbe,
	PageTarget, Probe, ProbeConfig, ProbeSession, Result,
};
use indexmap::IndexMap;

/// Scripted behavior for one fake session.
#[derive(Clone)]
struct Script {
	navigate_ok: bool,
	page_ready: bool,
	post_submit_ready: bool,
	title: String,
	url: String,
	post_submit_title: String,
	post_submit_url: String,
	missing_fields: Vec<String>,
	submit_present: bool,
	click_ok: bool,
}

impl Script {
	/// Everything succeeds; pages look like example.test.
	fn happy() -> Self {
		Self {
			navigate_ok: true,
			page_ready: true,
			post_submit_ready: true,
			title: "Example Domain".to_string(),
			url: "http://example.test/".to_string(),
			post_submit_title: "Submission Received".to_string(),
			post_submit_url: "http://example.test/done".to_string(),
			missing_fields: Vec::new(),
			submit_present: true,
			click_ok: true,
		}
	}
}

struct FakeSession {
	script: Script,
	clicked: Arc<Mutex<bool>>,
	log: Arc<Mutex<Vec<String>>>,
}

impl FakeSession {
	fn new(script: Script) -> Self {
		Self {
			script,
			clicked: Arc::new(Mutex::new(false)),
			log: Arc::new(Mutex::new(Vec::new())),
		}
	}

	fn log_call(&self, entry: impl Into<String>) {
		self.log.lock().unwrap().push(entry.into());
	}

	fn calls(&self) -> Vec<String> {
		self.log.lock().unwrap().clone()
	}

	fn count(&self, prefix: &str) -> usize {
		self.calls().iter().filter(|c| c.starts_with(prefix)).count()
	}

	fn current_title(&self) -> &str {
		if *self.clicked.lock().unwrap() {
			&self.script.post_submit_title
		} else {
			&self.script.title
		}
	}

	fn current_url(&self) -> &str {
		if *self.clicked.lock().unwrap() {
			&self.script.post_submit_url
		} else {
			&self.script.url
		}
	}
}

#[async_trait]
impl ProbeSession for FakeSession {
	async fn navigate(&self, url: &str) -> Result<()> {
		self.log_call(format!("navigate:{url}"));
		if self.script.navigate_ok {
			Ok(())
		} else {
			Err(Error::Wait {
				seconds: 10,
				condition: format!("navigation to {url}"),
			})
		}
	}

	async fn wait_for_page_load(&self) -> bool {
		self.log_call("wait_for_page_load");
		if *self.clicked.lock().unwrap() {
			self.script.post_submit_ready
		} else {
			self.script.page_ready
		}
	}

	async fn check_title(&self, expected: Option<&str>) -> bool {
		self.log_call("check_title");
		expected.is_none_or(|needle| self.current_title().contains(needle))
	}

	async fn check_url(&self, expected: Option<&str>) -> bool {
		self.log_call("check_url");
		expected.is_none_or(|needle| self.current_url().contains(needle))
	}

	async fn find_by_name(&self, name: &str) -> Result<Box<dyn PageElement>> {
		self.log_call(format!("find_by_name:{name}"));
		if self.script.missing_fields.iter().any(|f| f == name) {
			return Err(Error::ElementNotFound {
				locator: format!("name='{name}'"),
			});
		}
		Ok(Box::new(FakeElement {
			id: name.to_string(),
			click_ok: self.script.click_ok,
			clicked: Arc::clone(&self.clicked),
			log: Arc::clone(&self.log),
		}))
	}

	async fn find_by_xpath(&self, xpath: &str) -> Result<Box<dyn PageElement>> {
		self.log_call(format!("find_by_xpath:{xpath}"));
		if !self.script.submit_present {
			return Err(Error::ElementNotFound {
				locator: xpath.to_string(),
			});
		}
		Ok(Box::new(FakeElement {
			id: "submit".to_string(),
			click_ok: self.script.click_ok,
			clicked: Arc::clone(&self.clicked),
			log: Arc::clone(&self.log),
		}))
	}
}

struct FakeElement {
	id: String,
	click_ok: bool,
	clicked: Arc<Mutex<bool>>,
	log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl PageElement for FakeElement {
	async fn send_keys(&self, text: &str) -> Result<()> {
		self.log.lock().unwrap().push(format!("send_keys:{}={}", self.id, text));
		Ok(())
	}

	async fn click(&self) -> Result<()> {
		self.log.lock().unwrap().push(format!("click:{}", self.id));
		if self.click_ok {
			*self.clicked.lock().unwrap() = true;
			Ok(())
		} else {
			Err(Error::Wait {
				seconds: 10,
				condition: "form submission click".to_string(),
			})
		}
	}

	async fn attribute(&self, _name: &str) -> Result<Option<String>> {
		Ok(None)
	}
}

fn page_probe(name: &str, expected_title: Option<&str>, expected_url: Option<&str>) -> PageProbe {
	PageProbe::new(
		ProbeConfig::named(name),
		PageTarget {
			url: "http://example.test".to_string(),
			expected_title: expected_title.map(str::to_string),
			expected_url: expected_url.map(str::to_string),
		},
	)
}

fn form_probe(fields: &[(&str, &str)]) -> FormProbe {
	let mut map = IndexMap::new();
	for (name, value) in fields {
		map.insert(name.to_string(), value.to_string());
	}
	FormProbe::new(
		ProbeConfig::named("probe_form"),
		PageTarget::new("http://example.test"),
		FormSpec {
			fields: map,
			post_submit_title: Some("Submission Received".to_string()),
			post_submit_url: Some("/done".to_string()),
			..FormSpec::default()
		},
	)
}

#[tokio::test]
async fn base_probe_always_succeeds() {
	let session = FakeSession::new(Script::happy());
	let mut probe = BaseProbe::new(ProbeConfig::named("probe_base"));

	assert!(probe.run(&session).await);

	let report = probe.metrics();
	assert_eq!(report.probe_name(), "probe_base");
	let init = report.action(INIT_TAG).expect("init record");
	assert!(init.success);
	assert!(init.duration >= 0.0);
	// the baseline step never touches the session
	assert!(session.calls().is_empty());
}

#[tokio::test]
async fn page_probe_passes_without_expectations() {
	let session = FakeSession::new(Script::happy());
	let mut probe = page_probe("probe_page", None, None);

	assert!(probe.run(&session).await);

	let report = probe.metrics();
	assert!(report.action(INIT_TAG).unwrap().success);
	assert!(report.action(PAGE_LOAD_TAG).unwrap().success);
}

#[tokio::test]
async fn page_probe_passes_with_matching_expectations() {
	let session = FakeSession::new(Script::happy());
	let mut probe = page_probe("probe_page", Some("Example"), Some("example.test"));

	assert!(probe.run(&session).await);
}

#[tokio::test]
async fn page_probe_fails_on_title_mismatch() {
	let session = FakeSession::new(Script::happy());
	let mut probe = page_probe("probe_page", Some("NoMatch"), None);

	assert!(!probe.run(&session).await);

	let report = probe.metrics();
	// intermediate tags stay independent: init still succeeded
	assert!(report.action(INIT_TAG).unwrap().success);
	assert!(!report.action(PAGE_LOAD_TAG).unwrap().success);
}

#[tokio::test]
async fn page_probe_fails_when_navigation_fails() {
	let mut script = Script::happy();
	script.navigate_ok = false;
	let session = FakeSession::new(script);
	let mut probe = page_probe("probe_page", None, None);

	assert!(!probe.run(&session).await);
	assert!(!probe.metrics().action(PAGE_LOAD_TAG).unwrap().success);
	// a failed navigation skips the page-ready wait and both checks
	assert_eq!(session.count("wait_for_page_load"), 0);
	assert_eq!(session.count("check_title"), 0);
}

#[tokio::test]
async fn page_probe_fails_when_page_wait_times_out() {
	let mut script = Script::happy();
	script.page_ready = false;
	let session = FakeSession::new(script);
	let mut probe = page_probe("probe_page", Some("Example"), None);

	assert!(!probe.run(&session).await);
	assert!(!probe.metrics().action(PAGE_LOAD_TAG).unwrap().success);
	// checks are skipped when the page never became ready
	assert_eq!(session.count("check_title"), 0);
	assert_eq!(session.count("check_url"), 0);
}

#[tokio::test]
async fn form_probe_happy_path_records_all_tags_in_order() {
	let session = FakeSession::new(Script::happy());
	let mut probe = form_probe(&[("user", "monitor"), ("pass", "hunter2")]);

	assert!(probe.run(&session).await);

	let report = probe.metrics();
	let tags: Vec<&str> = report.actions().keys().map(String::as_str).collect();
	assert_eq!(tags, [INIT_TAG, PAGE_LOAD_TAG, FORM_SUBMIT_TAG]);
	assert!(report.action(FORM_SUBMIT_TAG).unwrap().success);
	assert_eq!(session.count("send_keys"), 2);
	assert_eq!(session.count("click:submit"), 1);
}

#[tokio::test]
async fn form_probe_attempts_every_field_despite_a_missing_one() {
	let mut script = Script::happy();
	script.missing_fields = vec!["middle".to_string()];
	let session = FakeSession::new(script);
	let mut probe = form_probe(&[("first", "a"), ("middle", "b"), ("last", "c")]);

	assert!(!probe.run(&session).await);

	// the loop does not short-circuit: every field is looked up and the
	// valid ones are still populated
	assert_eq!(session.count("find_by_name"), 3);
	assert_eq!(session.count("send_keys:first"), 1);
	assert_eq!(session.count("send_keys:middle"), 0);
	assert_eq!(session.count("send_keys:last"), 1);
	assert!(!probe.metrics().action(FORM_SUBMIT_TAG).unwrap().success);
}

#[tokio::test]
async fn form_probe_never_clicks_a_missing_submit_control() {
	let mut script = Script::happy();
	script.submit_present = false;
	let session = FakeSession::new(script);
	let mut probe = form_probe(&[("q", "search terms")]);

	assert!(!probe.run(&session).await);
	assert_eq!(session.count("find_by_xpath"), 1);
	assert_eq!(session.count("click"), 0);
}

#[tokio::test]
async fn form_probe_fails_on_click_timeout() {
	let mut script = Script::happy();
	script.click_ok = false;
	let session = FakeSession::new(script);
	let mut probe = form_probe(&[("q", "search terms")]);

	assert!(!probe.run(&session).await);
	assert_eq!(session.count("click:submit"), 1);
	// only the page stage ran its checks; no post-submit verification
	assert_eq!(session.count("check_title"), 1);
	assert_eq!(session.count("wait_for_page_load"), 1);
}

#[tokio::test]
async fn form_probe_fails_on_post_submit_mismatch() {
	let mut script = Script::happy();
	script.post_submit_title = "Unexpected Error Page".to_string();
	let session = FakeSession::new(script);
	let mut probe = form_probe(&[("q", "search terms")]);

	assert!(!probe.run(&session).await);
	assert!(!probe.metrics().action(FORM_SUBMIT_TAG).unwrap().success);
	// page stage itself passed
	assert!(probe.metrics().action(PAGE_LOAD_TAG).unwrap().success);
}

#[tokio::test]
async fn form_probe_skips_interaction_when_page_stage_fails() {
	let mut script = Script::happy();
	script.page_ready = false;
	let session = FakeSession::new(script);
	let mut probe = form_probe(&[("q", "search terms")]);

	assert!(!probe.run(&session).await);
	assert_eq!(session.count("find_by_name"), 0);
	assert_eq!(session.count("find_by_xpath"), 0);
	assert!(!probe.metrics().action(FORM_SUBMIT_TAG).unwrap().success);
}

#[tokio::test]
async fn rerunning_a_probe_overwrites_its_records() {
	let session = FakeSession::new(Script::happy());
	let mut probe = page_probe("probe_page", None, None);

	assert!(probe.run(&session).await);
	let first = probe.metrics().action(PAGE_LOAD_TAG).cloned().unwrap();

	assert!(probe.run(&session).await);
	let report = probe.metrics();
	let second = report.action(PAGE_LOAD_TAG).cloned().unwrap();

	// one record per tag, refreshed in place
	assert_eq!(report.actions().len(), 2);
	assert!(second.timestamp_start >= first.timestamp_start);
}

#[tokio::test]
async fn final_tag_success_mirrors_the_returned_boolean() {
	let session = FakeSession::new(Script::happy());
	let mut passing = form_probe(&[("q", "ok")]);
	let outcome = passing.run(&session).await;
	assert_eq!(passing.metrics().action(FORM_SUBMIT_TAG).unwrap().success, outcome);

	let mut script = Script::happy();
	script.submit_present = false;
	let failing_session = FakeSession::new(script);
	let mut failing = form_probe(&[("q", "ok")]);
	let outcome = failing.run(&failing_session).await;
	assert_eq!(failing.metrics().action(FORM_SUBMIT_TAG).unwrap().success, outcome);
}
