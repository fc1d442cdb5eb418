//! Session handle owning one remote grid browser session.
//!
//! A [`SessionHandle`] wraps the WebDriver session for its whole lifetime:
//! construction swallows connection failures (leaving the handle
//! disconnected), and [`SessionHandle::close`] performs the one cookie-clear
//! + terminate cleanup. Probes drive the session through the [`ProbeSession`]
//! trait so probe logic can be exercised against a scripted fake.

mod config;

use std::time::Duration;

use async_trait::async_trait;
pub use config::{BrowserKind, SessionConfig};
use thirtyfour::extensions::query::ElementQueryable;
use thirtyfour::{By, Capabilities, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver, WebElement};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::probe::Probe;

/// XPath of the element whose presence signals "the page is ready".
const PAGE_READY_XPATH: &str = "/html/head/title";
/// Attribute read from the page-ready element.
const PAGE_READY_ATTRIBUTE: &str = "innerHTML";
/// Polling interval for bounded element waits.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Session surface probes are written against.
///
/// [`SessionHandle`] is the production implementation; tests substitute a
/// scripted fake to exercise probe logic without a grid.
#[async_trait]
pub trait ProbeSession: Send + Sync {
	/// Requests navigation to a URL.
	async fn navigate(&self, url: &str) -> Result<()>;

	/// Waits for the current page to become ready, bounded by the session timeout.
	async fn wait_for_page_load(&self) -> bool;

	/// Checks the current title against an expected substring (vacuous pass on `None`).
	async fn check_title(&self, expected: Option<&str>) -> bool;

	/// Checks the current URL against an expected substring (vacuous pass on `None`).
	async fn check_url(&self, expected: Option<&str>) -> bool;

	/// Locates an input element by its `name` attribute.
	async fn find_by_name(&self, name: &str) -> Result<Box<dyn PageElement>>;

	/// Locates an element by XPath.
	async fn find_by_xpath(&self, xpath: &str) -> Result<Box<dyn PageElement>>;
}

/// Located DOM element a probe can interact with.
#[async_trait]
pub trait PageElement: Send + Sync {
	/// Types text into the element.
	async fn send_keys(&self, text: &str) -> Result<()>;

	/// Clicks the element.
	async fn click(&self) -> Result<()>;

	/// Reads an attribute or property value.
	async fn attribute(&self, name: &str) -> Result<Option<String>>;
}

/// Owned wrapper around one remote grid session.
///
/// `driver: None` signals that construction failed; every operation on a
/// disconnected handle degrades to a logged failure instead of raising.
pub struct SessionHandle {
	driver: Option<WebDriver>,
	page_load_timeout: Duration,
}

impl SessionHandle {
	/// Opens a headless session against the configured grid endpoint.
	///
	/// Connection failures are logged and leave the handle disconnected;
	/// this never returns an error. The page-load timeout is set once for
	/// the session's lifetime.
	pub async fn connect(config: SessionConfig) -> Self {
		let caps = match headless_capabilities(config.browser) {
			Ok(caps) => caps,
			Err(err) => {
				error!(browser = %config.browser, error = %err, "failed to build browser capabilities");
				return Self {
					driver: None,
					page_load_timeout: config.page_load_timeout,
				};
			}
		};

		match WebDriver::new(&config.endpoint, caps).await {
			Ok(driver) => {
				if let Err(err) = driver.set_page_load_timeout(config.page_load_timeout).await {
					warn!(error = %err, "failed to set page-load timeout");
				}
				debug!(endpoint = %config.endpoint, browser = %config.browser, "grid session established");
				Self {
					driver: Some(driver),
					page_load_timeout: config.page_load_timeout,
				}
			}
			Err(err) => {
				error!(endpoint = %config.endpoint, error = %err, "failed to connect to remote grid");
				Self {
					driver: None,
					page_load_timeout: config.page_load_timeout,
				}
			}
		}
	}

	/// Returns true when an underlying grid session is active.
	pub fn is_connected(&self) -> bool {
		self.driver.is_some()
	}

	/// Clears cookies and terminates the grid session.
	///
	/// Idempotent: the cleanup runs at most once per handle, and not at all
	/// when construction failed. Cleanup errors are logged, never raised.
	pub async fn close(&mut self) {
		if let Some(driver) = self.driver.take() {
			debug!("clearing cookies and terminating grid session");
			if let Err(err) = driver.delete_all_cookies().await {
				warn!(error = %err, "failed to clear cookies");
			}
			if let Err(err) = driver.quit().await {
				warn!(error = %err, "failed to terminate grid session");
			}
		}
	}

	/// Requests navigation to a URL.
	///
	/// The error is returned rather than logged here so the caller can fold
	/// it into its own outcome and log once.
	pub async fn navigate(&self, url: &str) -> Result<()> {
		let driver = self.driver.as_ref().ok_or(Error::NotConnected)?;
		info!(url, "requesting page");
		driver.goto(url).await.map_err(|source| Error::Navigation {
			url: url.to_string(),
			source,
		})
	}

	/// Checks the current page title against an expected substring.
	pub async fn check_title(&self, expected: Option<&str>) -> bool {
		let Some(driver) = &self.driver else {
			warn!("title check attempted on disconnected session");
			return false;
		};
		match driver.title().await {
			Ok(title) => {
				info!(title = %title, "current page title");
				report_match("title", expected, &title)
			}
			Err(err) => {
				warn!(error = %err, "failed to read page title");
				false
			}
		}
	}

	/// Checks the current URL against an expected substring.
	pub async fn check_url(&self, expected: Option<&str>) -> bool {
		let Some(driver) = &self.driver else {
			warn!("url check attempted on disconnected session");
			return false;
		};
		match driver.current_url().await {
			Ok(url) => {
				info!(url = %url, "current page url");
				report_match("url", expected, url.as_str())
			}
			Err(err) => {
				warn!(error = %err, "failed to read current url");
				false
			}
		}
	}

	/// Waits for an element to appear, then reads one of its attributes.
	///
	/// Bounded by `timeout`; timeout and driver failures are logged and
	/// reported as `(false, None)`. A present element with a missing
	/// attribute is still a success: `(true, None)`.
	pub async fn wait_for_element_attribute(
		&self,
		xpath: &str,
		attribute: &str,
		timeout: Duration,
	) -> (bool, Option<String>) {
		let Some(driver) = &self.driver else {
			warn!("element wait attempted on disconnected session");
			return (false, None);
		};
		debug!(xpath, "waiting for element");
		let found = driver
			.query(By::XPath(xpath))
			.wait(timeout, WAIT_POLL_INTERVAL)
			.first()
			.await;
		match found {
			Ok(element) => match element.attr(attribute).await {
				Ok(value) => (true, value),
				Err(err) => {
					warn!(xpath, attribute, error = %err, "failed to read element attribute");
					(false, None)
				}
			},
			Err(err) => {
				warn!(xpath, timeout_s = timeout.as_secs(), error = %err, "element did not appear");
				(false, None)
			}
		}
	}

	/// Waits for the title element to be present in the document.
	///
	/// This is the proxy signal for "page loaded": the canonical
	/// `/html/head/title` / `innerHTML` wait with the session timeout.
	pub async fn wait_for_page_load(&self) -> bool {
		let (ready, _title) = self
			.wait_for_element_attribute(PAGE_READY_XPATH, PAGE_READY_ATTRIBUTE, self.page_load_timeout)
			.await;
		ready
	}

	async fn lookup(&self, by: By, locator: String) -> Result<Box<dyn PageElement>> {
		let driver = self.driver.as_ref().ok_or(Error::NotConnected)?;
		match driver.find(by).await {
			Ok(element) => Ok(Box::new(DriverElement { element, locator })),
			Err(_) => Err(Error::ElementNotFound { locator }),
		}
	}
}

impl Drop for SessionHandle {
	fn drop(&mut self) {
		if self.driver.is_some() {
			warn!("session handle dropped without close(); grid session may leak");
		}
	}
}

#[async_trait]
impl ProbeSession for SessionHandle {
	async fn navigate(&self, url: &str) -> Result<()> {
		SessionHandle::navigate(self, url).await
	}

	async fn wait_for_page_load(&self) -> bool {
		SessionHandle::wait_for_page_load(self).await
	}

	async fn check_title(&self, expected: Option<&str>) -> bool {
		SessionHandle::check_title(self, expected).await
	}

	async fn check_url(&self, expected: Option<&str>) -> bool {
		SessionHandle::check_url(self, expected).await
	}

	async fn find_by_name(&self, name: &str) -> Result<Box<dyn PageElement>> {
		self.lookup(By::Name(name), format!("name='{name}'")).await
	}

	async fn find_by_xpath(&self, xpath: &str) -> Result<Box<dyn PageElement>> {
		self.lookup(By::XPath(xpath), xpath.to_string()).await
	}
}

/// WebDriver-backed element with its locator kept for error context.
struct DriverElement {
	element: WebElement,
	locator: String,
}

#[async_trait]
impl PageElement for DriverElement {
	async fn send_keys(&self, text: &str) -> Result<()> {
		self.element
			.send_keys(text)
			.await
			.map_err(|source| Error::Interaction {
				locator: self.locator.clone(),
				source,
			})
	}

	async fn click(&self) -> Result<()> {
		self.element.click().await.map_err(|source| Error::Interaction {
			locator: self.locator.clone(),
			source,
		})
	}

	async fn attribute(&self, name: &str) -> Result<Option<String>> {
		self.element.attr(name).await.map_err(|source| Error::Interaction {
			locator: self.locator.clone(),
			source,
		})
	}
}

/// Runs one probe inside a scoped session: connect, run, always close.
pub async fn run_probe(config: SessionConfig, probe: &mut dyn Probe) -> bool {
	let mut session = SessionHandle::connect(config).await;
	let outcome = probe.run(&session).await;
	session.close().await;
	outcome
}

fn headless_capabilities(kind: BrowserKind) -> Result<Capabilities> {
	match kind {
		BrowserKind::Chrome => {
			let mut caps = DesiredCapabilities::chrome();
			caps.set_headless()?;
			Ok(caps.into())
		}
		BrowserKind::Firefox => {
			let mut caps = DesiredCapabilities::firefox();
			caps.set_headless()?;
			Ok(caps.into())
		}
	}
}

fn expectation_matches(expected: Option<&str>, actual: &str) -> bool {
	expected.is_none_or(|needle| actual.contains(needle))
}

fn report_match(what: &str, expected: Option<&str>, actual: &str) -> bool {
	let ok = expectation_matches(expected, actual);
	if let Some(needle) = expected {
		if ok {
			info!(expected = needle, "page {} matches", what);
		} else {
			warn!(expected = needle, actual, "page {} does not match", what);
		}
	}
	ok
}
