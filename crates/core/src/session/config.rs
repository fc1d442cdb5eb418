use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Browser engine requested from the grid.
///
/// Parsing an unrecognized name is a configuration error: a probe silently
/// running against the wrong browser would report misleading metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
	/// Chromium-based browser (Chrome, Edge)
	#[default]
	Chrome,
	/// Mozilla Firefox
	Firefox,
}

impl std::fmt::Display for BrowserKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BrowserKind::Chrome => write!(f, "chrome"),
			BrowserKind::Firefox => write!(f, "firefox"),
		}
	}
}

impl FromStr for BrowserKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"chrome" | "chromium" => Ok(BrowserKind::Chrome),
			"firefox" => Ok(BrowserKind::Firefox),
			other => Err(Error::Config(format!("unrecognized browser kind '{other}'"))),
		}
	}
}

/// Fully owned session configuration.
///
/// This type is the stable handoff between callers and session construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Grid hub URL the session is opened against.
	pub endpoint: String,
	/// Browser engine requested from the grid (always headless).
	pub browser: BrowserKind,
	/// Page-load timeout, set once for the session's lifetime.
	pub page_load_timeout: Duration,
}

impl SessionConfig {
	/// Creates a config with default browser and timeout.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			browser: BrowserKind::default(),
			page_load_timeout: Duration::from_secs(10),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn browser_kind_parses_known_names() {
		assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
		assert_eq!("chromium".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
		assert_eq!("Firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
	}

	#[test]
	fn browser_kind_rejects_unrecognized_names() {
		let err = "safari".parse::<BrowserKind>().unwrap_err();
		assert!(matches!(err, Error::Config(_)));
		assert!(err.to_string().contains("safari"));
	}

	#[test]
	fn session_config_defaults() {
		let cfg = SessionConfig::new("http://localhost:4444/wd/hub");
		assert_eq!(cfg.browser, BrowserKind::Chrome);
		assert_eq!(cfg.page_load_timeout, Duration::from_secs(10));
	}
}
