//! gridprobe: synthetic-monitoring probes over a remote Selenium Grid
//!
//! This crate drives a remote browser-automation grid to load pages and
//! submit forms, checking title/URL expectations and reporting per-action
//! timing and success records.
//!
//! Three pieces compose the library:
//!
//! - [`SessionHandle`] owns one remote browser session, guarantees the
//!   cookie-clear + terminate cleanup, and exposes the title/URL checks and
//!   bounded element waits probes rely on.
//! - The probe hierarchy ([`BaseProbe`] → [`PageProbe`] → [`FormProbe`])
//!   composes timed lifecycle steps into one pass/fail outcome plus a
//!   per-action [`MetricsReport`]. Probes absorb environmental failures
//!   (timeouts, missing elements, unreachable pages) into their boolean
//!   result; they never raise for them.
//! - [`VaultClient`] talks to the secret store, independent of the probes.
//!
//! # Example
//!
//! ```ignore
//! use gridprobe::{FormProbe, FormSpec, PageTarget, Probe, ProbeConfig, SessionConfig, SessionHandle};
//! use indexmap::IndexMap;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut fields = IndexMap::new();
//!     fields.insert("q".to_string(), "rust testing".to_string());
//!
//!     let mut probe = FormProbe::new(
//!         ProbeConfig::named("probe_form_duckduckgo"),
//!         PageTarget {
//!             url: "http://duckduckgo.com".into(),
//!             expected_title: Some("DuckDuckGo".into()),
//!             expected_url: Some("https://duckduckgo.com".into()),
//!         },
//!         FormSpec {
//!             fields,
//!             submit_locator: "//input[@type='submit']".into(),
//!             post_submit_title: Some("rust testing".into()),
//!             post_submit_url: None,
//!         },
//!     );
//!
//!     let mut session = SessionHandle::connect(SessionConfig::new("http://localhost:4444/wd/hub")).await;
//!     let ok = probe.run(&session).await;
//!     session.close().await;
//!
//!     println!("{}", serde_json::to_string_pretty(&probe.metrics()).unwrap());
//!     assert!(ok, "form probe failed");
//! }
//! ```

pub mod error;
pub mod metrics;
pub mod probe;
pub mod session;
pub mod vault;

pub use error::{Error, Result};
pub use metrics::{ActionRecord, MetricsReport};
pub use probe::{
	BaseProbe, DEFAULT_SUBMIT_LOCATOR, FORM_SUBMIT_TAG, FormProbe, FormSpec, INIT_TAG, PAGE_LOAD_TAG, PageProbe,
	PageTarget, Probe, ProbeConfig,
};
pub use session::{BrowserKind, PageElement, ProbeSession, SessionConfig, SessionHandle, run_probe};
pub use vault::{SecretAttributes, SecretBundle, VaultClient, VaultConfig, VaultCredentials};
