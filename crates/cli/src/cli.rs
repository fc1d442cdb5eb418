use clap::{Args, Parser, Subcommand, ValueEnum};
use gridprobe::BrowserKind;

/// Browser engine requested from the grid (CLI wrapper for gridprobe::BrowserKind)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CliBrowserKind {
    /// Chromium-based browser (Chrome, Edge)
    #[default]
    Chrome,
    /// Mozilla Firefox
    Firefox,
}

impl From<CliBrowserKind> for BrowserKind {
    fn from(kind: CliBrowserKind) -> Self {
        match kind {
            CliBrowserKind::Chrome => BrowserKind::Chrome,
            CliBrowserKind::Firefox => BrowserKind::Firefox,
        }
    }
}

/// Output format for the metrics report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary lines
    #[default]
    Text,
    /// Pretty-printed JSON report
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "gridprobe")]
#[command(about = "Synthetic-monitoring probes over a remote Selenium Grid")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Selenium Grid hub URL
    #[arg(short, long, global = true, default_value = "http://localhost:4444/wd/hub")]
    pub endpoint: String,

    /// Browser engine to request from the grid
    #[arg(short, long, global = true, value_enum, default_value_t = CliBrowserKind::Chrome)]
    pub browser: CliBrowserKind,

    /// Seconds to wait for a page or element to appear
    #[arg(short, long, global = true, default_value_t = 10)]
    pub timeout: u64,

    /// Output format for the metrics report
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page and verify title/URL expectations
    Page(PageArgs),
    /// Load a page, fill a form, submit it, and verify the result
    Form(FormArgs),
}

#[derive(Args, Debug)]
pub struct PageArgs {
    /// URL to probe
    pub url: String,

    /// Probe name reflected in metrics and logs
    #[arg(short, long, default_value = "noname")]
    pub name: String,

    /// Substring expected in the page title
    #[arg(long, value_name = "TEXT")]
    pub expect_title: Option<String>,

    /// Substring expected in the final URL (e.g. after redirect)
    #[arg(long, value_name = "URL")]
    pub expect_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct FormArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Form field to fill, as name=value (repeatable, filled in order)
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// XPath of the control that submits the form
    #[arg(long, value_name = "XPATH", default_value = gridprobe::DEFAULT_SUBMIT_LOCATOR)]
    pub submit: String,

    /// Substring expected in the post-submit title
    #[arg(long, value_name = "TEXT")]
    pub post_title: Option<String>,

    /// Substring expected in the post-submit URL
    #[arg(long, value_name = "URL")]
    pub post_url: Option<String>,
}
