//! Command dispatch: build a session and probe from CLI args, run, report.

use std::time::Duration;

use anyhow::{Context, bail};
use gridprobe::{FormProbe, FormSpec, MetricsReport, PageProbe, PageTarget, Probe, ProbeConfig, SessionConfig};
use indexmap::IndexMap;
use url::Url;

use crate::cli::{Cli, Commands, FormArgs, OutputFormat, PageArgs};

/// Runs the configured probe and returns its overall success.
pub async fn dispatch(cli: Cli) -> anyhow::Result<bool> {
    Url::parse(&cli.endpoint).with_context(|| format!("invalid grid endpoint '{}'", cli.endpoint))?;

    let session_config = SessionConfig {
        endpoint: cli.endpoint.clone(),
        browser: cli.browser.into(),
        page_load_timeout: Duration::from_secs(cli.timeout),
    };

    let mut probe: Box<dyn Probe> = match &cli.command {
        Commands::Page(args) => Box::new(build_page_probe(args, cli.timeout)),
        Commands::Form(args) => Box::new(build_form_probe(args, cli.timeout)?),
    };

    let ok = gridprobe::run_probe(session_config, probe.as_mut()).await;
    print_report(&probe.metrics(), ok, cli.format)?;
    Ok(ok)
}

fn probe_config(name: &str, timeout: u64) -> ProbeConfig {
    ProbeConfig {
        name: name.to_string(),
        timeout: Duration::from_secs(timeout),
    }
}

fn page_target(args: &PageArgs) -> PageTarget {
    PageTarget {
        url: args.url.clone(),
        expected_title: args.expect_title.clone(),
        expected_url: args.expect_url.clone(),
    }
}

fn build_page_probe(args: &PageArgs, timeout: u64) -> PageProbe {
    PageProbe::new(probe_config(&args.name, timeout), page_target(args))
}

fn build_form_probe(args: &FormArgs, timeout: u64) -> anyhow::Result<FormProbe> {
    let mut fields = IndexMap::new();
    for raw in &args.fields {
        let (name, value) = parse_field(raw)?;
        fields.insert(name, value);
    }

    Ok(FormProbe::new(
        probe_config(&args.page.name, timeout),
        page_target(&args.page),
        FormSpec {
            fields,
            submit_locator: args.submit.clone(),
            post_submit_title: args.post_title.clone(),
            post_submit_url: args.post_url.clone(),
        },
    ))
}

/// Splits a `name=value` field argument; values may contain further `=`.
fn parse_field(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("invalid field '{raw}', expected name=value"),
    }
}

fn print_report(report: &MetricsReport, ok: bool, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("probe {}: {}", report.probe_name(), if ok { "PASS" } else { "FAIL" });
            for (tag, record) in report.actions() {
                println!(
                    "  {:<12} {:<7} {:.3}s",
                    tag,
                    if record.success { "ok" } else { "failed" },
                    record.duration
                );
            }
        }
    }
    Ok(())
}
