//! Run one check invocation and print what it emitted

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;
use yarn_lib::emitter::{Event, Gauge};
use yarn_lib::{CheckSummary, Emitter, InstanceConfig, RecordingEmitter, YarnCheck};

use crate::output::{color_alert, format_value, print_error, print_info, print_success, print_table, OutputFormat};

/// Row for the gauges table
#[derive(Tabled, Serialize)]
struct GaugeRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Gauge> for GaugeRow {
    fn from(gauge: &Gauge) -> Self {
        Self {
            name: gauge.name.clone(),
            value: format_value(gauge.value),
            tags: gauge.tags.join(", "),
        }
    }
}

#[derive(Serialize)]
struct CollectReport {
    summary: CheckSummary,
    gauges: Vec<Gauge>,
    events: Vec<Event>,
}

/// Run one invocation, optionally at a fixed time
pub async fn run_collect(
    instance: InstanceConfig,
    at: Option<DateTime<FixedOffset>>,
    format: OutputFormat,
) -> Result<()> {
    let emitter = Arc::new(RecordingEmitter::new());
    let check = YarnCheck::connect(instance, emitter.clone() as Arc<dyn Emitter>)?;

    let summary = match at {
        Some(now) => check.collect_at(now).await,
        None => check.collect().await,
    };

    let report = CollectReport {
        summary,
        gauges: emitter.gauges(),
        events: emitter.events(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &CollectReport) {
    let summary = &report.summary;
    println!("{} {}", "ResourceManager".bold(), summary.host.cyan());
    println!("{}", "=".repeat(50));

    if !report.gauges.is_empty() {
        let rows: Vec<GaugeRow> = report.gauges.iter().map(GaugeRow::from).collect();
        print_table(&rows, OutputFormat::Table);
    }

    for event in &report.events {
        print_error(&format!("[{}] {}", color_alert(event.alert_type), event.text));
    }

    println!();
    if summary.aborted {
        print_error("Running applications could not be fetched, no metrics were emitted");
        return;
    }
    if !summary.completed_pass {
        print_info("Completed applications are only counted on the hour");
    }
    print_success(&format!(
        "{} running applications, {} gauges, {} events",
        summary.running_apps, summary.gauges, summary.events
    ));
}
