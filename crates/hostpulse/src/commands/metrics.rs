//! `hostpulse metrics <id> <metric>`: one metric series.

use tabled::Tabled;

use hostpulse_core::format::{format_network_speed, format_percent};
use hostpulse_core::{MetricName, MetricSample};

use super::Context;
use crate::cli::MetricsArgs;
use crate::error::{CliError, Target};
use crate::output;

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn format_value(metric: &MetricName, value: f64) -> String {
    if metric.is_rate() {
        format_network_speed(Some(value))
    } else {
        format_percent(value)
    }
}

/// `min / avg / max` over the series, or `None` when it is empty.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn stats(series: &[MetricSample]) -> Option<(f64, f64, f64)> {
    if series.is_empty() {
        return None;
    }
    let (min, max, sum) = series.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), s| (min.min(s.value), max.max(s.value), sum + s.value),
    );
    Some((min, sum / series.len() as f64, max))
}

fn render_table(metric: &MetricName, series: &[MetricSample]) -> String {
    let Some((min, avg, max)) = stats(series) else {
        return "No data available.".into();
    };
    let rows: Vec<SampleRow> = series
        .iter()
        .map(|s| SampleRow {
            timestamp: s.timestamp.clone(),
            value: format_value(metric, s.value),
        })
        .collect();
    format!(
        "{}\n{metric}: min {} · avg {} · max {} over {} samples",
        output::render_table(&rows),
        format_value(metric, min),
        format_value(metric, avg),
        format_value(metric, max),
        series.len()
    )
}

pub async fn handle(ctx: &Context<'_>, args: MetricsArgs) -> Result<(), CliError> {
    let metric = MetricName::from(args.metric);
    let range = args.range.as_deref().unwrap_or(&ctx.dashboard.metric_range);
    let aggregate = args
        .aggregate
        .as_deref()
        .unwrap_or(&ctx.dashboard.metric_aggregate);

    let series = ctx
        .client
        .host_metric_history(&args.host_id, &metric, range, aggregate)
        .await
        .map_err(|e| {
            let target = Target::Metric {
                host_id: &args.host_id,
                metric: metric.as_str(),
            };
            CliError::from_api(e, target, ctx.url())
        })?;

    let out = match ctx.global.output {
        crate::cli::OutputFormat::Table => render_table(&metric, &series),
        format => output::render_list(
            format,
            &series,
            |s| SampleRow {
                timestamp: s.timestamp.clone(),
                value: format_value(&metric, s.value),
            },
            |s| format!("{}\t{}", s.timestamp, s.value),
        )?,
    };
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
