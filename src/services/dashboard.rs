// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML rendering for the dashboard page.
//!
//! Charts are Plotly bar charts described as JSON and drawn client-side.

use crate::models::{BinnedDistribution, SummaryStats};
use serde_json::json;

const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Bar colors, one per chart in display order.
const COLORS: [&str; 6] = [
    "skyblue",
    "lightgreen",
    "lightcoral",
    "gold",
    "plum",
    "lightsteelblue",
];

/// How the Plotly library reaches the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlotlyJs {
    /// Load from the public CDN.
    #[default]
    Cdn,
    /// Leave it out; the embedding page provides it.
    Omit,
}

/// Chart rendering options, passed explicitly to every render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    pub plotly_js: PlotlyJs,
    /// Height of each chart in pixels
    pub chart_height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            plotly_js: PlotlyJs::Cdn,
            chart_height: 380,
        }
    }
}

/// Summary metric block.
pub fn render_summary(stats: &SummaryStats) -> String {
    let optional = |value: Option<f64>, unit: &str| match value {
        Some(v) => format!("{:.1}{}", v, unit),
        None => "n/a".to_string(),
    };

    let metrics = [
        ("Time Period", stats.time_period()),
        ("Number of Runs", stats.run_count.to_string()),
        (
            "Total Distance",
            format!("{:.1} miles", stats.total_distance_miles),
        ),
        (
            "Total Moving Time",
            format!("{:.1} hours", stats.total_moving_time_hours),
        ),
        (
            "Total Elevation Gain",
            format!("{:.0} ft", stats.total_elevation_gain_ft),
        ),
        (
            "Average Pace",
            stats
                .average_pace
                .as_deref()
                .map(|p| format!("{} min/mi", p))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        (
            "Average Heart Rate",
            optional(stats.average_heartrate, " bpm"),
        ),
        ("Average Watts", optional(stats.average_watts, "")),
    ];

    metrics
        .iter()
        .map(|(name, value)| {
            format!(
                "<div class=\"metric\"><strong>{}:</strong> {}</div>",
                name, value
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chart grid for all distributions.
pub fn render_charts(distributions: &[BinnedDistribution], options: &ChartOptions) -> String {
    let mut html = String::new();

    if options.plotly_js == PlotlyJs::Cdn {
        html.push_str(&format!(
            "<script src=\"{}\" charset=\"utf-8\"></script>\n",
            PLOTLY_CDN_URL
        ));
    }

    html.push_str("<div class=\"charts\">\n");
    for idx in 0..distributions.len() {
        html.push_str(&format!("<div id=\"chart-{}\" class=\"chart\"></div>\n", idx));
    }
    html.push_str("</div>\n<script>\n");

    for (idx, dist) in distributions.iter().enumerate() {
        let data = json!([{
            "type": "bar",
            "x": dist.bins.iter().map(|b| b.label).collect::<Vec<_>>(),
            "y": dist.bins.iter().map(|b| b.count).collect::<Vec<_>>(),
            "text": dist.bins.iter().map(|b| b.text_label()).collect::<Vec<_>>(),
            "textposition": "auto",
            "marker": {"color": COLORS[idx % COLORS.len()]},
            "name": dist.metric.title(),
        }]);
        let layout = json!({
            "title": {"text": dist.metric.title()},
            "xaxis": {"title": {"text": dist.metric.axis_label()}},
            "yaxis": {"title": {"text": "Runs"}},
            "height": options.chart_height,
            "showlegend": false,
        });

        html.push_str(&format!(
            "Plotly.newPlot(\"chart-{}\", {}, {}, {{\"responsive\": true}});\n",
            idx,
            script_json(&data),
            script_json(&layout)
        ));
    }
    html.push_str("</script>\n");

    html
}

/// Full dashboard page.
pub fn render_page(summary_html: &str, plot_html: &str) -> String {
    PAGE_TEMPLATE
        .replace("{{summary_html}}", summary_html)
        .replace("{{plot_html}}", plot_html)
}

/// Page shown when the period has no runs.
pub fn render_empty_page(message: &str) -> String {
    render_page(
        &format!("<div class=\"metric empty\">{}</div>", escape_html(message)),
        "",
    )
}

/// JSON safe to inline inside a `<script>` element.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Running Dashboard</title>
<style>
body { font-family: sans-serif; margin: 2em; color: #222; }
.summary { display: grid; grid-template-columns: repeat(4, 1fr); gap: 0.5em; margin-bottom: 1.5em; }
.metric { background: #f4f6f8; padding: 0.75em; border-radius: 6px; }
.metric.empty { grid-column: 1 / -1; }
.charts { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1em; }
form { margin-bottom: 1em; }
</style>
</head>
<body>
<h1>Running Dashboard</h1>
<form method="post" action="/refresh"><button type="submit">Refresh data</button></form>
<div class="summary">
{{summary_html}}
</div>
{{plot_html}}
</body>
</html>
"#;
