use std::time::Duration;

use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::logging::PROGRESS_TARGET;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
];

/// Progress bar for one sweep, advanced in completion order.
///
/// Backed by a tracing span so log lines emitted while the sweep runs are
/// printed above the bar. The bar disappears when this value is dropped.
pub struct SweepProgress {
    span: Span,
    label: &'static str,
    found: u64,
}

impl SweepProgress {
    pub fn start(label: &'static str, total: u64) -> Self {
        let span = info_span!(target: PROGRESS_TARGET, "sweep", indicatif.pb_show = true);

        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] {bar:32.cyan/blue} {pos}/{len} {msg}",
        ) {
            span.pb_set_style(&style.tick_strings(TICK_STRINGS));
        }
        span.pb_set_length(total);
        span.pb_start();

        let progress = Self {
            span,
            label,
            found: 0,
        };
        progress.refresh();
        progress
    }

    /// Marks one probe as completed.
    pub fn advance(&mut self, positive: bool) {
        if positive {
            self.found += 1;
            self.refresh();
        }
        self.span.pb_inc(1);
    }

    fn refresh(&self) {
        self.span.pb_set_message(&format!(
            "{} {} so far...",
            self.found.to_string().green().bold(),
            self.label
        ));
    }
}

/// Spinner shown while calibration samples run one after another.
pub fn calibration_spinner(samples: usize) -> Span {
    let span = info_span!(target: PROGRESS_TARGET, "calibration", indicatif.pb_show = true);
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        span.pb_set_style(&style.tick_strings(TICK_STRINGS));
    }
    span.pb_set_message(&format!("Sampling network response times ({samples} samples)..."));
    span.pb_start();
    span
}

pub fn format_latency(latency: Duration) -> String {
    format!("{}ms", latency.as_millis())
}
