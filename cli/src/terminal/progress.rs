//! Progress bar of a running job, drawn through the `tracing-indicatif` layer
//! so log lines print above it.

use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use sweepr_common::discovery::job::DiscoveryJob;
use sweepr_common::discovery::snapshot::ProgressSnapshot;

use crate::terminal::format;

const TEMPLATE: &str = "{spinner:.blue} [{bar:30.green/white}] {pos:>3}% {wide_msg}";

pub struct ProgressView {
    span: Span,
}

impl ProgressView {
    pub fn start(job: &DiscoveryJob, initial: &ProgressSnapshot) -> Self {
        let span = info_span!("discovery", indicatif.pb_show = true, job_id = %job.job_id);

        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
            .tick_strings(&["▁▂▃", "▂▃▄", "▃▄▅", "▄▅▆", "▅▆▇", "▆▇█", "▁▁▁"]);
        span.pb_set_style(&style);
        span.pb_set_length(100);
        span.pb_start();

        let view = Self { span };
        view.update(initial);
        view
    }

    pub fn update(&self, snapshot: &ProgressSnapshot) {
        self.span.pb_set_position(u64::from(snapshot.percent));
        self.span.pb_set_message(&format::snapshot_message(snapshot));
    }
}
