use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// A span whose progress bar tracks finished scan units.
///
/// The bar is drawn while the span is entered.
pub fn dispatch_span(units: usize) -> Span {
    let span = info_span!("dispatch", indicatif.pb_show = true);

    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] {bar:32.cyan/bright_black} {pos}/{len} units {msg}",
    ) {
        span.pb_set_style(&style.tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]));
    }
    span.pb_set_length(units as u64);
    span.pb_set_message("");
    span
}

pub fn report_unit_done(span: &Span, target: &str, done: usize) {
    span.pb_set_position(done as u64);
    span.pb_set_message(target);
}
