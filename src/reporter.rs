//! Reporter (§4.6): formats the single-line summary emitted on teardown.

use std::time::Duration;

use crate::engine::EngineTotals;

/// Formats `"Bench is done. speed=[S], bytes=[B], failed=[F]."`, brackets
/// literal, matching the source's `printf("... speed=[%d], ...")`.
pub fn format_summary(totals: EngineTotals) -> String {
    format!(
        "Bench is done. speed=[{}], bytes=[{}], failed=[{}].",
        totals.speed, totals.bytes, totals.failed
    )
}

/// Formats the same line with the wall-clock elapsed seconds appended, as
/// emitted by the thread-per-client alternative driver (§4.6, §10.3).
pub fn format_summary_with_elapsed(totals: EngineTotals, elapsed: Duration) -> String {
    format!(
        "{} elapsed={:.3}s",
        format_summary(totals),
        elapsed.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_summary() {
        let totals = EngineTotals {
            speed: 42,
            bytes: 1024,
            failed: 3,
        };
        assert_eq!(
            format_summary(totals),
            "Bench is done. speed=[42], bytes=[1024], failed=[3]."
        );
    }

    #[test]
    fn formats_summary_with_elapsed() {
        let totals = EngineTotals {
            speed: 1,
            bytes: 2,
            failed: 0,
        };
        let line = format_summary_with_elapsed(totals, Duration::from_millis(1500));
        assert_eq!(line, "Bench is done. speed=[1], bytes=[2], failed=[0]. elapsed=1.500s");
    }
}
