//! Human-readable statistics report.

use std::fmt;

use crate::statistics::StatisticsSummary;

const RULE_WIDTH: usize = 60;
const TOP_N: usize = 10;
const OPENINGS_PER_SEQUENCE: usize = 3;

/// Console report for a statistics summary, rendered through `Display`.
///
/// Sequences are listed only when repeated; their rank is the position in the
/// full sorted list, so numbering can skip.
pub struct Report<'a>(pub &'a StatisticsSummary);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "\n{rule}")?;
        writeln!(f, "CHESS OPENING MISTAKES ANALYSIS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "\nTotal mistakes found: {}", summary.total_mistakes)?;

        writeln!(f, "\n--- Mistakes by Color ---")?;
        for (color, count) in summary.by_color.iter() {
            writeln!(f, "  {color}: {count}")?;
        }

        writeln!(f, "\n--- Mistakes by Time Class ---")?;
        for (time_class, count) in summary.by_time_class.iter() {
            writeln!(f, "  {time_class}: {count}")?;
        }

        writeln!(f, "\n--- Mistakes by Move Number ---")?;
        for (number, count) in summary.by_move_number.iter() {
            writeln!(f, "  Move {number}: {count}")?;
        }

        writeln!(f, "\n--- Top {TOP_N} Openings with Most Mistakes ---")?;
        for (i, (opening, stats)) in summary.by_opening.iter().take(TOP_N).enumerate() {
            writeln!(
                f,
                "  {}. {opening}: {} mistakes (avg drop: {:.0} cp)",
                i + 1,
                stats.count,
                stats.avg_eval_drop
            )?;
        }

        writeln!(f, "\n--- Top {TOP_N} Most Repeated Mistake Sequences ---")?;
        for (i, (sequence, stats)) in summary.by_sequence.iter().take(TOP_N).enumerate() {
            if stats.count < 2 {
                continue;
            }
            let openings: Vec<&str> = stats
                .openings
                .iter()
                .take(OPENINGS_PER_SEQUENCE)
                .map(String::as_str)
                .collect();
            writeln!(f, "  {}. [{}x] {sequence}", i + 1, stats.count)?;
            writeln!(f, "      Openings: {}", openings.join(", "))?;
        }

        writeln!(f, "\n{rule}")
    }
}
