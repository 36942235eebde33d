use ratesheet_core::domain::merge::ProductChange;
use ratesheet_core::domain::product::Section;

pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("+{change}")
    } else {
        change.to_string()
    }
}

fn product_line(change: &ProductChange) -> String {
    format!(
        "  {}: {} (Change: {}, Trend: {})",
        change.label,
        change.rate,
        format_change(change.rate_change),
        change.trend
    )
}

/// Operator-facing summary printed after a run.
pub fn render_summary(display_date: &str, changes: &[ProductChange], written: bool) -> String {
    let mut lines = Vec::with_capacity(changes.len() + 5);
    if written {
        lines.push("Rates updated successfully!".to_string());
    } else {
        lines.push("Dry run: rates file not written.".to_string());
    }
    lines.push(format!("Updated: {display_date}"));

    for (section, heading) in [
        (Section::Purchase, "Purchase Rates:"),
        (Section::Refi, "Refinance Rates:"),
    ] {
        lines.push(heading.to_string());
        lines.extend(
            changes
                .iter()
                .filter(|c| c.key.slot().0 == section)
                .map(product_line),
        );
    }

    lines.join("\n")
}
