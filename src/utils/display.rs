// Plain-text rendering of schedules and metrics for the terminal

use std::fmt::Write;

use crate::planner::Schedule;
use crate::utils::metrics::ScheduleMetrics;

const BAR_WIDTH: usize = 30;

/// Render a schedule as a table with one row per day and one column per hour
pub fn format_schedule_table(schedule: &Schedule) -> String {
    if schedule.is_empty() {
        return "(no days could be scheduled)\n".to_string();
    }

    let hours = schedule.max_day_len();
    let mut header = vec!["Day".to_string()];
    header.extend((1..=hours).map(|h| format!("Hour {}", h)));

    let rows: Vec<Vec<String>> = schedule
        .iter()
        .map(|(day, slots)| {
            let mut row = vec![day.to_string()];
            row.extend((0..hours).map(|h| slots.get(h).cloned().unwrap_or_default()));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].len())
                .chain(std::iter::once(header[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    push_row(&mut output, &header, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut output, &separator, &widths);
    for row in &rows {
        push_row(&mut output, row, &widths);
    }
    output
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(output, "| {} |", line.join(" | "));
}

/// Summary lines for the headline metrics
pub fn format_metrics(metrics: &ScheduleMetrics) -> String {
    format!(
        "Total Study Hours: {}\nSchedule Balance Score: {:.2} (higher is more balanced)\n",
        metrics.total_hours, metrics.balance_score
    )
}

/// Horizontal bar chart of hours per subject
pub fn format_hour_chart(metrics: &ScheduleMetrics) -> String {
    let max_hours = metrics
        .subject_hours
        .iter()
        .map(|(_, h)| *h)
        .max()
        .unwrap_or(0);
    let name_width = metrics
        .subject_hours
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (subject, hours) in &metrics.subject_hours {
        let bar_len = if max_hours == 0 {
            0
        } else {
            (hours * BAR_WIDTH).div_ceil(max_hours)
        };
        let _ = writeln!(
            output,
            "{:<name_width$} | {} {}",
            subject,
            "#".repeat(bar_len),
            hours,
            name_width = name_width
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::metrics::calculate_schedule_metrics;

    fn sample() -> Schedule {
        let mut schedule = Schedule::new();
        schedule.insert("Day 1", vec!["Math".into(), "Chemistry".into()]);
        schedule.insert("Day 2", vec!["Chemistry".into(), "Math".into()]);
        schedule
    }

    #[test]
    fn test_table_layout() {
        let table = format_schedule_table(&sample());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("| Day   | Hour 1"));
        assert!(lines[2].contains("Math      | Chemistry"));
        // All rows have the same width
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_empty_table() {
        assert!(format_schedule_table(&Schedule::new()).contains("no days"));
    }

    #[test]
    fn test_hour_chart() {
        let subjects = vec!["Math".to_string(), "Chemistry".to_string(), "Art".to_string()];
        let metrics = calculate_schedule_metrics(&sample(), &subjects);
        let chart = format_hour_chart(&metrics);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(&format!("{} 2", "#".repeat(BAR_WIDTH))));
        assert!(lines[2].ends_with("|  0"));
    }

    #[test]
    fn test_metrics_summary() {
        let metrics = calculate_schedule_metrics(&sample(), &["Math".to_string()]);
        let text = format_metrics(&metrics);
        assert!(text.contains("Total Study Hours: 4"));
    }
}
