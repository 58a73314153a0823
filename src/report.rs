use std::fmt::Write;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::{ApiError, HealthApi};
use crate::models::{
    HealthReport, HealthSummary, Insight, Metric, TimeRange, Timestamped,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to fetch {metric} data for report generation")]
    Fetch {
        metric: Metric,
        #[source]
        source: ApiError,
    },
}

/// Build a consolidated, time-windowed view across all report metrics for
/// one user. All ten fetches run concurrently; `join!` waits for every
/// branch, and the per-metric failure policy is applied afterwards.
pub async fn build_report(
    api: &HealthApi,
    user_id: &str,
    range: TimeRange,
) -> Result<HealthReport, ReportError> {
    let end = Utc::now();
    let start = end - range.duration();
    tracing::debug!(%user_id, ?range, %start, %end, "building report");

    let (
        heart_rate,
        blood_pressure,
        spo2,
        temperature,
        weight,
        mood,
        sleep,
        mental_fatigue,
        anxiety,
        depression,
    ) = tokio::join!(
        api.heart_rate_history(user_id),
        api.blood_pressure_history(user_id),
        api.spo2_history(user_id),
        api.temperature_history(user_id),
        api.weight_history(user_id),
        api.mood_history(user_id),
        api.sleep_history(user_id),
        api.mental_fatigue_history(user_id),
        api.anxiety_history(user_id),
        api.depression_history(user_id),
    );

    Ok(HealthReport {
        start,
        end,
        heart_rate: window(required(Metric::HeartRate, heart_rate)?, start, end),
        blood_pressure: window(degraded(Metric::BloodPressure, blood_pressure), start, end),
        spo2: window(required(Metric::Spo2, spo2)?, start, end),
        temperature: window(required(Metric::Temperature, temperature)?, start, end),
        weight: window(required(Metric::Weight, weight)?, start, end),
        mood: window(degraded(Metric::Mood, mood), start, end),
        sleep: window(degraded(Metric::Sleep, sleep), start, end),
        mental_fatigue: window(required(Metric::MentalFatigue, mental_fatigue)?, start, end),
        anxiety: window(required(Metric::Anxiety, anxiety)?, start, end),
        depression: window(degraded(Metric::Depression, depression), start, end),
    })
}

fn required<T>(metric: Metric, result: Result<Vec<T>, ApiError>) -> Result<Vec<T>, ReportError> {
    result.map_err(|source| ReportError::Fetch { metric, source })
}

/// Metrics the aggregate view tolerates losing: a failed fetch degrades to
/// an empty list so one backend outage cannot sink the whole report.
fn degraded<T>(metric: Metric, result: Result<Vec<T>, ApiError>) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(%metric, error = %err, "metric fetch failed, reporting without it");
            Vec::new()
        }
    }
}

/// Keep records whose timestamp falls within `[start, end]` inclusive,
/// preserving server return order.
fn window<T: Timestamped>(records: Vec<T>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| {
            let at = record.recorded_at();
            at >= start && at <= end
        })
        .collect()
}

fn average_line(output: &mut String, label: &str, avg: crate::models::MetricAverage, unit: &str) {
    if avg.has_data() {
        let _ = writeln!(
            output,
            "- {}: {} {} (from {} readings)",
            label, avg.value, unit, avg.samples
        );
    }
}

/// Render the report as markdown, one section per concern.
pub fn render_markdown(
    user_id: &str,
    report: &HealthReport,
    summary: &HealthSummary,
    insights: &[Insight],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Health Report");
    let _ = writeln!(
        output,
        "Generated for user {} ({} to {})",
        user_id,
        report.start.format("%Y-%m-%d %H:%M"),
        report.end.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Averages");

    let has_any = summary.record_counts.values().any(|count| *count > 0);
    if !has_any {
        let _ = writeln!(output, "No readings recorded for this window.");
    } else {
        average_line(&mut output, "Heart rate", summary.heart_rate, "bpm");
        if summary.systolic.has_data() && summary.diastolic.has_data() {
            let _ = writeln!(
                output,
                "- Blood pressure: {}/{} mmHg (from {} readings)",
                summary.systolic.value, summary.diastolic.value, summary.systolic.samples
            );
        }
        average_line(&mut output, "Oxygen saturation", summary.spo2, "%");
        average_line(&mut output, "Temperature", summary.temperature, "deg");
        average_line(&mut output, "Weight", summary.weight, "kg");
        average_line(&mut output, "Sleep", summary.sleep_hours, "hours");
        average_line(&mut output, "Mood", summary.mood, "/ 5");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");

    if insights.is_empty() {
        let _ = writeln!(output, "Not enough data to generate insights.");
    } else {
        for item in insights {
            let _ = writeln!(output, "- [{}] {}", item.kind, item.message);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assessments");
    for (label, key) in [
        ("Anxiety (GAD-7)", "anxiety"),
        ("Depression (PHQ-9)", "depression"),
        ("Mental fatigue", "mental_fatigue"),
    ] {
        let count = summary.record_counts.get(key).copied().unwrap_or(0);
        let _ = writeln!(output, "- {}: {} assessments in window", label, count);
    }

    let mut notes = recent_notes(report);
    notes.sort_by(|a, b| b.0.cmp(&a.0));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Notes");

    if notes.is_empty() {
        let _ = writeln!(output, "No noted readings for this window.");
    } else {
        for (at, metric, note) in notes.iter().take(5) {
            let _ = writeln!(output, "- {} ({}): {}", at.format("%Y-%m-%d"), metric, note);
        }
    }

    output
}

fn recent_notes(report: &HealthReport) -> Vec<(DateTime<Utc>, Metric, String)> {
    let mut notes = Vec::new();

    macro_rules! collect_notes {
        ($list:expr, $metric:expr) => {
            for record in $list.iter().filter(|r| !r.notes.is_empty()) {
                notes.push(($crate::models::Timestamped::recorded_at(record), $metric, record.notes.clone()));
            }
        };
    }

    collect_notes!(report.heart_rate, Metric::HeartRate);
    collect_notes!(report.blood_pressure, Metric::BloodPressure);
    collect_notes!(report.spo2, Metric::Spo2);
    collect_notes!(report.temperature, Metric::Temperature);
    collect_notes!(report.weight, Metric::Weight);
    collect_notes!(report.mood, Metric::Mood);
    collect_notes!(report.sleep, Metric::Sleep);

    notes
}
