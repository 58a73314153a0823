use crate::models::{HealthReport, HealthSummary, MetricAverage};

fn mean<T>(records: &[T], value: impl Fn(&T) -> f64) -> (f64, usize) {
    if records.is_empty() {
        return (0.0, 0);
    }
    let total: f64 = records.iter().map(value).sum();
    (total / records.len() as f64, records.len())
}

/// Vital-sign averages are reported as whole numbers.
fn whole<T>(records: &[T], value: impl Fn(&T) -> f64) -> MetricAverage {
    let (avg, samples) = mean(records, value);
    MetricAverage {
        value: avg.round(),
        samples,
    }
}

fn one_decimal<T>(records: &[T], value: impl Fn(&T) -> f64) -> MetricAverage {
    let (avg, samples) = mean(records, value);
    MetricAverage {
        value: (avg * 10.0).round() / 10.0,
        samples,
    }
}

/// Reduce a report's record lists to per-metric averages and counts. An
/// empty list yields `value: 0.0, samples: 0`, never an error.
pub fn summarize(report: &HealthReport) -> HealthSummary {
    let mut summary = HealthSummary {
        heart_rate: whole(&report.heart_rate, |r| r.rate as f64),
        systolic: whole(&report.blood_pressure, |r| r.systolic as f64),
        diastolic: whole(&report.blood_pressure, |r| r.diastolic as f64),
        spo2: whole(&report.spo2, |r| r.oxygen_level as f64),
        sleep_hours: one_decimal(&report.sleep, |r| r.hours_slept),
        mood: one_decimal(&report.mood, |r| r.mood as f64),
        weight: one_decimal(&report.weight, |r| r.weight),
        temperature: one_decimal(&report.temperature, |r| r.temperature),
        ..HealthSummary::default()
    };

    let counts = [
        ("heart_rate", report.heart_rate.len()),
        ("blood_pressure", report.blood_pressure.len()),
        ("spo2", report.spo2.len()),
        ("temperature", report.temperature.len()),
        ("weight", report.weight.len()),
        ("mood", report.mood.len()),
        ("sleep", report.sleep.len()),
        ("mental_fatigue", report.mental_fatigue.len()),
        ("anxiety", report.anxiety.len()),
        ("depression", report.depression.len()),
    ];
    for (metric, count) in counts {
        summary.record_counts.insert(metric.to_string(), count);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HealthReport, HeartRateRecord, MoodRecord, SleepRecord};
    use chrono::{Duration, Utc};

    fn report_fixture() -> HealthReport {
        let end = Utc::now();
        HealthReport::empty(end - Duration::days(7), end)
    }

    fn heart_rate(rate: i64) -> HeartRateRecord {
        HeartRateRecord {
            rate,
            notes: String::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn empty_report_averages_to_zero_with_zero_counts() {
        let summary = summarize(&report_fixture());
        assert_eq!(summary.heart_rate.value, 0.0);
        assert_eq!(summary.heart_rate.samples, 0);
        assert!(!summary.heart_rate.has_data());
        assert_eq!(summary.record_counts["heart_rate"], 0);
        assert_eq!(summary.record_counts.len(), 10);
    }

    #[test]
    fn heart_rate_average_rounds_to_nearest_integer() {
        let mut report = report_fixture();
        report.heart_rate = vec![heart_rate(60), heart_rate(100)];
        let summary = summarize(&report);
        assert_eq!(summary.heart_rate.value, 80.0);
        assert_eq!(summary.heart_rate.samples, 2);

        // 60 + 100 + 63 = 223; 223 / 3 = 74.33 -> 74
        report.heart_rate.push(heart_rate(63));
        let summary = summarize(&report);
        assert_eq!(summary.heart_rate.value, 74.0);
    }

    #[test]
    fn sleep_and_mood_round_to_one_decimal() {
        let mut report = report_fixture();
        report.sleep = vec![
            SleepRecord {
                hours_slept: 7.25,
                sleep_score: Some(80),
                notes: String::new(),
                recorded_at: Utc::now(),
            },
            SleepRecord {
                hours_slept: 8.0,
                sleep_score: Some(85),
                notes: String::new(),
                recorded_at: Utc::now(),
            },
        ];
        report.mood = vec![
            MoodRecord {
                mood: 3,
                mood_label: String::new(),
                notes: String::new(),
                recorded_at: Utc::now(),
            },
            MoodRecord {
                mood: 4,
                mood_label: String::new(),
                notes: String::new(),
                recorded_at: Utc::now(),
            },
        ];

        let summary = summarize(&report);
        assert_eq!(summary.sleep_hours.value, 7.6);
        assert_eq!(summary.mood.value, 3.5);
    }

    #[test]
    fn counts_cover_every_report_list() {
        let mut report = report_fixture();
        report.heart_rate = vec![heart_rate(72)];
        let summary = summarize(&report);
        assert_eq!(summary.record_counts["heart_rate"], 1);
        assert_eq!(summary.record_counts["depression"], 0);
    }
}
