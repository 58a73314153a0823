use crate::models::{HealthSummary, Insight, InsightKind};

fn insight(kind: InsightKind, message: &str) -> Insight {
    Insight {
        kind,
        message: message.to_string(),
    }
}

/// Map summary averages to qualitative judgments against fixed clinical
/// thresholds. Metrics without data in the window produce no entry.
/// Evaluation order: heart rate, blood pressure, SpO2, sleep, mood.
pub fn generate_insights(summary: &HealthSummary) -> Vec<Insight> {
    let mut insights = Vec::new();

    if summary.heart_rate.has_data() {
        insights.push(match summary.heart_rate.value {
            avg if avg > 100.0 => insight(
                InsightKind::Warning,
                "Your average heart rate is elevated. Consider consulting with a healthcare professional.",
            ),
            avg if avg < 60.0 => insight(
                InsightKind::Info,
                "Your average heart rate is on the lower side. This can be normal for physically active individuals.",
            ),
            _ => insight(
                InsightKind::Success,
                "Your average heart rate is within the normal range.",
            ),
        });
    }

    if summary.systolic.has_data() && summary.diastolic.has_data() {
        let (systolic, diastolic) = (summary.systolic.value, summary.diastolic.value);
        insights.push(if systolic >= 140.0 || diastolic >= 90.0 {
            insight(
                InsightKind::Warning,
                "Your average blood pressure readings indicate hypertension. Please consult with a healthcare provider.",
            )
        } else if systolic >= 120.0 || diastolic >= 80.0 {
            insight(
                InsightKind::Info,
                "Your average blood pressure readings indicate pre-hypertension. Consider lifestyle modifications.",
            )
        } else {
            insight(
                InsightKind::Success,
                "Your average blood pressure is within the normal range.",
            )
        });
    }

    if summary.spo2.has_data() {
        insights.push(if summary.spo2.value < 95.0 {
            insight(
                InsightKind::Warning,
                "Your average oxygen saturation is below the normal range. Consider consulting with a healthcare professional.",
            )
        } else {
            insight(
                InsightKind::Success,
                "Your average oxygen saturation is within the normal range.",
            )
        });
    }

    if summary.sleep_hours.has_data() {
        insights.push(match summary.sleep_hours.value {
            avg if avg < 7.0 => insight(
                InsightKind::Warning,
                "You are averaging less than 7 hours of sleep. Most adults need 7-9 hours for optimal health.",
            ),
            avg if avg > 9.0 => insight(
                InsightKind::Info,
                "You are averaging more than 9 hours of sleep. While this may be normal for some, excessive sleep can sometimes indicate health issues.",
            ),
            _ => insight(
                InsightKind::Success,
                "Your average sleep duration is within the recommended range of 7-9 hours.",
            ),
        });
    }

    if summary.mood.has_data() {
        insights.push(match summary.mood.value {
            avg if avg < 3.0 => insight(
                InsightKind::Warning,
                "Your average mood score is on the lower side. Consider activities that boost your mental wellbeing.",
            ),
            avg if avg >= 4.0 => insight(
                InsightKind::Success,
                "Your average mood score is positive. Keep up the good work!",
            ),
            _ => insight(
                InsightKind::Info,
                "Your average mood score is neutral. Consider incorporating more activities you enjoy.",
            ),
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricAverage;

    fn avg(value: f64) -> MetricAverage {
        MetricAverage { value, samples: 1 }
    }

    #[test]
    fn no_data_produces_no_insights() {
        let insights = generate_insights(&HealthSummary::default());
        assert!(insights.is_empty());
    }

    #[test]
    fn elevated_heart_rate_is_a_single_warning() {
        let summary = HealthSummary {
            heart_rate: avg(110.0),
            ..HealthSummary::default()
        };
        let insights = generate_insights(&summary);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].message.contains("heart rate is elevated"));
    }

    #[test]
    fn normal_heart_rate_is_a_success() {
        let summary = HealthSummary {
            heart_rate: avg(80.0),
            ..HealthSummary::default()
        };
        let insights = generate_insights(&summary);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Success);
    }

    #[test]
    fn low_heart_rate_is_informational() {
        let summary = HealthSummary {
            heart_rate: avg(55.0),
            ..HealthSummary::default()
        };
        let insights = generate_insights(&summary);
        assert_eq!(insights[0].kind, InsightKind::Info);
    }

    #[test]
    fn blood_pressure_tiers() {
        let tiers = [
            (145.0, 85.0, InsightKind::Warning),
            (130.0, 92.0, InsightKind::Warning),
            (125.0, 75.0, InsightKind::Info),
            (118.0, 82.0, InsightKind::Info),
            (115.0, 75.0, InsightKind::Success),
        ];
        for (systolic, diastolic, expected) in tiers {
            let summary = HealthSummary {
                systolic: avg(systolic),
                diastolic: avg(diastolic),
                ..HealthSummary::default()
            };
            let insights = generate_insights(&summary);
            assert_eq!(insights.len(), 1);
            assert_eq!(insights[0].kind, expected, "{systolic}/{diastolic}");
        }
    }

    #[test]
    fn spo2_below_95_warns() {
        let summary = HealthSummary {
            spo2: avg(93.0),
            ..HealthSummary::default()
        };
        assert_eq!(generate_insights(&summary)[0].kind, InsightKind::Warning);

        let summary = HealthSummary {
            spo2: avg(97.0),
            ..HealthSummary::default()
        };
        assert_eq!(generate_insights(&summary)[0].kind, InsightKind::Success);
    }

    #[test]
    fn sleep_bands() {
        for (hours, expected) in [
            (6.5, InsightKind::Warning),
            (8.0, InsightKind::Success),
            (9.5, InsightKind::Info),
        ] {
            let summary = HealthSummary {
                sleep_hours: avg(hours),
                ..HealthSummary::default()
            };
            assert_eq!(generate_insights(&summary)[0].kind, expected, "{hours}h");
        }
    }

    #[test]
    fn mood_bands() {
        for (mood, expected) in [
            (2.5, InsightKind::Warning),
            (3.5, InsightKind::Info),
            (4.2, InsightKind::Success),
        ] {
            let summary = HealthSummary {
                mood: avg(mood),
                ..HealthSummary::default()
            };
            assert_eq!(generate_insights(&summary)[0].kind, expected, "mood {mood}");
        }
    }

    #[test]
    fn evaluation_order_is_stable() {
        let summary = HealthSummary {
            heart_rate: avg(110.0),
            systolic: avg(145.0),
            diastolic: avg(95.0),
            spo2: avg(98.0),
            sleep_hours: avg(6.0),
            mood: avg(4.5),
            ..HealthSummary::default()
        };
        let kinds: Vec<_> = generate_insights(&summary)
            .iter()
            .map(|i| i.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                InsightKind::Warning,
                InsightKind::Warning,
                InsightKind::Success,
                InsightKind::Warning,
                InsightKind::Success,
            ]
        );
    }
}
