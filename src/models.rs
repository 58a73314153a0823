use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// One tracked health measurement category, with its wire path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    HeartRate,
    BloodPressure,
    Spo2,
    RespiratoryRate,
    Temperature,
    Weight,
    Mood,
    Anxiety,
    Depression,
    Sleep,
    MentalFatigue,
}

impl Metric {
    pub fn path(&self) -> &'static str {
        match self {
            Metric::HeartRate => "heart-rate",
            Metric::BloodPressure => "blood-pressure",
            Metric::Spo2 => "spo2",
            Metric::RespiratoryRate => "respiratory-rate",
            Metric::Temperature => "temperature",
            Metric::Weight => "weight",
            Metric::Mood => "mood",
            Metric::Anxiety => "anxiety",
            Metric::Depression => "depression",
            Metric::Sleep => "sleep",
            Metric::MentalFatigue => "mental-fatigue",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Named report window. The window length is fixed per keyword, so an
/// unknown keyword is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    #[value(name = "24hours")]
    Last24Hours,
    Weekly,
    Monthly,
    #[value(name = "3months")]
    ThreeMonths,
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match self {
            TimeRange::Last24Hours => "24hours",
            TimeRange::Weekly => "weekly",
            TimeRange::Monthly => "monthly",
            TimeRange::ThreeMonths => "3months",
        };
        f.write_str(keyword)
    }
}

impl TimeRange {
    pub fn duration(&self) -> chrono::Duration {
        match self {
            TimeRange::Last24Hours => chrono::Duration::days(1),
            TimeRange::Weekly => chrono::Duration::days(7),
            TimeRange::Monthly => chrono::Duration::days(30),
            TimeRange::ThreeMonths => chrono::Duration::days(90),
        }
    }
}

/// Parse a backend timestamp. The API emits RFC 3339 for some metrics and
/// offset-less `isoformat()` strings for others; both normalize to UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub trait Timestamped {
    fn recorded_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_timestamped {
    ($($record:ty),+ $(,)?) => {
        $(impl Timestamped for $record {
            fn recorded_at(&self) -> DateTime<Utc> {
                self.recorded_at
            }
        })+
    };
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateRecord {
    pub rate: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BloodPressureRecord {
    pub systolic: i64,
    pub diastolic: i64,
    #[serde(default)]
    pub pulse: Option<i64>,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpO2Record {
    pub oxygen_level: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespiratoryRateRecord {
    pub rate: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureRecord {
    pub temperature: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightRecord {
    pub weight: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoodRecord {
    /// 1-5 scale.
    pub mood: i64,
    #[serde(default)]
    pub mood_label: String,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// GAD-7 assessment result.
#[derive(Debug, Clone, Deserialize)]
pub struct AnxietyRecord {
    pub score: i64,
    #[serde(default)]
    pub level: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// PHQ-9 assessment result.
#[derive(Debug, Clone, Deserialize)]
pub struct DepressionRecord {
    pub score: i64,
    #[serde(default)]
    pub level: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleepRecord {
    pub hours_slept: f64,
    #[serde(default)]
    pub sleep_score: Option<i64>,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentalFatigueRecord {
    pub fatigue_score: i64,
    #[serde(default)]
    pub level: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

impl_timestamped!(
    HeartRateRecord,
    BloodPressureRecord,
    SpO2Record,
    RespiratoryRateRecord,
    TemperatureRecord,
    WeightRecord,
    MoodRecord,
    AnxietyRecord,
    DepressionRecord,
    SleepRecord,
    MentalFatigueRecord,
);

/// Time-windowed view across all report metrics for one user. Record order
/// is the server's return order; nothing is re-sorted here.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub heart_rate: Vec<HeartRateRecord>,
    pub blood_pressure: Vec<BloodPressureRecord>,
    pub spo2: Vec<SpO2Record>,
    pub temperature: Vec<TemperatureRecord>,
    pub weight: Vec<WeightRecord>,
    pub mood: Vec<MoodRecord>,
    pub sleep: Vec<SleepRecord>,
    pub mental_fatigue: Vec<MentalFatigueRecord>,
    pub anxiety: Vec<AnxietyRecord>,
    pub depression: Vec<DepressionRecord>,
}

impl HealthReport {
    pub fn empty(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            heart_rate: Vec::new(),
            blood_pressure: Vec::new(),
            spo2: Vec::new(),
            temperature: Vec::new(),
            weight: Vec::new(),
            mood: Vec::new(),
            sleep: Vec::new(),
            mental_fatigue: Vec::new(),
            anxiety: Vec::new(),
            depression: Vec::new(),
        }
    }
}

/// Average of one summarized field. `value` is 0.0 when no records fell in
/// the window; check `has_data` before treating it as a real reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricAverage {
    pub value: f64,
    pub samples: usize,
}

impl MetricAverage {
    pub fn has_data(&self) -> bool {
        self.samples > 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthSummary {
    pub heart_rate: MetricAverage,
    pub systolic: MetricAverage,
    pub diastolic: MetricAverage,
    pub spo2: MetricAverage,
    pub sleep_hours: MetricAverage,
    pub mood: MetricAverage,
    pub weight: MetricAverage,
    pub temperature: MetricAverage,
    pub record_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Info,
    Success,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::Warning => write!(f, "warning"),
            InsightKind::Info => write!(f, "info"),
            InsightKind::Success => write!(f, "success"),
        }
    }
}

/// Qualitative judgment derived from an averaged metric.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_timestamps() {
        let parsed = parse_timestamp("2026-02-01T08:30:00+00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn parses_naive_isoformat_timestamps() {
        let parsed = parse_timestamp("2026-02-01T08:30:00.123456").unwrap();
        assert_eq!(
            parsed.date_naive(),
            chrono::NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("last tuesday").is_err());
    }

    #[test]
    fn time_range_durations_match_keywords() {
        assert_eq!(TimeRange::Last24Hours.duration(), chrono::Duration::days(1));
        assert_eq!(TimeRange::Weekly.duration(), chrono::Duration::days(7));
        assert_eq!(TimeRange::Monthly.duration(), chrono::Duration::days(30));
        assert_eq!(TimeRange::ThreeMonths.duration(), chrono::Duration::days(90));
    }

    #[test]
    fn record_tolerates_unknown_and_missing_optional_fields() {
        let raw = r#"{
            "id": "65f0",
            "user_id": "12",
            "service_type": "heart_rate",
            "rate": 72,
            "status": "normal",
            "recorded_at": "2026-02-01T08:30:00"
        }"#;
        let record: HeartRateRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.rate, 72);
        assert_eq!(record.notes, "");
    }

    #[test]
    fn metric_paths_are_wire_segments() {
        assert_eq!(Metric::HeartRate.path(), "heart-rate");
        assert_eq!(Metric::Spo2.path(), "spo2");
        assert_eq!(Metric::MentalFatigue.path(), "mental-fatigue");
    }
}
