use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{
    AnxietyRecord, BloodPressureRecord, DepressionRecord, HeartRateRecord, MentalFatigueRecord,
    Metric, MoodRecord, RespiratoryRateRecord, SleepRecord, SpO2Record, TemperatureRecord,
    WeightRecord,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAY: Duration = Duration::from_secs(1);
/// Extra attempts after the first failed one.
const RETRY_ATTEMPTS: usize = 2;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Parse(serde_json::Error),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// The backend returns histories in three shapes: a bare array,
/// `{"records": [...]}`, and `{"success": ..., "records": [...]}`. The
/// untagged decode collapses all of them into one record list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryPayload<T> {
    Bare(Vec<T>),
    Wrapped { records: Vec<T> },
}

impl<T> HistoryPayload<T> {
    fn into_records(self) -> Vec<T> {
        match self {
            HistoryPayload::Bare(records) => records,
            HistoryPayload::Wrapped { records } => records,
        }
    }
}

/// Retry `op` up to `extra_attempts` additional times, sleeping `delay`
/// between attempts. Only failures accepted by `retryable` are retried;
/// everything else propagates immediately.
pub async fn retry_with_backoff<T, E, F, Fut>(
    extra_attempts: usize,
    delay: Duration,
    retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut remaining = extra_attempts;
    loop {
        match op().await {
            Err(err) if remaining > 0 && retryable(&err) => {
                remaining -= 1;
                tracing::debug!(remaining, "transient failure, retrying");
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

/// Client for the health metrics REST API. One resource per metric:
/// `POST/GET <base>/health/<metric>/<user_id>/`.
pub struct HealthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HealthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Transport)?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, metric: Metric, user_id: &str) -> String {
        format!("{}/health/{}/{}/", self.base_url, metric.path(), user_id)
    }

    /// Automatic retries are limited to the PHQ-9 endpoints; every other
    /// metric surfaces its first failure.
    fn extra_attempts(metric: Metric) -> usize {
        match metric {
            Metric::Depression => RETRY_ATTEMPTS,
            _ => 0,
        }
    }

    /// Save one reading. The payload's field set is metric-specific and
    /// validated upstream by the caller, not here.
    pub async fn save(
        &self,
        metric: Metric,
        user_id: &str,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        retry_with_backoff(
            Self::extra_attempts(metric),
            RETRY_DELAY,
            ApiError::is_transport,
            || self.save_once(metric, user_id, payload),
        )
        .await
    }

    async fn save_once(
        &self,
        metric: Metric,
        user_id: &str,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(metric, user_id);
        tracing::debug!(%metric, %url, "saving record");
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(ApiError::Transport)?;
        // Some endpoints reply 200 with an empty or non-JSON body.
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) => Ok(json!({ "success": true })),
        }
    }

    /// Fetch all records of one metric for one user, normalized to a list.
    pub async fn fetch_history<T: DeserializeOwned>(
        &self,
        metric: Metric,
        user_id: &str,
    ) -> Result<Vec<T>, ApiError> {
        retry_with_backoff(
            Self::extra_attempts(metric),
            RETRY_DELAY,
            ApiError::is_transport,
            || self.fetch_history_once(metric, user_id),
        )
        .await
    }

    async fn fetch_history_once<T: DeserializeOwned>(
        &self,
        metric: Metric,
        user_id: &str,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.endpoint(metric, user_id);
        tracing::debug!(%metric, %url, "fetching history");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(ApiError::Transport)?;
        let payload: HistoryPayload<T> = serde_json::from_str(&body).map_err(ApiError::Parse)?;
        Ok(payload.into_records())
    }

    /// History as raw JSON values, for untyped listing.
    pub async fn history_raw(&self, metric: Metric, user_id: &str) -> Result<Vec<Value>, ApiError> {
        self.fetch_history(metric, user_id).await
    }

    pub async fn heart_rate_history(&self, user_id: &str) -> Result<Vec<HeartRateRecord>, ApiError> {
        self.fetch_history(Metric::HeartRate, user_id).await
    }

    pub async fn blood_pressure_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<BloodPressureRecord>, ApiError> {
        self.fetch_history(Metric::BloodPressure, user_id).await
    }

    pub async fn spo2_history(&self, user_id: &str) -> Result<Vec<SpO2Record>, ApiError> {
        self.fetch_history(Metric::Spo2, user_id).await
    }

    pub async fn respiratory_rate_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<RespiratoryRateRecord>, ApiError> {
        self.fetch_history(Metric::RespiratoryRate, user_id).await
    }

    pub async fn temperature_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<TemperatureRecord>, ApiError> {
        self.fetch_history(Metric::Temperature, user_id).await
    }

    pub async fn weight_history(&self, user_id: &str) -> Result<Vec<WeightRecord>, ApiError> {
        self.fetch_history(Metric::Weight, user_id).await
    }

    pub async fn mood_history(&self, user_id: &str) -> Result<Vec<MoodRecord>, ApiError> {
        self.fetch_history(Metric::Mood, user_id).await
    }

    pub async fn anxiety_history(&self, user_id: &str) -> Result<Vec<AnxietyRecord>, ApiError> {
        self.fetch_history(Metric::Anxiety, user_id).await
    }

    pub async fn depression_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<DepressionRecord>, ApiError> {
        self.fetch_history(Metric::Depression, user_id).await
    }

    pub async fn sleep_history(&self, user_id: &str) -> Result<Vec<SleepRecord>, ApiError> {
        self.fetch_history(Metric::Sleep, user_id).await
    }

    pub async fn mental_fatigue_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<MentalFatigueRecord>, ApiError> {
        self.fetch_history(Metric::MentalFatigue, user_id).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    // Error bodies are expected as `{"error": "..."}`; anything else gets a
    // placeholder derived from the status code.
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Status code {}", status.as_u16()),
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
