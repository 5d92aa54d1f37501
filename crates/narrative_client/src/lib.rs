//! Narrative backend client.
//!
//! Asynchronous text-to-time-series lookup against the dashboard backend:
//! one endpoint resolves a search text to a weight series, another serves
//! the reference price series for a symbol.

use common::{Error, PriceSeries, WeightSeries};
use tracing::debug;

/// Cap carried into error messages from backend response bodies.
const MAX_ERROR_BODY: usize = 500;

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
fn truncate_body(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Backend API client with connection pooling and request timeout.
#[derive(Debug, Clone)]
pub struct NarrativeClient {
    client: reqwest::Client,
    base_url: String,
}

impl NarrativeClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("narrative-dash/0.1")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build backend HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a search text to its weight series.
    ///
    /// A 404 means the backend has no result for this text; the caller
    /// treats that the same as any other failure (entry goes to error).
    pub async fn text_series(&self, text: &str) -> Result<WeightSeries, Error> {
        let url = format!("{}/api/time-series", self.base_url);
        debug!("Fetching weight series for {:?}", text);

        let resp = self
            .client
            .get(&url)
            .query(&[("text", text)])
            .send()
            .await
            .map_err(|e| Error::Http(format!("time-series request for {text:?}: {e}")))?;

        let status = resp.status().as_u16();
        if status == 404 {
            return Err(Error::NoResult(text.to_string()));
        }
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status,
                message: truncate_body(&body, MAX_ERROR_BODY).to_string(),
            });
        }

        let series: WeightSeries = resp
            .json()
            .await
            .map_err(|e| Error::Http(format!("time-series parse for {text:?}: {e}")))?;

        debug!("Got {} weight points for {:?}", series.points.len(), text);
        Ok(series)
    }

    /// Fetch the reference price series for a symbol.
    pub async fn price_series(&self, symbol: &str) -> Result<PriceSeries, Error> {
        let url = format!("{}/api/price", self.base_url);
        debug!("Fetching price series for {}", symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| Error::Http(format!("price request for {symbol}: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status,
                message: truncate_body(&body, MAX_ERROR_BODY).to_string(),
            });
        }

        let series: PriceSeries = resp
            .json()
            .await
            .map_err(|e| Error::Http(format!("price parse for {symbol}: {e}")))?;

        debug!("Got {} price points for {}", series.points.len(), symbol);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::{truncate_body, MAX_ERROR_BODY};
    use common::{PriceSeries, WeightSeries};

    #[test]
    fn weight_series_deserializes_from_wire_shape() {
        let json = r#"{
            "from": "2023-05-01T00:00:00Z",
            "statistics": {
                "mean_prevalence": 0.42,
                "peak_prevalence": 0.9,
                "mean_sentiment": -0.05,
                "document_count": 1200
            },
            "points": [
                {"tstamp": "2023-05-01T00:00:00Z", "prevalence": 0.4, "sentiment": 0.1},
                {
                    "tstamp": "2023-05-02T00:00:00Z",
                    "prevalence": 0.9,
                    "sentiment": -0.3,
                    "significant": {"title": "Launch", "url": "https://example.com/a"}
                }
            ]
        }"#;

        let series: WeightSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.points.len(), 2);
        assert!(series.points[0].significant.is_none());
        assert_eq!(
            series.points[1].significant.as_ref().map(|s| s.title.as_str()),
            Some("Launch")
        );
        assert_eq!(series.statistics.unwrap().document_count, 1200);
    }

    #[test]
    fn error_body_truncates_at_a_char_boundary() {
        // A multi-byte char straddling the cap must not split the slice.
        let mut body = "x".repeat(MAX_ERROR_BODY - 1);
        body.push('é');
        let cut = truncate_body(&body, MAX_ERROR_BODY);
        assert_eq!(cut.len(), MAX_ERROR_BODY - 1);
        assert!(cut.chars().all(|c| c == 'x'));

        let short = "not found";
        assert_eq!(truncate_body(short, MAX_ERROR_BODY), short);
    }

    #[test]
    fn price_series_tolerates_missing_points() {
        let series: PriceSeries =
            serde_json::from_str(r#"{"from": "2023-05-01T00:00:00Z"}"#).unwrap();
        assert!(series.points.is_empty());
    }
}
