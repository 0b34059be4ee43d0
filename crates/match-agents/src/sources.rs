//! HTTP clients for the enrichment providers: thin GETs against the
//! code-portfolio analysis service and the job-market service. All
//! failures surface as `SourceError::Unavailable`; the gateway turns
//! those into staleness, never into pipeline errors.

use std::time::Duration;

use async_trait::async_trait;

use tribunal::{ContextSource, SourceError, CODE_PORTFOLIO_SOURCE, JOB_MARKET_SOURCE};

fn build_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Unavailable(e.to_string()))
}

async fn get_json(
    http: &reqwest::Client,
    url: &str,
) -> Result<serde_json::Value, SourceError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;
    if !response.status().is_success() {
        return Err(SourceError::Unavailable(format!(
            "status {}",
            response.status()
        )));
    }
    response
        .json()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))
}

/// Code-portfolio analysis service; subjects are portfolio handles.
pub struct PortfolioContextSource {
    http: reqwest::Client,
    base_url: String,
}

impl PortfolioContextSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContextSource for PortfolioContextSource {
    fn id(&self) -> &str {
        CODE_PORTFOLIO_SOURCE
    }

    async fn fetch(&self, subject: &str) -> Result<serde_json::Value, SourceError> {
        get_json(&self.http, &format!("{}/profile/{subject}", self.base_url)).await
    }
}

/// Job-market data service; subjects are role titles.
pub struct JobMarketSource {
    http: reqwest::Client,
    base_url: String,
}

impl JobMarketSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContextSource for JobMarketSource {
    fn id(&self) -> &str {
        JOB_MARKET_SOURCE
    }

    async fn fetch(&self, subject: &str) -> Result<serde_json::Value, SourceError> {
        let url = format!("{}/trends?role={}", self.base_url, urlencode(subject));
        get_json(&self.http, &url).await
    }
}

/// Minimal percent-encoding for the role query parameter.
fn urlencode(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c.to_string()
            } else if c == ' ' {
                "+".to_string()
            } else {
                c.to_string()
                    .bytes()
                    .map(|b| format!("%{b:02X}"))
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("Backend Engineer"), "Backend+Engineer");
        assert_eq!(urlencode("C++/Go"), "C%2B%2B%2FGo");
        assert_eq!(urlencode("plain-role_1.0"), "plain-role_1.0");
    }

    #[test]
    fn test_source_ids() {
        let portfolio =
            PortfolioContextSource::new("http://localhost:8001/", Duration::from_secs(1)).unwrap();
        assert_eq!(portfolio.id(), CODE_PORTFOLIO_SOURCE);
        assert_eq!(portfolio.base_url, "http://localhost:8001");

        let market =
            JobMarketSource::new("http://localhost:8002", Duration::from_secs(1)).unwrap();
        assert_eq!(market.id(), JOB_MARKET_SOURCE);
    }
}
