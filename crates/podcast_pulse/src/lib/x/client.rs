use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::Error,
    types::{SearchResponse, SourcePost},
    x::PostSearcher,
};

/// X (Twitter) v2 recent search
pub struct XClient {
    client: Client,
    bearer_token: Option<SecretString>,
    base_url: String,
}

impl XClient {
    pub const SEARCH_QUERY: &str = r#"from:jposhaughnessy "two thoughts from""#;
    const MAX_RESULTS: u8 = 10;
    const LOOKBACK_HOURS: i64 = 24;

    pub fn new(bearer_token: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            bearer_token,
            base_url: "https://api.x.com".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub(crate) fn search_params(now: DateTime<Utc>) -> [(&'static str, String); 4] {
        let start_time = now - Duration::hours(Self::LOOKBACK_HOURS);
        [
            ("query", Self::SEARCH_QUERY.to_string()),
            (
                "start_time",
                start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("tweet.fields", "created_at,text".to_string()),
            ("max_results", Self::MAX_RESULTS.to_string()),
        ]
    }
}

impl PostSearcher for XClient {
    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn latest_post(&self) -> Result<Option<SourcePost>, Self::Error> {
        let token = self
            .bearer_token
            .as_ref()
            .ok_or(Error::MissingConfig("X_BEARER_TOKEN"))?;

        let resp = self
            .client
            .get(format!("{}/2/tweets/search/recent", self.base_url))
            .query(&Self::search_params(Utc::now()))
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        tracing::debug!(url = %resp.url(), status = %resp.status(), "Search response");

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        let search = resp.json::<SearchResponse>().await?;
        tracing::info!(
            result_count = search.meta.as_ref().map(|m| m.result_count).unwrap_or_default(),
            "Search complete"
        );

        Ok(search.into_latest())
    }
}
