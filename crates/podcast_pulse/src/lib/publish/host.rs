//! Podcast hosting client.
//!
//! Publishing is a dependent three call sequence: authenticate, upload the
//! media file, create a scheduled episode referencing the media. Every call
//! that needs a bearer token authenticates again first; tokens are never
//! reused between calls.

use std::path::Path;

use chrono::{DateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{multipart, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{error::Error, Publisher};
use podcast_status::{PublishOutcome, PublishStage};

const SHOW_NOTES: &str = "Two short ideas from a great thinker, unpacked in a few minutes. \
New episodes every morning.";

#[derive(Debug, Clone)]
pub struct HostCredentials {
    pub api_url: Option<String>,
    pub user_id: Option<String>,
    pub api_token: Option<SecretString>,
}

pub struct HostClient {
    client: Client,
    credentials: HostCredentials,
    show_id: String,
    timezone: Tz,
    publish_hour: u32,
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    user_id: &'a str,
    api_token: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    media_id: Option<String>,
}

#[derive(Serialize)]
struct EpisodeRequest<'a> {
    title: String,
    description: &'a str,
    media_id: &'a str,
    publish_at: String,
    status: &'a str,
}

#[derive(Deserialize)]
struct EpisodeResponse {
    id: String,
}

impl HostClient {
    pub fn new(credentials: HostCredentials, show_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            credentials,
            show_id: show_id.into(),
            timezone: chrono_tz::America::New_York,
            publish_hour: 6,
        }
    }

    pub fn with_schedule(mut self, timezone: Tz, publish_hour: u32) -> Self {
        self.timezone = timezone;
        self.publish_hour = publish_hour;
        self
    }

    fn api_url(&self) -> Result<&str, Error> {
        self.credentials
            .api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/'))
            .ok_or(Error::MissingConfig("PODCAST_API_URL"))
    }

    #[tracing::instrument(skip(self))]
    async fn authenticate(&self) -> Result<String, Error> {
        let user_id = self
            .credentials
            .user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(Error::MissingConfig("PODCAST_USER_ID"))?;
        let api_token = self
            .credentials
            .api_token
            .as_ref()
            .filter(|token| !token.expose_secret().trim().is_empty())
            .ok_or(Error::MissingConfig("PODCAST_API_TOKEN"))?;

        let resp = self
            .client
            .post(format!("{}/auth/token", self.api_url()?))
            .json(&AuthRequest {
                user_id,
                api_token: api_token.expose_secret(),
            })
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        Ok(resp.json::<AuthResponse>().await?.access_token)
    }

    #[tracing::instrument(skip(self, token))]
    async fn upload_media(&self, token: &str, audio_path: &Path) -> Result<String, Error> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("episode.mp3")
            .to_string();
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(format!("{}/media", self.api_url()?))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to upload media"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        match resp.json::<UploadResponse>().await? {
            UploadResponse {
                success: true,
                media_id: Some(media_id),
            } => Ok(media_id),
            _ => Err(Error::UnexpectedResponse(
                "Upload response is missing its success indicator".into(),
            )),
        }
    }

    #[tracing::instrument(skip(self, token))]
    async fn create_episode(
        &self,
        token: &str,
        media_id: &str,
        subject: &str,
    ) -> Result<String, Error> {
        let body = EpisodeRequest {
            title: episode_title(subject),
            description: SHOW_NOTES,
            media_id,
            publish_at: scheduled_publish_time(Utc::now(), self.timezone, self.publish_hour)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            status: "scheduled",
        };

        let resp = self
            .client
            .post(format!(
                "{}/shows/{}/episodes",
                self.api_url()?,
                self.show_id
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to create episode"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        Ok(resp.json::<EpisodeResponse>().await?.id)
    }
}

pub fn episode_title(subject: &str) -> String {
    format!("Two Thoughts from {subject}")
}

/// Today (in `timezone`) at `hour`:00, as a UTC instant
pub fn scheduled_publish_time(now: DateTime<Utc>, timezone: Tz, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let local_date = now.with_timezone(&timezone).date_naive();
    let naive = local_date.and_time(time);

    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // skipped by a DST transition
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Where a publish attempt stopped, and with what
struct PublishFailure {
    stage: PublishStage,
    error: Error,
    media_id: Option<String>,
}

fn failed_at(stage: PublishStage, media_id: Option<&str>) -> impl FnOnce(Error) -> PublishFailure {
    let media_id = media_id.map(str::to_string);
    move |error| PublishFailure {
        stage,
        error,
        media_id,
    }
}

impl HostClient {
    async fn try_publish(
        &self,
        audio_path: &Path,
        subject: &str,
    ) -> Result<(String, String), PublishFailure> {
        let token = self
            .authenticate()
            .await
            .map_err(failed_at(PublishStage::Authenticate, None))?;
        let media_id = self
            .upload_media(&token, audio_path)
            .await
            .map_err(failed_at(PublishStage::Upload, None))?;

        let token = self
            .authenticate()
            .await
            .map_err(failed_at(PublishStage::Authenticate, Some(&media_id)))?;
        let episode_id = self
            .create_episode(&token, &media_id, subject)
            .await
            .map_err(failed_at(PublishStage::CreateEpisode, Some(&media_id)))?;

        Ok((media_id, episode_id))
    }
}

impl Publisher for HostClient {
    #[tracing::instrument(skip(self), fields(show_id = %self.show_id))]
    async fn publish(&self, audio_path: &Path, subject: &str) -> PublishOutcome {
        match self.try_publish(audio_path, subject).await {
            Ok((media_id, episode_id)) => {
                tracing::info!(%media_id, %episode_id, "Episode published");
                PublishOutcome::Published {
                    media_id,
                    episode_id,
                }
            }
            Err(PublishFailure {
                stage,
                error,
                media_id,
            }) => {
                tracing::error!(error = %error, ?stage, ?media_id, "Publishing failed");
                PublishOutcome::Failed {
                    stage,
                    error: error.to_string(),
                    media_id,
                }
            }
        }
    }
}
