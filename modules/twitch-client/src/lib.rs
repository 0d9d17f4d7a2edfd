pub mod error;
pub mod types;

pub use error::{Result, TwitchError};
pub use types::{
    ChannelEditor, ChannelFollower, ChannelInformation, ChannelVip, ChatSettings, Clip, DateRange,
    Emote, EmoteImages, FollowedChannel, Game, GameAnalytics, HelixResponse, Pagination, Poll,
    PollChoice, TwitchTokens, User,
};

use std::time::Duration;

use serde::de::DeserializeOwned;

const ID_BASE_URL: &str = "https://id.twitch.tv";
const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Scopes requested on the authorization page.
pub const SCOPES: &[&str] = &[
    "analytics:read:games",
    "channel:read:editors",
    "channel:read:goals",
    "channel:read:vips",
    "channel:read:polls",
    "moderator:read:followers",
    "user:read:follows",
];

#[derive(Debug, Clone)]
pub struct TwitchCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

pub struct TwitchClient {
    client: reqwest::Client,
    credentials: TwitchCredentials,
    id_base_url: String,
    helix_base_url: String,
}

impl TwitchClient {
    pub fn new(credentials: TwitchCredentials) -> Result<Self> {
        Self::with_base_urls(credentials, ID_BASE_URL, HELIX_BASE_URL)
    }

    /// Point the client at other hosts (a mock server, a proxy).
    pub fn with_base_urls(
        credentials: TwitchCredentials,
        id_base_url: &str,
        helix_base_url: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            credentials,
            id_base_url: id_base_url.trim_end_matches('/').to_string(),
            helix_base_url: helix_base_url.trim_end_matches('/').to_string(),
        })
    }

    // --- OAuth ---

    /// URL the user opens to grant access. Twitch redirects back to
    /// `redirect_uri` with `?code=...`.
    pub fn authorize_url(&self) -> Result<String> {
        let scope = SCOPES.join(" ");
        let url = url::Url::parse_with_params(
            &format!("{}/oauth2/authorize", self.id_base_url),
            &[
                ("response_type", "code"),
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| TwitchError::Parse(e.to_string()))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<TwitchTokens> {
        tracing::info!("Exchanging Twitch authorization code");
        self.token_request(&[
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ])
        .await
    }

    /// Trade a refresh token for a fresh token set.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TwitchTokens> {
        tracing::info!("Refreshing Twitch access token");
        self.token_request(&[
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TwitchTokens> {
        let url = format!("{}/oauth2/token", self.id_base_url);
        let resp = self.client.post(&url).form(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    // --- Helix ---

    async fn helix<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<HelixResponse<T>> {
        let url = format!("{}/{}", self.helix_base_url, path);
        let query: Vec<(&str, &str)> = query
            .iter()
            .copied()
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let resp = self
            .client
            .get(&url)
            .header("Client-Id", &self.credentials.client_id)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), "Helix request failed");
            return Err(TwitchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: HelixResponse<T> = serde_json::from_str(&body)?;
        tracing::debug!(path, count = parsed.data.len(), "Helix response");
        Ok(parsed)
    }

    /// The user the token belongs to.
    pub async fn user(&self, token: &str) -> Result<HelixResponse<User>> {
        self.helix("users", token, &[]).await
    }

    pub async fn games(
        &self,
        token: &str,
        id: &str,
        name: &str,
        igdb_id: &str,
    ) -> Result<HelixResponse<Game>> {
        self.helix("games", token, &[("id", id), ("name", name), ("igdb_id", igdb_id)])
            .await
    }

    pub async fn top_games(&self, token: &str) -> Result<HelixResponse<Game>> {
        self.helix("games/top", token, &[]).await
    }

    pub async fn game_analytics(
        &self,
        token: &str,
        game_id: &str,
    ) -> Result<HelixResponse<GameAnalytics>> {
        self.helix("analytics/games", token, &[("game_id", game_id)])
            .await
    }

    pub async fn channel_information(
        &self,
        token: &str,
        broadcaster_id: &str,
    ) -> Result<HelixResponse<ChannelInformation>> {
        self.helix("channels", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn channel_editors(
        &self,
        token: &str,
        broadcaster_id: &str,
    ) -> Result<HelixResponse<ChannelEditor>> {
        self.helix("channels/editors", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn followed_channels(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<HelixResponse<FollowedChannel>> {
        self.helix("channels/followed", token, &[("user_id", user_id)])
            .await
    }

    pub async fn channel_followers(
        &self,
        token: &str,
        broadcaster_id: &str,
    ) -> Result<HelixResponse<ChannelFollower>> {
        self.helix("channels/followers", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn channel_emotes(
        &self,
        token: &str,
        broadcaster_id: &str,
    ) -> Result<HelixResponse<Emote>> {
        self.helix("chat/emotes", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn global_emotes(&self, token: &str) -> Result<HelixResponse<Emote>> {
        self.helix("chat/emotes/global", token, &[]).await
    }

    pub async fn chat_settings(
        &self,
        token: &str,
        broadcaster_id: &str,
    ) -> Result<HelixResponse<ChatSettings>> {
        self.helix("chat/settings", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn clips(&self, token: &str, broadcaster_id: &str) -> Result<HelixResponse<Clip>> {
        self.helix("clips", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn channel_vips(
        &self,
        token: &str,
        broadcaster_id: &str,
    ) -> Result<HelixResponse<ChannelVip>> {
        self.helix("channels/vips", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }

    pub async fn polls(&self, token: &str, broadcaster_id: &str) -> Result<HelixResponse<Poll>> {
        self.helix("polls", token, &[("broadcaster_id", broadcaster_id)])
            .await
    }
}
