//! The two upstreams as trait objects, so handlers can run against mocks.

use async_trait::async_trait;
use lamoda_client::{LamodaClient, SneakerCard, SneakerDetail, SneakerLink};
use serde::Serialize;
use tapline_common::routes::twitch as routes;
use tapline_common::TopicRoute;
use twitch_client::{HelixResponse, TwitchClient, TwitchTokens};

#[async_trait]
pub trait SneakerCatalog: Send + Sync {
    async fn sneakers(&self, page: u32) -> lamoda_client::Result<Vec<SneakerCard>>;

    async fn sneaker_links(&self, page: u32) -> lamoda_client::Result<Vec<SneakerLink>>;

    async fn sneaker_by_href(&self, href: &str) -> lamoda_client::Result<SneakerDetail>;

    async fn sneaker_by_article(&self, article: &str) -> lamoda_client::Result<SneakerDetail>;
}

#[async_trait]
impl SneakerCatalog for LamodaClient {
    async fn sneakers(&self, page: u32) -> lamoda_client::Result<Vec<SneakerCard>> {
        LamodaClient::sneakers(self, page).await
    }

    async fn sneaker_links(&self, page: u32) -> lamoda_client::Result<Vec<SneakerLink>> {
        LamodaClient::sneaker_links(self, page).await
    }

    async fn sneaker_by_href(&self, href: &str) -> lamoda_client::Result<SneakerDetail> {
        LamodaClient::sneaker_by_href(self, href).await
    }

    async fn sneaker_by_article(&self, article: &str) -> lamoda_client::Result<SneakerDetail> {
        LamodaClient::sneaker_by_article(self, article).await
    }
}

/// One Helix read, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelixQuery {
    User,
    Games {
        id: String,
        name: String,
        igdb_id: String,
    },
    TopGames,
    GameAnalytics { game_id: String },
    ChannelInformation { broadcaster_id: String },
    ChannelEditors { broadcaster_id: String },
    FollowedChannels { user_id: String },
    ChannelFollowers { broadcaster_id: String },
    ChannelEmotes { broadcaster_id: String },
    GlobalEmotes,
    ChatSettings { broadcaster_id: String },
    ChannelVips { broadcaster_id: String },
    Clips { broadcaster_id: String },
    Polls { broadcaster_id: String },
}

impl HelixQuery {
    /// Where the result of this read is published.
    pub fn route(&self) -> TopicRoute {
        match self {
            HelixQuery::User => routes::USER,
            HelixQuery::Games { .. } => routes::GAMES,
            HelixQuery::TopGames => routes::TOP_GAMES,
            HelixQuery::GameAnalytics { .. } => routes::GAMES_ANALYTIC,
            HelixQuery::ChannelInformation { .. } => routes::CHANNEL_INFORMATION,
            HelixQuery::ChannelEditors { .. } => routes::CHANNEL_EDITOR,
            HelixQuery::FollowedChannels { .. } => routes::CHANNEL_FOLLOWED,
            HelixQuery::ChannelFollowers { .. } => routes::CHANNEL_FOLLOWERS,
            HelixQuery::ChannelEmotes { .. } => routes::CHANNEL_EMOTES,
            HelixQuery::GlobalEmotes => routes::GLOBAL_EMOTES,
            HelixQuery::ChatSettings { .. } => routes::CHANNEL_CHAT_SETTINGS,
            HelixQuery::ChannelVips { .. } => routes::CHANNEL_VIP,
            HelixQuery::Clips { .. } => routes::CLIPS,
            HelixQuery::Polls { .. } => routes::POOLS,
        }
    }
}

#[async_trait]
pub trait StreamingApi: Send + Sync {
    fn authorize_url(&self) -> twitch_client::Result<String>;

    async fn exchange_code(&self, code: &str) -> twitch_client::Result<TwitchTokens>;

    async fn refresh_tokens(&self, refresh_token: &str) -> twitch_client::Result<TwitchTokens>;

    /// Run `query` and return its records as JSON, already decoded and
    /// checked against the typed Helix models.
    async fn fetch(
        &self,
        token: &str,
        query: &HelixQuery,
    ) -> twitch_client::Result<HelixResponse<serde_json::Value>>;
}

fn to_json<T: Serialize>(
    resp: HelixResponse<T>,
) -> twitch_client::Result<HelixResponse<serde_json::Value>> {
    let data = resp
        .data
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HelixResponse {
        data,
        total: resp.total,
        pagination: resp.pagination,
        template: resp.template,
    })
}

#[async_trait]
impl StreamingApi for TwitchClient {
    fn authorize_url(&self) -> twitch_client::Result<String> {
        TwitchClient::authorize_url(self)
    }

    async fn exchange_code(&self, code: &str) -> twitch_client::Result<TwitchTokens> {
        TwitchClient::exchange_code(self, code).await
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> twitch_client::Result<TwitchTokens> {
        TwitchClient::refresh_tokens(self, refresh_token).await
    }

    async fn fetch(
        &self,
        token: &str,
        query: &HelixQuery,
    ) -> twitch_client::Result<HelixResponse<serde_json::Value>> {
        match query {
            HelixQuery::User => to_json(self.user(token).await?),
            HelixQuery::Games { id, name, igdb_id } => {
                to_json(self.games(token, id, name, igdb_id).await?)
            }
            HelixQuery::TopGames => to_json(self.top_games(token).await?),
            HelixQuery::GameAnalytics { game_id } => {
                to_json(self.game_analytics(token, game_id).await?)
            }
            HelixQuery::ChannelInformation { broadcaster_id } => {
                to_json(self.channel_information(token, broadcaster_id).await?)
            }
            HelixQuery::ChannelEditors { broadcaster_id } => {
                to_json(self.channel_editors(token, broadcaster_id).await?)
            }
            HelixQuery::FollowedChannels { user_id } => {
                to_json(self.followed_channels(token, user_id).await?)
            }
            HelixQuery::ChannelFollowers { broadcaster_id } => {
                to_json(self.channel_followers(token, broadcaster_id).await?)
            }
            HelixQuery::ChannelEmotes { broadcaster_id } => {
                to_json(self.channel_emotes(token, broadcaster_id).await?)
            }
            HelixQuery::GlobalEmotes => to_json(self.global_emotes(token).await?),
            HelixQuery::ChatSettings { broadcaster_id } => {
                to_json(self.chat_settings(token, broadcaster_id).await?)
            }
            HelixQuery::ChannelVips { broadcaster_id } => {
                to_json(self.channel_vips(token, broadcaster_id).await?)
            }
            HelixQuery::Clips { broadcaster_id } => to_json(self.clips(token, broadcaster_id).await?),
            HelixQuery::Polls { broadcaster_id } => to_json(self.polls(token, broadcaster_id).await?),
        }
    }
}
