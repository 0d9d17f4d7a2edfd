//! Topic → collection pairs. Every record published to `topic` is drained
//! into `collection`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicRoute {
    pub topic: &'static str,
    pub collection: &'static str,
}

impl TopicRoute {
    pub const fn new(topic: &'static str, collection: &'static str) -> Self {
        Self { topic, collection }
    }
}

pub mod lamoda {
    use super::TopicRoute;

    pub const SNEAKERS: TopicRoute = TopicRoute::new(
        "lamoda-list-sneakers-topic",
        "lamoda-list-sneakers-collection",
    );
    pub const SNEAKER_HREFS: TopicRoute = TopicRoute::new(
        "lamoda-list-sneaker-hrefs-topic",
        "lamoda-list-sneaker-hrefs-collection",
    );
    pub const SNEAKER_DETAIL: TopicRoute =
        TopicRoute::new("lamoda-sneaker-topic", "lamoda-sneaker-detail");

    pub const ALL: &[TopicRoute] = &[SNEAKERS, SNEAKER_HREFS, SNEAKER_DETAIL];
}

pub mod twitch {
    use super::TopicRoute;

    pub const AUTH: TopicRoute = TopicRoute::new("twitch-auth-topic", "twitch-auth-collections");
    pub const USER: TopicRoute = TopicRoute::new("twitch-user-topic", "twitch-user-collections");
    pub const GAMES: TopicRoute =
        TopicRoute::new("twitch-games-topic", "twitch-games-collections");
    pub const TOP_GAMES: TopicRoute =
        TopicRoute::new("twitch-top-games-topic", "twitch-top-games-collections");
    pub const GAMES_ANALYTIC: TopicRoute = TopicRoute::new(
        "twitch-games-analytic-topic",
        "twitch-games-analytic-collections",
    );
    pub const CHANNEL_INFORMATION: TopicRoute = TopicRoute::new(
        "twitch-channel-information-topic",
        "twitch-channel-information-collections",
    );
    pub const CHANNEL_EDITOR: TopicRoute = TopicRoute::new(
        "twitch-channel-editor-topic",
        "twitch-channel-editor-collections",
    );
    pub const CHANNEL_FOLLOWED: TopicRoute = TopicRoute::new(
        "twitch-channel-followed-topic",
        "twitch-channel-followed-collections",
    );
    pub const CHANNEL_FOLLOWERS: TopicRoute = TopicRoute::new(
        "twitch-channel-followers-topic",
        "twitch-channel-followers-collections",
    );
    pub const CHANNEL_EMOTES: TopicRoute = TopicRoute::new(
        "twitch-channel-emotes-topic",
        "twitch-channel-emotes-collections",
    );
    pub const CHANNEL_CHAT_SETTINGS: TopicRoute = TopicRoute::new(
        "twitch-channel-chat-settings-topic",
        "twitch-channel-chat-settings-collections",
    );
    pub const CHANNEL_VIP: TopicRoute =
        TopicRoute::new("twitch-channel-vip-topic", "twitch-channel-vip-collections");
    pub const GLOBAL_EMOTES: TopicRoute = TopicRoute::new(
        "twitch-global-emotes-topic",
        "twitch-global-emotes-collections",
    );
    pub const CLIPS: TopicRoute = TopicRoute::new("twitch-clips-topic", "twitch-clips-collections");
    pub const POOLS: TopicRoute = TopicRoute::new("twitch-pools-topic", "twitch-pools-collections");

    pub const ALL: &[TopicRoute] = &[
        AUTH,
        USER,
        GAMES,
        TOP_GAMES,
        GAMES_ANALYTIC,
        CHANNEL_INFORMATION,
        CHANNEL_EDITOR,
        CHANNEL_FOLLOWED,
        CHANNEL_FOLLOWERS,
        CHANNEL_EMOTES,
        CHANNEL_CHAT_SETTINGS,
        CHANNEL_VIP,
        GLOBAL_EMOTES,
        CLIPS,
        POOLS,
    ];
}
