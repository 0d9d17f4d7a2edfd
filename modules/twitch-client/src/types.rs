use serde::{Deserialize, Serialize};

// --- OAuth ---

/// Token set returned by the authorization-code and refresh grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitchTokens {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub id_token: Option<String>,
    pub refresh_token: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// --- Helix envelope ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Every Helix list endpoint wraps its records in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Emote endpoints return a URL template alongside the records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl<T> HelixResponse<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// --- Users ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub user_type: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: String,
}

// --- Games ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub box_art_url: String,
    #[serde(default)]
    pub igdb_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub started_at: String,
    pub ended_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalytics {
    pub game_id: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub date_range: DateRange,
}

// --- Channels ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInformation {
    pub broadcaster_id: String,
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    pub broadcaster_language: String,
    pub game_name: String,
    pub game_id: String,
    pub title: String,
    #[serde(default)]
    pub delay: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content_classification_labels: Vec<String>,
    #[serde(default)]
    pub is_branded_content: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEditor {
    pub user_id: String,
    pub user_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowedChannel {
    pub broadcaster_id: String,
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    pub followed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelFollower {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub followed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelVip {
    pub user_id: String,
    pub user_name: String,
    pub user_login: String,
}

// --- Chat ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmoteImages {
    #[serde(default)]
    pub url_1x: String,
    #[serde(default)]
    pub url_2x: String,
    #[serde(default)]
    pub url_4x: String,
}

/// Channel and global emotes share one shape; globals leave tier and set empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emote {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: EmoteImages,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub emote_type: String,
    #[serde(default)]
    pub emote_set_id: String,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default)]
    pub scale: Vec<String>,
    #[serde(default)]
    pub theme_mode: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub broadcaster_id: String,
    pub emote_mode: bool,
    pub follower_mode: bool,
    pub follower_mode_duration: Option<u32>,
    #[serde(default)]
    pub moderator_id: Option<String>,
    #[serde(default)]
    pub non_moderator_chat_delay: Option<bool>,
    #[serde(default)]
    pub non_moderator_chat_delay_duration: Option<u32>,
    pub slow_mode: bool,
    pub slow_mode_wait_time: Option<u32>,
    pub subscriber_mode: bool,
    pub unique_chat_mode: bool,
}

// --- Clips and polls ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    pub url: String,
    pub embed_url: String,
    pub broadcaster_id: String,
    pub broadcaster_name: String,
    pub creator_id: String,
    pub creator_name: String,
    #[serde(default)]
    pub video_id: String,
    pub game_id: String,
    pub language: String,
    pub title: String,
    pub view_count: u64,
    pub created_at: String,
    pub thumbnail_url: String,
    pub duration: f64,
    #[serde(default)]
    pub vod_offset: Option<u64>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollChoice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub votes: u64,
    #[serde(default)]
    pub channel_points_votes: u64,
    #[serde(default)]
    pub bits_votes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub broadcaster_id: String,
    pub broadcaster_name: String,
    pub broadcaster_login: String,
    pub title: String,
    pub choices: Vec<PollChoice>,
    #[serde(default)]
    pub bits_voting_enabled: bool,
    #[serde(default)]
    pub bits_per_vote: u64,
    #[serde(default)]
    pub channel_points_voting_enabled: bool,
    #[serde(default)]
    pub channel_points_per_vote: u64,
    pub status: String,
    pub duration: u64,
    pub started_at: String,
    #[serde(default)]
    pub ended_at: Option<String>,
}
