use serde::{Deserialize, Serialize};

use crate::sources::{Result, http};

#[derive(Debug, Clone)]
pub struct GameServerClient {
    client: reqwest::Client,
    url: String,
}

impl GameServerClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub async fn status(&self) -> Result<ServerStatus> {
        let dimensions: Vec<Vec<OnlinePlayer>> = http::get_json(&self.client, &self.url, &[]).await?;
        Ok(ServerStatus { dimensions })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OnlinePlayer {
    pub player: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub circular: Option<String>,
    /// Packed 0xRRGGBB.
    #[serde(default)]
    pub color: Option<u32>,
}

impl OnlinePlayer {
    pub fn avatar_url(&self) -> String {
        format!("https://mc-heads.net/avatar/{}", urlencoding::encode(&self.player))
    }
}

/// Online players grouped by dimension, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerStatus {
    pub dimensions: Vec<Vec<OnlinePlayer>>,
}

impl ServerStatus {
    pub fn player_count(&self) -> usize {
        self.dimensions.iter().map(Vec::len).sum()
    }
}
