use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::sources::{Result, http};

pub const IMAGE_QUERIES: [&str; 6] = ["landscape", "nature", "ocean", "sky", "space", "sunset"];

const REFERRAL: &str = "utm_source=nearby_transit_dashboard&utm_medium=referral";

#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl UnsplashClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    /// A random landscape photo matching one of [`IMAGE_QUERIES`].
    pub async fn random_photo(&self) -> Result<BackgroundImage> {
        let query = IMAGE_QUERIES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(IMAGE_QUERIES[0]);
        let url = format!("{}/photos/random/", self.base_url);
        let photo: RandomPhoto = http::get_json(
            &self.client,
            &url,
            &[
                ("client_id", self.key.clone()),
                ("w", "3840".to_string()),
                ("orientation", "landscape".to_string()),
                ("query", query.to_string()),
            ],
        )
        .await?;
        Ok(BackgroundImage::from(photo))
    }
}

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    description: Option<String>,
    user: PhotoUser,
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUser {
    name: String,
    links: UserLinks,
}

#[derive(Debug, Deserialize)]
struct UserLinks {
    html: String,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    /// Present when a width was requested.
    custom: Option<String>,
    full: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundImage {
    pub title: Option<String>,
    pub author: String,
    pub profile_url: String,
    pub image_url: String,
}

impl BackgroundImage {
    pub fn author_link(&self) -> String {
        format!("{}?{}", self.profile_url, REFERRAL)
    }

    pub fn service_link() -> String {
        format!("https://unsplash.com/?{REFERRAL}")
    }
}

impl From<RandomPhoto> for BackgroundImage {
    fn from(photo: RandomPhoto) -> Self {
        BackgroundImage {
            title: photo.description,
            author: photo.user.name,
            profile_url: photo.user.links.html,
            image_url: photo.urls.custom.unwrap_or(photo.urls.full),
        }
    }
}
