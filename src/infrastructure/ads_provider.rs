// Ad inventory

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Timestamp;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdImage {
    pub portrait: String,
    pub landscape: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: i64,
    pub commerce: String,
    pub description: String,
    pub image_path: Vec<AdImage>,
    pub url: String,
    pub date: AdWindow,
}

#[async_trait]
pub trait AdsProvider: Send + Sync {
    async fn fetch_ads(&self, now: DateTime<Utc>) -> AppResult<Vec<Ad>>;
}

const STATIC_ADS: &[(&str, &str, &str, &str)] = &[
    (
        "TechStore",
        "The best deals in technology",
        "photo-1468495244123-6c6c332eeece",
        "https://example.com/tech",
    ),
    (
        "FashionHub",
        "Fashion for every style",
        "photo-1445205170230-053b83016050",
        "https://example.com/fashion",
    ),
    (
        "SportLife",
        "Quality sports equipment",
        "photo-1517836357463-d25dfeac3438",
        "https://example.com/sport",
    ),
    (
        "HomeDecor",
        "Transform your home",
        "photo-1556909114-f6e7ad7d3136",
        "https://example.com/home",
    ),
    (
        "TravelDreams",
        "Discover new destinations",
        "photo-1488085061387-422e29b40080",
        "https://example.com/travel",
    ),
];

/// Fixed demo inventory; every ad runs for 30 days from the time it is fetched.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticAdsProvider;

#[async_trait]
impl AdsProvider for StaticAdsProvider {
    async fn fetch_ads(&self, now: DateTime<Utc>) -> AppResult<Vec<Ad>> {
        let window = AdWindow {
            start: Timestamp::from_datetime(now),
            end: Timestamp::from_datetime(now + Duration::days(30)),
        };

        Ok(STATIC_ADS
            .iter()
            .enumerate()
            .map(|(i, (commerce, description, photo, url))| Ad {
                id: i as i64 + 1,
                commerce: commerce.to_string(),
                description: description.to_string(),
                image_path: vec![AdImage {
                    portrait: format!("https://images.unsplash.com/{}?w=400&h=600&fit=crop", photo),
                    landscape: format!("https://images.unsplash.com/{}?w=600&h=400&fit=crop", photo),
                }],
                url: url.to_string(),
                date: window.clone(),
            })
            .collect())
    }
}
