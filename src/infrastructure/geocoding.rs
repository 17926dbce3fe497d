// Reverse geocoding - coordinates to a city name

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a city for the coordinates. `Ok(None)` means the provider had no city.
    async fn reverse(&self, latitude: f64, longitude: f64) -> AppResult<Option<String>>;
}

/// Used when geocoding is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> AppResult<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

impl ReverseResponse {
    fn city(self) -> Option<String> {
        let address = self.address?;
        address
            .city
            .or(address.town)
            .or(address.village)
            .filter(|c| !c.trim().is_empty())
    }
}

/// OpenStreetMap Nominatim client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build geocoding client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> AppResult<Option<String>> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Reverse geocoding request failed: {}", e);
                AppError::BadRequest("Unable to resolve location".to_string())
            })?;

        if !response.status().is_success() {
            warn!("Reverse geocoding returned {}", response.status());
            return Err(AppError::BadRequest("Unable to resolve location".to_string()));
        }

        let body: ReverseResponse = response.json().await.map_err(|e| {
            warn!("Unreadable geocoding response: {}", e);
            AppError::BadRequest("Unable to resolve location".to_string())
        })?;

        let city = body.city();
        debug!(latitude, longitude, ?city, "Reverse geocoded");
        Ok(city)
    }
}
