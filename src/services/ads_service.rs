// AdService - monthly ad list behind an explicit expiring cache

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::infrastructure::cache::{start_of_next_month, ExpiringCache};
use crate::infrastructure::{Ad, AdsProvider, Clock};
use crate::models::{FeedItem, PostView};

/// An ad follows every `AD_EVERY`th post.
pub const AD_EVERY: i64 = 3;

pub struct AdService {
    provider: Arc<dyn AdsProvider>,
    cache: ExpiringCache<Vec<Ad>>,
    clock: Arc<dyn Clock>,
}

impl AdService {
    pub fn new(provider: Arc<dyn AdsProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            cache: ExpiringCache::new(),
            clock,
        }
    }

    /// Ads for the current calendar month. Fetched at most once per month; if a refresh
    /// fails the previous month's list is served instead.
    pub async fn monthly_ads(&self) -> AppResult<Vec<Ad>> {
        let now = self.clock.now();
        if let Some(ads) = self.cache.get(now) {
            return Ok(ads);
        }

        match self.provider.fetch_ads(now).await {
            Ok(ads) => {
                let expires_at = start_of_next_month(now);
                info!(count = ads.len(), %expires_at, "Refreshed monthly ads");
                self.cache.put(ads.clone(), expires_at);
                Ok(ads)
            }
            Err(e) => match self.cache.get_stale() {
                Some(stale) => {
                    warn!("Ad refresh failed, serving previous list: {}", e);
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }
}

/// Place ads into a feed page. Positions are counted from the start of the whole feed, so
/// the ad after absolute post `3k` is `ads[k - 1]` no matter how the feed is paged. Once the
/// ads run out the remaining posts go through untouched.
pub fn interleave_ads(posts: Vec<PostView>, ads: &[Ad], offset: i64) -> Vec<FeedItem> {
    let mut items = Vec::with_capacity(posts.len() + posts.len() / AD_EVERY as usize + 1);
    for (i, post) in posts.into_iter().enumerate() {
        items.push(FeedItem::Post(post));

        let position = offset + i as i64 + 1;
        if position % AD_EVERY == 0 {
            if let Some(ad) = usize::try_from(position / AD_EVERY - 1)
                .ok()
                .and_then(|idx| ads.get(idx))
            {
                items.push(FeedItem::Ad(ad.clone()));
            }
        }
    }
    items
}
