use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{
        AdsProvider, Clock, Database, DisabledGeocoder, Geocoder, IdGenerator, LogMailer, Mailer,
        NominatimGeocoder, PasswordHasher, StaticAdsProvider, SystemClock, TokenService,
    },
    services::{
        AdService, AuthService, EngagementService, FeedService, FollowService, PostService,
        UserService,
    },
};

/// External collaborators the services are built around.
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub geocoder: Arc<dyn Geocoder>,
    pub mailer: Arc<dyn Mailer>,
    pub ads_provider: Arc<dyn AdsProvider>,
    pub hasher: PasswordHasher,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub clock: Arc<dyn Clock>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub feed_service: Arc<FeedService>,
    pub engagement_service: Arc<EngagementService>,
    pub follow_service: Arc<FollowService>,
    pub ad_service: Arc<AdService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config.database.url, config.database.max_connections).await?;

        let geocoder: Arc<dyn Geocoder> = if config.geocoding.enabled {
            Arc::new(NominatimGeocoder::new(&config.geocoding)?)
        } else {
            Arc::new(DisabledGeocoder)
        };

        let collaborators = Collaborators {
            clock: Arc::new(SystemClock),
            geocoder,
            mailer: Arc::new(LogMailer),
            ads_provider: Arc::new(StaticAdsProvider),
            hasher: PasswordHasher::from_config(&config.auth)?,
        };

        Ok(Self::with_collaborators(config, db, collaborators))
    }

    /// Wire every service over an already initialized database.
    pub fn with_collaborators(config: Config, db: Database, c: Collaborators) -> Self {
        let ids = Arc::new(IdGenerator::new(config.id_node));
        let tokens = Arc::new(TokenService::new(&config.auth, c.clock.clone()));

        let ad_service = Arc::new(AdService::new(c.ads_provider, c.clock.clone()));
        let feed_service = Arc::new(FeedService::new(db.clone(), ad_service.clone()));

        let auth_service = Arc::new(AuthService::new(
            db.clone(),
            ids.clone(),
            c.clock.clone(),
            c.hasher.clone(),
            tokens.clone(),
            c.mailer,
            config.auth.clone(),
        ));
        let user_service = Arc::new(UserService::new(
            db.clone(),
            c.clock.clone(),
            c.hasher,
            tokens,
            &config.auth,
        ));
        let post_service = Arc::new(PostService::new(
            db.clone(),
            ids.clone(),
            c.clock.clone(),
            c.geocoder,
            feed_service.clone(),
        ));
        let engagement_service = Arc::new(EngagementService::new(db.clone(), ids, c.clock.clone()));
        let follow_service = Arc::new(FollowService::new(db.clone(), c.clock.clone()));

        Self {
            config,
            db,
            clock: c.clock,
            auth_service,
            user_service,
            post_service,
            feed_service,
            engagement_service,
            follow_service,
            ad_service,
        }
    }
}
