// Infrastructure: storage, ids, time, security and external collaborators
pub mod ads_provider;          // Ad inventory
pub mod cache;                 // Expiring single-value cache
pub mod clock;                 // Injectable time source
pub mod database;              // SQLite pool and schema
pub mod geocoding;             // Reverse geocoding
pub mod id_generator;          // Snowflake ids
pub mod mailer;                // Outbound mail
pub mod middleware;            // Bearer auth middleware and Vc extractor
pub mod security;              // Password hashing and tokens
pub mod viewer;                // Viewer context

pub use ads_provider::{Ad, AdsProvider, StaticAdsProvider};
pub use cache::ExpiringCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use database::Database;
pub use geocoding::{DisabledGeocoder, Geocoder, NominatimGeocoder};
pub use id_generator::IdGenerator;
pub use mailer::{LogMailer, Mailer};
pub use security::{PasswordHasher, TokenKind, TokenPair, TokenService};
pub use viewer::ViewerContext;
