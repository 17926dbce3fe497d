// Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use tribe_server::app_state::{AppState, Collaborators};
use tribe_server::config::Config;
use tribe_server::core::{PostId, UserId};
use tribe_server::entities::{EntVerificationCode, Media, MediaKind};
use tribe_server::error::{AppError, AppResult};
use tribe_server::infrastructure::{
    Database, Geocoder, ManualClock, Mailer, PasswordHasher, StaticAdsProvider,
};
use tribe_server::models::{AuthResponse, CreatePostRequest, RegisterRequest};

pub const PASSWORD: &str = "correct-horse";

#[derive(Debug, Clone)]
pub enum GeocoderMode {
    City(String),
    NoCity,
    Fail,
}

/// Geocoder whose answer the test decides.
pub struct StubGeocoder {
    mode: Mutex<GeocoderMode>,
}

impl StubGeocoder {
    pub fn set(&self, mode: GeocoderMode) {
        *self.mode.lock().unwrap() = mode;
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> AppResult<Option<String>> {
        match self.mode.lock().unwrap().clone() {
            GeocoderMode::City(city) => Ok(Some(city)),
            GeocoderMode::NoCity => Ok(None),
            GeocoderMode::Fail => Err(AppError::Internal("geocoder timed out".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub db: Database,
    pub clock: Arc<ManualClock>,
    pub mailer: Arc<RecordingMailer>,
    pub geocoder: Arc<StubGeocoder>,
}

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_database(Database::new_in_memory().await.unwrap())
    }

    /// Backed by a SQLite file with a pool of several connections, so concurrent requests
    /// really contend for the database. Keep the directory alive for the test's duration.
    pub async fn on_disk() -> (Self, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("tribe.db").display());
        let db = Database::connect(&url, 5).await.unwrap();
        (Self::with_database(db), dir)
    }

    fn with_database(db: Database) -> Self {
        let mut config = Config::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config.auth.argon2_memory_kib = 8;
        config.auth.argon2_iterations = 1;

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        ));
        let mailer = Arc::new(RecordingMailer::default());
        let geocoder = Arc::new(StubGeocoder {
            mode: Mutex::new(GeocoderMode::City("Madrid".to_string())),
        });

        let collaborators = Collaborators {
            clock: clock.clone(),
            geocoder: geocoder.clone(),
            mailer: mailer.clone(),
            ads_provider: Arc::new(StaticAdsProvider),
            hasher: PasswordHasher::from_config(&config.auth).unwrap(),
        };
        let state = AppState::with_collaborators(config, db.clone(), collaborators);

        Self {
            state,
            db,
            clock,
            mailer,
            geocoder,
        }
    }

    /// `SELECT COUNT(*) FROM {table} WHERE {column} = ?`, straight from storage.
    pub async fn count_rows(&self, table: &str, column: &str, value: i64) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, column))
            .bind(value)
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    pub fn tick(&self) {
        self.clock.advance(Duration::seconds(1));
    }

    /// The code most recently issued for `email`, read back from storage.
    pub async fn code_for(&self, email: &str) -> String {
        EntVerificationCode::gen_nullable(self.db.pool(), email)
            .await
            .unwrap()
            .expect("a verification code was issued")
            .code
    }

    pub async fn register(&self, nick_name: &str) -> String {
        let email = format!("{}@tribe.test", nick_name);
        self.state
            .auth_service
            .register(RegisterRequest {
                nick_name: nick_name.to_string(),
                email: email.clone(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
        email
    }

    /// Register, verify and sign in.
    pub async fn user(&self, nick_name: &str) -> TestUser {
        let email = self.register(nick_name).await;
        let code = self.code_for(&email).await;
        let session: AuthResponse = self
            .state
            .auth_service
            .verify_code(&email, &code)
            .await
            .unwrap();

        TestUser {
            id: session.user.id,
            email,
            token: session.tokens.token,
            refresh_token: session.tokens.refresh_token,
        }
    }

    pub async fn post(&self, author: UserId, description: &str) -> PostId {
        self.tick();
        self.state
            .post_service
            .create_post(author, post_request(description))
            .await
            .unwrap()
            .id
    }
}

pub fn image(url: &str) -> Media {
    Media {
        url: url.to_string(),
        kind: MediaKind::Image,
    }
}

pub fn post_request(description: &str) -> CreatePostRequest {
    CreatePostRequest {
        description: Some(description.to_string()),
        multimedia: vec![image("https://cdn.tribe.test/photo.jpg")],
        latitude: None,
        longitude: None,
    }
}
