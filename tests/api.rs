mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{TestApp, PASSWORD};
use tribe_server::create_router;

struct Client {
    router: Router,
}

impl Client {
    fn new(app: &TestApp) -> Self {
        Self {
            router: create_router(app.state.clone()),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn raw_post(&self, uri: &str, body: &'static str) -> StatusCode {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }
}

#[tokio::test]
async fn health_check() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let (status, body) = client.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn protected_routes_need_a_bearer_token() {
    let app = TestApp::new().await;
    let client = Client::new(&app);

    let (status, body) = client.send(Method::GET, "/timeline", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["message"].is_string());

    let (status, _) = client
        .send(Method::GET, "/users/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_and_verification_over_http() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let registration = json!({
        "nickName": "ana",
        "email": "ana@tribe.test",
        "password": PASSWORD,
    });

    let (status, body) = client
        .send(Method::POST, "/auths/registrations", None, Some(registration.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = client
        .send(Method::POST, "/auths/registrations", None, Some(registration))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let code = app.code_for("ana@tribe.test").await;
    let (status, body) = client
        .send(
            Method::POST,
            "/auths/verify-totp",
            None,
            Some(json!({ "email": "ana@tribe.test", "totpCode": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(body["refreshToken"].is_string());
    assert_eq!(body["user"]["nickName"], "ana");
    assert_eq!(body["user"]["gamificationLevel"]["level"], 1);

    let (status, body) = client
        .send(
            Method::POST,
            "/auths/sessions",
            None,
            Some(json!({ "email": "ana@tribe.test", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = client
        .send(
            Method::POST,
            "/auths/validate-token",
            None,
            Some(json!({ "token": token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn bad_bodies_are_400() {
    let app = TestApp::new().await;
    let client = Client::new(&app);

    let status = client.raw_post("/auths/registrations", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = client
        .send(
            Method::POST,
            "/auths/registrations",
            None,
            Some(json!({ "nickName": "ana", "email": "nope", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn post_like_then_read_back() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    let (status, _) = client
        .send(
            Method::POST,
            "/posts",
            Some(&ana.token),
            Some(json!({ "description": "nothing to see", "multimedia": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, post) = client
        .send(
            Method::POST,
            "/posts",
            Some(&ana.token),
            Some(json!({
                "description": "sunset",
                "multimedia": [{ "url": "https://cdn.tribe.test/s.jpg", "type": "image" }],
                "latitude": 40.4,
                "longitude": -3.7,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["location"]["city"], "Madrid");
    assert_eq!(post["multimedia"][0]["type"], "image");

    let uri = format!("/posts/{}/likes", post_id);
    let (status, _) = client.send(Method::POST, &uri, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = client.send(Method::POST, &uri, Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = client
        .send(Method::GET, &format!("/posts/{}", post_id), Some(&bob.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 1);
    assert_eq!(body["isLiked"], true);
    assert_eq!(body["isBookmarked"], false);
    assert_eq!(body["user"]["nickName"], "ana");

    let (status, comment) = client
        .send(
            Method::POST,
            &format!("/posts/{}/comments", post_id),
            Some(&bob.token),
            Some(json!({ "content": "lovely" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["comment"], "lovely");

    let (status, comments) = client
        .send(
            Method::GET,
            &format!("/posts/{}/comments?offset=0&limit=5", post_id),
            Some(&ana.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_and_missing_post_ids() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let ana = app.user("ana").await;

    let (status, _) = client
        .send(Method::GET, "/posts/not-an-id", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = client
        .send(Method::GET, "/posts/123456", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn timeline_with_ads_is_tagged() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let ana = app.user("ana").await;
    for i in 0..3 {
        app.post(ana.id, &format!("post {}", i)).await;
    }

    let (status, body) = client
        .send(Method::GET, "/timeline?withAds=true", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["type"], "post");
    assert_eq!(items[3]["type"], "ad");
    assert_eq!(items[3]["commerce"], "TechStore");

    let (status, ads) = client
        .send(Method::GET, "/posts/ads", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ads.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn follow_routes_and_public_profiles() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    let uri = format!("/users/me/following/{}", bob.id);
    let (status, _) = client.send(Method::POST, &uri, Some(&ana.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = client.send(Method::POST, &uri, Some(&ana.token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, following) = client
        .send(Method::GET, "/users/me/following", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(following[0]["id"], bob.id.to_string());

    let (status, profile) = client
        .send(Method::GET, &format!("/users/{}", bob.id), Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["numberOfFollowers"], 1);
    assert!(profile.get("email").is_none());

    let (status, metrics) = client
        .send(Method::GET, "/users/me/metrics", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["numberOfFollowing"], 1);

    let (status, _) = client.send(Method::DELETE, &uri, Some(&ana.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = client.send(Method::DELETE, &uri, Some(&ana.token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn logout_and_account_deletion_revoke_tokens() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    let (status, _) = client
        .send(Method::POST, "/users/me/logout", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = client.send(Method::GET, "/users/me", Some(&ana.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = client.send(Method::DELETE, "/users/me", Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = client.send(Method::GET, "/users/me", Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_and_profile_update() {
    let app = TestApp::new().await;
    let client = Client::new(&app);
    let ana = app.user("ana").await;

    let (status, me) = client
        .send(
            Method::PATCH,
            "/users/me",
            Some(&ana.token),
            Some(json!({ "name": "Ana", "lastName": "Ruiz" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["lastName"], "Ruiz");
    assert_eq!(me["email"], "ana@tribe.test");

    let (status, found) = client
        .send(Method::GET, "/users?input=ruiz", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, found) = client
        .send(Method::GET, "/users?input=nobody", Some(&ana.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([]));
}
