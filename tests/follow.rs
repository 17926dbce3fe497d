mod common;

use common::TestApp;
use tribe_server::core::{Page, UserId};
use tribe_server::error::AppError;

#[tokio::test]
async fn follow_updates_both_sides() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    app.state.follow_service.follow(ana.id, bob.id).await.unwrap();
    assert_eq!(app.count_rows("follows", "follower_id", ana.id.0).await, 1);
    assert_eq!(app.count_rows("follows", "follower_id", bob.id.0).await, 0);

    let ana_view = app.state.user_service.get_me(ana.id).await.unwrap();
    let bob_view = app.state.user_service.get_me(bob.id).await.unwrap();
    assert_eq!(ana_view.number_of_following, 1);
    assert_eq!(ana_view.number_of_followers, 0);
    assert_eq!(bob_view.number_of_followers, 1);

    let following = app.state.follow_service.following(ana.id, Page::default()).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id, bob.id);

    let followers = app.state.follow_service.followers(bob.id, Page::default()).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].nick_name, "ana");
}

#[tokio::test]
async fn following_twice_is_a_conflict_and_changes_nothing() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    app.state.follow_service.follow(ana.id, bob.id).await.unwrap();
    let err = app.state.follow_service.follow(ana.id, bob.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let following = app.state.follow_service.following(ana.id, Page::default()).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(
        app.state.user_service.get_me(ana.id).await.unwrap().number_of_following,
        1
    );
}

#[tokio::test]
async fn unfollow_before_follow_reports_not_following() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    let err = app.state.follow_service.unfollow(ana.id, bob.id).await.unwrap_err();
    match err {
        AppError::Conflict(message) => assert!(message.contains("not following")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        app.state.user_service.get_me(bob.id).await.unwrap().number_of_followers,
        0
    );
}

#[tokio::test]
async fn unfollow_reverses_follow() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;

    app.state.follow_service.follow(ana.id, bob.id).await.unwrap();
    app.state.follow_service.unfollow(ana.id, bob.id).await.unwrap();

    assert_eq!(app.state.user_service.get_me(ana.id).await.unwrap().number_of_following, 0);
    assert_eq!(app.state.user_service.get_me(bob.id).await.unwrap().number_of_followers, 0);
    assert!(app
        .state
        .follow_service
        .followers(bob.id, Page::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn self_and_missing_targets_are_rejected() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;

    let err = app.state.follow_service.follow(ana.id, ana.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = app.state.follow_service.follow(ana.id, UserId(999)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app.state.follow_service.unfollow(ana.id, UserId(999)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn lists_are_newest_edge_first_and_paginated() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;
    let mut followed = Vec::new();
    for nick in ["bob", "cai", "dan"] {
        let user = app.user(nick).await;
        app.tick();
        app.state.follow_service.follow(ana.id, user.id).await.unwrap();
        followed.push(user.id);
    }

    let first = app.state.follow_service.following(ana.id, Page::new(0, 2)).await.unwrap();
    let ids: Vec<_> = first.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![followed[2], followed[1]]);

    let rest = app.state.follow_service.following(ana.id, Page::new(2, 2)).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, followed[0]);
}

#[tokio::test]
async fn deleting_an_account_cleans_up_the_graph() {
    let app = TestApp::new().await;
    let ana = app.user("ana").await;
    let bob = app.user("bob").await;
    let cai = app.user("cai").await;

    app.state.follow_service.follow(ana.id, bob.id).await.unwrap();
    app.state.follow_service.follow(bob.id, cai.id).await.unwrap();
    app.state.follow_service.follow(cai.id, bob.id).await.unwrap();

    app.state.user_service.delete_account(bob.id).await.unwrap();

    let ana_view = app.state.user_service.get_me(ana.id).await.unwrap();
    let cai_view = app.state.user_service.get_me(cai.id).await.unwrap();
    assert_eq!(ana_view.number_of_following, 0);
    assert_eq!(cai_view.number_of_following, 0);
    assert_eq!(cai_view.number_of_followers, 0);

    let err = app.state.follow_service.follow(ana.id, bob.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_follows_on_a_file_database_are_all_counted() {
    let (app, _dir) = TestApp::on_disk().await;
    let star = app.user("star").await;

    let mut fans = Vec::new();
    for i in 0..12 {
        fans.push(app.user(&format!("fan{}", i)).await.id);
    }

    let handles: Vec<_> = fans
        .iter()
        .map(|fan| {
            let service = app.state.follow_service.clone();
            let (fan, star) = (*fan, star.id);
            tokio::spawn(async move { service.follow(fan, star).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let star_view = app.state.user_service.get_me(star.id).await.unwrap();
    assert_eq!(star_view.number_of_followers, 12);
    assert_eq!(app.count_rows("follows", "followee_id", star.id.0).await, 12);
    for fan in fans {
        assert_eq!(app.state.user_service.get_me(fan).await.unwrap().number_of_following, 1);
    }
}
