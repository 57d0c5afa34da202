mod common;

use common::*;
use reqwest::{Method, StatusCode};
use serde_json::json;
use speshal_application::{
    CommentOutcome, Delivery, FeedView, IncomingRequestsView, LoadError, LoadMore, PostView, ProfileListKind,
    ProfileListView, ProfileView, ViewStatus,
};
use speshal_core::collection::CollectionState;
use speshal_core::model::{FollowStatus, NewPost, ProfilePatch, Upload};
use speshal_core::reconcile::{ProfileEditOutcome, RelationOutcome};

// ============================================================================
// FeedView
// ============================================================================

#[tokio::test]
async fn test_feed_like_then_unlike_restores_post() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/posts/feed/") => page(vec![post_json(1, "ann"), post_json(2, "bob")], None),
        ("PUT", "/api/likes/?post_id=2") => ok(json!({ "nlikes": 2 })),
        ("DELETE", "/api/likes/?post_id=2") => ok(json!({ "nlikes": 1 })),
        _ => status(StatusCode::NOT_FOUND),
    });
    let feed = FeedView::new(api_for(server).await);
    assert_eq!(feed.load().await, Delivery::Delivered(ViewStatus::Loaded));
    let before = feed.posts().items();

    let liked = feed.toggle_like(2).await.unwrap().into_option().unwrap();
    assert!(liked.is_liked_by_me);
    assert_eq!(liked.nlikes, 2);
    assert_eq!(feed.posts().items()[1], liked);

    feed.toggle_like(2).await.unwrap();
    assert_eq!(feed.posts().items(), before);
}

#[tokio::test]
async fn test_overlapping_likes_leave_post_liked() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/posts/feed/") => page(vec![post_json(1, "ann")], None),
        ("PUT", "/api/likes/?post_id=1") => ok(json!({ "nlikes": 2 })),
        ("DELETE", "/api/likes/?post_id=1") => ok(json!({ "nlikes": 1 })),
        _ => status(StatusCode::NOT_FOUND),
    });
    let feed = FeedView::new(api_for(server.clone()).await);
    feed.load().await;

    let (first, second) = tokio::join!(feed.toggle_like(1), feed.toggle_like(1));
    first.unwrap();
    second.unwrap();

    assert_eq!(server.count(Method::PUT, "/api/likes/?post_id=1"), 2);
    assert_eq!(server.count(Method::DELETE, "/api/likes/?post_id=1"), 0);
    let held = &feed.posts().items()[0];
    assert!(held.is_liked_by_me);
    assert_eq!(held.nlikes, 2);
}

#[tokio::test]
async fn test_feed_anonymous_is_not_logged_in() {
    let server = FakeServer::new(|_, _| status(StatusCode::UNAUTHORIZED));
    let feed = FeedView::new(api_for(server).await);

    // The stored token is rejected, the refresh too, and the anonymous resend as well.
    assert_eq!(
        feed.load().await,
        Delivery::Delivered(ViewStatus::Failed(LoadError::NotLoggedIn))
    );
}

#[tokio::test]
async fn test_feed_torn_down_before_response() {
    let server = FakeServer::new(|_, _| page(vec![post_json(1, "ann")], None));
    let feed = FeedView::new(api_for(server).await);

    let (delivery, ()) = tokio::join!(feed.load(), async { feed.teardown() });

    assert_eq!(delivery, Delivery::Discarded);
    assert_eq!(feed.status(), ViewStatus::Loading);
    assert!(feed.posts().is_empty());
}

// ============================================================================
// ProfileView
// ============================================================================

#[tokio::test]
async fn test_closed_profile_shows_header_without_posts() {
    let server = FakeServer::new(|_, path| match path {
        "/api/users/ann" => ok(profile_json("ann", false, None)),
        "/api/posts/?username=ann" => status(StatusCode::FORBIDDEN),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = ProfileView::new(api_for(server).await, "ann");

    assert_eq!(view.load().await, Delivery::Delivered(ViewStatus::Loaded));
    assert_eq!(view.profile().unwrap().username, "ann");
    assert_eq!(view.posts().state(), CollectionState::NotLoaded);
    assert!(view.followers().await.unwrap_err().is_forbidden());
}

#[tokio::test]
async fn test_missing_profile_is_not_found() {
    let server = FakeServer::new(|_, _| status(StatusCode::NOT_FOUND));
    let view = ProfileView::new(api_for(server).await, "ghost");

    assert_eq!(
        view.load().await,
        Delivery::Delivered(ViewStatus::Failed(LoadError::NotFound))
    );
}

#[tokio::test]
async fn test_cancel_on_closed_profile_discards_posts() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/users/ann") => ok(profile_json("ann", false, Some("Accepted"))),
        ("GET", "/api/posts/?username=ann") => page(vec![post_json(1, "ann")], None),
        ("DELETE", "/api/users/ann/subscribe/") => ok(profile_json("ann", false, None)),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = ProfileView::new(api_for(server).await, "ann");
    view.load().await;
    assert_eq!(view.posts().len(), 1);

    let outcome = view.cancel_subscription().await.unwrap();

    assert_eq!(outcome, Delivery::Delivered(RelationOutcome::PostsHidden));
    assert_eq!(view.profile().unwrap().followed_by_me_status, None);
    assert_eq!(view.posts().state(), CollectionState::NotLoaded);
}

#[tokio::test]
async fn test_subscribe_to_closed_profile_stays_pending() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/users/ann") => ok(profile_json("ann", false, None)),
        ("GET", "/api/posts/?username=ann") => status(StatusCode::FORBIDDEN),
        ("PUT", "/api/users/ann/subscribe/") => ok(profile_json("ann", false, Some("Pending"))),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = ProfileView::new(api_for(server).await, "ann");
    view.load().await;

    let outcome = view.subscribe().await.unwrap();

    assert_eq!(outcome, Delivery::Delivered(RelationOutcome::Unchanged));
    assert_eq!(
        view.profile().unwrap().followed_by_me_status,
        Some(FollowStatus::Pending)
    );
}

fn my_profile_server(edited_username: &'static str) -> std::sync::Arc<FakeServer> {
    FakeServer::new(move |method, path| match (method.as_str(), path) {
        ("GET", "/api/users/me") => {
            ok(profile_json("me", true, Some("self")))
        }
        ("GET", "/api/posts/?username=me") => page(vec![post_json(1, "me"), post_json(2, "me")], None),
        ("PATCH", "/api/users/me/") => {
            let mut profile = profile_json(edited_username, true, Some("self"));
            profile["avatar"] = json!("/media/new.png");
            ok(profile)
        }
        ("POST", "/api/posts/") => created(post_json(9, "me")),
        _ => status(StatusCode::NOT_FOUND),
    })
}

#[tokio::test]
async fn test_avatar_edit_propagates_to_held_posts() {
    let view = ProfileView::new(api_for(my_profile_server("me")).await, "me");
    view.load().await;
    let before = view.posts().items();

    let patch = ProfilePatch {
        avatar: Some(Upload::new("me.png", vec![1])),
        ..Default::default()
    };
    let outcome = view.edit_profile(&patch).await.unwrap();

    assert_eq!(
        outcome,
        Delivery::Delivered(ProfileEditOutcome::Updated { avatar_changed: true })
    );
    for (old, new) in before.iter().zip(view.posts().items()) {
        assert_eq!(new.owner.avatar.as_deref(), Some("/media/new.png"));
        assert_eq!(new.description, old.description);
        assert_eq!(new.nlikes, old.nlikes);
        assert_eq!(new.picture, old.picture);
    }
}

#[tokio::test]
async fn test_username_edit_redirects() {
    let view = ProfileView::new(api_for(my_profile_server("me2")).await, "me");
    view.load().await;

    let patch = ProfilePatch {
        username: Some("me2".to_string()),
        ..Default::default()
    };
    let outcome = view.edit_profile(&patch).await.unwrap();

    assert_eq!(
        outcome,
        Delivery::Delivered(ProfileEditOutcome::Redirect {
            username: "me2".to_string()
        })
    );
    assert_eq!(view.profile().unwrap().username, "me");
}

#[tokio::test]
async fn test_edit_someone_elses_profile_is_refused() {
    let server = FakeServer::new(|_, path| match path {
        "/api/users/ann" => ok(profile_json("ann", true, None)),
        "/api/posts/?username=ann" => page(vec![], None),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = ProfileView::new(api_for(server.clone()).await, "ann");
    view.load().await;

    let err = view.edit_profile(&ProfilePatch::default()).await.unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(server.count(Method::PATCH, "/api/users/me/"), 0);
}

#[tokio::test]
async fn test_upload_prepends_post() {
    let view = ProfileView::new(api_for(my_profile_server("me")).await, "me");
    view.load().await;

    let created = view
        .handle_upload(&NewPost {
            picture: Some(Upload::new("p.png", vec![1])),
            description: None,
        })
        .await
        .unwrap();

    assert_eq!(created.into_option().map(|p| p.id), Some(9));
    let ids: Vec<_> = view.posts().items().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![9, 1, 2]);
}

// ============================================================================
// PostView
// ============================================================================

#[tokio::test]
async fn test_post_view_status_mapping() {
    let server = FakeServer::new(|_, path| match path {
        "/api/posts/1/" => status(StatusCode::FORBIDDEN),
        "/api/posts/2/" => status(StatusCode::NOT_FOUND),
        _ => status(StatusCode::BAD_GATEWAY),
    });
    let api = api_for(server).await;

    assert_eq!(
        PostView::new(api.clone(), 1).load().await,
        Delivery::Delivered(ViewStatus::Failed(LoadError::Forbidden))
    );
    assert_eq!(
        PostView::new(api.clone(), 2).load().await,
        Delivery::Delivered(ViewStatus::Failed(LoadError::NotFound))
    );
    assert!(matches!(
        PostView::new(api, 3).load().await,
        Delivery::Delivered(ViewStatus::Failed(LoadError::Failed(_)))
    ));
}

fn thread_server() -> std::sync::Arc<FakeServer> {
    FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/posts/5/") => ok(post_json(5, "ann")),
        ("GET", "/api/comments/?post_id=5") => page(
            vec![comment_json(11, "bob", "second"), comment_json(10, "cid", "first")],
            Some("http://api.test/api/comments/?post_id=5&cursor=2"),
        ),
        ("GET", "/api/comments/?post_id=5&cursor=2") => page(vec![comment_json(9, "dan", "zeroth")], None),
        ("POST", "/api/comments/?post_id=5") => created(comment_json(12, "me", "third")),
        _ => status(StatusCode::NOT_FOUND),
    })
}

#[tokio::test]
async fn test_new_comment_goes_on_top() {
    let view = PostView::new(api_for(thread_server()).await, 5);
    view.load().await;

    let outcome = view.add_comment("third").await.unwrap();
    assert!(matches!(outcome, CommentOutcome::Added(ref c) if c.id == 12));

    assert_eq!(view.load_more_comments().await.unwrap(), LoadMore::Appended(1));
    let ids: Vec<_> = view.comments().items().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![12, 11, 10, 9]);
}

#[tokio::test]
async fn test_blank_comment_is_rejected_with_text_message() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/posts/5/") => ok(post_json(5, "ann")),
        ("GET", "/api/comments/?post_id=5") => page(vec![], None),
        ("POST", _) => bad_request(json!({ "text": ["This field may not be blank."] })),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = PostView::new(api_for(server).await, 5);
    view.load().await;

    let outcome = view.add_comment("").await.unwrap();
    assert_eq!(
        outcome,
        CommentOutcome::Rejected("This field may not be blank.".to_string())
    );
    assert!(view.comments().is_empty());
}

// ============================================================================
// ProfileListView and IncomingRequestsView
// ============================================================================

#[tokio::test]
async fn test_failed_page_closes_profile_list() {
    let server = FakeServer::new(|_, path| match path {
        "/api/users/ann/followers/" => page(
            vec![short_profile("bob")],
            Some("http://api.test/api/users/ann/followers/?cursor=2"),
        ),
        _ => status(StatusCode::INTERNAL_SERVER_ERROR),
    });
    let view = ProfileListView::new(
        api_for(server).await,
        ProfileListKind::Followers("ann".to_string()),
    );
    view.load().await.unwrap();
    assert_eq!(view.profiles().len(), 1);

    assert!(view.load_more().await.is_err());
    assert!(view.is_closed());
    assert_eq!(view.load_more().await.unwrap(), LoadMore::Exhausted);
}

#[tokio::test]
async fn test_likes_list() {
    let server = FakeServer::new(|_, path| match path {
        "/api/likes/?post_id=3" => page(vec![short_profile("bob"), short_profile("cid")], None),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = ProfileListView::new(api_for(server).await, ProfileListKind::Likes(3));
    view.load().await.unwrap();

    let names: Vec<_> = view.profiles().items().into_iter().map(|p| p.username).collect();
    assert_eq!(names, vec!["bob", "cid"]);
}

#[tokio::test]
async fn test_accept_removes_pending_entry() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/users/pending_followers/") => ok(json!([short_profile("bob"), short_profile("cid")])),
        ("PUT", "/api/users/bob/accept/") => status(StatusCode::OK),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = IncomingRequestsView::new(api_for(server).await);
    view.load().await;

    assert_eq!(view.accept("bob").await.unwrap(), Delivery::Delivered(true));
    assert!(view.reject("zed").await.unwrap_err().is_not_found());
    assert_eq!(view.pending().len(), 1);
}

#[tokio::test]
async fn test_pending_requests_follow_cursor() {
    let server = FakeServer::new(|method, path| match (method.as_str(), path) {
        ("GET", "/api/users/pending_followers/") => page(
            vec![short_profile("bob")],
            Some("http://api.test/api/users/pending_followers/?cursor=cD0x"),
        ),
        ("GET", "/api/users/pending_followers/?cursor=cD0x") => page(vec![short_profile("cid")], None),
        _ => status(StatusCode::NOT_FOUND),
    });
    let view = IncomingRequestsView::new(api_for(server).await);
    view.load().await;

    assert_eq!(view.load_more().await.unwrap(), LoadMore::Appended(1));
    assert_eq!(view.load_more().await.unwrap(), LoadMore::Exhausted);
    let names: Vec<_> = view.pending().items().into_iter().map(|p| p.username).collect();
    assert_eq!(names, vec!["bob", "cid"]);
}
