use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use engagement_service::domain::{OwnerProfile, RelationKind, VideoRecord};
use engagement_service::error::AppError;
use engagement_service::repository::memory::{InMemoryContentStore, InMemoryRelationLedger};
use engagement_service::repository::{ContentStore, RelationLedger};
use engagement_service::services::AggregationEngine;

fn profile(username: &str) -> OwnerProfile {
    OwnerProfile {
        id: Uuid::new_v4(),
        username: username.to_string(),
        full_name: format!("{} Fullname", username),
        avatar_url: Some(format!("https://cdn.test/{}.jpg", username)),
    }
}

fn video(owner_id: Uuid, title: &str, views: i64) -> VideoRecord {
    VideoRecord {
        id: Uuid::new_v4(),
        owner_id,
        title: title.to_string(),
        description: String::new(),
        video_url: "https://cdn.test/video.mp4".to_string(),
        thumbnail_url: "https://cdn.test/thumb.jpg".to_string(),
        duration_secs: 60.0,
        views,
        is_published: true,
        created_at: Utc::now(),
    }
}

struct Fixture {
    ledger: Arc<InMemoryRelationLedger>,
    content: Arc<InMemoryContentStore>,
    engine: AggregationEngine,
}

fn fixture() -> Fixture {
    let ledger = Arc::new(InMemoryRelationLedger::new());
    let content = Arc::new(InMemoryContentStore::new());
    let engine = AggregationEngine::new(
        Arc::clone(&ledger) as Arc<dyn RelationLedger>,
        Arc::clone(&content) as Arc<dyn ContentStore>,
    );

    Fixture {
        ledger,
        content,
        engine,
    }
}

#[tokio::test]
async fn channel_stats_aggregate_over_the_owners_videos() {
    let fx = fixture();
    let owner = profile("creator");
    fx.content.insert_user(owner.clone()).await;

    let v1 = video(owner.id, "first", 10);
    let v2 = video(owner.id, "second", 20);
    let v3 = video(owner.id, "third", 30);
    for v in [&v1, &v2, &v3] {
        fx.content.insert_video(v.clone()).await;
    }

    // v1 gets one like, v2 none, v3 two
    let fans: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    fx.ledger
        .insert(fans[0], v1.id, RelationKind::LikeVideo)
        .await
        .unwrap();
    fx.ledger
        .insert(fans[1], v3.id, RelationKind::LikeVideo)
        .await
        .unwrap();
    fx.ledger
        .insert(fans[2], v3.id, RelationKind::LikeVideo)
        .await
        .unwrap();

    // Two subscribers
    fx.ledger
        .insert(fans[0], owner.id, RelationKind::Subscription)
        .await
        .unwrap();
    fx.ledger
        .insert(fans[1], owner.id, RelationKind::Subscription)
        .await
        .unwrap();

    let stats = fx.engine.channel_stats(owner.id).await.unwrap();
    assert_eq!(stats.subscriber_count, 2);
    assert_eq!(stats.video_count, 3);
    assert_eq!(stats.total_views, 60);
    assert_eq!(stats.total_likes, 3);
}

#[tokio::test]
async fn channel_stats_ignore_other_owners_activity() {
    let fx = fixture();
    let owner = profile("creator");
    let rival = profile("rival");
    fx.content.insert_user(owner.clone()).await;
    fx.content.insert_user(rival.clone()).await;

    let mine = video(owner.id, "mine", 5);
    let theirs = video(rival.id, "theirs", 500);
    fx.content.insert_video(mine.clone()).await;
    fx.content.insert_video(theirs.clone()).await;

    let fan = Uuid::new_v4();
    fx.ledger
        .insert(fan, theirs.id, RelationKind::LikeVideo)
        .await
        .unwrap();
    fx.ledger
        .insert(fan, rival.id, RelationKind::Subscription)
        .await
        .unwrap();

    let stats = fx.engine.channel_stats(owner.id).await.unwrap();
    assert_eq!(stats.subscriber_count, 0);
    assert_eq!(stats.video_count, 1);
    assert_eq!(stats.total_views, 5);
    assert_eq!(stats.total_likes, 0);
}

#[tokio::test]
async fn fresh_channel_yields_zero_stats() {
    let fx = fixture();
    let owner = profile("newcomer");
    fx.content.insert_user(owner.clone()).await;

    let stats = fx.engine.channel_stats(owner.id).await.unwrap();
    assert_eq!(stats.subscriber_count, 0);
    assert_eq!(stats.video_count, 0);
    assert_eq!(stats.total_views, 0);
    assert_eq!(stats.total_likes, 0);
}

#[tokio::test]
async fn unknown_owner_is_not_computable() {
    let fx = fixture();

    let result = fx.engine.channel_stats(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotComputable(_))));
}

#[tokio::test]
async fn liked_videos_come_back_newest_like_first() {
    let fx = fixture();
    let owner = profile("creator");
    let viewer = profile("viewer");
    fx.content.insert_user(owner.clone()).await;
    fx.content.insert_user(viewer.clone()).await;

    let first_liked = video(owner.id, "liked first", 1);
    let second_liked = video(owner.id, "liked second", 2);
    fx.content.insert_video(first_liked.clone()).await;
    fx.content.insert_video(second_liked.clone()).await;

    fx.ledger
        .insert(viewer.id, first_liked.id, RelationKind::LikeVideo)
        .await
        .unwrap();
    fx.ledger
        .insert(viewer.id, second_liked.id, RelationKind::LikeVideo)
        .await
        .unwrap();

    let liked = fx.engine.liked_videos(viewer.id).await.unwrap();
    let ids: Vec<Uuid> = liked.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![second_liked.id, first_liked.id]);
    assert_eq!(liked[0].owner.username, "creator");
}

#[tokio::test]
async fn liked_videos_drop_stale_relations() {
    let fx = fixture();
    let owner = profile("creator");
    let viewer = profile("viewer");
    fx.content.insert_user(owner.clone()).await;
    fx.content.insert_user(viewer.clone()).await;

    let kept = video(owner.id, "kept", 1);
    let removed = video(owner.id, "removed", 2);
    fx.content.insert_video(kept.clone()).await;
    fx.content.insert_video(removed.clone()).await;

    fx.ledger
        .insert(viewer.id, kept.id, RelationKind::LikeVideo)
        .await
        .unwrap();
    fx.ledger
        .insert(viewer.id, removed.id, RelationKind::LikeVideo)
        .await
        .unwrap();

    // Upstream deletes the video; its like stays in the ledger
    fx.content.remove_video(removed.id).await;

    let liked = fx.engine.liked_videos(viewer.id).await.unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].id, kept.id);
}

#[tokio::test]
async fn liked_videos_empty_for_user_with_no_likes() {
    let fx = fixture();
    let liked = fx.engine.liked_videos(Uuid::new_v4()).await.unwrap();
    assert!(liked.is_empty());
}

#[tokio::test]
async fn channel_subscribers_join_profiles_newest_first() {
    let fx = fixture();
    let owner = profile("creator");
    let early = profile("early_fan");
    let late = profile("late_fan");
    fx.content.insert_user(owner.clone()).await;
    fx.content.insert_user(early.clone()).await;
    fx.content.insert_user(late.clone()).await;

    fx.ledger
        .insert(early.id, owner.id, RelationKind::Subscription)
        .await
        .unwrap();
    fx.ledger
        .insert(late.id, owner.id, RelationKind::Subscription)
        .await
        .unwrap();

    let subscribers = fx.engine.channel_subscribers(owner.id).await.unwrap();
    let usernames: Vec<&str> = subscribers
        .iter()
        .map(|s| s.profile.username.as_str())
        .collect();
    assert_eq!(usernames, vec!["late_fan", "early_fan"]);
}

#[tokio::test]
async fn subscribers_without_resolvable_profiles_are_dropped() {
    let fx = fixture();
    let owner = profile("creator");
    let fan = profile("fan");
    fx.content.insert_user(owner.clone()).await;
    fx.content.insert_user(fan.clone()).await;

    fx.ledger
        .insert(fan.id, owner.id, RelationKind::Subscription)
        .await
        .unwrap();
    // Subscription from an account the content store no longer knows
    fx.ledger
        .insert(Uuid::new_v4(), owner.id, RelationKind::Subscription)
        .await
        .unwrap();

    let subscribers = fx.engine.channel_subscribers(owner.id).await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].profile.id, fan.id);
}

#[tokio::test]
async fn subscribed_channels_list_the_channels_a_user_follows() {
    let fx = fixture();
    let fan = profile("fan");
    let channel_a = profile("channel_a");
    let channel_b = profile("channel_b");
    fx.content.insert_user(fan.clone()).await;
    fx.content.insert_user(channel_a.clone()).await;
    fx.content.insert_user(channel_b.clone()).await;

    fx.ledger
        .insert(fan.id, channel_a.id, RelationKind::Subscription)
        .await
        .unwrap();
    fx.ledger
        .insert(fan.id, channel_b.id, RelationKind::Subscription)
        .await
        .unwrap();

    let channels = fx.engine.subscribed_channels(fan.id).await.unwrap();
    let usernames: Vec<&str> = channels
        .iter()
        .map(|s| s.profile.username.as_str())
        .collect();
    assert_eq!(usernames, vec!["channel_b", "channel_a"]);
}
