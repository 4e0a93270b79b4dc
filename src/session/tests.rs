//! Session Integration Tests
//!
//! Drives the admin session against the in-memory backend and checks the
//! reconciliation guarantees: dirty-gated saves, eager structural writes,
//! the all-or-nothing batch commit and the media attachment workflow.

use uuid::Uuid;

use crate::domain::{Memory, MemoryKind, Track};
use crate::session::{AdminSession, AttachmentPhase};
use crate::store::LocalStore;

fn memory(id: i64, caption: &str, owner: Uuid) -> Memory {
    let mut m = Memory::new(id, MemoryKind::Image, owner);
    m.caption = caption.to_string();
    m
}

fn track(id: i64, name: &str, playlist: i32, owner: Uuid) -> Track {
    let mut t = Track::new(id, owner);
    t.name = name.to_string();
    t.playlist = playlist;
    t
}

/// Two memories, one category, one track and a title, freshly loaded
async fn setup() -> (LocalStore, AdminSession, Uuid) {
    let store = LocalStore::new();
    let owner = Uuid::new_v4();

    store
        .memories
        .seed(vec![memory(5, "before", owner), memory(6, "other", owner)]);
    store.categories.seed(vec![{
        let mut c = crate::domain::Category::new(1, owner);
        c.name = "Trips".to_string();
        c
    }]);
    store.tracks.seed(vec![track(1, "Song", 1, owner)]);
    store.title.seed(owner, "Memory Keeper");

    let session = AdminSession::load(store.stores(), owner)
        .await
        .expect("load failed");
    (store, session, owner)
}

#[tokio::test]
async fn test_load_seeds_draft_and_baseline_identically() {
    let (_store, session, owner) = setup().await;

    assert_eq!(session.draft(), session.baseline());
    assert_eq!(session.draft().memories.len(), 2);
    assert_eq!(session.draft().title, "Memory Keeper");
    assert_eq!(session.owner(), owner);
    assert!(!session.has_changes());
}

#[tokio::test]
async fn test_load_failure_surfaces() {
    let store = LocalStore::new();
    store.memories.refuse_lists();

    let result = AdminSession::load(store.stores(), Uuid::new_v4()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_caption_edit_saves_exactly_one_update() {
    let (store, mut session, _owner) = setup().await;

    session
        .edit_memory(5, |m| m.caption = "after".to_string())
        .expect("edit failed");
    assert!(session.has_changes());

    session.save().await.expect("save failed");

    assert_eq!(store.memories.updated_ids(), vec![5]);
    assert!(store.categories.updated_ids().is_empty());
    assert!(store.tracks.updated_ids().is_empty());
    assert_eq!(store.title.update_count(), 0);

    assert!(!session.has_changes());
    assert_eq!(session.baseline(), session.draft());
    assert_eq!(store.memories.all()[0].caption, "after");
}

#[tokio::test]
async fn test_second_save_issues_no_writes() {
    let (store, mut session, _owner) = setup().await;

    session
        .edit_memory(5, |m| m.caption = "after".to_string())
        .unwrap();
    session.save().await.unwrap();
    store.memories.clear_update_log();

    session.save().await.expect("second save failed");
    assert!(store.memories.updated_ids().is_empty());
    assert_eq!(store.title.update_count(), 0);
}

#[tokio::test]
async fn test_title_edit_saves_once() {
    let (store, mut session, _owner) = setup().await;

    session.set_title("Our Story");
    assert!(session.has_changes());

    session.save().await.expect("save failed");
    assert_eq!(store.title.update_count(), 1);
    assert!(!session.has_changes());

    session.save().await.expect("second save failed");
    assert_eq!(store.title.update_count(), 1);
}

#[tokio::test]
async fn test_edits_across_collections_fan_out() {
    let (store, mut session, _owner) = setup().await;

    session
        .edit_memory(6, |m| m.caption = "renamed".to_string())
        .unwrap();
    session
        .edit_category(1, |c| c.description = "places we went".to_string())
        .unwrap();
    session.edit_track(1, |t| t.playlist = 3).unwrap();
    session.set_title("Everything");

    session.save().await.expect("save failed");

    assert_eq!(store.memories.updated_ids(), vec![6]);
    assert_eq!(store.categories.updated_ids(), vec![1]);
    assert_eq!(store.tracks.updated_ids(), vec![1]);
    assert_eq!(store.title.update_count(), 1);
    assert!(!session.has_changes());
}

#[tokio::test]
async fn test_edit_cannot_change_id() {
    let (_store, mut session, _owner) = setup().await;

    session
        .edit_memory(5, |m| {
            m.id = 400;
            m.caption = "after".to_string();
        })
        .unwrap();

    assert!(session.draft().memories.iter().any(|m| m.id == 5));
    assert!(!session.draft().memories.iter().any(|m| m.id == 400));
}

#[tokio::test]
async fn test_edit_unknown_record_is_not_found() {
    let (_store, mut session, _owner) = setup().await;
    let result = session.edit_memory(404, |m| m.caption = "x".to_string());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_create_is_eager_and_clean() {
    let (store, mut session, owner) = setup().await;

    let created = session.add_category().await.expect("create failed");

    assert!(created.id > 0);
    assert_eq!(created.owner, owner);
    assert!(session.draft().categories.iter().any(|c| c.id == created.id));
    assert!(session
        .baseline()
        .categories
        .iter()
        .any(|c| c.id == created.id));
    assert!(!session.has_changes());

    // Nothing to flush: the new record is already synced
    session.save().await.expect("save failed");
    assert!(store.categories.updated_ids().is_empty());
}

#[tokio::test]
async fn test_create_failure_leaves_snapshots_untouched() {
    let (store, mut session, _owner) = setup().await;
    store.categories.refuse_creates();

    assert!(session.add_category().await.is_err());
    assert_eq!(session.draft().categories.len(), 1);
    assert_eq!(session.baseline().categories.len(), 1);
    assert!(!session.has_changes());
}

#[tokio::test]
async fn test_delete_removes_from_both_snapshots() {
    let (store, mut session, _owner) = setup().await;

    session.remove_memory(6).await.expect("delete failed");

    assert!(!session.draft().memories.iter().any(|m| m.id == 6));
    assert!(!session.baseline().memories.iter().any(|m| m.id == 6));
    assert!(!session.has_changes());
    assert_eq!(store.memories.all().len(), 1);
}

#[tokio::test]
async fn test_delete_failure_keeps_record() {
    let (store, mut session, _owner) = setup().await;
    store.tracks.refuse_deletes();

    assert!(session.remove_track(1).await.is_err());
    assert!(session.draft().tracks.iter().any(|t| t.id == 1));
    assert!(session.baseline().tracks.iter().any(|t| t.id == 1));
}

#[tokio::test]
async fn test_failed_batch_does_not_commit() {
    let (store, mut session, _owner) = setup().await;

    session
        .edit_memory(5, |m| m.caption = "after".to_string())
        .unwrap();
    session
        .edit_memory(6, |m| m.caption = "changed".to_string())
        .unwrap();
    store.memories.refuse_updates_for(6);

    assert!(session.save().await.is_err());

    // The baseline stayed put, so everything is still dirty
    assert!(session.has_changes());
    let baseline_five = session
        .baseline()
        .memories
        .iter()
        .find(|m| m.id == 5)
        .unwrap();
    assert_eq!(baseline_five.caption, "before");

    // A later save recomputes the same dirty set and resends it, including
    // any record whose remote write already went through.
    store.memories.accept_all_updates();
    store.memories.clear_update_log();
    session.save().await.expect("retry save failed");

    let mut resent = store.memories.updated_ids();
    resent.sort_unstable();
    assert_eq!(resent, vec![5, 6]);
    assert!(!session.has_changes());
}

#[tokio::test]
async fn test_counterpart_less_record_is_skipped_by_save() {
    let (store, mut session, owner) = setup().await;

    // A draft-only record can only appear if creation never round-tripped;
    // the batch writer leaves it alone and the commit absorbs it.
    session.draft.memories.push(memory(99, "orphan", owner));
    assert!(session.has_changes());

    session.save().await.expect("save failed");
    assert!(store.memories.updated_ids().is_empty());
    assert!(!session.has_changes());
}

#[tokio::test]
async fn test_media_attachment_links_both_snapshots() {
    let (store, mut session, _owner) = setup().await;

    let attachment = session
        .attach_memory_media(5, "photo.jpg", vec![1, 2, 3])
        .await
        .expect("attach failed");

    assert_eq!(attachment.phase(), AttachmentPhase::Linked);
    let expected = "local://object/memories_photo/photo.jpg";
    assert_eq!(attachment.url(), Some(expected));

    let draft_url = session
        .draft()
        .memories
        .iter()
        .find(|m| m.id == 5)
        .unwrap()
        .url
        .clone();
    let baseline_url = session
        .baseline()
        .memories
        .iter()
        .find(|m| m.id == 5)
        .unwrap()
        .url
        .clone();
    assert_eq!(draft_url, expected);
    assert_eq!(baseline_url, expected);

    // The link was an eager write, not a pending field edit
    assert!(!session.has_changes());
    assert_eq!(store.memories.updated_ids(), vec![5]);
    assert_eq!(store.uploader.uploads(), vec!["memories_photo/photo.jpg"]);
}

#[tokio::test]
async fn test_failed_upload_leaves_url_unchanged() {
    let (store, mut session, _owner) = setup().await;
    store.uploader.refuse_uploads();

    assert!(session
        .attach_memory_media(5, "photo.jpg", vec![1])
        .await
        .is_err());

    assert!(session
        .draft()
        .memories
        .iter()
        .find(|m| m.id == 5)
        .unwrap()
        .url
        .is_empty());
    assert!(session
        .baseline()
        .memories
        .iter()
        .find(|m| m.id == 5)
        .unwrap()
        .url
        .is_empty());
    assert!(store.memories.updated_ids().is_empty());
}

#[tokio::test]
async fn test_failed_link_leaves_url_unchanged() {
    let (store, mut session, _owner) = setup().await;
    store.memories.refuse_updates_for(5);

    assert!(session
        .attach_memory_media(5, "photo.jpg", vec![1])
        .await
        .is_err());

    // The upload went out but the record kept its placeholder
    assert_eq!(store.uploader.uploads().len(), 1);
    assert!(session
        .draft()
        .memories
        .iter()
        .find(|m| m.id == 5)
        .unwrap()
        .url
        .is_empty());
}

#[tokio::test]
async fn test_track_audio_lands_in_music_bucket() {
    let (store, mut session, _owner) = setup().await;

    let attachment = session
        .attach_track_audio(1, "song.mp3", vec![9, 9])
        .await
        .expect("attach failed");

    assert_eq!(attachment.phase(), AttachmentPhase::Linked);
    assert!(store.uploader.uploads()[0].starts_with("music/"));

    let expected = "local://object/music/song.mp3";
    assert_eq!(
        session
            .draft()
            .tracks
            .iter()
            .find(|t| t.id == 1)
            .unwrap()
            .music_url,
        expected
    );
    assert_eq!(
        session
            .baseline()
            .tracks
            .iter()
            .find(|t| t.id == 1)
            .unwrap()
            .music_url,
        expected
    );
    assert!(!session.has_changes());
}

#[tokio::test]
async fn test_attach_to_unknown_record_is_not_found() {
    let (_store, mut session, _owner) = setup().await;
    let result = session.attach_memory_media(404, "photo.jpg", vec![1]).await;
    assert!(result.is_err());
}
