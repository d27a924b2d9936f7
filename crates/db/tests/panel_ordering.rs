//! Integration tests for the panel ordering invariant.
//!
//! After any sequence of create/update/delete operations the set of
//! `sort_order` values for an episode must equal `{0..count-1}`.

use inkstrip_core::ordering;
use inkstrip_db::models::episode::CreateEpisode;
use inkstrip_db::models::panel::PanelContent;
use inkstrip_db::models::series::CreateSeries;
use inkstrip_db::repositories::{EpisodeRepo, PanelRepo, SeriesRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_episode(pool: &PgPool) -> i64 {
    let series = SeriesRepo::create(
        pool,
        &CreateSeries {
            owner_id: "user-1".to_string(),
            title: "Ordering".to_string(),
            style: "ink".to_string(),
        },
    )
    .await
    .unwrap();
    EpisodeRepo::create(
        pool,
        &CreateEpisode {
            series_id: series.id,
            title: "Ep 1".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn content(scene: &str) -> PanelContent {
    PanelContent {
        scene_description: scene.to_string(),
        dialogue: String::new(),
        character_ids: vec![],
        mime_type: "image/jpeg".to_string(),
        image_data: vec![0xEE; 8],
        width: None,
        height: None,
    }
}

async fn orders(pool: &PgPool, episode_id: i64) -> Vec<i32> {
    PanelRepo::list_by_episode(pool, episode_id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.sort_order)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn appends_get_sequential_orders(pool: PgPool) {
    let episode_id = new_episode(&pool).await;

    for i in 0..4 {
        let panel = PanelRepo::create(&pool, episode_id, &content(&format!("scene {i}")))
            .await
            .unwrap();
        assert_eq!(panel.sort_order, i);
    }

    assert_eq!(orders(&pool, episode_id).await, vec![0, 1, 2, 3]);
}

#[sqlx::test]
async fn delete_middle_panel_renumbers_survivors(pool: PgPool) {
    let episode_id = new_episode(&pool).await;

    let mut ids = Vec::new();
    for i in 0..4 {
        let panel = PanelRepo::create(&pool, episode_id, &content(&format!("scene {i}")))
            .await
            .unwrap();
        ids.push(panel.id);
    }

    // Delete the panel at order 1: former orders 0,2,3 become 0,1,2.
    assert!(PanelRepo::delete_with_renumber(&pool, ids[1]).await.unwrap());

    let panels = PanelRepo::list_by_episode(&pool, episode_id).await.unwrap();
    let surviving_ids: Vec<i64> = panels.iter().map(|p| p.id).collect();
    assert_eq!(surviving_ids, vec![ids[0], ids[2], ids[3]]);
    assert_eq!(
        panels.iter().map(|p| p.sort_order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[sqlx::test]
async fn delete_first_and_last_keep_invariant(pool: PgPool) {
    let episode_id = new_episode(&pool).await;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            PanelRepo::create(&pool, episode_id, &content(&format!("scene {i}")))
                .await
                .unwrap()
                .id,
        );
    }

    assert!(PanelRepo::delete_with_renumber(&pool, ids[0]).await.unwrap());
    assert!(PanelRepo::delete_with_renumber(&pool, ids[4]).await.unwrap());

    let remaining = orders(&pool, episode_id).await;
    assert_eq!(remaining, vec![0, 1, 2]);
    assert!(ordering::is_contiguous(&remaining));
}

#[sqlx::test]
async fn delete_then_append_fills_the_tail(pool: PgPool) {
    let episode_id = new_episode(&pool).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(
            PanelRepo::create(&pool, episode_id, &content(&format!("scene {i}")))
                .await
                .unwrap()
                .id,
        );
    }

    assert!(PanelRepo::delete_with_renumber(&pool, ids[1]).await.unwrap());
    let appended = PanelRepo::create(&pool, episode_id, &content("scene new"))
        .await
        .unwrap();

    assert_eq!(appended.sort_order, 2);
    assert!(ordering::is_contiguous(&orders(&pool, episode_id).await));
}

#[sqlx::test]
async fn delete_missing_panel_returns_false(pool: PgPool) {
    let episode_id = new_episode(&pool).await;
    PanelRepo::create(&pool, episode_id, &content("only"))
        .await
        .unwrap();

    assert!(!PanelRepo::delete_with_renumber(&pool, 999_999).await.unwrap());
    assert_eq!(orders(&pool, episode_id).await, vec![0]);
}

#[sqlx::test]
async fn update_content_preserves_order(pool: PgPool) {
    let episode_id = new_episode(&pool).await;

    let first = PanelRepo::create(&pool, episode_id, &content("a")).await.unwrap();
    let second = PanelRepo::create(&pool, episode_id, &content("b")).await.unwrap();

    let updated = PanelRepo::update_content(&pool, first.id, &content("a, revised"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.sort_order, 0);
    assert_eq!(updated.scene_description, "a, revised");
    assert_eq!(
        PanelRepo::find_by_id(&pool, second.id)
            .await
            .unwrap()
            .unwrap()
            .sort_order,
        1
    );
}
