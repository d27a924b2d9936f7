//! Panel sequence orchestration.
//!
//! Panels of an episode form a contiguous zero-based sequence. This
//! manager generates panel images conditioned on character portraits
//! and preceding-panel continuity, normalizes them, and commits writes
//! so that a generation failure never leaves a partial panel behind.
//!
//! Concurrency contract: at most one in-flight operation per panel at
//! a time. A second edit of the same panel while one is running must
//! be rejected or queued by the caller.

use std::sync::Arc;

use inkstrip_core::ordering::{continuity_range, ContinuityMode};
use inkstrip_core::prompts::{self, CharacterBrief};
use inkstrip_core::types::DbId;
use inkstrip_core::validate::require_non_blank;
use inkstrip_db::models::panel::{Panel, PanelContent};
use inkstrip_db::models::portrait::Portrait;
use inkstrip_db::repositories::{CharacterRepo, EpisodeRepo, PanelRepo, PortraitRepo, SeriesRepo};
use inkstrip_events::{EventBus, StudioEvent};
use inkstrip_gemini::{
    generate_with_retry, GenerateRequest, GenerateService, RetryConfig, RetryNotice,
};
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::normalize::{normalize, NormalizeConfig};
use crate::reference;

/// Resolved inputs for one panel generation call.
struct PanelContext {
    style: String,
    briefs: Vec<(String, String)>,
    portrait_sets: Vec<Vec<Portrait>>,
}

/// Orchestrates create, regenerate-in-place, and delete-with-renumber
/// for episode panels.
pub struct PanelSequenceManager {
    pool: PgPool,
    service: Arc<dyn GenerateService>,
    events: Arc<EventBus>,
    retry: RetryConfig,
    normalize: NormalizeConfig,
}

impl PanelSequenceManager {
    pub fn new(pool: PgPool, service: Arc<dyn GenerateService>, events: Arc<EventBus>) -> Self {
        Self {
            pool,
            service,
            events,
            retry: RetryConfig::default(),
            normalize: NormalizeConfig::default(),
        }
    }

    /// Override the retry strategy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Override the normalization parameters.
    pub fn with_normalize_config(mut self, normalize: NormalizeConfig) -> Self {
        self.normalize = normalize;
        self
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Generate a new panel and append it to the episode.
    ///
    /// Continuity references are the last two panels currently in the
    /// episode. If generation exhausts its retries nothing is written.
    pub async fn create_panel(
        &self,
        episode_id: DbId,
        scene_description: &str,
        dialogue: &str,
        character_ids: &[DbId],
    ) -> Result<Panel, PipelineError> {
        require_non_blank("scene_description", scene_description)?;

        let episode = EpisodeRepo::find_by_id(&self.pool, episode_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "episode",
                id: episode_id,
            })?;

        let context = self.load_context(episode.series_id, character_ids).await?;
        let panels = PanelRepo::list_by_episode(&self.pool, episode_id).await?;
        let continuity = &panels[continuity_range(panels.len(), ContinuityMode::Append)];

        let content = self
            .generate_panel_image(
                episode_id,
                &context,
                continuity,
                scene_description,
                dialogue,
                character_ids,
            )
            .await?;

        let panel = PanelRepo::create(&self.pool, episode_id, &content).await?;

        self.events.publish(
            StudioEvent::new("panel.created")
                .with_source("panel", panel.id)
                .with_payload(serde_json::json!({ "order": panel.sort_order })),
        );
        tracing::info!(
            panel_id = panel.id,
            episode_id,
            order = panel.sort_order,
            "Panel created",
        );
        Ok(panel)
    }

    /// Regenerate an existing panel in place.
    ///
    /// Continuity references are the two panels immediately before this
    /// panel's position at the time editing started; they are not
    /// recomputed even if siblings change while generation retries.
    /// The panel's `sort_order` is preserved.
    pub async fn edit_panel(
        &self,
        panel_id: DbId,
        scene_description: &str,
        dialogue: &str,
        character_ids: &[DbId],
    ) -> Result<Panel, PipelineError> {
        require_non_blank("scene_description", scene_description)?;

        let panel = PanelRepo::find_by_id(&self.pool, panel_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "panel",
                id: panel_id,
            })?;
        let episode = EpisodeRepo::find_by_id(&self.pool, panel.episode_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "episode",
                id: panel.episode_id,
            })?;

        let context = self.load_context(episode.series_id, character_ids).await?;

        // Capture the continuity window at the edited position now;
        // nothing below recomputes it.
        let panels = PanelRepo::list_by_episode(&self.pool, panel.episode_id).await?;
        let position = panel.sort_order as usize;
        let continuity = &panels[continuity_range(panels.len(), ContinuityMode::EditAt(position))];

        let content = self
            .generate_panel_image(
                panel.episode_id,
                &context,
                continuity,
                scene_description,
                dialogue,
                character_ids,
            )
            .await?;

        let updated = PanelRepo::update_content(&self.pool, panel_id, &content)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "panel",
                id: panel_id,
            })?;

        self.events.publish(
            StudioEvent::new("panel.updated")
                .with_source("panel", panel_id)
                .with_payload(serde_json::json!({ "order": updated.sort_order })),
        );
        Ok(updated)
    }

    /// Delete a panel; surviving siblings are renumbered in the same
    /// atomic batch so orders stay contiguous from 0.
    pub async fn delete_panel(&self, panel_id: DbId) -> Result<(), PipelineError> {
        let deleted = PanelRepo::delete_with_renumber(&self.pool, panel_id)
            .await
            .map_err(PipelineError::Consistency)?;
        if !deleted {
            return Err(PipelineError::NotFound {
                entity: "panel",
                id: panel_id,
            });
        }

        self.events
            .publish(StudioEvent::new("panel.deleted").with_source("panel", panel_id));
        Ok(())
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    /// Resolve the series style and, for every present character (in
    /// list order), its metadata and stored portraits.
    async fn load_context(
        &self,
        series_id: DbId,
        character_ids: &[DbId],
    ) -> Result<PanelContext, PipelineError> {
        let series = SeriesRepo::find_by_id(&self.pool, series_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "series",
                id: series_id,
            })?;

        let mut briefs = Vec::with_capacity(character_ids.len());
        let mut portrait_sets = Vec::with_capacity(character_ids.len());
        for &character_id in character_ids {
            let character = CharacterRepo::find_by_id(&self.pool, character_id)
                .await?
                .ok_or(PipelineError::NotFound {
                    entity: "character",
                    id: character_id,
                })?;
            portrait_sets.push(PortraitRepo::list_by_character(&self.pool, character_id).await?);
            briefs.push((character.name, character.description));
        }

        Ok(PanelContext {
            style: series.style,
            briefs,
            portrait_sets,
        })
    }

    /// Build the prompt and references, call the service with retries,
    /// and normalize the result into persistable content.
    async fn generate_panel_image(
        &self,
        episode_id: DbId,
        context: &PanelContext,
        continuity: &[Panel],
        scene_description: &str,
        dialogue: &str,
        character_ids: &[DbId],
    ) -> Result<PanelContent, PipelineError> {
        let briefs: Vec<CharacterBrief<'_>> = context
            .briefs
            .iter()
            .map(|(name, description)| CharacterBrief { name, description })
            .collect();
        let prompt = prompts::panel_prompt(&context.style, scene_description, dialogue, &briefs);
        let references =
            reference::panel_generation_references(&context.portrait_sets, continuity);

        let request = GenerateRequest::new(prompt).with_references(references);
        let events = Arc::clone(&self.events);
        let observer = move |notice: RetryNotice| {
            events.publish(
                StudioEvent::new("generation.retry")
                    .with_source("episode", episode_id)
                    .with_payload(serde_json::json!({
                        "attempt": notice.attempt,
                        "max_attempts": notice.max_attempts,
                        "delay_ms": notice.delay.as_millis() as u64,
                    })),
            );
        };

        let image =
            generate_with_retry(self.service.as_ref(), &request, &self.retry, Some(&observer))
                .await?;
        let normalized = normalize(&image.data, &self.normalize)?;

        Ok(PanelContent {
            scene_description: scene_description.to_string(),
            dialogue: dialogue.to_string(),
            character_ids: character_ids.to_vec(),
            mime_type: normalized.mime_type,
            image_data: normalized.data,
            width: Some(normalized.width as i32),
            height: Some(normalized.height as i32),
        })
    }
}
