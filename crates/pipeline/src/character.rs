//! Character portrait-set orchestration.
//!
//! A character owns up to [`PORTRAIT_SLOT_COUNT`] portrait images, one
//! per fixed prompt template. This manager fires the slot generations
//! in parallel, joins them, and only then replaces the stored set in a
//! single write, so readers never observe a half-old-half-new mixture.
//!
//! Concurrency contract: at most one generation run per character at a
//! time. A second request while one is in flight must be rejected or
//! queued by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use inkstrip_core::portrait_state::{classify_result, PortraitSetStatus};
use inkstrip_core::prompts::{self, PORTRAIT_SLOT_COUNT};
use inkstrip_core::types::DbId;
use inkstrip_core::validate::require_non_blank;
use inkstrip_db::models::character::{Character, CreateCharacter, UpdateCharacter};
use inkstrip_db::models::portrait::{CreatePortrait, Portrait};
use inkstrip_db::repositories::{CharacterRepo, PortraitRepo, SeriesRepo};
use inkstrip_events::{EventBus, StudioEvent};
use inkstrip_gemini::{
    generate_with_retry, GenerateError, GenerateRequest, GenerateService, GeneratedImage,
    ReferenceImage, RetryConfig, RetryNotice,
};
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::normalize::{normalize, NormalizeConfig};
use crate::reference;

/// One slot generation to run: prompt plus conditioning references.
struct SlotJob {
    slot: usize,
    prompt: String,
    references: Vec<ReferenceImage>,
}

/// Orchestrates portrait generation, regeneration, and deletion for
/// characters.
pub struct CharacterAssetManager {
    pool: PgPool,
    service: Arc<dyn GenerateService>,
    events: Arc<EventBus>,
    retry: RetryConfig,
    normalize: NormalizeConfig,
}

impl CharacterAssetManager {
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

    /// Create a character (or update an existing one's metadata), then
    /// regenerate its full portrait set.
    ///
    /// Metadata is persisted first, so the character exists even if
    /// every generation attempt later fails.
    pub async fn create_or_update(
        &self,
        series_id: DbId,
        character_id: Option<DbId>,
        name: &str,
        description: &str,
    ) -> Result<Character, PipelineError> {
        require_non_blank("name", name)?;
        require_non_blank("description", description)?;

        let series = SeriesRepo::find_by_id(&self.pool, series_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "series",
                id: series_id,
            })?;

        let character = match character_id {
            Some(id) => CharacterRepo::update(
                &self.pool,
                id,
                &UpdateCharacter {
                    name: Some(name.to_string()),
                    description: Some(description.to_string()),
                },
            )
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "character",
                id,
            })?,
            None => {
                CharacterRepo::create(
                    &self.pool,
                    &CreateCharacter {
                        series_id,
                        name: name.to_string(),
                        description: description.to_string(),
                    },
                )
                .await?
            }
        };

        self.run_full_generation(&character, &series.style).await
    }

    /// Regenerate a character's portraits.
    ///
    /// With `keep_only_selected` and a non-empty selection, the
    /// selected slot images are retained verbatim and only the
    /// remaining slots are regenerated, conditioned on the selected
    /// images plus optional free-text guidance. Otherwise the whole
    /// set is regenerated from a cold start and prior images are
    /// discarded.
    pub async fn regenerate(
        &self,
        character_id: DbId,
        selected_slots: &[usize],
        guidance: Option<&str>,
        keep_only_selected: bool,
    ) -> Result<Character, PipelineError> {
        let character = CharacterRepo::find_by_id(&self.pool, character_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "character",
                id: character_id,
            })?;
        let series = SeriesRepo::find_by_id(&self.pool, character.series_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "series",
                id: character.series_id,
            })?;

        if keep_only_selected && !selected_slots.is_empty() {
            self.run_partial_regeneration(&character, &series.style, selected_slots, guidance)
                .await
        } else {
            self.run_full_generation(&character, &series.style).await
        }
    }

    /// Delete a character and all of its portraits as one atomic unit.
    pub async fn delete(&self, character_id: DbId) -> Result<(), PipelineError> {
        let exists = CharacterRepo::find_by_id(&self.pool, character_id)
            .await?
            .is_some();
        if !exists {
            return Err(PipelineError::NotFound {
                entity: "character",
                id: character_id,
            });
        }

        CharacterRepo::delete_with_portraits(&self.pool, character_id)
            .await
            .map_err(PipelineError::Consistency)?;

        self.events.publish(
            StudioEvent::new("character.deleted").with_source("character", character_id),
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Generation runs
    // -----------------------------------------------------------------

    /// Cold-start generation of all slots. Prior images are replaced by
    /// whatever this run produces; failed slots are simply absent from
    /// the new set (degraded state, documented, not auto-repaired).
    async fn run_full_generation(
        &self,
        character: &Character,
        style: &str,
    ) -> Result<Character, PipelineError> {
        self.begin_generation(character.id).await?;

        let jobs = prompts::portrait_prompts(style, &character.description)
            .into_iter()
            .enumerate()
            .map(|(slot, prompt)| SlotJob {
                slot,
                prompt,
                references: Vec::new(),
            })
            .collect();
        let results = self.generate_slots(character.id, jobs).await;

        let mut new_set = Vec::new();
        for (slot, result) in results {
            if let Some(portrait) = self.normalized_portrait(character.id, slot, result) {
                new_set.push(portrait);
            }
        }

        self.commit_set(character.id, new_set).await
    }

    /// Guided regeneration: keep the selected slots verbatim, regenerate
    /// the rest conditioned on the selected images.
    async fn run_partial_regeneration(
        &self,
        character: &Character,
        style: &str,
        selected_slots: &[usize],
        guidance: Option<&str>,
    ) -> Result<Character, PipelineError> {
        let existing = PortraitRepo::list_by_character(&self.pool, character.id).await?;
        let references = reference::selected_portrait_references(&existing, selected_slots);
        let by_slot: HashMap<usize, &Portrait> = existing
            .iter()
            .map(|p| (p.slot_index as usize, p))
            .collect();

        self.begin_generation(character.id).await?;

        let mut new_set = Vec::new();
        let mut jobs = Vec::new();
        for slot in 0..PORTRAIT_SLOT_COUNT {
            if selected_slots.contains(&slot) {
                // Selected slots are never regenerated.
                if let Some(&kept) = by_slot.get(&slot) {
                    new_set.push(clone_portrait(kept));
                }
            } else {
                let base = prompts::portrait_prompt(slot, style, &character.description);
                jobs.push(SlotJob {
                    slot,
                    prompt: prompts::guided_portrait_prompt(&base, guidance),
                    references: references.clone(),
                });
            }
        }

        let results = self.generate_slots(character.id, jobs).await;
        for (slot, result) in results {
            match self.normalized_portrait(character.id, slot, result) {
                Some(portrait) => new_set.push(portrait),
                // A failed slot keeps its prior image when one exists.
                None => {
                    if let Some(&prior) = by_slot.get(&slot) {
                        new_set.push(clone_portrait(prior));
                    }
                }
            }
        }

        new_set.sort_by_key(|p| p.slot_index);
        self.commit_set(character.id, new_set).await
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    async fn begin_generation(&self, character_id: DbId) -> Result<(), PipelineError> {
        CharacterRepo::set_image_status(
            &self.pool,
            character_id,
            PortraitSetStatus::Generating.as_str(),
        )
        .await?;
        self.events.publish(
            StudioEvent::new("character.images.generating")
                .with_source("character", character_id),
        );
        Ok(())
    }

    /// Fan out the slot generations, then join. Results come back in
    /// job order; each carries its slot index.
    async fn generate_slots(
        &self,
        character_id: DbId,
        jobs: Vec<SlotJob>,
    ) -> Vec<(usize, Result<GeneratedImage, GenerateError>)> {
        let tasks = jobs.into_iter().map(|job| {
            let SlotJob {
                slot,
                prompt,
                references,
            } = job;
            let service = Arc::clone(&self.service);
            let events = Arc::clone(&self.events);
            let retry = self.retry.clone();

            async move {
                let request = GenerateRequest::new(prompt).with_references(references);
                let observer = move |notice: RetryNotice| {
                    events.publish(
                        StudioEvent::new("generation.retry")
                            .with_source("character", character_id)
                            .with_payload(serde_json::json!({
                                "slot": slot,
                                "attempt": notice.attempt,
                                "max_attempts": notice.max_attempts,
                                "delay_ms": notice.delay.as_millis() as u64,
                            })),
                    );
                };
                let result =
                    generate_with_retry(service.as_ref(), &request, &retry, Some(&observer)).await;
                (slot, result)
            }
        });

        join_all(tasks).await
    }

    /// Normalize one slot result, or `None` if the slot failed.
    fn normalized_portrait(
        &self,
        character_id: DbId,
        slot: usize,
        result: Result<GeneratedImage, GenerateError>,
    ) -> Option<CreatePortrait> {
        let image = match result {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(
                    character_id,
                    slot,
                    error = %e,
                    "Portrait slot failed after retries",
                );
                return None;
            }
        };
        match normalize(&image.data, &self.normalize) {
            Ok(n) => Some(CreatePortrait {
                character_id,
                slot_index: slot as i32,
                mime_type: n.mime_type,
                data: n.data,
                width: Some(n.width as i32),
                height: Some(n.height as i32),
            }),
            Err(e) => {
                tracing::warn!(
                    character_id,
                    slot,
                    error = %e,
                    "Discarding undecodable portrait",
                );
                None
            }
        }
    }

    /// Single persistence step after the join: replace the stored set,
    /// then mark the character ready or degraded.
    async fn commit_set(
        &self,
        character_id: DbId,
        new_set: Vec<CreatePortrait>,
    ) -> Result<Character, PipelineError> {
        PortraitRepo::replace_set(&self.pool, character_id, &new_set)
            .await
            .map_err(PipelineError::Consistency)?;

        let status = classify_result(new_set.len());
        CharacterRepo::set_image_status(&self.pool, character_id, status.as_str()).await?;

        let event_type = match status {
            PortraitSetStatus::Ready => "character.images.ready",
            _ => "character.images.degraded",
        };
        self.events.publish(
            StudioEvent::new(event_type)
                .with_source("character", character_id)
                .with_payload(serde_json::json!({ "stored": new_set.len() })),
        );

        tracing::info!(
            character_id,
            stored = new_set.len(),
            status = status.as_str(),
            "Portrait set committed",
        );

        CharacterRepo::find_by_id(&self.pool, character_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "character",
                id: character_id,
            })
    }
}

/// Re-insertable copy of a stored portrait (kept slots keep their bytes
/// verbatim).
fn clone_portrait(portrait: &Portrait) -> CreatePortrait {
    CreatePortrait {
        character_id: portrait.character_id,
        slot_index: portrait.slot_index,
        mime_type: portrait.mime_type.clone(),
        data: portrait.data.clone(),
        width: portrait.width,
        height: portrait.height,
    }
}
