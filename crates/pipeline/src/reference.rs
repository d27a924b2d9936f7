//! Reference-context assembly for generation calls.
//!
//! Computes, for a given generation intent, the ordered list of
//! reference images conditioning the call:
//!
//! - Character cold start / full regeneration: no references.
//! - Character partial regeneration: the kept slot images, ascending
//!   slot order.
//! - Panel generation: every portrait of every present character in
//!   character-list order, then up to two continuity panels captured
//!   at operation start.

use inkstrip_db::models::panel::Panel;
use inkstrip_db::models::portrait::Portrait;
use inkstrip_gemini::ReferenceImage;

/// Reference image from a stored portrait.
pub fn portrait_reference(portrait: &Portrait) -> ReferenceImage {
    ReferenceImage {
        mime_type: portrait.mime_type.clone(),
        data: portrait.data.clone(),
    }
}

/// Reference image from a stored panel.
pub fn panel_reference(panel: &Panel) -> ReferenceImage {
    ReferenceImage {
        mime_type: panel.mime_type.clone(),
        data: panel.image_data.clone(),
    }
}

/// References for guided portrait regeneration: the selected slot
/// images in ascending slot-index order.
///
/// `portraits` must be the character's stored set sorted by slot;
/// selected slots with no stored image contribute nothing.
pub fn selected_portrait_references(
    portraits: &[Portrait],
    selected_slots: &[usize],
) -> Vec<ReferenceImage> {
    portraits
        .iter()
        .filter(|p| selected_slots.contains(&(p.slot_index as usize)))
        .map(portrait_reference)
        .collect()
}

/// References for panel generation: (a) all portraits of each present
/// character, in character-list order, then (b) the continuity panels.
pub fn panel_generation_references(
    portrait_sets: &[Vec<Portrait>],
    continuity: &[Panel],
) -> Vec<ReferenceImage> {
    let mut references: Vec<ReferenceImage> = portrait_sets
        .iter()
        .flat_map(|set| set.iter().map(portrait_reference))
        .collect();
    references.extend(continuity.iter().map(panel_reference));
    references
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
