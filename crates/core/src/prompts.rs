//! Prompt construction for portrait and panel generation.
//!
//! Every prompt that reaches the generation service is assembled here,
//! so the exact wording lives in one place. Portrait slots use fixed
//! templates; panel prompts always carry the series style, the 16:9
//! framing request, and the scene/dialogue text verbatim.

// ---------------------------------------------------------------------------
// Portrait slots
// ---------------------------------------------------------------------------

/// Number of portrait slots per character (one per template below).
pub const PORTRAIT_SLOT_COUNT: usize = 3;

/// Appended to a portrait template when reference images accompany the
/// request during guided regeneration.
pub const CONSISTENCY_SUFFIX: &str =
    " Use these reference images to maintain consistency with the character's appearance.";

/// Build the prompt for one portrait slot.
///
/// Slot roles are fixed: 0 = full-body standing, 1 = shoulders-up
/// portrait, 2 = action pose. Panics if `slot` is out of range; slot
/// indices come from [`PORTRAIT_SLOT_COUNT`]-bounded loops, never from
/// user input.
pub fn portrait_prompt(slot: usize, style: &str, description: &str) -> String {
    match slot {
        0 => format!(
            "Full body character concept art, clear background. Style: \"{style}\". \
             Character: {description}, standing pose, neutral expression."
        ),
        1 => format!(
            "Character portrait, shoulders up. Style: \"{style}\". \
             Character: {description}, smiling."
        ),
        2 => format!(
            "Character concept art, action pose. Style: \"{style}\". Character: {description}."
        ),
        _ => panic!("portrait slot {slot} out of range"),
    }
}

/// Build all [`PORTRAIT_SLOT_COUNT`] portrait prompts in slot order.
pub fn portrait_prompts(style: &str, description: &str) -> Vec<String> {
    (0..PORTRAIT_SLOT_COUNT)
        .map(|slot| portrait_prompt(slot, style, description))
        .collect()
}

/// Append the consistency suffix and optional free-text guidance to a
/// portrait prompt for guided regeneration.
pub fn guided_portrait_prompt(base: &str, guidance: Option<&str>) -> String {
    let mut prompt = format!("{base}{CONSISTENCY_SUFFIX}");
    if let Some(guide) = guidance {
        let guide = guide.trim();
        if !guide.is_empty() {
            prompt.push_str(&format!(" Additional instructions: {guide}"));
        }
    }
    prompt
}

// ---------------------------------------------------------------------------
// Panel prompts
// ---------------------------------------------------------------------------

/// Name/description pair for a character present in a panel.
#[derive(Debug, Clone)]
pub struct CharacterBrief<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// The roster sentence for a panel prompt.
///
/// With characters present, enumerates them and restricts the scene to
/// ONLY those. With none, states explicitly that the scene contains NO
/// characters so the model does not invent any.
fn character_roster(characters: &[CharacterBrief<'_>]) -> String {
    if characters.is_empty() {
        "The scene must contain NO characters. Focus only on the environment and setting described."
            .to_string()
    } else {
        let listed = characters
            .iter()
            .map(|c| format!("{}: {}", c.name, c.description))
            .collect::<Vec<_>>()
            .join(". ");
        format!("The scene must include ONLY the following characters: {listed}")
    }
}

/// Build the full prompt for a panel generation call.
///
/// Always states the series style, requests 16:9 widescreen framing,
/// and restates the scene description and dialogue verbatim.
pub fn panel_prompt(
    style: &str,
    scene_description: &str,
    dialogue: &str,
    characters: &[CharacterBrief<'_>],
) -> String {
    format!(
        "Comic book panel in the style of: \"{style}\".\n\
         Generate this image in 16:9 aspect ratio (widescreen format, horizontal layout).\n\
         The composition should be optimized for 16:9 viewing with proper horizontal framing.\n\
         {roster}\n\
         Use the provided images as a strong reference for the characters' appearance \
         and the scene's continuity from previous panels.\n\
         Scene description: {scene_description}.\n\
         Dialogue: \"{dialogue}\".\n\
         The image should focus on the action and characters described in the scene, \
         framed appropriately for widescreen display.",
        roster = character_roster(characters),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portrait_prompt_carries_style_and_description() {
        let p = portrait_prompt(0, "ink wash", "a tired detective");
        assert!(p.contains("Full body"));
        assert!(p.contains("\"ink wash\""));
        assert!(p.contains("a tired detective"));
    }

    #[test]
    fn portrait_prompts_one_per_slot() {
        let prompts = portrait_prompts("noir", "a cat");
        assert_eq!(prompts.len(), PORTRAIT_SLOT_COUNT);
        assert!(prompts[1].contains("shoulders up"));
        assert!(prompts[2].contains("action pose"));
    }

    #[test]
    #[should_panic]
    fn portrait_prompt_rejects_out_of_range_slot() {
        portrait_prompt(PORTRAIT_SLOT_COUNT, "s", "d");
    }

    #[test]
    fn guided_prompt_appends_suffix_and_guidance() {
        let p = guided_portrait_prompt("Base prompt.", Some("give him a red scarf"));
        assert!(p.starts_with("Base prompt."));
        assert!(p.contains("maintain consistency"));
        assert!(p.ends_with("Additional instructions: give him a red scarf"));
    }

    #[test]
    fn guided_prompt_skips_blank_guidance() {
        let p = guided_portrait_prompt("Base.", Some("   "));
        assert!(p.ends_with(CONSISTENCY_SUFFIX.trim_start()));
        assert!(!p.contains("Additional instructions"));
    }

    #[test]
    fn guided_prompt_without_guidance() {
        let p = guided_portrait_prompt("Base.", None);
        assert!(!p.contains("Additional instructions"));
    }

    #[test]
    fn panel_prompt_states_style_and_aspect_ratio() {
        let p = panel_prompt("manga", "a rooftop chase", "Stop!", &[]);
        assert!(p.contains("\"manga\""));
        assert!(p.contains("16:9 aspect ratio"));
        assert!(p.contains("Scene description: a rooftop chase."));
        assert!(p.contains("Dialogue: \"Stop!\"."));
    }

    #[test]
    fn panel_prompt_lists_only_present_characters() {
        let chars = [
            CharacterBrief {
                name: "Mira",
                description: "a pilot",
            },
            CharacterBrief {
                name: "Oto",
                description: "a robot",
            },
        ];
        let p = panel_prompt("manga", "hangar", "", &chars);
        assert!(p.contains("ONLY the following characters"));
        assert!(p.contains("Mira: a pilot. Oto: a robot"));
    }

    #[test]
    fn panel_prompt_states_no_characters_when_roster_empty() {
        let p = panel_prompt("manga", "an empty street", "", &[]);
        assert!(p.contains("NO characters"));
        assert!(!p.contains("ONLY the following"));
    }
}
