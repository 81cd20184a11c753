//! Best-effort extraction of titled sections from a free-text model reply.
//!
//! Relies on the model emitting `### <Title>` markers. A title that does not
//! appear yields an empty string; alternate spellings are not guessed.

use once_cell::sync::Lazy;
use regex::Regex;

pub const ROOM_LAYOUT_TITLE: &str = "Room Layout Reconstruction";
pub const FURNITURE_TITLE: &str = "Key Furniture Positions";
pub const FENG_SHUI_TITLE: &str = "Feng Shui Improvements";

static SECTION_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"###\s*").unwrap());

/// The three sections the room analyzer asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSections {
    pub room_layout: String,
    pub furniture_positions: String,
    pub feng_shui_advice: String,
}

pub fn extract_sections(text: &str) -> RoomSections {
    let sections: Vec<&str> = SECTION_DELIMITER.split(text).collect();
    RoomSections {
        room_layout: extract_section(&sections, ROOM_LAYOUT_TITLE),
        furniture_positions: extract_section(&sections, FURNITURE_TITLE),
        feng_shui_advice: extract_section(&sections, FENG_SHUI_TITLE),
    }
}

/// Body of the first section whose trimmed text starts with `title`
/// (ASCII case-insensitive), with the title removed.
pub fn extract_section(sections: &[&str], title: &str) -> String {
    sections
        .iter()
        .map(|section| section.trim())
        .find(|section| starts_with_ignore_case(section, title))
        .map(|section| section[title.len()..].trim().to_string())
        .unwrap_or_default()
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_present_sections() {
        let sections = extract_sections("### Room Layout Reconstruction\nfoo\n### Key Furniture Positions\nbar");
        assert_eq!(sections.room_layout, "foo");
        assert_eq!(sections.furniture_positions, "bar");
        assert_eq!(sections.feng_shui_advice, "");
    }

    #[test]
    fn titles_match_case_insensitively() {
        let text = "Intro text.\n###feng shui improvements\n1. Move the desk.\n2. Add a plant.";
        let sections = extract_sections(text);
        assert_eq!(sections.feng_shui_advice, "1. Move the desk.\n2. Add a plant.");
    }

    #[test]
    fn first_matching_section_wins() {
        let text = "### Key Furniture Positions\nfirst\n### Key Furniture Positions\nsecond";
        assert_eq!(extract_sections(text).furniture_positions, "first");
    }

    #[test]
    fn no_markers_yields_empty_sections() {
        assert_eq!(extract_sections("Room Layout: a square room."), RoomSections {
            room_layout: String::new(),
            furniture_positions: String::new(),
            feng_shui_advice: String::new(),
        });
    }

    #[test]
    fn heading_suffix_stays_with_body() {
        // "### Room Layout Reconstruction:" keeps the colon; no normalization beyond trimming.
        let text = "### Room Layout Reconstruction: An L-shaped room.";
        assert_eq!(extract_sections(text).room_layout, ": An L-shaped room.");
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        assert_eq!(extract_section(&["ü"], ROOM_LAYOUT_TITLE), "");
        assert_eq!(extract_section(&["Room Layout Reconstruction — ok"], ROOM_LAYOUT_TITLE), "— ok");
    }
}
