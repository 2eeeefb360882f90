/// Art style catalog
///
/// Each style contributes a prompt fragment appended to every scene prompt.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtStyle {
    /// Display name, unique within the catalog
    pub name: &'static str,

    /// Fragment appended to the user's prompt
    pub prompt: &'static str,

    /// Preview image shown by style pickers
    pub thumbnail: &'static str,
}

pub const ART_STYLES: &[ArtStyle] = &[
    ArtStyle {
        name: "Cinematic",
        prompt: "cinematic, hyper-detailed, epic lighting, 8k",
        thumbnail: "https://picsum.photos/seed/cinematic/100/100",
    },
    ArtStyle {
        name: "Anime",
        prompt: "anime style, vibrant colors, detailed background, studio ghibli inspired",
        thumbnail: "https://picsum.photos/seed/anime/100/100",
    },
    ArtStyle {
        name: "Surreal",
        prompt: "surrealism, dreamlike, abstract, imaginative, salvador dali style",
        thumbnail: "https://picsum.photos/seed/surreal/100/100",
    },
    ArtStyle {
        name: "Pixel Art",
        prompt: "pixel art, 16-bit, retro video game style, detailed sprites",
        thumbnail: "https://picsum.photos/seed/pixel/100/100",
    },
    ArtStyle {
        name: "Watercolor",
        prompt: "watercolor painting, soft edges, blended colors, beautiful gradients",
        thumbnail: "https://picsum.photos/seed/watercolor/100/100",
    },
];

/// First catalog entry; selected when a session starts.
pub fn default_style() -> &'static ArtStyle {
    &ART_STYLES[0]
}

/// Look up a style by name, ignoring case and surrounding whitespace.
pub fn find_style(name: &str) -> Option<&'static ArtStyle> {
    let name = name.trim();
    ART_STYLES
        .iter()
        .find(|style| style.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let names: HashSet<_> = ART_STYLES.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), ART_STYLES.len());
    }

    #[test]
    fn test_find_style() {
        assert_eq!(find_style("pixel art").unwrap().name, "Pixel Art");
        assert_eq!(find_style(" Anime ").unwrap().prompt, ART_STYLES[1].prompt);
        assert!(find_style("Baroque").is_none());
    }

    #[test]
    fn test_default_style_is_first() {
        assert_eq!(default_style().name, "Cinematic");
    }
}
