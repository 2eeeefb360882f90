use crate::styles::ArtStyle;

/// Scene prompt for the segment starting at `timestamp` seconds.
///
/// `base` must be non-empty; callers validate it before a run starts.
pub fn build_scene_prompt(base: &str, style: &ArtStyle, timestamp: f64) -> String {
    format!(
        "{}, {}, scene at {} seconds.",
        base,
        style.prompt,
        timestamp.round() as i64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANIME: ArtStyle = ArtStyle {
        name: "Anime",
        prompt: "anime",
        thumbnail: "",
    };

    #[test]
    fn test_prompt_rounds_timestamp() {
        let prompt = build_scene_prompt("cat", &ANIME, 12.7);
        assert!(prompt.contains("cat"));
        assert!(prompt.contains("anime"));
        assert!(prompt.contains("13 seconds"));
    }

    #[test]
    fn test_prompt_layout() {
        assert_eq!(
            build_scene_prompt("a lonely astronaut", &ANIME, 0.0),
            "a lonely astronaut, anime, scene at 0 seconds."
        );
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_scene_prompt("neon city", &ANIME, 25.0);
        let b = build_scene_prompt("neon city", &ANIME, 25.0);
        assert_eq!(a, b);
    }
}
