//! Input fixtures.

use crate::core::{CharacterImage, PipelineInputs, Scene, ScriptInput};

/// `count` scenes with indices `0..count`, alternating two roles.
#[must_use]
pub fn sample_scenes(count: usize) -> Vec<Scene> {
    (0..count)
        .map(|i| {
            let role = if i % 2 == 0 { "HERO" } else { "VILLAIN" };
            Scene::new(i, format!("{role}: line {i}")).with_role(role)
        })
        .collect()
}

/// A text script plus `image_count` small PNG-named images.
#[must_use]
pub fn sample_inputs(script: &str, image_count: usize) -> PipelineInputs {
    (0..image_count).fold(
        PipelineInputs::new().with_script(ScriptInput::from_text("script.txt", script)),
        |inputs, i| inputs.with_image(CharacterImage::new(format!("character_{i}.png"), vec![0x89, b'P', b'N', b'G'])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_scenes() {
        let scenes = sample_scenes(3);
        assert_eq!(scenes.len(), 3);
        assert_eq!(scenes[1].role.as_deref(), Some("VILLAIN"));
    }

    #[test]
    fn test_sample_inputs() {
        let inputs = sample_inputs("HERO: hi", 2);
        assert!(inputs.missing().is_none());
        assert_eq!(inputs.images.len(), 2);
    }
}
