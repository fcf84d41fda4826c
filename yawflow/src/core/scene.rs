//! Scene type produced by the parse stage.

use serde::{Deserialize, Serialize};

/// An ordered unit of narrative content derived from the script.
///
/// The `index` is unique within a run and defines the ordering; every
/// downstream clip is addressed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Position of the scene in the script.
    pub index: usize,
    /// Raw scene text.
    pub text: String,
    /// Character or role speaking in the scene, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Scene {
    /// Creates a new scene without a role tag.
    #[must_use]
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            role: None,
        }
    }

    /// Sets the role tag.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_creation() {
        let scene = Scene::new(2, "INT. KITCHEN - NIGHT").with_role("NARRATOR");
        assert_eq!(scene.index, 2);
        assert_eq!(scene.role.as_deref(), Some("NARRATOR"));
    }

    #[test]
    fn test_scene_serialization_skips_missing_role() {
        let json = serde_json::to_value(Scene::new(0, "Fade in.")).unwrap();
        assert_eq!(json, serde_json::json!({"index": 0, "text": "Fade in."}));
    }
}
