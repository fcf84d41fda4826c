//! Per-scene clips and the reconciled clip set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The kind of per-scene clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    /// A synthesized voice track.
    Voice,
    /// A rendered image or video segment.
    Visual,
}

impl ClipKind {
    /// Staging subdirectory for clips of this kind.
    #[must_use]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Visual => "visual",
        }
    }

    /// File extension used when an engine asks for a default clip path.
    #[must_use]
    pub const fn default_extension(&self) -> &'static str {
        match self {
            Self::Voice => "wav",
            Self::Visual => "png",
        }
    }
}

impl fmt::Display for ClipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A clip that belongs to exactly one scene.
pub trait SceneClip {
    /// The kind of clip.
    const KIND: ClipKind;

    /// Index of the scene this clip was produced for.
    fn scene_index(&self) -> usize;

    /// Where the clip lives on disk.
    fn path(&self) -> &std::path::Path;
}

/// Audio artifact for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceClip {
    /// Index of the scene the clip belongs to.
    pub scene_index: usize,
    /// Storage path of the audio file.
    pub path: PathBuf,
    /// Length of the audio.
    pub duration: Duration,
}

impl VoiceClip {
    /// Creates a new voice clip.
    #[must_use]
    pub fn new(scene_index: usize, path: impl Into<PathBuf>, duration: Duration) -> Self {
        Self {
            scene_index,
            path: path.into(),
            duration,
        }
    }
}

impl SceneClip for VoiceClip {
    const KIND: ClipKind = ClipKind::Voice;

    fn scene_index(&self) -> usize {
        self.scene_index
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Image or video artifact for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualClip {
    /// Index of the scene the clip belongs to.
    pub scene_index: usize,
    /// Storage path of the image or video file.
    pub path: PathBuf,
    /// Length of the segment; `None` for still images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl VisualClip {
    /// Creates a still-image visual clip.
    #[must_use]
    pub fn still(scene_index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            scene_index,
            path: path.into(),
            duration: None,
        }
    }

    /// Sets the segment duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl SceneClip for VisualClip {
    const KIND: ClipKind = ClipKind::Visual;

    fn scene_index(&self) -> usize {
        self.scene_index
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Clips keyed by scene index, reconciled against a scene sequence.
///
/// A `ClipSet` can only be built by [`crate::pipeline::reconcile`], so its
/// key set is always exactly the indices of the scenes it was checked
/// against. Iteration follows scene order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipSet<C> {
    clips: BTreeMap<usize, C>,
}

impl<C> ClipSet<C> {
    pub(crate) fn from_reconciled(clips: BTreeMap<usize, C>) -> Self {
        Self { clips }
    }

    /// Returns the clip for a scene index.
    #[must_use]
    pub fn get(&self, scene_index: usize) -> Option<&C> {
        self.clips.get(&scene_index)
    }

    /// Returns the number of clips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Returns true if the set holds no clips.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Returns the scene indices covered, in scene order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.clips.keys().copied().collect()
    }

    /// Iterates clips in scene order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.clips.values()
    }
}

impl<'a, C> IntoIterator for &'a ClipSet<C> {
    type Item = (&'a usize, &'a C);
    type IntoIter = std::collections::btree_map::Iter<'a, usize, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_kind_layout() {
        assert_eq!(ClipKind::Voice.dir_name(), "voice");
        assert_eq!(ClipKind::Visual.default_extension(), "png");
        assert_eq!(ClipKind::Visual.to_string(), "visual");
    }

    #[test]
    fn test_scene_clip_trait() {
        let voice = VoiceClip::new(3, "voice/scene_0003.wav", Duration::from_millis(1500));
        assert_eq!(voice.scene_index(), 3);
        assert_eq!(VoiceClip::KIND, ClipKind::Voice);

        let visual = VisualClip::still(1, "visual/scene_0001.png").with_duration(Duration::from_secs(2));
        assert_eq!(visual.scene_index(), 1);
        assert_eq!(visual.duration, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_clip_set_iterates_in_index_order() {
        let mut clips = BTreeMap::new();
        clips.insert(2, VisualClip::still(2, "c.png"));
        clips.insert(0, VisualClip::still(0, "a.png"));
        clips.insert(1, VisualClip::still(1, "b.png"));
        let set = ClipSet::from_reconciled(clips);

        assert_eq!(set.indices(), vec![0, 1, 2]);
        let paths: Vec<_> = set.iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.png"), PathBuf::from("b.png"), PathBuf::from("c.png")]);
        assert!(set.get(1).is_some());
        assert!(set.get(7).is_none());
    }
}
