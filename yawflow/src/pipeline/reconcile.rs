//! Structural checks between stages.
//!
//! Engines are trusted to do their job but not to honour the pipeline's
//! shape. Before anything reaches the next stage the orchestrator checks:
//! the scene sequence is non-empty with unique indices, every clip set
//! covers exactly the scene indices, and the assembled file exists.

use crate::core::{ClipSet, FinalArtifact, Scene, SceneClip, StageName};
use crate::errors::StageError;
use std::collections::{BTreeMap, BTreeSet};

/// Validates a parse result and orders it by scene index.
///
/// An empty sequence is a failure, not an empty movie.
pub fn validate_scenes(mut scenes: Vec<Scene>) -> Result<Vec<Scene>, StageError> {
    if scenes.is_empty() {
        return Err(StageError::new(StageName::Parse, "script produced no scenes"));
    }

    scenes.sort_by_key(|scene| scene.index);
    if let Some(pair) = scenes.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(StageError::new(
            StageName::Parse,
            format!("duplicate scene index {}", pair[0].index),
        ));
    }

    Ok(scenes)
}

/// Checks an engine's clips against the scene sequence.
///
/// Any index mismatch fails `stage`: a clip for an unknown scene, two clips
/// for the same scene, or a scene without a clip.
pub fn reconcile<C: SceneClip>(
    stage: StageName,
    scenes: &[Scene],
    clips: Vec<C>,
) -> Result<ClipSet<C>, StageError> {
    let expected: BTreeSet<usize> = scenes.iter().map(|scene| scene.index).collect();
    let mut by_index = BTreeMap::new();

    for clip in clips {
        let index = clip.scene_index();
        if !expected.contains(&index) {
            return Err(StageError::new(
                stage,
                format!("{} clip references unknown scene index {index}", C::KIND),
            )
            .with_partial_artifacts());
        }
        if by_index.insert(index, clip).is_some() {
            return Err(StageError::new(
                stage,
                format!("duplicate {} clip for scene index {index}", C::KIND),
            )
            .with_partial_artifacts());
        }
    }

    let missing: Vec<usize> = expected
        .iter()
        .filter(|index| !by_index.contains_key(*index))
        .copied()
        .collect();
    if !missing.is_empty() {
        let err = StageError::new(
            stage,
            format!("missing {} clips for scene indices {missing:?}", C::KIND),
        );
        return Err(if by_index.is_empty() { err } else { err.with_partial_artifacts() });
    }

    Ok(ClipSet::from_reconciled(by_index))
}

/// Checks that the assembled movie exists and is non-empty, recording its
/// measured size.
pub fn verify_artifact(mut artifact: FinalArtifact) -> Result<FinalArtifact, StageError> {
    let meta = std::fs::metadata(&artifact.path).map_err(|e| {
        StageError::new(
            StageName::Assemble,
            format!("artifact '{}' is not readable: {e}", artifact.path.display()),
        )
    })?;

    if !meta.is_file() {
        return Err(StageError::new(
            StageName::Assemble,
            format!("artifact '{}' is not a file", artifact.path.display()),
        ));
    }
    if meta.len() == 0 {
        return Err(StageError::new(
            StageName::Assemble,
            format!("artifact '{}' is empty", artifact.path.display()),
        )
        .with_partial_artifacts());
    }

    artifact.size_bytes = meta.len();
    Ok(artifact)
}
