//! Pure per-container decisions.
//!
//! Given what the daemon reported about a container and its image, decide
//! what the current phase should do with it. Nothing here touches the daemon.

use super::outcome::Phase;
use crate::container::ContainerSpec;
use crate::daemon::{ContainerState, ImageInfo};
use crate::error::{JunbanError, Result};

/// Action chosen for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Create the container.
    Create,
    /// Container exists with the expected image.
    SkipExisting,
    /// Start the container.
    Start,
    /// Container is already running.
    SkipRunning,
}

/// Decides the step for `spec` in `phase`.
pub fn decide(
    phase: Phase,
    spec: &ContainerSpec,
    existing: Option<&ContainerState>,
    image: Option<&ImageInfo>,
) -> Result<Step> {
    match phase {
        Phase::Create => decide_create(spec, existing, image),
        Phase::Start => decide_start(spec, existing, image),
    }
}

/// Create phase: create missing containers, keep existing ones whose image
/// still matches.
///
/// `image` is the resolution of `spec.image` and is only consulted when the
/// container exists.
pub fn decide_create(
    spec: &ContainerSpec,
    existing: Option<&ContainerState>,
    image: Option<&ImageInfo>,
) -> Result<Step> {
    match existing {
        None => Ok(Step::Create),
        Some(state) => {
            verify_image(spec, state, image)?;
            Ok(Step::SkipExisting)
        }
    }
}

/// Start phase: the container must exist and match its image.
pub fn decide_start(
    spec: &ContainerSpec,
    existing: Option<&ContainerState>,
    image: Option<&ImageInfo>,
) -> Result<Step> {
    let state = existing.ok_or_else(|| JunbanError::MissingContainer {
        name: spec.name.clone(),
    })?;
    verify_image(spec, state, image)?;

    if state.running {
        Ok(Step::SkipRunning)
    } else {
        Ok(Step::Start)
    }
}

/// Checks that an existing container was created from `spec.image`.
pub fn verify_image(
    spec: &ContainerSpec,
    state: &ContainerState,
    image: Option<&ImageInfo>,
) -> Result<()> {
    let image = image.ok_or_else(|| JunbanError::NoSuchImage {
        image: spec.image.clone(),
    })?;

    if state.image_id != image.id {
        return Err(JunbanError::ImageMismatch {
            name: spec.name.clone(),
            actual: state.image_id.clone(),
            expected: image.id.clone(),
        });
    }

    Ok(())
}
