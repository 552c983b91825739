//! Per-frame stroke driver.
//!
//! The driver turns a frame's input (pointer, camera gesture, pick result)
//! into at most one stroke. It has two states:
//!
//! - **Idle**: the pointer is up, a camera gesture is in progress, or the
//!   pick ray missed the mesh. No geometry is touched.
//! - **Sculpting**: the pointer is down, no gesture is active and the pick ray
//!   hit the mesh. Exactly one stroke runs at the hit.
//!
//! A press counts for the frame it happens on and the frame after, so a
//! click with no movement still lands one stroke.

use glam::{Affine3A, Vec3};
use sculpting_config::SculptParams;
use tracing::{debug, trace, warn};

use crate::brush::BrushState;
use crate::geometry::GeometryBuffer;
use crate::picking::{LocalHit, PickHit};
use crate::pipeline::{apply_stroke, StrokeReport};
use crate::region::StrokeRegion;
use crate::spatial::SpatialIndex;

/// Input gathered from the host for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Primary pointer button is held down
    pub pointer_pressed: bool,
    /// The camera collaborator is orbiting/panning
    pub gesture_active: bool,
    /// Pick result under the pointer, in world space
    pub hit: Option<PickHit>,
}

/// Where the brush sits on the surface, in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushPlacement {
    pub center: Vec3,
    /// Unit surface normal at the center
    pub normal: Vec3,
    /// Clamped brush radius
    pub radius: f32,
}

/// Driver state. Sculpting always carries the placement it is sculpting at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum SculptState {
    #[default]
    Idle,
    Sculpting { placement: BrushPlacement },
}

impl SculptState {
    pub fn is_sculpting(&self) -> bool {
        matches!(self, SculptState::Sculpting { .. })
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// State after the frame
    pub state: SculptState,
    /// Brush placement for an indicator, present whenever the pointer is
    /// over the mesh and the camera is not being moved
    pub placement: Option<BrushPlacement>,
    /// Stroke applied this frame, if any
    pub stroke: Option<StrokeReport>,
}

/// Drives strokes from per-frame input.
#[derive(Debug, Default)]
pub struct StrokeDriver {
    state: SculptState,
    pointer_was_pressed: bool,
    scratch: StrokeRegion,
    /// Last parameters seen and their clamped form
    params: Option<(SculptParams, SculptParams)>,
}

impl StrokeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SculptState {
        &self.state
    }

    /// Region touched by the most recent stroke.
    pub fn last_region(&self) -> &StrokeRegion {
        &self.scratch
    }

    /// Advance one frame.
    ///
    /// `world_from_mesh` places the mesh in the world; pick hits are carried
    /// into mesh space through it before the stroke runs. Parameters are
    /// clamped before use.
    pub fn update<I: SpatialIndex>(
        &mut self,
        input: &FrameInput,
        params: &SculptParams,
        world_from_mesh: &Affine3A,
        geometry: &mut GeometryBuffer,
        index: &I,
    ) -> FrameOutcome {
        let pressed = input.pointer_pressed || self.pointer_was_pressed;
        self.pointer_was_pressed = input.pointer_pressed;

        let hit = match input.hit {
            Some(hit) if !input.gesture_active => hit,
            _ => {
                self.transition(SculptState::Idle);
                return FrameOutcome::default();
            }
        };

        let LocalHit { point, normal } = hit.to_mesh_space(world_from_mesh);
        if normal == Vec3::ZERO {
            warn!("sculpt: pick hit at {:?} has a degenerate normal", point);
        }
        let params = self.sanitized_params(params);
        let brush = BrushState::new(point, normal, &params);
        let placement = BrushPlacement {
            center: brush.center,
            normal: brush.direction,
            radius: brush.radius,
        };

        if !pressed {
            self.transition(SculptState::Idle);
            return FrameOutcome {
                state: self.state,
                placement: Some(placement),
                stroke: None,
            };
        }

        self.transition(SculptState::Sculpting { placement });
        let report = apply_stroke(geometry, index, &brush, &mut self.scratch);

        FrameOutcome {
            state: self.state,
            placement: Some(placement),
            stroke: Some(report),
        }
    }

    /// Clamp parameters, reusing the previous result while they are unchanged
    /// so an out-of-range value is reported once rather than every frame.
    fn sanitized_params(&mut self, params: &SculptParams) -> SculptParams {
        match self.params {
            Some((raw, clean)) if same_bits(&raw, params) => clean,
            _ => {
                let clean = params.sanitized();
                self.params = Some((*params, clean));
                clean
            }
        }
    }

    fn transition(&mut self, next: SculptState) {
        match (self.state.is_sculpting(), next.is_sculpting()) {
            (false, true) => debug!("sculpt: idle -> sculpting"),
            (true, false) => debug!("sculpt: sculpting -> idle"),
            _ => trace!("sculpt: state unchanged"),
        }
        self.state = next;
    }
}

/// Bitwise equality, so a NaN parameter compares equal to itself.
fn same_bits(a: &SculptParams, b: &SculptParams) -> bool {
    a.radius.to_bits() == b.radius.to_bits()
        && a.intensity.to_bits() == b.intensity.to_bits()
        && a.depth == b.depth
        && a.flat_shading == b.flat_shading
}
