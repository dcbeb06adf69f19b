/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The two-eye render pipeline: one multisampled target per eye, resolved
//! into presentable textures after the host has drawn its scene.

use crate::model::RenderModelAsset;
use crate::session::SessionConfig;

use euclid::Transform3D;
use std::rc::Rc;

use vrbridge_api::math::{transform_from_3x4, transform_from_4x4};
use vrbridge_api::Device;
use vrbridge_api::Display;
use vrbridge_api::Error;
use vrbridge_api::Eye;
use vrbridge_api::Graphics;
use vrbridge_api::Hand;
use vrbridge_api::LeftEye;
use vrbridge_api::Native;
use vrbridge_api::RightEye;
use vrbridge_api::Runtime;
use vrbridge_api::TextureHandle;
use vrbridge_api::Viewer;

pub struct StereoPipeline<G: Graphics> {
    graphics: G,
    targets: Option<[G::EyeTarget; 2]>,
    eye_view_proj: [Transform3D<f32, Viewer, Display>; 2],
    size: (u32, u32),
}

fn eye_matrix<R: Runtime, E>(
    runtime: &R,
    eye: Eye,
    near: f32,
    far: f32,
) -> Result<Transform3D<f32, Viewer, Display>, Error> {
    let projection = transform_from_4x4::<E, Display>(&runtime.projection_matrix(eye, near, far));
    let eye_to_head = transform_from_3x4::<E, Viewer>(&runtime.eye_to_head(eye));
    let head_to_eye = eye_to_head
        .inverse()
        .ok_or_else(|| Error::Backend(format!("singular eye-to-head transform for {:?} eye", eye)))?;
    Ok(head_to_eye.then(&projection))
}

impl<G: Graphics> StereoPipeline<G> {
    /// Allocate both eye targets at the recommended size and fix each
    /// eye's view-projection matrix for the session (the device's optical
    /// geometry does not change at runtime).
    pub fn new<R: Runtime>(
        mut graphics: G,
        runtime: &R,
        size: (u32, u32),
        config: &SessionConfig,
    ) -> Result<StereoPipeline<G>, Error> {
        let (width, height) = size;
        let left = graphics.create_eye_target(width, height, config.msaa_samples)?;
        let right = match graphics.create_eye_target(width, height, config.msaa_samples) {
            Ok(target) => target,
            Err(err) => {
                graphics.destroy_eye_target(&left);
                return Err(err);
            }
        };

        let eye_view_proj = [
            eye_matrix::<R, LeftEye>(runtime, Eye::Left, config.near_clip, config.far_clip)?,
            eye_matrix::<R, RightEye>(runtime, Eye::Right, config.near_clip, config.far_clip)?,
        ];

        Ok(StereoPipeline {
            graphics,
            targets: Some([left, right]),
            eye_view_proj,
            size,
        })
    }

    pub fn eye_view_projection(&self, eye: Eye) -> Transform3D<f32, Viewer, Display> {
        self.eye_view_proj[eye.index()]
    }

    pub fn render_size(&self) -> (u32, u32) {
        self.size
    }

    pub fn begin_eye(&mut self, eye: Eye) {
        if let Some(ref targets) = self.targets {
            self.graphics
                .begin_eye_pass(&targets[eye.index()], self.size.0, self.size.1);
        }
    }

    pub fn resolve_eye(&mut self, eye: Eye) {
        if let Some(ref targets) = self.targets {
            self.graphics
                .resolve_eye_pass(&targets[eye.index()], self.size.0, self.size.1);
        }
    }

    pub fn resolve_texture(&self, eye: Eye) -> Option<TextureHandle> {
        self.targets
            .as_ref()
            .map(|targets| self.graphics.resolve_texture(&targets[eye.index()]))
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.graphics
    }

    /// Free both eye targets. Further per-eye calls become no-ops.
    pub fn destroy(&mut self) {
        if let Some(targets) = self.targets.take() {
            for target in targets.iter() {
                self.graphics.destroy_eye_target(target);
            }
        }
    }
}

pub(crate) struct ControllerDraw<M> {
    pub asset: Rc<RenderModelAsset<M>>,
    pub transform: Transform3D<f32, Device, Native>,
}

/// What the host's scene callback gets to work with for one eye: the
/// eye's view-projection matrix, and the controllers that currently have
/// a render model so scene and controller geometry compose under one
/// projection.
pub struct EyeFrame<'a, G: Graphics> {
    pub(crate) view_projection: Transform3D<f32, Native, Display>,
    pub(crate) graphics: &'a mut G,
    pub(crate) controllers: [Option<ControllerDraw<G::Model>>; 2],
}

impl<'a, G: Graphics> EyeFrame<'a, G> {
    pub fn view_projection(&self) -> Transform3D<f32, Native, Display> {
        self.view_projection
    }

    pub fn controller_active(&self, hand: Hand) -> bool {
        self.controllers[hand.index()].is_some()
    }

    pub fn controller_transform(&self, hand: Hand) -> Option<Transform3D<f32, Device, Native>> {
        self.controllers[hand.index()]
            .as_ref()
            .map(|controller| controller.transform)
    }

    /// Draw the hand's render model with the host's currently bound
    /// shader. Does nothing while the hand has no model.
    pub fn draw_controller(&mut self, hand: Hand) {
        if let Some(ref controller) = self.controllers[hand.index()] {
            self.graphics.draw_model(&controller.asset.model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use vrbridge_api::mock::{GraphicsOp, MockEntry, MockGraphics, MockRuntimeInit};
    use vrbridge_api::RuntimeEntry;

    fn pipeline() -> (
        StereoPipeline<MockGraphics>,
        vrbridge_api::mock::MockGraphicsHandle,
    ) {
        let (mut entry, _handle) = MockEntry::new(MockRuntimeInit::default());
        let runtime = entry.connect().unwrap();
        let (graphics, graphics_handle) = MockGraphics::new();
        let pipeline = StereoPipeline::new(
            graphics,
            &runtime,
            (1512, 1680),
            &SessionConfig::default(),
        )
        .unwrap();
        (pipeline, graphics_handle)
    }

    #[test]
    fn allocates_one_target_per_eye() {
        let (pipeline, graphics_handle) = pipeline();
        assert_eq!(graphics_handle.live_targets(), 2);
        assert!(pipeline.resolve_texture(Eye::Left) != pipeline.resolve_texture(Eye::Right));
    }

    #[test]
    fn eye_passes_run_in_bind_resolve_order() {
        let (mut pipeline, graphics_handle) = pipeline();
        pipeline.begin_eye(Eye::Left);
        pipeline.resolve_eye(Eye::Left);
        pipeline.begin_eye(Eye::Right);
        pipeline.resolve_eye(Eye::Right);

        let ops = graphics_handle.ops();
        assert_eq!(
            &ops[2..],
            &[
                GraphicsOp::BeginEye(1),
                GraphicsOp::ResolveEye(1),
                GraphicsOp::BeginEye(2),
                GraphicsOp::ResolveEye(2),
            ]
        );
    }

    #[test]
    fn destroy_releases_both_targets_and_disables_passes() {
        let (mut pipeline, graphics_handle) = pipeline();
        pipeline.destroy();
        assert_eq!(graphics_handle.live_targets(), 0);

        let ops_before = graphics_handle.ops().len();
        pipeline.begin_eye(Eye::Left);
        pipeline.resolve_eye(Eye::Left);
        assert_eq!(graphics_handle.ops().len(), ops_before);
        assert!(pipeline.resolve_texture(Eye::Left).is_none());
    }

    #[test]
    fn incomplete_framebuffer_fails_construction() {
        let (mut entry, _handle) = MockEntry::new(MockRuntimeInit::default());
        let runtime = entry.connect().unwrap();
        let (graphics, graphics_handle) = MockGraphics::new();
        graphics_handle.set_fail_eye_target(Some(0x8CD6));

        let result = StereoPipeline::new(
            graphics,
            &runtime,
            (1512, 1680),
            &SessionConfig::default(),
        );
        match result {
            Err(Error::IncompleteFramebuffer(status)) => assert_eq!(status, 0x8CD6),
            other => panic!("expected incomplete framebuffer, got {:?}", other.is_ok()),
        }
    }
}
