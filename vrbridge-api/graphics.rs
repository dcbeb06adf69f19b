/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::Error;
use crate::ModelMesh;
use crate::ModelTexture;
use crate::TextureHandle;

/// The GPU operations the stereo pipeline and the model cache need,
/// behind a seam so everything above the GL calls runs in tests.
///
/// An eye target is a multisampled color+depth render target paired with
/// a single-sampled resolve texture of the same dimensions. A model is
/// uploaded geometry plus its diffuse texture.
pub trait Graphics {
    type EyeTarget;
    type Model;

    /// Allocate one eye's render + resolve targets. Fails with
    /// `Error::IncompleteFramebuffer` if either framebuffer does not pass
    /// its completeness check after construction.
    fn create_eye_target(
        &mut self,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<Self::EyeTarget, Error>;

    fn destroy_eye_target(&mut self, target: &Self::EyeTarget);

    /// Bind the multisampled target and set the viewport; scene drawing
    /// happens between this and `resolve_eye_pass`.
    fn begin_eye_pass(&mut self, target: &Self::EyeTarget, width: u32, height: u32);

    /// Unbind and blit the multisampled color into the resolve texture.
    fn resolve_eye_pass(&mut self, target: &Self::EyeTarget, width: u32, height: u32);

    /// The presentable texture produced by `resolve_eye_pass`.
    fn resolve_texture(&self, target: &Self::EyeTarget) -> TextureHandle;

    fn upload_model(
        &mut self,
        mesh: &ModelMesh,
        texture: &ModelTexture,
    ) -> Result<Self::Model, Error>;

    fn destroy_model(&mut self, model: &Self::Model);

    /// Draw an uploaded model with whatever shader the host has bound.
    fn draw_model(&mut self, model: &Self::Model);
}
