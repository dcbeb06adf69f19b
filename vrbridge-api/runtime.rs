/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Traits to be implemented by device-runtime backends.

use crate::ActionHandle;
use crate::ActionSetHandle;
use crate::AnalogActionData;
use crate::DeviceClass;
use crate::DevicePose;
use crate::DigitalActionData;
use crate::Error;
use crate::Eye;
use crate::InputHandle;
use crate::ModelLoad;
use crate::ModelMesh;
use crate::ModelTexture;
use crate::OriginInfo;
use crate::PoseActionData;
use crate::TextureId;
use crate::TrackingUniverse;
use crate::MAX_TRACKED_DEVICES;

use std::path::Path;

#[cfg(feature = "ipc")]
use serde::{Deserialize, Serialize};

/// String properties a tracked device can be asked for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum DeviceProperty {
    TrackingSystemName,
    SerialNumber,
    RenderModelName,
}

/// Notifications drained from the runtime's event queue each frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum RuntimeEvent {
    DeviceActivated { device: usize },
    DeviceDeactivated { device: usize },
    DeviceUpdated { device: usize },
}

/// A native texture handle plus its API tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum TextureHandle {
    OpenGl(u32),
}

/// The color space a submitted texture's contents are encoded in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum ColorSpace {
    Auto,
    Gamma,
    Linear,
}

/// One eye's presentable texture as handed to the compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct SubmitTexture {
    pub handle: TextureHandle,
    pub color_space: ColorSpace,
}

/// Pre-connection probes plus the connection attempt itself.
pub trait RuntimeEntry {
    type Runtime: Runtime;

    /// Whether a display device is physically present.
    fn hmd_present(&self) -> bool;

    /// Whether the device runtime is installed on this machine.
    fn runtime_installed(&self) -> bool;

    /// Establish the runtime connection. On failure the error carries the
    /// runtime's human-readable description.
    fn connect(&mut self) -> Result<Self::Runtime, Error>;
}

/// A connected device runtime. One instance backs one session; the
/// session owns it and shuts it down exactly once at teardown.
pub trait Runtime {
    /// Cheap cloneable handle to the asset streaming interface, usable
    /// from a background thread.
    type Models: ModelSource;

    // System interface.

    fn recommended_render_target_size(&self) -> (u32, u32);

    /// Row-major 4×4 projection matrix for one eye.
    fn projection_matrix(&self, eye: Eye, near: f32, far: f32) -> [[f32; 4]; 4];

    /// Row-major 3×4 eye-to-head transform for one eye.
    fn eye_to_head(&self, eye: Eye) -> [[f32; 4]; 3];

    fn device_class(&self, device: usize) -> DeviceClass;

    fn string_property(&self, device: usize, prop: DeviceProperty) -> Result<String, Error>;

    fn poll_event(&mut self) -> Option<RuntimeEvent>;

    // Compositor interface.

    /// Acquire the compositor service. Called once at session init.
    fn acquire_compositor(&mut self) -> Result<(), Error>;

    /// Block until the compositor hands back this frame's device poses.
    /// This is the synchronization point that paces the render loop to
    /// the display's refresh cycle.
    fn wait_get_poses(
        &mut self,
        poses: &mut [DevicePose; MAX_TRACKED_DEVICES],
    ) -> Result<(), Error>;

    fn submit(&mut self, eye: Eye, texture: &SubmitTexture) -> Result<(), Error>;

    // Action interface.

    fn load_action_manifest(&mut self, path: &Path) -> Result<(), Error>;

    fn action_set_handle(&mut self, path: &str) -> Result<ActionSetHandle, Error>;

    fn action_handle(&mut self, path: &str) -> Result<ActionHandle, Error>;

    fn input_source_handle(&mut self, path: &str) -> Result<InputHandle, Error>;

    /// Advance the action set so subsequent reads see this frame's state.
    fn update_action_state(&mut self, set: ActionSetHandle) -> Result<(), Error>;

    fn digital_action_data(&self, action: ActionHandle) -> Result<DigitalActionData, Error>;

    fn analog_action_data(&self, action: ActionHandle) -> Result<AnalogActionData, Error>;

    /// Pose state predicted for the next frame.
    fn pose_action_data(
        &self,
        action: ActionHandle,
        universe: TrackingUniverse,
    ) -> Result<PoseActionData, Error>;

    /// Resolve an action's active origin back to the device behind it.
    fn origin_info(&self, origin: InputHandle) -> Result<OriginInfo, Error>;

    fn trigger_haptic_pulse(
        &mut self,
        action: ActionHandle,
        duration: f32,
        frequency: f32,
        amplitude: f32,
    ) -> Result<(), Error>;

    // Asset streaming.

    fn models(&self) -> Self::Models;

    // Lifecycle.

    fn shutdown(&mut self);
}

/// The runtime's asynchronous asset loaders. Each call is one poll: the
/// runtime either hands over the staged payload, reports that staging is
/// still in progress, or fails terminally.
pub trait ModelSource: Clone + Send + 'static {
    fn load_render_model(&self, name: &str) -> ModelLoad<ModelMesh>;

    fn load_texture(&self, id: TextureId) -> ModelLoad<ModelTexture>;
}
