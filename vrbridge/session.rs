/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Session lifecycle. A [`VrSession`] owns the runtime connection, the
//! per-frame pose and input state, the render-model cache and the stereo
//! pipeline; everything else nests inside it.

use crate::input::ActionInput;
use crate::model::{LoadPolicy, RenderModelAsset, RenderModelCache};
use crate::pipeline::{ControllerDraw, EyeFrame, StereoPipeline};
use crate::pose::PoseTracker;

use euclid::Transform3D;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use vrbridge_api::ColorSpace;
use vrbridge_api::Device;
use vrbridge_api::DeviceClass;
use vrbridge_api::DeviceProperty;
use vrbridge_api::Display;
use vrbridge_api::Error;
use vrbridge_api::EventBuffer;
use vrbridge_api::EventSink;
use vrbridge_api::Eye;
use vrbridge_api::Graphics;
use vrbridge_api::Hand;
use vrbridge_api::Native;
use vrbridge_api::Runtime;
use vrbridge_api::RuntimeEntry;
use vrbridge_api::SubmitTexture;
use vrbridge_api::Viewer;
use vrbridge_api::HMD_DEVICE_INDEX;

/// Host-tunable knobs. Everything has a sensible default; the manifest
/// path is the one value a host normally overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub action_manifest_path: PathBuf,
    pub near_clip: f32,
    pub far_clip: f32,
    pub msaa_samples: u32,
    pub model_load: LoadPolicy,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            action_manifest_path: PathBuf::from("config/actions.json"),
            near_clip: 0.1,
            far_clip: 100.0,
            msaa_samples: 4,
            model_load: LoadPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_file(path: &Path) -> Result<SessionConfig, Error> {
        let file = File::open(path)
            .map_err(|e| Error::Backend(format!("cannot open {}: {}", path.display(), e)))?;
        serde_json::from_reader(file)
            .map_err(|e| Error::Backend(format!("cannot parse {}: {}", path.display(), e)))
    }
}

pub struct VrSession<R: Runtime, G: Graphics> {
    runtime: R,
    driver_name: String,
    display_name: String,
    render_target_size: (u32, u32),
    poses: PoseTracker,
    input: ActionInput,
    cache: RenderModelCache<G>,
    pipeline: StereoPipeline<G>,
    controller_assets: [Option<Rc<RenderModelAsset<G::Model>>>; 2],
    scene_callback: Option<Box<dyn FnMut(&mut EyeFrame<'_, G>)>>,
    events: EventBuffer,
    destroyed: bool,
}

impl<R: Runtime, G: Graphics> fmt::Debug for VrSession<R, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VrSession")
            .field("driver_name", &self.driver_name)
            .field("display_name", &self.display_name)
            .field("render_target_size", &self.render_target_size)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<R: Runtime, G: Graphics> VrSession<R, G> {
    /// Establish the session. Any error returned here is fatal for the
    /// run (`Error::is_fatal`); the host should surface its description
    /// and give up on VR. A failed action manifest is the one exception:
    /// input silently degrades to inactive instead.
    pub fn init<E>(mut entry: E, graphics: G, config: SessionConfig) -> Result<VrSession<R, G>, Error>
    where
        E: RuntimeEntry<Runtime = R>,
    {
        if !entry.hmd_present() {
            return Err(Error::NoHmd);
        }
        if !entry.runtime_installed() {
            return Err(Error::RuntimeNotInstalled);
        }
        let mut runtime = entry.connect()?;

        let driver_name = runtime
            .string_property(HMD_DEVICE_INDEX, DeviceProperty::TrackingSystemName)
            .unwrap_or_default();
        let display_name = runtime
            .string_property(HMD_DEVICE_INDEX, DeviceProperty::SerialNumber)
            .unwrap_or_default();

        if let Err(err) = runtime.acquire_compositor() {
            runtime.shutdown();
            return Err(err);
        }

        let render_target_size = runtime.recommended_render_target_size();
        info!(
            "initialized HMD, driver: {}, display: {}, render target: {}x{}",
            driver_name, display_name, render_target_size.0, render_target_size.1
        );

        let pipeline = match StereoPipeline::new(graphics, &runtime, render_target_size, &config) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                runtime.shutdown();
                return Err(err);
            }
        };

        let input = ActionInput::resolve(&mut runtime, &config.action_manifest_path);
        let cache = RenderModelCache::new(config.model_load);

        Ok(VrSession {
            runtime,
            driver_name,
            display_name,
            render_target_size,
            poses: PoseTracker::new(),
            input,
            cache,
            pipeline,
            controller_assets: [None, None],
            scene_callback: None,
            events: EventBuffer::default(),
            destroyed: false,
        })
    }

    /// Per-frame state refresh: drain events, poll actions, kick off or
    /// bind render-model loads, then block on the compositor's pose wait.
    pub fn update(&mut self) {
        if self.destroyed {
            return;
        }

        let bound = [
            self.controller_assets[0].is_some(),
            self.controller_assets[1].is_some(),
        ];
        let requests = self.input.update(&mut self.runtime, &mut self.events, bound);
        let models = self.runtime.models();
        for &hand in Hand::BOTH.iter() {
            if let Some(ref name) = requests.names[hand.index()] {
                if self.controller_assets[hand.index()].is_none() {
                    if let Some(asset) = self.cache.request(name, &models) {
                        info!("{:?} hand bound to render model {}", hand, name);
                        self.controller_assets[hand.index()] = Some(asset);
                    }
                }
            }
        }

        if let Err(err) = self.poses.update(&mut self.runtime) {
            warn!("pose wait failed: {}", err);
        }

        self.cache.pump(self.pipeline.graphics_mut());
    }

    /// Render both eyes through the registered scene callback and hand
    /// the frame to the compositor. A no-op until a callback is set.
    ///
    /// Hosts that want to drive the eye loop themselves call
    /// [`render_eye`](VrSession::render_eye) per eye plus
    /// [`submit`](VrSession::submit) instead; the two styles must not be
    /// mixed within one frame.
    pub fn render(&mut self) {
        if self.destroyed || self.scene_callback.is_none() {
            return;
        }
        self.render_eye(Eye::Left);
        self.render_eye(Eye::Right);
        self.submit();
    }

    /// Render one eye: bind its multisampled target, run the scene
    /// callback with that eye's view-projection, then resolve into the
    /// presentable texture.
    pub fn render_eye(&mut self, eye: Eye) {
        if self.destroyed {
            return;
        }
        let view_projection = self
            .poses
            .head_transform()
            .then(&self.pipeline.eye_view_projection(eye));
        let controllers = [
            self.controller_draw(Hand::Left),
            self.controller_draw(Hand::Right),
        ];
        let callback = match self.scene_callback.as_mut() {
            Some(callback) => callback,
            None => return,
        };

        self.pipeline.begin_eye(eye);
        {
            let mut frame = EyeFrame {
                view_projection,
                graphics: self.pipeline.graphics_mut(),
                controllers,
            };
            callback(&mut frame);
        }
        self.pipeline.resolve_eye(eye);
    }

    /// Submit both eyes' resolve textures. A rejected submission is
    /// logged and the frame moves on; presentation is the compositor's
    /// problem, not ours.
    pub fn submit(&mut self) {
        if self.destroyed {
            return;
        }
        for &eye in Eye::BOTH.iter() {
            let handle = match self.pipeline.resolve_texture(eye) {
                Some(handle) => handle,
                None => return,
            };
            let texture = SubmitTexture {
                handle,
                color_space: ColorSpace::Gamma,
            };
            if let Err(err) = self.runtime.submit(eye, &texture) {
                warn!("failed to submit {:?} eye texture: {}", eye, err);
            }
        }
    }

    /// Tear the session down: release controller-held assets, cancel
    /// outstanding loads, free GPU objects, then shut the runtime
    /// connection down. Safe to call more than once; also runs on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for slot in self.controller_assets.iter_mut() {
            *slot = None;
        }
        self.cache.destroy(self.pipeline.graphics_mut());
        self.pipeline.destroy();
        self.runtime.shutdown();
    }

    pub fn set_scene_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut EyeFrame<'_, G>) + 'static,
    {
        self.scene_callback = Some(Box::new(callback));
    }

    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.events.upgrade(sink);
    }

    /// `eyeViewProjection[eye] × headWorldTransform`, this frame's full
    /// world-to-clip transform for one eye.
    pub fn view_projection(&self, eye: Eye) -> Transform3D<f32, Native, Display> {
        self.poses
            .head_transform()
            .then(&self.pipeline.eye_view_projection(eye))
    }

    pub fn head_transform(&self) -> Transform3D<f32, Native, Viewer> {
        self.poses.head_transform()
    }

    /// Whether the hand has a loaded render model to draw.
    pub fn is_controller_active(&self, hand: Hand) -> bool {
        self.controller_assets[hand.index()].is_some()
    }

    pub fn controller_model_transform(&self, hand: Hand) -> Transform3D<f32, Device, Native> {
        self.input.controller_transform(hand)
    }

    /// Draw the hand's render model with the host's currently bound
    /// shader, for hosts composing their own eye loop.
    pub fn render_controller(&mut self, hand: Hand) {
        let asset = match self.controller_assets[hand.index()] {
            Some(ref asset) => asset.clone(),
            None => return,
        };
        self.pipeline.graphics_mut().draw_model(&asset.model);
    }

    pub fn trigger_held(&self) -> bool {
        self.input.trigger_held()
    }

    pub fn menu_held(&self) -> bool {
        self.input.menu_held()
    }

    pub fn trackpad(&self) -> [f32; 2] {
        self.input.trackpad()
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn render_target_size(&self) -> (u32, u32) {
        self.render_target_size
    }

    pub fn tracked_device_transform(&self, device: usize) -> Transform3D<f32, Device, Native> {
        self.poses.device_transform(device)
    }

    pub fn tracked_device_class(&self, device: usize) -> Option<DeviceClass> {
        self.poses.device_class(device)
    }

    fn controller_draw(&self, hand: Hand) -> Option<ControllerDraw<G::Model>> {
        self.controller_assets[hand.index()]
            .as_ref()
            .map(|asset| ControllerDraw {
                asset: asset.clone(),
                transform: self.input.controller_transform(hand),
            })
    }
}

impl<R: Runtime, G: Graphics> Drop for VrSession<R, G> {
    fn drop(&mut self) {
        self.destroy();
    }
}
