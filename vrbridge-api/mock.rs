/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A fully scripted runtime and graphics backend. Tests (and hosts that
//! want a headless development target) drive device poses, action state
//! and asset staging through a [`MockRuntimeHandle`] while the session
//! under test owns the [`MockRuntime`] like any other backend.

use crate::ActionHandle;
use crate::ActionSetHandle;
use crate::AnalogActionData;
use crate::DeviceClass;
use crate::DevicePose;
use crate::DeviceProperty;
use crate::DigitalActionData;
use crate::Error;
use crate::Eye;
use crate::Graphics;
use crate::InputHandle;
use crate::ModelLoad;
use crate::ModelMesh;
use crate::ModelSource;
use crate::ModelTexture;
use crate::ModelVertex;
use crate::OriginInfo;
use crate::PoseActionData;
use crate::Runtime;
use crate::RuntimeEntry;
use crate::RuntimeEvent;
use crate::SubmitTexture;
use crate::TextureHandle;
use crate::TextureId;
use crate::TrackingUniverse;
use crate::MAX_TRACKED_DEVICES;

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// Initial capabilities of the simulated runtime.
#[derive(Clone, Debug)]
pub struct MockRuntimeInit {
    pub hmd_present: bool,
    pub runtime_installed: bool,
    pub compositor_available: bool,
    /// When set, `connect()` fails with this description.
    pub connect_error: Option<String>,
    pub render_target_size: (u32, u32),
    pub projection: [[[f32; 4]; 4]; 2],
    pub eye_to_head: [[[f32; 4]; 3]; 2],
}

impl Default for MockRuntimeInit {
    fn default() -> MockRuntimeInit {
        MockRuntimeInit {
            hmd_present: true,
            runtime_installed: true,
            compositor_available: true,
            connect_error: None,
            render_target_size: (1512, 1680),
            projection: [identity_4x4(), identity_4x4()],
            eye_to_head: [eye_offset_3x4(-0.032), eye_offset_3x4(0.032)],
        }
    }
}

fn identity_4x4() -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

fn eye_offset_3x4(x: f32) -> [[f32; 4]; 3] {
    [
        [1.0, 0.0, 0.0, x],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ]
}

/// A recorded haptic command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HapticPulse {
    pub action: ActionHandle,
    pub duration: f32,
    pub frequency: f32,
    pub amplitude: f32,
}

/// A recorded compositor submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubmittedEye {
    pub eye: Eye,
    pub texture: SubmitTexture,
}

struct ModelScript {
    pending_polls: u32,
    result: Result<ModelMesh, String>,
}

struct TextureScript {
    pending_polls: u32,
    result: Result<ModelTexture, String>,
}

struct MockRuntimeData {
    init: MockRuntimeInit,
    poses: [DevicePose; MAX_TRACKED_DEVICES],
    device_classes: [DeviceClass; MAX_TRACKED_DEVICES],
    class_queries: [u32; MAX_TRACKED_DEVICES],
    string_props: HashMap<(usize, DeviceProperty), String>,
    events: VecDeque<RuntimeEvent>,
    handles: HashMap<String, u64>,
    next_handle: u64,
    digital: HashMap<u64, DigitalActionData>,
    analog: HashMap<u64, AnalogActionData>,
    pose_actions: HashMap<u64, PoseActionData>,
    origins: HashMap<u64, OriginInfo>,
    haptics: Vec<HapticPulse>,
    submitted: Vec<SubmittedEye>,
    submit_error: Option<String>,
    wait_poses_error: Option<String>,
    fail_action_resolution: bool,
    manifest_error: Option<String>,
    manifest_path: Option<PathBuf>,
    action_state_updates: u32,
    wait_pose_calls: u32,
    models: HashMap<String, ModelScript>,
    textures: HashMap<i32, TextureScript>,
    model_polls: HashMap<String, u32>,
    texture_polls: HashMap<i32, u32>,
    shutdowns: u32,
}

impl MockRuntimeData {
    fn new(init: MockRuntimeInit) -> MockRuntimeData {
        MockRuntimeData {
            init,
            poses: [DevicePose::default(); MAX_TRACKED_DEVICES],
            device_classes: [DeviceClass::Invalid; MAX_TRACKED_DEVICES],
            class_queries: [0; MAX_TRACKED_DEVICES],
            string_props: HashMap::new(),
            events: VecDeque::new(),
            handles: HashMap::new(),
            next_handle: 1,
            digital: HashMap::new(),
            analog: HashMap::new(),
            pose_actions: HashMap::new(),
            origins: HashMap::new(),
            haptics: Vec::new(),
            submitted: Vec::new(),
            submit_error: None,
            wait_poses_error: None,
            fail_action_resolution: false,
            manifest_error: None,
            manifest_path: None,
            action_state_updates: 0,
            wait_pose_calls: 0,
            models: HashMap::new(),
            textures: HashMap::new(),
            model_polls: HashMap::new(),
            texture_polls: HashMap::new(),
            shutdowns: 0,
        }
    }

    fn handle_for(&mut self, path: &str) -> u64 {
        if let Some(&handle) = self.handles.get(path) {
            return handle;
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(path.to_owned(), handle);
        handle
    }
}

/// The probe/connect side of the simulated runtime.
pub struct MockEntry {
    data: Arc<Mutex<MockRuntimeData>>,
}

impl MockEntry {
    pub fn new(init: MockRuntimeInit) -> (MockEntry, MockRuntimeHandle) {
        let data = Arc::new(Mutex::new(MockRuntimeData::new(init)));
        let handle = MockRuntimeHandle { data: data.clone() };
        (MockEntry { data }, handle)
    }
}

impl RuntimeEntry for MockEntry {
    type Runtime = MockRuntime;

    fn hmd_present(&self) -> bool {
        self.data.lock().unwrap().init.hmd_present
    }

    fn runtime_installed(&self) -> bool {
        self.data.lock().unwrap().init.runtime_installed
    }

    fn connect(&mut self) -> Result<MockRuntime, Error> {
        let error = self.data.lock().unwrap().init.connect_error.clone();
        match error {
            Some(desc) => Err(Error::RuntimeInit(desc)),
            None => Ok(MockRuntime {
                data: self.data.clone(),
            }),
        }
    }
}

/// The connected side handed to the session.
pub struct MockRuntime {
    data: Arc<Mutex<MockRuntimeData>>,
}

impl Runtime for MockRuntime {
    type Models = MockModels;

    fn recommended_render_target_size(&self) -> (u32, u32) {
        self.data.lock().unwrap().init.render_target_size
    }

    fn projection_matrix(&self, eye: Eye, _near: f32, _far: f32) -> [[f32; 4]; 4] {
        self.data.lock().unwrap().init.projection[eye.index()]
    }

    fn eye_to_head(&self, eye: Eye) -> [[f32; 4]; 3] {
        self.data.lock().unwrap().init.eye_to_head[eye.index()]
    }

    fn device_class(&self, device: usize) -> DeviceClass {
        let mut data = self.data.lock().unwrap();
        data.class_queries[device] += 1;
        data.device_classes[device]
    }

    fn string_property(&self, device: usize, prop: DeviceProperty) -> Result<String, Error> {
        self.data
            .lock()
            .unwrap()
            .string_props
            .get(&(device, prop))
            .cloned()
            .ok_or_else(|| Error::Backend(format!("device {} has no {:?}", device, prop)))
    }

    fn poll_event(&mut self) -> Option<RuntimeEvent> {
        self.data.lock().unwrap().events.pop_front()
    }

    fn acquire_compositor(&mut self) -> Result<(), Error> {
        if self.data.lock().unwrap().init.compositor_available {
            Ok(())
        } else {
            Err(Error::CompositorUnavailable)
        }
    }

    fn wait_get_poses(
        &mut self,
        poses: &mut [DevicePose; MAX_TRACKED_DEVICES],
    ) -> Result<(), Error> {
        let mut data = self.data.lock().unwrap();
        data.wait_pose_calls += 1;
        if let Some(ref desc) = data.wait_poses_error {
            return Err(Error::Compositor(desc.clone()));
        }
        poses.copy_from_slice(&data.poses);
        Ok(())
    }

    fn submit(&mut self, eye: Eye, texture: &SubmitTexture) -> Result<(), Error> {
        let mut data = self.data.lock().unwrap();
        data.submitted.push(SubmittedEye {
            eye,
            texture: *texture,
        });
        match data.submit_error {
            Some(ref desc) => Err(Error::Compositor(desc.clone())),
            None => Ok(()),
        }
    }

    fn load_action_manifest(&mut self, path: &Path) -> Result<(), Error> {
        let mut data = self.data.lock().unwrap();
        if let Some(ref desc) = data.manifest_error {
            return Err(Error::Input(desc.clone()));
        }
        data.manifest_path = Some(path.to_owned());
        Ok(())
    }

    fn action_set_handle(&mut self, path: &str) -> Result<ActionSetHandle, Error> {
        let mut data = self.data.lock().unwrap();
        if data.fail_action_resolution {
            return Err(Error::Input(format!("cannot resolve {}", path)));
        }
        let handle = data.handle_for(path);
        Ok(ActionSetHandle(handle))
    }

    fn action_handle(&mut self, path: &str) -> Result<ActionHandle, Error> {
        let mut data = self.data.lock().unwrap();
        if data.fail_action_resolution {
            return Err(Error::Input(format!("cannot resolve {}", path)));
        }
        let handle = data.handle_for(path);
        Ok(ActionHandle(handle))
    }

    fn input_source_handle(&mut self, path: &str) -> Result<InputHandle, Error> {
        let mut data = self.data.lock().unwrap();
        if data.fail_action_resolution {
            return Err(Error::Input(format!("cannot resolve {}", path)));
        }
        let handle = data.handle_for(path);
        Ok(InputHandle(handle))
    }

    fn update_action_state(&mut self, _set: ActionSetHandle) -> Result<(), Error> {
        self.data.lock().unwrap().action_state_updates += 1;
        Ok(())
    }

    fn digital_action_data(&self, action: ActionHandle) -> Result<DigitalActionData, Error> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .digital
            .get(&action.0)
            .copied()
            .unwrap_or_default())
    }

    fn analog_action_data(&self, action: ActionHandle) -> Result<AnalogActionData, Error> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .analog
            .get(&action.0)
            .copied()
            .unwrap_or_default())
    }

    fn pose_action_data(
        &self,
        action: ActionHandle,
        _universe: TrackingUniverse,
    ) -> Result<PoseActionData, Error> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .pose_actions
            .get(&action.0)
            .copied()
            .unwrap_or(PoseActionData {
                active: false,
                origin: InputHandle::INVALID,
                pose: DevicePose::default(),
            }))
    }

    fn origin_info(&self, origin: InputHandle) -> Result<OriginInfo, Error> {
        self.data
            .lock()
            .unwrap()
            .origins
            .get(&origin.0)
            .copied()
            .ok_or_else(|| Error::Input(format!("unknown origin {:?}", origin)))
    }

    fn trigger_haptic_pulse(
        &mut self,
        action: ActionHandle,
        duration: f32,
        frequency: f32,
        amplitude: f32,
    ) -> Result<(), Error> {
        self.data.lock().unwrap().haptics.push(HapticPulse {
            action,
            duration,
            frequency,
            amplitude,
        });
        Ok(())
    }

    fn models(&self) -> MockModels {
        MockModels {
            data: self.data.clone(),
        }
    }

    fn shutdown(&mut self) {
        self.data.lock().unwrap().shutdowns += 1;
    }
}

/// Cloneable asset-streaming handle, safe to poll from a worker thread.
#[derive(Clone)]
pub struct MockModels {
    data: Arc<Mutex<MockRuntimeData>>,
}

impl ModelSource for MockModels {
    fn load_render_model(&self, name: &str) -> ModelLoad<ModelMesh> {
        let mut data = self.data.lock().unwrap();
        *data.model_polls.entry(name.to_owned()).or_insert(0) += 1;
        match data.models.get_mut(name) {
            None => ModelLoad::Failed(format!("unknown render model {}", name)),
            Some(script) => {
                if script.pending_polls > 0 {
                    script.pending_polls -= 1;
                    ModelLoad::Pending
                } else {
                    match script.result {
                        Ok(ref mesh) => ModelLoad::Ready(mesh.clone()),
                        Err(ref desc) => ModelLoad::Failed(desc.clone()),
                    }
                }
            }
        }
    }

    fn load_texture(&self, id: TextureId) -> ModelLoad<ModelTexture> {
        let mut data = self.data.lock().unwrap();
        *data.texture_polls.entry(id.0).or_insert(0) += 1;
        match data.textures.get_mut(&id.0) {
            None => ModelLoad::Failed(format!("unknown texture {}", id.0)),
            Some(script) => {
                if script.pending_polls > 0 {
                    script.pending_polls -= 1;
                    ModelLoad::Pending
                } else {
                    match script.result {
                        Ok(ref texture) => ModelLoad::Ready(texture.clone()),
                        Err(ref desc) => ModelLoad::Failed(desc.clone()),
                    }
                }
            }
        }
    }
}

/// The scripting/inspection side shared with the test.
#[derive(Clone)]
pub struct MockRuntimeHandle {
    data: Arc<Mutex<MockRuntimeData>>,
}

impl MockRuntimeHandle {
    pub fn set_device_pose(&self, device: usize, device_to_absolute: [[f32; 4]; 3]) {
        self.data.lock().unwrap().poses[device] = DevicePose {
            valid: true,
            device_to_absolute,
        };
    }

    pub fn clear_device_pose(&self, device: usize) {
        self.data.lock().unwrap().poses[device].valid = false;
    }

    pub fn set_device_class(&self, device: usize, class: DeviceClass) {
        self.data.lock().unwrap().device_classes[device] = class;
    }

    /// How many times the session has asked for this device's class.
    pub fn device_class_queries(&self, device: usize) -> u32 {
        self.data.lock().unwrap().class_queries[device]
    }

    pub fn set_string_property(&self, device: usize, prop: DeviceProperty, value: &str) {
        self.data
            .lock()
            .unwrap()
            .string_props
            .insert((device, prop), value.to_owned());
    }

    pub fn push_event(&self, event: RuntimeEvent) {
        self.data.lock().unwrap().events.push_back(event);
    }

    /// The handle the runtime assigned (or will assign) to a path.
    pub fn input_handle(&self, path: &str) -> InputHandle {
        InputHandle(self.data.lock().unwrap().handle_for(path))
    }

    /// Set a digital action's state; the change flag is computed against
    /// the previous poll like a real runtime would.
    pub fn set_digital(&self, action_path: &str, pressed: bool, origin_path: &str) {
        let mut data = self.data.lock().unwrap();
        let action = data.handle_for(action_path);
        let origin = InputHandle(data.handle_for(origin_path));
        let changed = match data.digital.get(&action) {
            Some(prev) => prev.pressed != pressed,
            None => pressed,
        };
        data.digital.insert(
            action,
            DigitalActionData {
                active: true,
                pressed,
                changed,
                origin,
            },
        );
    }

    pub fn clear_digital(&self, action_path: &str) {
        let mut data = self.data.lock().unwrap();
        let action = data.handle_for(action_path);
        data.digital.insert(action, DigitalActionData::default());
    }

    pub fn set_analog(&self, action_path: &str, x: f32, y: f32) {
        let mut data = self.data.lock().unwrap();
        let action = data.handle_for(action_path);
        data.analog
            .insert(action, AnalogActionData { active: true, x, y });
    }

    pub fn clear_analog(&self, action_path: &str) {
        let mut data = self.data.lock().unwrap();
        let action = data.handle_for(action_path);
        data.analog.insert(action, AnalogActionData::default());
    }

    pub fn set_pose_action(
        &self,
        action_path: &str,
        device_to_absolute: [[f32; 4]; 3],
        origin_path: &str,
    ) {
        let mut data = self.data.lock().unwrap();
        let action = data.handle_for(action_path);
        let origin = InputHandle(data.handle_for(origin_path));
        data.pose_actions.insert(
            action,
            PoseActionData {
                active: true,
                origin,
                pose: DevicePose {
                    valid: true,
                    device_to_absolute,
                },
            },
        );
    }

    pub fn clear_pose_action(&self, action_path: &str) {
        let mut data = self.data.lock().unwrap();
        let action = data.handle_for(action_path);
        data.pose_actions.insert(
            action,
            PoseActionData {
                active: false,
                origin: InputHandle::INVALID,
                pose: DevicePose::default(),
            },
        );
    }

    /// Associate an origin path with the tracked device behind it.
    pub fn bind_origin(&self, origin_path: &str, device_index: usize) {
        let mut data = self.data.lock().unwrap();
        let handle = data.handle_for(origin_path);
        data.origins.insert(
            handle,
            OriginInfo {
                device_index,
                device_path: InputHandle(handle),
            },
        );
    }

    /// Script a mesh load: report "still loading" for `pending_polls`
    /// polls, then the given outcome.
    pub fn script_model(&self, name: &str, pending_polls: u32, result: Result<ModelMesh, String>) {
        self.data.lock().unwrap().models.insert(
            name.to_owned(),
            ModelScript {
                pending_polls,
                result,
            },
        );
    }

    pub fn script_texture(
        &self,
        id: TextureId,
        pending_polls: u32,
        result: Result<ModelTexture, String>,
    ) {
        self.data.lock().unwrap().textures.insert(
            id.0,
            TextureScript {
                pending_polls,
                result,
            },
        );
    }

    pub fn model_polls(&self, name: &str) -> u32 {
        self.data
            .lock()
            .unwrap()
            .model_polls
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn texture_polls(&self, id: TextureId) -> u32 {
        self.data
            .lock()
            .unwrap()
            .texture_polls
            .get(&id.0)
            .copied()
            .unwrap_or(0)
    }

    pub fn haptic_pulses(&self) -> Vec<HapticPulse> {
        self.data.lock().unwrap().haptics.clone()
    }

    pub fn submitted(&self) -> Vec<SubmittedEye> {
        self.data.lock().unwrap().submitted.clone()
    }

    pub fn set_submit_error(&self, desc: Option<&str>) {
        self.data.lock().unwrap().submit_error = desc.map(str::to_owned);
    }

    pub fn set_wait_poses_error(&self, desc: Option<&str>) {
        self.data.lock().unwrap().wait_poses_error = desc.map(str::to_owned);
    }

    pub fn set_fail_action_resolution(&self, fail: bool) {
        self.data.lock().unwrap().fail_action_resolution = fail;
    }

    pub fn set_manifest_error(&self, desc: Option<&str>) {
        self.data.lock().unwrap().manifest_error = desc.map(str::to_owned);
    }

    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.data.lock().unwrap().manifest_path.clone()
    }

    pub fn wait_pose_calls(&self) -> u32 {
        self.data.lock().unwrap().wait_pose_calls
    }

    pub fn action_state_updates(&self) -> u32 {
        self.data.lock().unwrap().action_state_updates
    }

    pub fn shutdowns(&self) -> u32 {
        self.data.lock().unwrap().shutdowns
    }
}

/// A one-triangle mesh suitable for load scripts.
pub fn sample_mesh(diffuse_texture: TextureId) -> ModelMesh {
    ModelMesh {
        vertices: vec![
            ModelVertex {
                position: [0.0, 0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coord: [0.0, 0.0],
            },
            ModelVertex {
                position: [1.0, 0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coord: [1.0, 0.0],
            },
            ModelVertex {
                position: [0.0, 1.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coord: [0.0, 1.0],
            },
        ],
        indices: vec![0, 1, 2],
        diffuse_texture,
    }
}

/// A 2×2 white texture suitable for load scripts.
pub fn sample_texture() -> ModelTexture {
    ModelTexture {
        width: 2,
        height: 2,
        data: vec![0xff; 16],
    }
}

const RESOLVE_TEXTURE_BASE: u32 = 100;

/// Operations recorded by [`MockGraphics`], in call order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GraphicsOp {
    CreateEyeTarget(u32),
    DestroyEyeTarget(u32),
    BeginEye(u32),
    ResolveEye(u32),
    UploadModel(u32),
    DestroyModel(u32),
    DrawModel(u32),
}

#[derive(Debug)]
pub struct MockEyeTarget {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
}

#[derive(Debug)]
pub struct MockGpuModel {
    pub id: u32,
    pub index_count: u32,
}

#[derive(Default)]
struct MockGraphicsState {
    next_id: u32,
    live_targets: HashSet<u32>,
    live_models: HashSet<u32>,
    ops: Vec<GraphicsOp>,
    fail_eye_target: Option<u32>,
}

/// A recording `Graphics` implementation with failure injection.
pub struct MockGraphics {
    state: Rc<RefCell<MockGraphicsState>>,
}

/// Inspection side of [`MockGraphics`].
#[derive(Clone)]
pub struct MockGraphicsHandle {
    state: Rc<RefCell<MockGraphicsState>>,
}

impl MockGraphics {
    pub fn new() -> (MockGraphics, MockGraphicsHandle) {
        let state = Rc::new(RefCell::new(MockGraphicsState::default()));
        let handle = MockGraphicsHandle {
            state: state.clone(),
        };
        (MockGraphics { state }, handle)
    }
}

impl Graphics for MockGraphics {
    type EyeTarget = MockEyeTarget;
    type Model = MockGpuModel;

    fn create_eye_target(
        &mut self,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<MockEyeTarget, Error> {
        let mut state = self.state.borrow_mut();
        if let Some(status) = state.fail_eye_target {
            return Err(Error::IncompleteFramebuffer(status));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.live_targets.insert(id);
        state.ops.push(GraphicsOp::CreateEyeTarget(id));
        Ok(MockEyeTarget {
            id,
            width,
            height,
            samples,
        })
    }

    fn destroy_eye_target(&mut self, target: &MockEyeTarget) {
        let mut state = self.state.borrow_mut();
        state.live_targets.remove(&target.id);
        state.ops.push(GraphicsOp::DestroyEyeTarget(target.id));
    }

    fn begin_eye_pass(&mut self, target: &MockEyeTarget, _width: u32, _height: u32) {
        self.state.borrow_mut().ops.push(GraphicsOp::BeginEye(target.id));
    }

    fn resolve_eye_pass(&mut self, target: &MockEyeTarget, _width: u32, _height: u32) {
        self.state.borrow_mut().ops.push(GraphicsOp::ResolveEye(target.id));
    }

    fn resolve_texture(&self, target: &MockEyeTarget) -> TextureHandle {
        TextureHandle::OpenGl(RESOLVE_TEXTURE_BASE + target.id)
    }

    fn upload_model(
        &mut self,
        mesh: &ModelMesh,
        _texture: &ModelTexture,
    ) -> Result<MockGpuModel, Error> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.live_models.insert(id);
        state.ops.push(GraphicsOp::UploadModel(id));
        Ok(MockGpuModel {
            id,
            index_count: mesh.indices.len() as u32,
        })
    }

    fn destroy_model(&mut self, model: &MockGpuModel) {
        let mut state = self.state.borrow_mut();
        state.live_models.remove(&model.id);
        state.ops.push(GraphicsOp::DestroyModel(model.id));
    }

    fn draw_model(&mut self, model: &MockGpuModel) {
        self.state.borrow_mut().ops.push(GraphicsOp::DrawModel(model.id));
    }
}

impl MockGraphicsHandle {
    pub fn ops(&self) -> Vec<GraphicsOp> {
        self.state.borrow().ops.clone()
    }

    pub fn live_targets(&self) -> usize {
        self.state.borrow().live_targets.len()
    }

    pub fn live_models(&self) -> usize {
        self.state.borrow().live_models.len()
    }

    /// Make subsequent eye-target allocations fail with this GL status.
    pub fn set_fail_eye_target(&self, status: Option<u32>) {
        self.state.borrow_mut().fail_eye_target = status;
    }
}
