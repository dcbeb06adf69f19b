/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Translation of runtime input events and action state into the
//! application's digital/analog/pose/haptic model.

use crate::manifest::ActionManifest;

use euclid::Transform3D;
use log::{info, warn};
use std::path::Path;

use vrbridge_api::math::transform_from_3x4;
use vrbridge_api::ActionHandle;
use vrbridge_api::ActionSetHandle;
use vrbridge_api::Device;
use vrbridge_api::DeviceProperty;
use vrbridge_api::DigitalActivation;
use vrbridge_api::Event;
use vrbridge_api::EventBuffer;
use vrbridge_api::Hand;
use vrbridge_api::InputHandle;
use vrbridge_api::Native;
use vrbridge_api::Runtime;
use vrbridge_api::RuntimeEvent;
use vrbridge_api::TrackingUniverse;
use vrbridge_api::MAX_TRACKED_DEVICES;

pub const ACTION_SET: &str = "/actions/main";
pub const TRIGGER_ACTION: &str = "/actions/main/in/trigger";
pub const GRIP_ACTION: &str = "/actions/main/in/grip";
pub const TRACKPAD_ACTION: &str = "/actions/main/in/trackpad";
pub const MENU_ACTION: &str = "/actions/main/in/application_menu";
pub const HAND_POSE_ACTIONS: [&str; 2] = [
    "/actions/main/in/hand_left",
    "/actions/main/in/hand_right",
];
pub const HAPTIC_ACTIONS: [&str; 2] = [
    "/actions/main/out/haptic_left",
    "/actions/main/out/haptic_right",
];
pub const HAND_SOURCES: [&str; 2] = ["/user/hand/left", "/user/hand/right"];

// One grip pulse, as felt on the matching hand.
pub const HAPTIC_DURATION_SECONDS: f32 = 1.0;
pub const HAPTIC_FREQUENCY_HZ: f32 = 4.0;
pub const HAPTIC_AMPLITUDE: f32 = 1.0;

struct Controller {
    source: InputHandle,
    pose_action: ActionHandle,
    haptic_action: ActionHandle,
    transform: Transform3D<f32, Device, Native>,
}

/// Render-model names discovered this frame for hands that have no
/// bound asset yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelRequests {
    pub names: [Option<String>; 2],
}

pub struct ActionInput {
    enabled: bool,
    action_set: ActionSetHandle,
    trigger: ActionHandle,
    grip: ActionHandle,
    trackpad: ActionHandle,
    menu: ActionHandle,
    controllers: [Controller; 2],
    trigger_held: bool,
    menu_held: bool,
    trackpad_state: [f32; 2],
}

fn resolve_action<R: Runtime>(runtime: &mut R, path: &str) -> ActionHandle {
    match runtime.action_handle(path) {
        Ok(handle) => handle,
        Err(err) => {
            warn!("failed to resolve action {}: {}", path, err);
            ActionHandle::INVALID
        }
    }
}

fn resolve_source<R: Runtime>(runtime: &mut R, path: &str) -> InputHandle {
    match runtime.input_source_handle(path) {
        Ok(handle) => handle,
        Err(err) => {
            warn!("failed to resolve input source {}: {}", path, err);
            InputHandle::INVALID
        }
    }
}

fn resolve_controller<R: Runtime>(runtime: &mut R, hand: usize) -> Controller {
    Controller {
        source: resolve_source(runtime, HAND_SOURCES[hand]),
        pose_action: resolve_action(runtime, HAND_POSE_ACTIONS[hand]),
        haptic_action: resolve_action(runtime, HAPTIC_ACTIONS[hand]),
        transform: Transform3D::identity(),
    }
}

impl ActionInput {
    /// Load the manifest and resolve every handle. Resolution failure is
    /// never fatal; the affected actions simply stay inactive for the
    /// session.
    pub fn resolve<R: Runtime>(runtime: &mut R, manifest_path: &Path) -> ActionInput {
        let mut enabled = true;

        if let Err(err) = ActionManifest::from_file(manifest_path) {
            warn!("action manifest rejected, input disabled: {}", err);
            enabled = false;
        }
        if enabled {
            if let Err(err) = runtime.load_action_manifest(manifest_path) {
                warn!("runtime rejected action manifest, input disabled: {}", err);
                enabled = false;
            }
        }

        let action_set = match runtime.action_set_handle(ACTION_SET) {
            Ok(handle) => handle,
            Err(err) => {
                warn!("failed to resolve action set {}: {}", ACTION_SET, err);
                enabled = false;
                ActionSetHandle::INVALID
            }
        };

        let trigger = resolve_action(runtime, TRIGGER_ACTION);
        let grip = resolve_action(runtime, GRIP_ACTION);
        let trackpad = resolve_action(runtime, TRACKPAD_ACTION);
        let menu = resolve_action(runtime, MENU_ACTION);

        let controllers = [resolve_controller(runtime, 0), resolve_controller(runtime, 1)];

        ActionInput {
            enabled,
            action_set,
            trigger,
            grip,
            trackpad,
            menu,
            controllers,
            trigger_held: false,
            menu_held: false,
            trackpad_state: [0.0, 0.0],
        }
    }

    /// Drain pending runtime events and read this frame's action state.
    /// `bound` flags hands that already hold a render-model asset;
    /// returns the model names newly discovered for the others.
    ///
    /// Individual reads the runtime reports as inactive or invalid are
    /// skipped for the frame, silently: anything else would spam logs at
    /// the display's refresh rate.
    pub fn update<R: Runtime>(
        &mut self,
        runtime: &mut R,
        events: &mut EventBuffer,
        bound: [bool; 2],
    ) -> ModelRequests {
        while let Some(event) = runtime.poll_event() {
            match event {
                RuntimeEvent::DeviceActivated { device } => {
                    info!("device {} attached", device);
                    events.callback(Event::DeviceAttached(device));
                }
                RuntimeEvent::DeviceDeactivated { device } => {
                    info!("device {} detached", device);
                    events.callback(Event::DeviceDetached(device));
                }
                RuntimeEvent::DeviceUpdated { device } => {
                    info!("device {} updated", device);
                    events.callback(Event::DeviceUpdated(device));
                }
            }
        }

        let mut requests = ModelRequests::default();
        if !self.enabled {
            return requests;
        }
        if runtime.update_action_state(self.action_set).is_err() {
            return requests;
        }

        if let Ok(data) = runtime.digital_action_data(self.trigger) {
            self.trigger_held = DigitalActivation::Held.evaluate(&data);
        }
        if let Ok(data) = runtime.digital_action_data(self.menu) {
            self.menu_held = DigitalActivation::Held.evaluate(&data);
        }

        if let Ok(data) = runtime.digital_action_data(self.grip) {
            if DigitalActivation::Rising.evaluate(&data) {
                if let Ok(origin) = runtime.origin_info(data.origin) {
                    for &hand in Hand::BOTH.iter() {
                        let controller = &self.controllers[hand.index()];
                        if origin.device_path == controller.source {
                            let _ = runtime.trigger_haptic_pulse(
                                controller.haptic_action,
                                HAPTIC_DURATION_SECONDS,
                                HAPTIC_FREQUENCY_HZ,
                                HAPTIC_AMPLITUDE,
                            );
                        }
                    }
                }
            }
        }

        if let Ok(data) = runtime.analog_action_data(self.trackpad) {
            if data.active {
                self.trackpad_state = [data.x, data.y];
            }
        }

        for &hand in Hand::BOTH.iter() {
            let controller = &mut self.controllers[hand.index()];
            let data =
                match runtime.pose_action_data(controller.pose_action, TrackingUniverse::Standing) {
                    Ok(data) => data,
                    Err(_) => continue,
                };
            if !data.active || !data.pose.valid {
                continue;
            }
            controller.transform = transform_from_3x4(&data.pose.device_to_absolute);

            if bound[hand.index()] {
                continue;
            }
            let origin = match runtime.origin_info(data.origin) {
                Ok(origin) => origin,
                Err(_) => continue,
            };
            if origin.device_index >= MAX_TRACKED_DEVICES {
                continue;
            }
            match runtime.string_property(origin.device_index, DeviceProperty::RenderModelName) {
                Ok(ref name) if !name.is_empty() => {
                    requests.names[hand.index()] = Some(name.clone());
                }
                _ => {}
            }
        }

        requests
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn trigger_held(&self) -> bool {
        self.trigger_held
    }

    pub fn menu_held(&self) -> bool {
        self.menu_held
    }

    pub fn trackpad(&self) -> [f32; 2] {
        self.trackpad_state
    }

    pub fn controller_transform(&self, hand: Hand) -> Transform3D<f32, Device, Native> {
        self.controllers[hand.index()].transform
    }
}
