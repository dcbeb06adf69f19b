/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! This crate defines the Rust API for the vrbridge HMD integration
//! layer. It is implemented by the `vrbridge` crate.

mod error;
mod events;
mod graphics;
mod input;
pub mod math;
pub mod mock;
mod model;
mod pose;
mod runtime;
mod view;

pub use error::Error;

pub use events::Event;
pub use events::EventBuffer;
pub use events::EventSink;

pub use graphics::Graphics;

pub use input::ActionHandle;
pub use input::ActionSetHandle;
pub use input::AnalogActionData;
pub use input::DigitalActionData;
pub use input::DigitalActivation;
pub use input::Hand;
pub use input::InputHandle;
pub use input::OriginInfo;
pub use input::PoseActionData;

pub use model::ModelLoad;
pub use model::ModelMesh;
pub use model::ModelTexture;
pub use model::ModelVertex;
pub use model::TextureId;

pub use pose::DeviceClass;
pub use pose::DevicePose;
pub use pose::TrackingUniverse;
pub use pose::HMD_DEVICE_INDEX;
pub use pose::MAX_TRACKED_DEVICES;

pub use runtime::ColorSpace;
pub use runtime::DeviceProperty;
pub use runtime::ModelSource;
pub use runtime::Runtime;
pub use runtime::RuntimeEntry;
pub use runtime::RuntimeEvent;
pub use runtime::SubmitTexture;
pub use runtime::TextureHandle;

pub use view::Device;
pub use view::Display;
pub use view::Eye;
pub use view::LeftEye;
pub use view::Native;
pub use view::RightEye;
pub use view::Viewer;
