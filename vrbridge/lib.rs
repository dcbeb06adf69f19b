/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! This crate implements the vrbridge HMD integration layer: it connects
//! an application's stereo renderer to a device runtime's compositor,
//! tracks device poses and input actions once per frame, streams in
//! controller render models in the background, and drives the
//! multisampled two-eye render loop.

pub mod gl;
pub mod input;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod pose;
pub mod session;

pub use input::ActionInput;
pub use manifest::ActionManifest;
pub use model::LoadPolicy;
pub use model::RenderModelAsset;
pub use model::RenderModelCache;
pub use pipeline::EyeFrame;
pub use pipeline::StereoPipeline;
pub use pose::PoseTracker;
pub use session::SessionConfig;
pub use session::VrSession;
