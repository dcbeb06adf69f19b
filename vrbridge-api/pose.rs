/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#[cfg(feature = "ipc")]
use serde::{Deserialize, Serialize};

/// The fixed number of device slots the runtime tracks.
pub const MAX_TRACKED_DEVICES: usize = 64;

/// The head-mounted display always occupies this reserved slot.
pub const HMD_DEVICE_INDEX: usize = 0;

/// What kind of hardware occupies a device slot. Resolved lazily on the
/// first valid observation and cached for the session's lifetime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum DeviceClass {
    Invalid,
    Hmd,
    Controller,
    GenericTracker,
    TrackingReference,
}

impl DeviceClass {
    /// One-character tag used in per-frame pose summaries.
    pub fn tag(self) -> char {
        match self {
            DeviceClass::Hmd => 'H',
            DeviceClass::Controller => 'C',
            DeviceClass::GenericTracker => 'G',
            DeviceClass::TrackingReference => 'T',
            DeviceClass::Invalid => 'I',
        }
    }
}

/// The coordinate space convention poses are reported in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum TrackingUniverse {
    Seated,
    Standing,
    Raw,
}

/// A single device slot's pose as the runtime reports it: a validity
/// flag and a 3×4 row-major device-to-absolute transform.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct DevicePose {
    pub valid: bool,
    pub device_to_absolute: [[f32; 4]; 3],
}

impl DevicePose {
    pub fn identity() -> DevicePose {
        DevicePose {
            valid: true,
            device_to_absolute: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }
}

impl Default for DevicePose {
    fn default() -> DevicePose {
        DevicePose {
            valid: false,
            ..DevicePose::identity()
        }
    }
}
