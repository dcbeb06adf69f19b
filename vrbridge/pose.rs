/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-frame device pose resolution. The compositor's pose wait is the
//! synchronization point that paces the whole loop to the display's
//! refresh cycle.

use euclid::Transform3D;
use log::debug;

use vrbridge_api::math::transform_from_3x4;
use vrbridge_api::Device;
use vrbridge_api::DeviceClass;
use vrbridge_api::DevicePose;
use vrbridge_api::Error;
use vrbridge_api::Native;
use vrbridge_api::Runtime;
use vrbridge_api::Viewer;
use vrbridge_api::HMD_DEVICE_INDEX;
use vrbridge_api::MAX_TRACKED_DEVICES;

pub struct PoseTracker {
    poses: [DevicePose; MAX_TRACKED_DEVICES],
    transforms: [Transform3D<f32, Device, Native>; MAX_TRACKED_DEVICES],
    classes: [Option<DeviceClass>; MAX_TRACKED_DEVICES],
    head: Transform3D<f32, Native, Viewer>,
}

impl PoseTracker {
    pub fn new() -> PoseTracker {
        PoseTracker {
            poses: [DevicePose::default(); MAX_TRACKED_DEVICES],
            transforms: [Transform3D::identity(); MAX_TRACKED_DEVICES],
            classes: [None; MAX_TRACKED_DEVICES],
            head: Transform3D::identity(),
        }
    }

    /// Block until the compositor hands back this frame's poses, then
    /// refresh every valid slot. An invalid pose freezes its slot's last
    /// known transform; it is never an error.
    pub fn update<R: Runtime>(&mut self, runtime: &mut R) -> Result<(), Error> {
        runtime.wait_get_poses(&mut self.poses)?;

        let mut valid_count = 0;
        let mut pose_classes = String::new();
        for device in 0..MAX_TRACKED_DEVICES {
            if !self.poses[device].valid {
                continue;
            }
            valid_count += 1;
            self.transforms[device] = transform_from_3x4(&self.poses[device].device_to_absolute);
            // The class of the hardware in a slot never changes while the
            // session lives, so query it on first valid observation only.
            let class = match self.classes[device] {
                Some(class) => class,
                None => {
                    let class = runtime.device_class(device);
                    self.classes[device] = Some(class);
                    class
                }
            };
            pose_classes.push(class.tag());
        }

        // Consumers compose scene transforms against a world-to-head
        // basis, so the head transform is the inverse of the HMD's
        // device-to-world pose.
        if self.poses[HMD_DEVICE_INDEX].valid {
            if let Some(inverse) = self.transforms[HMD_DEVICE_INDEX].inverse() {
                self.head = inverse.with_destination::<Viewer>();
            }
        }

        debug!("{} valid poses: {}", valid_count, pose_classes);
        Ok(())
    }

    /// World-to-head transform derived from the HMD slot.
    pub fn head_transform(&self) -> Transform3D<f32, Native, Viewer> {
        self.head
    }

    /// Last known device-to-world transform for a slot.
    pub fn device_transform(&self, device: usize) -> Transform3D<f32, Device, Native> {
        self.transforms[device]
    }

    /// Cached class of the hardware in a slot, if it has ever had a
    /// valid pose.
    pub fn device_class(&self, device: usize) -> Option<DeviceClass> {
        self.classes[device]
    }

    pub fn pose_valid(&self, device: usize) -> bool {
        self.poses[device].valid
    }
}
