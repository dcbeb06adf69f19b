/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::DevicePose;

#[cfg(feature = "ipc")]
use serde::{Deserialize, Serialize};

/// Opaque handle to a resolved action.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct ActionHandle(pub u64);

/// Opaque handle to a resolved action set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct ActionSetHandle(pub u64);

/// Opaque handle to an input source or an action's active origin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct InputHandle(pub u64);

impl ActionHandle {
    pub const INVALID: ActionHandle = ActionHandle(0);
}

impl ActionSetHandle {
    pub const INVALID: ActionSetHandle = ActionSetHandle(0);
}

impl InputHandle {
    pub const INVALID: InputHandle = InputHandle(0);
}

impl Default for InputHandle {
    fn default() -> InputHandle {
        InputHandle::INVALID
    }
}

/// One of the user's two hands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const COUNT: usize = 2;
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// One poll of a digital (boolean) action.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct DigitalActionData {
    /// The action is bound to a live device this frame.
    pub active: bool,
    /// Current boolean state.
    pub pressed: bool,
    /// State differs from the previous poll.
    pub changed: bool,
    /// The input source the state came from.
    pub origin: InputHandle,
}

/// One poll of a two-axis analog action.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct AnalogActionData {
    pub active: bool,
    pub x: f32,
    pub y: f32,
}

/// One poll of a pose action, predicted for the next frame.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct PoseActionData {
    pub active: bool,
    pub origin: InputHandle,
    pub pose: DevicePose,
}

/// The tracked device behind an action's active origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct OriginInfo {
    pub device_index: usize,
    pub device_path: InputHandle,
}

/// How a digital action's state is interpreted. Different actions in the
/// same session use different interpretations, so all three are exposed
/// through one evaluation point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum DigitalActivation {
    /// Currently active and held down.
    Held,
    /// Became pressed on this poll.
    Rising,
    /// Became released on this poll.
    Falling,
}

impl DigitalActivation {
    pub fn evaluate(self, data: &DigitalActionData) -> bool {
        match self {
            DigitalActivation::Held => data.active && data.pressed,
            DigitalActivation::Rising => data.active && data.changed && data.pressed,
            DigitalActivation::Falling => data.active && data.changed && !data.pressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(active: bool, pressed: bool, changed: bool) -> DigitalActionData {
        DigitalActionData {
            active,
            pressed,
            changed,
            origin: InputHandle::INVALID,
        }
    }

    #[test]
    fn held_ignores_edges() {
        assert!(DigitalActivation::Held.evaluate(&poll(true, true, true)));
        assert!(DigitalActivation::Held.evaluate(&poll(true, true, false)));
        assert!(!DigitalActivation::Held.evaluate(&poll(true, false, true)));
        assert!(!DigitalActivation::Held.evaluate(&poll(false, true, true)));
    }

    #[test]
    fn rising_fires_once_per_press() {
        // press, hold, release, hold released, press again
        let sequence = [
            poll(true, true, true),
            poll(true, true, false),
            poll(true, false, true),
            poll(true, false, false),
            poll(true, true, true),
        ];
        let fired: Vec<bool> = sequence
            .iter()
            .map(|d| DigitalActivation::Rising.evaluate(d))
            .collect();
        assert_eq!(fired, vec![true, false, false, false, true]);
    }

    #[test]
    fn falling_fires_only_on_release() {
        let sequence = [
            poll(true, true, true),
            poll(true, true, false),
            poll(true, false, true),
            poll(true, false, false),
        ];
        let fired: Vec<bool> = sequence
            .iter()
            .map(|d| DigitalActivation::Falling.evaluate(d))
            .collect();
        assert_eq!(fired, vec![false, false, true, false]);
    }

    #[test]
    fn inactive_never_fires() {
        for activation in [
            DigitalActivation::Held,
            DigitalActivation::Rising,
            DigitalActivation::Falling,
        ]
        .iter()
        {
            assert!(!activation.evaluate(&poll(false, true, true)));
            assert!(!activation.evaluate(&poll(false, false, true)));
        }
    }
}
