/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Document model of the action manifest the runtime consumes: one action
//! set declaring the digital, analog, pose and haptic actions this layer
//! resolves at session start.

use crate::input;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use vrbridge_api::Error;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionManifest {
    #[serde(default)]
    pub default_bindings: Vec<DefaultBinding>,
    #[serde(default)]
    pub action_sets: Vec<ActionSetDecl>,
    pub actions: Vec<ActionDecl>,
    #[serde(default)]
    pub localization: Vec<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DefaultBinding {
    pub controller_type: String,
    pub binding_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActionSetDecl {
    pub name: String,
    pub usage: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActionDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Boolean,
    Vector2,
    Pose,
    Vibration,
}

impl ActionManifest {
    /// The manifest this layer expects: one action set with the trigger,
    /// grip and menu booleans, the trackpad vector, and per-hand pose and
    /// vibration actions.
    pub fn standard() -> ActionManifest {
        let boolean = |name: &str| ActionDecl {
            name: name.to_owned(),
            kind: ActionKind::Boolean,
            requirement: None,
        };
        let mut actions = vec![
            boolean(input::TRIGGER_ACTION),
            boolean(input::GRIP_ACTION),
            boolean(input::MENU_ACTION),
            ActionDecl {
                name: input::TRACKPAD_ACTION.to_owned(),
                kind: ActionKind::Vector2,
                requirement: None,
            },
        ];
        for hand in 0..2 {
            actions.push(ActionDecl {
                name: input::HAND_POSE_ACTIONS[hand].to_owned(),
                kind: ActionKind::Pose,
                requirement: None,
            });
            actions.push(ActionDecl {
                name: input::HAPTIC_ACTIONS[hand].to_owned(),
                kind: ActionKind::Vibration,
                requirement: Some("optional".to_owned()),
            });
        }

        let mut names = BTreeMap::new();
        names.insert("language_tag".to_owned(), "en_US".to_owned());
        names.insert(input::TRIGGER_ACTION.to_owned(), "Trigger".to_owned());
        names.insert(input::GRIP_ACTION.to_owned(), "Grip".to_owned());
        names.insert(input::MENU_ACTION.to_owned(), "Application Menu".to_owned());
        names.insert(input::TRACKPAD_ACTION.to_owned(), "Trackpad".to_owned());

        ActionManifest {
            default_bindings: vec![DefaultBinding {
                controller_type: "vive_controller".to_owned(),
                binding_url: "bindings_vive_controller.json".to_owned(),
            }],
            action_sets: vec![ActionSetDecl {
                name: input::ACTION_SET.to_owned(),
                usage: "single".to_owned(),
            }],
            actions,
            localization: vec![names],
        }
    }

    pub fn from_file(path: &Path) -> Result<ActionManifest, Error> {
        let file = File::open(path)
            .map_err(|e| Error::Input(format!("cannot open {}: {}", path.display(), e)))?;
        serde_json::from_reader(file)
            .map_err(|e| Error::Input(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let file = File::create(path)
            .map_err(|e| Error::Input(format!("cannot create {}: {}", path.display(), e)))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Input(format!("cannot write {}: {}", path.display(), e)))
    }

    pub fn declares(&self, action_path: &str) -> bool {
        self.actions.iter().any(|action| action.name == action_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_declares_every_resolved_action() {
        let manifest = ActionManifest::standard();
        for path in [
            input::TRIGGER_ACTION,
            input::GRIP_ACTION,
            input::MENU_ACTION,
            input::TRACKPAD_ACTION,
            input::HAND_POSE_ACTIONS[0],
            input::HAND_POSE_ACTIONS[1],
            input::HAPTIC_ACTIONS[0],
            input::HAPTIC_ACTIONS[1],
        ]
        .iter()
        {
            assert!(manifest.declares(path), "missing {}", path);
        }
        assert_eq!(manifest.action_sets[0].name, input::ACTION_SET);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.json");
        let manifest = ActionManifest::standard();
        manifest.write_to(&path).unwrap();
        assert_eq!(ActionManifest::from_file(&path).unwrap(), manifest);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = ActionManifest::from_file(Path::new("/nonexistent/actions.json")).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn action_types_serialize_lowercase() {
        let json = serde_json::to_string(&ActionManifest::standard()).unwrap();
        assert!(json.contains("\"boolean\""));
        assert!(json.contains("\"vector2\""));
        assert!(json.contains("\"pose\""));
        assert!(json.contains("\"vibration\""));
    }
}
