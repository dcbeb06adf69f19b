/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Full-session tests against the scripted runtime and graphics
//! backends.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use euclid::Transform3D;

use vrbridge::input::{GRIP_ACTION, HAND_POSE_ACTIONS, HAND_SOURCES};
use vrbridge::{ActionManifest, LoadPolicy, SessionConfig, VrSession};

use vrbridge_api::math::{transform_from_3x4, transform_from_4x4};
use vrbridge_api::mock::{
    sample_mesh, sample_texture, GraphicsOp, MockEntry, MockGraphics, MockGraphicsHandle,
    MockRuntime, MockRuntimeHandle, MockRuntimeInit,
};
use vrbridge_api::{
    ColorSpace, Device, DeviceClass, DeviceProperty, Display, Error, Eye, Hand, LeftEye, Native,
    TextureId, Viewer, HMD_DEVICE_INDEX,
};

type MockSession = VrSession<MockRuntime, MockGraphics>;

struct Harness {
    session: MockSession,
    runtime: MockRuntimeHandle,
    graphics: MockGraphicsHandle,
    _manifest_dir: tempfile::TempDir,
}

fn config_with_manifest(dir: &tempfile::TempDir) -> SessionConfig {
    let manifest_path = dir.path().join("actions.json");
    ActionManifest::standard().write_to(&manifest_path).unwrap();
    SessionConfig {
        action_manifest_path: manifest_path,
        model_load: LoadPolicy {
            poll_interval: Duration::from_millis(2),
            max_polls: 50,
        },
        ..SessionConfig::default()
    }
}

fn harness_with(init: MockRuntimeInit) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_manifest(&dir);
    let (entry, runtime) = MockEntry::new(init);
    let (graphics, graphics_handle) = MockGraphics::new();
    let session = VrSession::init(entry, graphics, config).unwrap();
    Harness {
        session,
        runtime,
        graphics: graphics_handle,
        _manifest_dir: dir,
    }
}

fn harness() -> Harness {
    harness_with(MockRuntimeInit::default())
}

fn identity_pose() -> [[f32; 4]; 3] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ]
}

fn hmd_pose() -> [[f32; 4]; 3] {
    let (s, c) = (0.28_f32, 0.96_f32);
    [
        [c, 0.0, s, 0.1],
        [0.0, 1.0, 0.0, 1.7],
        [-s, 0.0, c, 0.4],
    ]
}

/// Drive frames until a hand binds its render model.
fn update_until_active(session: &mut MockSession, hand: Hand) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        session.update();
        if session.is_controller_active(hand) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn init_fails_fatally_without_an_hmd() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, _) = MockEntry::new(MockRuntimeInit {
        hmd_present: false,
        ..MockRuntimeInit::default()
    });
    let (graphics, _) = MockGraphics::new();
    let err = VrSession::init(entry, graphics, config_with_manifest(&dir)).unwrap_err();
    assert_eq!(err, Error::NoHmd);
    assert!(err.is_fatal());
}

#[test]
fn init_fails_fatally_without_an_installed_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, _) = MockEntry::new(MockRuntimeInit {
        runtime_installed: false,
        ..MockRuntimeInit::default()
    });
    let (graphics, _) = MockGraphics::new();
    let err = VrSession::init(entry, graphics, config_with_manifest(&dir)).unwrap_err();
    assert_eq!(err, Error::RuntimeNotInstalled);
}

#[test]
fn init_surfaces_the_runtimes_connect_description() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, _) = MockEntry::new(MockRuntimeInit {
        connect_error: Some("a component is missing".into()),
        ..MockRuntimeInit::default()
    });
    let (graphics, _) = MockGraphics::new();
    let err = VrSession::init(entry, graphics, config_with_manifest(&dir)).unwrap_err();
    assert_eq!(err, Error::RuntimeInit("a component is missing".into()));
    assert!(err.to_string().contains("a component is missing"));
}

#[test]
fn init_fails_fatally_without_a_compositor() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, runtime) = MockEntry::new(MockRuntimeInit {
        compositor_available: false,
        ..MockRuntimeInit::default()
    });
    let (graphics, _) = MockGraphics::new();
    let err = VrSession::init(entry, graphics, config_with_manifest(&dir)).unwrap_err();
    assert_eq!(err, Error::CompositorUnavailable);
    // The half-open connection is shut down again.
    assert_eq!(runtime.shutdowns(), 1);
}

#[test]
fn init_fails_fatally_on_an_incomplete_framebuffer() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, runtime) = MockEntry::new(MockRuntimeInit::default());
    let (graphics, graphics_handle) = MockGraphics::new();
    graphics_handle.set_fail_eye_target(Some(0x8CD6));
    let err = VrSession::init(entry, graphics, config_with_manifest(&dir)).unwrap_err();
    assert_eq!(err, Error::IncompleteFramebuffer(0x8CD6));
    assert_eq!(runtime.shutdowns(), 1);
}

#[test]
fn init_reads_driver_and_display_names() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, runtime) = MockEntry::new(MockRuntimeInit::default());
    runtime.set_string_property(
        HMD_DEVICE_INDEX,
        DeviceProperty::TrackingSystemName,
        "lighthouse",
    );
    runtime.set_string_property(HMD_DEVICE_INDEX, DeviceProperty::SerialNumber, "LHR-00000001");
    let (graphics, _) = MockGraphics::new();
    let session: MockSession =
        VrSession::init(entry, graphics, config_with_manifest(&dir)).unwrap();
    assert_eq!(session.driver_name(), "lighthouse");
    assert_eq!(session.display_name(), "LHR-00000001");
    assert_eq!(session.render_target_size(), (1512, 1680));
}

#[test]
fn a_missing_manifest_degrades_input_but_not_the_session() {
    let (entry, runtime) = MockEntry::new(MockRuntimeInit::default());
    let (graphics, _) = MockGraphics::new();
    let config = SessionConfig {
        action_manifest_path: "/nonexistent/actions.json".into(),
        ..SessionConfig::default()
    };
    let mut session: MockSession = VrSession::init(entry, graphics, config).unwrap();

    session.update();
    session.update();
    // Poses still pace the loop; the action set is never advanced.
    assert_eq!(runtime.wait_pose_calls(), 2);
    assert_eq!(runtime.action_state_updates(), 0);
}

#[test]
fn controller_discovery_loads_and_binds_exactly_once() {
    let mut h = harness();
    h.runtime.set_device_pose(HMD_DEVICE_INDEX, hmd_pose());
    h.runtime.set_device_class(HMD_DEVICE_INDEX, DeviceClass::Hmd);

    let controller_pose = [
        [1.0, 0.0, 0.0, -0.2],
        [0.0, 1.0, 0.0, 1.1],
        [0.0, 0.0, 1.0, -0.5],
    ];
    h.runtime.set_device_pose(3, controller_pose);
    h.runtime.set_device_class(3, DeviceClass::Controller);
    h.runtime.bind_origin(HAND_SOURCES[0], 3);
    h.runtime
        .set_pose_action(HAND_POSE_ACTIONS[0], controller_pose, HAND_SOURCES[0]);
    h.runtime
        .set_string_property(3, DeviceProperty::RenderModelName, "vr_controller_left");
    h.runtime
        .script_model("vr_controller_left", 1, Ok(sample_mesh(TextureId(7))));
    h.runtime.script_texture(TextureId(7), 0, Ok(sample_texture()));

    // One update sets the hand's transform and starts the load without
    // blocking on it; the asset itself arrives on a later frame.
    h.session.update();
    assert_eq!(
        h.session.controller_model_transform(Hand::Left),
        transform_from_3x4(&controller_pose)
    );
    assert!(!h.session.is_controller_active(Hand::Left));

    assert!(update_until_active(&mut h.session, Hand::Left));
    assert!(!h.session.is_controller_active(Hand::Right));

    // Later frames keep the same asset and never reload.
    let polls = h.runtime.model_polls("vr_controller_left");
    for _ in 0..3 {
        h.session.update();
        assert!(h.session.is_controller_active(Hand::Left));
    }
    assert_eq!(h.runtime.model_polls("vr_controller_left"), polls);
    assert_eq!(h.graphics.live_models(), 1);
}

#[test]
fn a_failed_model_leaves_the_hand_without_a_visual() {
    let mut h = harness();
    h.runtime.bind_origin(HAND_SOURCES[1], 2);
    h.runtime
        .set_pose_action(HAND_POSE_ACTIONS[1], identity_pose(), HAND_SOURCES[1]);
    h.runtime
        .set_string_property(2, DeviceProperty::RenderModelName, "vr_controller_right");
    h.runtime
        .script_model("vr_controller_right", 0, Err("not in the asset db".into()));

    h.session.update();
    let deadline = Instant::now() + Duration::from_secs(5);
    while h.runtime.model_polls("vr_controller_right") == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    for _ in 0..5 {
        h.session.update();
    }
    assert!(!h.session.is_controller_active(Hand::Right));
    // Terminal failure: the load was attempted once and never retried.
    assert_eq!(h.runtime.model_polls("vr_controller_right"), 1);
}

#[test]
fn view_projection_composes_eye_and_head_transforms() {
    let projection = [
        [0.76, 0.0, -0.06, 0.0],
        [0.0, 0.68, 0.0, 0.0],
        [0.0, 0.0, -1.0002, -0.20002],
        [0.0, 0.0, -1.0, 0.0],
    ];
    let mut init = MockRuntimeInit::default();
    init.projection = [projection, projection];
    let mut h = harness_with(init.clone());

    h.runtime.set_device_pose(HMD_DEVICE_INDEX, hmd_pose());
    h.runtime.set_device_class(HMD_DEVICE_INDEX, DeviceClass::Hmd);
    h.session.update();

    let head: Transform3D<f32, Native, Viewer> = transform_from_3x4::<Device, Native>(&hmd_pose())
        .inverse()
        .unwrap()
        .with_destination::<Viewer>();
    let eye_view_proj = transform_from_3x4::<LeftEye, Viewer>(&init.eye_to_head[0])
        .inverse()
        .unwrap()
        .then(&transform_from_4x4::<LeftEye, Display>(&projection));
    let expected = head.then(&eye_view_proj);

    assert!(h.session.view_projection(Eye::Left).approx_eq(&expected));

    // The composition holds on every frame regardless of controllers.
    h.session.update();
    assert!(h.session.view_projection(Eye::Left).approx_eq(&expected));
}

#[test]
fn render_runs_both_eye_passes_and_submits_in_order() {
    let mut h = harness();
    h.runtime.set_device_pose(HMD_DEVICE_INDEX, identity_pose());
    h.runtime.set_device_class(HMD_DEVICE_INDEX, DeviceClass::Hmd);
    h.session.update();

    // Without a scene callback, render is a no-op.
    h.session.render();
    assert!(h.runtime.submitted().is_empty());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_in_callback = seen.clone();
    h.session.set_scene_callback(move |frame| {
        seen_in_callback.borrow_mut().push(frame.view_projection());
        frame.draw_controller(Hand::Left);
        frame.draw_controller(Hand::Right);
    });
    h.session.render();

    assert_eq!(seen.borrow().len(), 2);
    let submitted = h.runtime.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].eye, Eye::Left);
    assert_eq!(submitted[1].eye, Eye::Right);
    assert_eq!(submitted[0].texture.color_space, ColorSpace::Gamma);
    assert_ne!(submitted[0].texture.handle, submitted[1].texture.handle);

    // No controller models are loaded, so no draw calls landed.
    let ops = h.graphics.ops();
    assert!(ops.contains(&GraphicsOp::BeginEye(1)));
    assert!(ops.contains(&GraphicsOp::ResolveEye(2)));
    assert!(!ops.iter().any(|op| matches!(op, GraphicsOp::DrawModel(_))));
}

#[test]
fn a_rejected_submission_does_not_abort_the_frame_loop() {
    let mut h = harness();
    h.session.set_scene_callback(|_frame| {});
    h.runtime.set_submit_error(Some("compositor is busy"));

    h.session.update();
    h.session.render();
    h.session.update();
    h.session.render();

    // Both frames went through; all four submissions were attempted.
    assert_eq!(h.runtime.submitted().len(), 4);
    assert_eq!(h.runtime.wait_pose_calls(), 2);
}

#[test]
fn host_driven_eye_loop_composes_with_controller_queries() {
    let mut h = harness();
    h.runtime.bind_origin(HAND_SOURCES[0], 1);
    h.runtime
        .set_pose_action(HAND_POSE_ACTIONS[0], identity_pose(), HAND_SOURCES[0]);
    h.runtime
        .set_string_property(1, DeviceProperty::RenderModelName, "vr_controller_left");
    h.runtime
        .script_model("vr_controller_left", 0, Ok(sample_mesh(TextureId(4))));
    h.runtime.script_texture(TextureId(4), 0, Ok(sample_texture()));
    assert!(update_until_active(&mut h.session, Hand::Left));

    h.session.set_scene_callback(|_frame| {});
    for &eye in Eye::BOTH.iter() {
        h.session.render_eye(eye);
        if h.session.is_controller_active(Hand::Left) {
            let _ = h.session.controller_model_transform(Hand::Left);
            h.session.render_controller(Hand::Left);
        }
    }
    h.session.submit();

    assert_eq!(h.runtime.submitted().len(), 2);
    let draws = h
        .graphics
        .ops()
        .iter()
        .filter(|op| matches!(op, GraphicsOp::DrawModel(_)))
        .count();
    assert_eq!(draws, 2);
}

#[test]
fn destroy_is_idempotent_and_releases_everything() {
    let mut h = harness();
    h.runtime.bind_origin(HAND_SOURCES[0], 1);
    h.runtime
        .set_pose_action(HAND_POSE_ACTIONS[0], identity_pose(), HAND_SOURCES[0]);
    h.runtime
        .set_string_property(1, DeviceProperty::RenderModelName, "vr_controller_left");
    h.runtime
        .script_model("vr_controller_left", 0, Ok(sample_mesh(TextureId(9))));
    h.runtime.script_texture(TextureId(9), 0, Ok(sample_texture()));
    assert!(update_until_active(&mut h.session, Hand::Left));

    assert_eq!(h.graphics.live_targets(), 2);
    assert_eq!(h.graphics.live_models(), 1);

    h.session.destroy();
    assert_eq!(h.graphics.live_targets(), 0);
    assert_eq!(h.graphics.live_models(), 0);
    assert_eq!(h.runtime.shutdowns(), 1);

    // A second destroy and post-destroy frames are harmless no-ops.
    let pose_waits = h.runtime.wait_pose_calls();
    h.session.destroy();
    h.session.update();
    h.session.render();
    assert_eq!(h.runtime.shutdowns(), 1);
    assert_eq!(h.runtime.wait_pose_calls(), pose_waits);
}

#[test]
fn dropping_the_session_shuts_the_runtime_down_once() {
    let h = harness();
    let runtime = h.runtime.clone();
    drop(h);
    assert_eq!(runtime.shutdowns(), 1);
}

#[test]
fn grip_pulse_reaches_the_hand_that_squeezed() {
    let mut h = harness();
    h.runtime.bind_origin(HAND_SOURCES[0], 1);
    h.runtime.set_digital(GRIP_ACTION, true, HAND_SOURCES[0]);
    h.session.update();
    assert_eq!(h.runtime.haptic_pulses().len(), 1);

    // Holding the grip across frames fires nothing further.
    h.runtime.set_digital(GRIP_ACTION, true, HAND_SOURCES[0]);
    h.session.update();
    assert_eq!(h.runtime.haptic_pulses().len(), 1);
}
