/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Controller render-model streaming. The runtime stages mesh and
//! texture payloads asynchronously; a worker thread polls them to
//! completion so the frame loop never blocks, and the cache uploads each
//! finished payload once and serves every later request for the same
//! name from memory.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use vrbridge_api::Error;
use vrbridge_api::Graphics;
use vrbridge_api::ModelLoad;
use vrbridge_api::ModelMesh;
use vrbridge_api::ModelSource;
use vrbridge_api::ModelTexture;

/// Pacing and budget for one asset load. The budget bounds how long a
/// worker keeps polling a runtime that answers "still loading"; once it
/// is exhausted the load fails like any other terminal error.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LoadPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for LoadPolicy {
    fn default() -> LoadPolicy {
        LoadPolicy {
            poll_interval: Duration::from_millis(50),
            max_polls: 200,
        }
    }
}

/// An uploaded render model, shared by every hand slot that requested
/// the same name.
pub struct RenderModelAsset<M> {
    pub name: String,
    pub model: M,
}

struct InFlight {
    receiver: Receiver<Result<(ModelMesh, ModelTexture), Error>>,
    cancel: Arc<AtomicBool>,
}

enum Slot<M> {
    InFlight(InFlight),
    Ready(Rc<RenderModelAsset<M>>),
    Failed,
}

pub struct RenderModelCache<G: Graphics> {
    slots: HashMap<String, Slot<G::Model>>,
    policy: LoadPolicy,
}

impl<G: Graphics> RenderModelCache<G> {
    pub fn new(policy: LoadPolicy) -> RenderModelCache<G> {
        RenderModelCache {
            slots: HashMap::new(),
            policy,
        }
    }

    /// Return the asset for `name` if it is already uploaded; otherwise
    /// start at most one background load for it and return nothing.
    /// A name whose load failed terminally stays failed for the session
    /// and is never dispatched again.
    pub fn request<S: ModelSource>(
        &mut self,
        name: &str,
        source: &S,
    ) -> Option<Rc<RenderModelAsset<G::Model>>> {
        match self.slots.get(name) {
            Some(Slot::Ready(asset)) => return Some(asset.clone()),
            Some(Slot::InFlight(_)) | Some(Slot::Failed) => return None,
            None => {}
        }

        let (sender, receiver): (Sender<_>, Receiver<_>) = crossbeam_channel::unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = cancel.clone();
        let worker_source = source.clone();
        let worker_name = name.to_owned();
        let policy = self.policy;
        thread::spawn(move || {
            let result = fetch_model(&worker_source, &worker_name, &policy, &worker_cancel);
            let _ = sender.send(result);
        });

        info!("loading render model {}", name);
        self.slots
            .insert(name.to_owned(), Slot::InFlight(InFlight { receiver, cancel }));
        None
    }

    /// Collect finished loads and upload them. Called once per frame from
    /// the driving thread, which is also the GL thread.
    pub fn pump(&mut self, graphics: &mut G) {
        for (name, slot) in self.slots.iter_mut() {
            let outcome = match *slot {
                Slot::InFlight(ref load) => match load.receiver.try_recv() {
                    Ok(result) => result,
                    Err(TryRecvError::Empty) => continue,
                    Err(TryRecvError::Disconnected) => {
                        Err(Error::RenderModel("loader thread died".into()))
                    }
                },
                _ => continue,
            };
            match outcome {
                Ok((mesh, texture)) => match graphics.upload_model(&mesh, &texture) {
                    Ok(model) => {
                        info!(
                            "render model {} ready ({} triangles)",
                            name,
                            mesh.indices.len() / 3
                        );
                        *slot = Slot::Ready(Rc::new(RenderModelAsset {
                            name: name.clone(),
                            model,
                        }));
                    }
                    Err(err) => {
                        warn!("failed to upload render model {}: {}", name, err);
                        *slot = Slot::Failed;
                    }
                },
                Err(err) => {
                    warn!("failed to load render model {}: {}", name, err);
                    *slot = Slot::Failed;
                }
            }
        }
    }

    /// Whether a load for this name failed terminally earlier in the
    /// session.
    pub fn is_failed(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::Failed))
    }

    /// Whether a load for this name is still in flight.
    pub fn is_loading(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::InFlight(_)))
    }

    /// Cancel outstanding loads and free every uploaded model. Called
    /// once at session teardown.
    pub fn destroy(&mut self, graphics: &mut G) {
        for (_, slot) in self.slots.drain() {
            match slot {
                Slot::InFlight(load) => load.cancel.store(true, Ordering::Relaxed),
                Slot::Ready(asset) => graphics.destroy_model(&asset.model),
                Slot::Failed => {}
            }
        }
    }
}

/// The blocking half of the load protocol, run on a worker thread: poll
/// the mesh to completion, then its texture. Callers on a frame-latency
/// path must go through the cache instead.
pub(crate) fn fetch_model<S: ModelSource>(
    source: &S,
    name: &str,
    policy: &LoadPolicy,
    cancel: &AtomicBool,
) -> Result<(ModelMesh, ModelTexture), Error> {
    let mesh = poll_until(policy, cancel, || source.load_render_model(name))?;
    let texture = poll_until(policy, cancel, || source.load_texture(mesh.diffuse_texture))?;
    Ok((mesh, texture))
}

fn poll_until<T>(
    policy: &LoadPolicy,
    cancel: &AtomicBool,
    mut poll: impl FnMut() -> ModelLoad<T>,
) -> Result<T, Error> {
    let mut attempts = 0;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::RenderModel("load cancelled".into()));
        }
        match poll() {
            ModelLoad::Ready(value) => return Ok(value),
            ModelLoad::Failed(desc) => return Err(Error::RenderModel(desc)),
            ModelLoad::Pending => {}
        }
        attempts += 1;
        if attempts >= policy.max_polls {
            return Err(Error::RenderModel(format!(
                "still loading after {} polls",
                attempts
            )));
        }
        thread::sleep(policy.poll_interval);
    }
}
