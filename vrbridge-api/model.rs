/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! CPU-side render-model payloads as the runtime stages them. GPU upload
//! happens in the `vrbridge` crate once a load completes.

#[cfg(feature = "ipc")]
use serde::{Deserialize, Serialize};

/// Identifier of a model's diffuse texture within the runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct TextureId(pub i32);

/// Interleaved vertex layout of a runtime-supplied mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// A staged mesh: interleaved vertices, 16-bit triangle indices, and the
/// id of the diffuse texture to fetch next.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct ModelMesh {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u16>,
    pub diffuse_texture: TextureId,
}

/// A staged RGBA8 texture.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub struct ModelTexture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Outcome of one poll of an asynchronous asset load.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum ModelLoad<T> {
    /// The runtime is still staging the asset; poll again later.
    Pending,
    Ready(T),
    /// Terminal failure, with the runtime's description.
    Failed(String),
}
