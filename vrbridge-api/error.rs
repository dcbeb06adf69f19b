/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;

#[cfg(feature = "ipc")]
use serde::{Deserialize, Serialize};

/// Everything that can go wrong talking to the device runtime or the GPU.
///
/// The first five variants abort session startup; the host must treat them
/// as unrecoverable for the run. The rest are degraded conditions that the
/// session handles internally.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum Error {
    /// No head-mounted display is physically connected.
    NoHmd,
    /// The device runtime is not installed on this machine.
    RuntimeNotInstalled,
    /// The runtime rejected the connection attempt, with its own
    /// human-readable description.
    RuntimeInit(String),
    /// The compositor service could not be acquired.
    CompositorUnavailable,
    /// An eye render target failed its completeness check after
    /// construction; carries the GL status code.
    IncompleteFramebuffer(u32),
    /// Action manifest or handle resolution failure.
    Input(String),
    /// The compositor rejected a pose wait or a texture submission.
    Compositor(String),
    /// Render-model streaming failure from the runtime.
    RenderModel(String),
    /// Anything else backend-specific.
    Backend(String),
}

impl Error {
    /// Whether this error aborts session startup.
    pub fn is_fatal(&self) -> bool {
        match *self {
            Error::NoHmd
            | Error::RuntimeNotInstalled
            | Error::RuntimeInit(_)
            | Error::CompositorUnavailable
            | Error::IncompleteFramebuffer(_) => true,
            Error::Input(_) | Error::Compositor(_) | Error::RenderModel(_) | Error::Backend(_) => {
                false
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NoHmd => write!(f, "no head-mounted display detected"),
            Error::RuntimeNotInstalled => write!(f, "device runtime is not installed"),
            Error::RuntimeInit(ref desc) => write!(f, "runtime connection failed: {}", desc),
            Error::CompositorUnavailable => write!(f, "compositor service unavailable"),
            Error::IncompleteFramebuffer(status) => {
                write!(f, "eye framebuffer incomplete (status {:#x})", status)
            }
            Error::Input(ref desc) => write!(f, "action input: {}", desc),
            Error::Compositor(ref desc) => write!(f, "compositor: {}", desc),
            Error::RenderModel(ref desc) => write!(f, "render model: {}", desc),
            Error::Backend(ref desc) => write!(f, "{}", desc),
        }
    }
}

impl std::error::Error for Error {}
