//! Light registry, device commands, and scene application.
//!
//! [`Registry`] owns every known light and its live device handle. The
//! command layer ([`commands`]) and scene application ([`scene`]) are
//! implemented as further `impl Registry` blocks; every device-facing call
//! returns an [`Outcome`] instead of propagating a device failure.

pub mod commands;
pub mod registry;
pub mod scene;

pub use registry::{Light, LightInfo, Registry};

/// Result of one device-facing operation: the `(success, message)` pair
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "tests/fake.rs"]
pub(crate) mod fake;
