//! The globe effect plugin: per-screen state, startup loading, and host hook
//! wiring.
//!
//! A [`ScreenContext`] is constructed when the effect attaches to a screen
//! and destroyed at detach; it owns every piece of mutable state (settings,
//! lights, geometry lists, textures, the cloud refresher, the damage flag).
//! [`init_plugin`] is the plugin-level gate that verifies the host ABI before
//! any per-screen state exists.

mod loader;
mod screen;

pub use screen::{InitError, ScreenContext};

use terra_host::{HostCaps, HostError, check_host_caps};

/// Verify the host before any per-screen allocation. An ABI mismatch is the
/// only fatal initialization path; everything later degrades gracefully.
pub fn init_plugin(caps: &HostCaps) -> Result<(), HostError> {
    check_host_caps(caps)?;
    log::info!("Globe effect plugin initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_host::REQUIRED_CAPS;

    #[test]
    fn test_matching_host_initializes() {
        assert!(init_plugin(&REQUIRED_CAPS).is_ok());
    }

    #[test]
    fn test_abi_mismatch_fails_before_screen_setup() {
        let caps = HostCaps {
            opengl_abi: 0,
            ..REQUIRED_CAPS
        };
        assert!(init_plugin(&caps).is_err());
    }
}
