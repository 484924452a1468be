//! Host capability versions and the plugin-load ABI gate.

/// ABI versions a host advertises at plugin load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostCaps {
    pub core_abi: u32,
    pub composite_abi: u32,
    pub opengl_abi: u32,
    pub cube_abi: u32,
}

/// The ABI versions this effect was built against.
pub const REQUIRED_CAPS: HostCaps = HostCaps {
    core_abi: 5,
    composite_abi: 2,
    opengl_abi: 3,
    cube_abi: 4,
};

/// Errors raised by the plugin-load gate.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A host component's ABI does not match the version built against.
    /// This is the only fatal initialization path.
    #[error("host `{component}` ABI {found} does not match required {required}")]
    AbiMismatch {
        component: &'static str,
        found: u32,
        required: u32,
    },
}

/// Verify the host's ABI versions before any per-screen state is allocated.
pub fn check_host_caps(caps: &HostCaps) -> Result<(), HostError> {
    let checks = [
        ("core", caps.core_abi, REQUIRED_CAPS.core_abi),
        ("composite", caps.composite_abi, REQUIRED_CAPS.composite_abi),
        ("opengl", caps.opengl_abi, REQUIRED_CAPS.opengl_abi),
        ("cube", caps.cube_abi, REQUIRED_CAPS.cube_abi),
    ];

    for (component, found, required) in checks {
        if found != required {
            return Err(HostError::AbiMismatch {
                component,
                found,
                required,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_caps_pass() {
        assert!(check_host_caps(&REQUIRED_CAPS).is_ok());
    }

    #[test]
    fn test_mismatched_cube_abi_is_fatal() {
        let caps = HostCaps {
            cube_abi: REQUIRED_CAPS.cube_abi + 1,
            ..REQUIRED_CAPS
        };
        let err = check_host_caps(&caps).unwrap_err();
        match err {
            HostError::AbiMismatch { component, .. } => assert_eq!(component, "cube"),
        }
    }

    #[test]
    fn test_first_mismatch_is_reported() {
        let caps = HostCaps {
            core_abi: 0,
            composite_abi: 0,
            ..REQUIRED_CAPS
        };
        match check_host_caps(&caps).unwrap_err() {
            HostError::AbiMismatch { component, .. } => assert_eq!(component, "core"),
        }
    }
}
