//! The host boundary: everything the compositor provides to the effect.
//!
//! The effect never talks to a graphics API directly. It draws through
//! [`PaintContext`] (the host's immediate-mode primitives), registers into a
//! [`PaintChain`] (the host's ordered per-frame hooks), and is gated by a
//! [`HostCaps`] ABI check at plugin initialization. [`RecordingContext`] is a
//! reference host used by the test suites and as a starting point for real
//! host implementations.

mod caps;
mod chain;
mod context;
mod output;
pub mod recording;

pub use caps::{HostCaps, HostError, REQUIRED_CAPS, check_host_caps};
pub use chain::{ChainAction, EffectHandler, HostScreen, PaintChain};
pub use context::{
    BlendMode, Capability, ContextError, DrawListId, LightParams, PaintContext, ProgramId,
    StateMask, TextureId, with_matrix, with_saved_state,
};
pub use output::{BackdropView, FrameInput, MultiOutputMode, OutputGeometry, ScreenGeometry};
pub use recording::RecordingContext;
