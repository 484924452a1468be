//! Ordered dispatch of per-frame effect hooks.
//!
//! Replaces function-pointer interception with an explicit handler list the
//! host drives. Every registered handler sees every hook exactly once per
//! dispatch; a handler can *replace* a paint hook's default behavior, which
//! stops the chain and suppresses the host's own handling.

use crate::context::PaintContext;
use crate::output::{BackdropView, FrameInput};

/// What a paint hook did with the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainAction {
    /// Pass the event on; later handlers and the host default still run.
    Continue,
    /// The event is fully handled; skip later handlers and the host default.
    Replace,
}

/// Host services available outside of painting.
pub trait HostScreen {
    /// Request a repaint next cycle.
    fn damage(&mut self);
}

/// Per-frame hooks an effect registers with the host.
///
/// Default implementations make every hook optional.
pub trait EffectHandler {
    /// Called once per frame before the host's own pre-paint step.
    fn prepare_paint(&mut self, context: &mut dyn PaintContext, elapsed_ms: u32) {
        let _ = (context, elapsed_ms);
    }

    /// Called once per frame after the host's own post-paint step.
    fn done_paint(&mut self, host: &mut dyn HostScreen) {
        let _ = host;
    }

    /// Called once per cube face while painting inside the cube.
    fn paint_inside(&mut self, context: &mut dyn PaintContext, frame: &FrameInput) -> ChainAction {
        let _ = (context, frame);
        ChainAction::Continue
    }

    /// Called once per cube face before the host clears/redraws a backdrop.
    fn clear_backdrop(&mut self, context: &mut dyn PaintContext, view: &BackdropView) -> ChainAction {
        let _ = (context, view);
        ChainAction::Continue
    }
}

/// The host's ordered list of effect handlers.
#[derive(Default)]
pub struct PaintChain {
    handlers: Vec<Box<dyn EffectHandler>>,
}

impl PaintChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler; dispatch order is registration order.
    pub fn register(&mut self, handler: Box<dyn EffectHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch the pre-paint hook to every handler.
    pub fn prepare_paint(&mut self, context: &mut dyn PaintContext, elapsed_ms: u32) {
        for handler in &mut self.handlers {
            handler.prepare_paint(context, elapsed_ms);
        }
    }

    /// Dispatch the post-paint hook to every handler.
    pub fn done_paint(&mut self, host: &mut dyn HostScreen) {
        for handler in &mut self.handlers {
            handler.done_paint(host);
        }
    }

    /// Dispatch the inside-paint hook. Returns `true` if a handler replaced
    /// the host's default behavior.
    pub fn paint_inside(&mut self, context: &mut dyn PaintContext, frame: &FrameInput) -> bool {
        for handler in &mut self.handlers {
            if handler.paint_inside(context, frame) == ChainAction::Replace {
                return true;
            }
        }
        false
    }

    /// Dispatch the backdrop-clear hook. Returns `true` if a handler replaced
    /// the host's default backdrop.
    pub fn clear_backdrop(&mut self, context: &mut dyn PaintContext, view: &BackdropView) -> bool {
        for handler in &mut self.handlers {
            if handler.clear_backdrop(context, view) == ChainAction::Replace {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingContext;
    use glam::Mat4;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingHandler {
        prepares: Arc<AtomicU32>,
        paints: Arc<AtomicU32>,
        paint_action: ChainAction,
        backdrop_action: ChainAction,
    }

    impl EffectHandler for CountingHandler {
        fn prepare_paint(&mut self, _context: &mut dyn PaintContext, _elapsed_ms: u32) {
            self.prepares.fetch_add(1, Ordering::SeqCst);
        }

        fn paint_inside(
            &mut self,
            _context: &mut dyn PaintContext,
            _frame: &FrameInput,
        ) -> ChainAction {
            self.paints.fetch_add(1, Ordering::SeqCst);
            self.paint_action
        }

        fn clear_backdrop(
            &mut self,
            _context: &mut dyn PaintContext,
            _view: &BackdropView,
        ) -> ChainAction {
            self.backdrop_action
        }
    }

    fn counting(
        paint_action: ChainAction,
        backdrop_action: ChainAction,
    ) -> (CountingHandler, Arc<AtomicU32>, Arc<AtomicU32>) {
        let prepares = Arc::new(AtomicU32::new(0));
        let paints = Arc::new(AtomicU32::new(0));
        let handler = CountingHandler {
            prepares: Arc::clone(&prepares),
            paints: Arc::clone(&paints),
            paint_action,
            backdrop_action,
        };
        (handler, prepares, paints)
    }

    fn frame() -> FrameInput {
        FrameInput {
            transform: Mat4::IDENTITY,
            output: 0,
            output_offset: (0.0, 0.0),
            output_scale: (1.0, 1.0),
            viewer_inside: false,
        }
    }

    #[test]
    fn test_every_handler_sees_prepare_exactly_once() {
        let mut chain = PaintChain::new();
        let (first, first_prepares, _) = counting(ChainAction::Continue, ChainAction::Continue);
        let (second, second_prepares, _) = counting(ChainAction::Continue, ChainAction::Continue);
        chain.register(Box::new(first));
        chain.register(Box::new(second));

        let mut context = RecordingContext::new();
        chain.prepare_paint(&mut context, 16);

        assert_eq!(first_prepares.load(Ordering::SeqCst), 1);
        assert_eq!(second_prepares.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replace_stops_the_chain() {
        let mut chain = PaintChain::new();
        let (first, _, first_paints) = counting(ChainAction::Replace, ChainAction::Continue);
        let (second, _, second_paints) = counting(ChainAction::Continue, ChainAction::Continue);
        chain.register(Box::new(first));
        chain.register(Box::new(second));

        let mut context = RecordingContext::new();
        let replaced = chain.paint_inside(&mut context, &frame());

        assert!(replaced);
        assert_eq!(first_paints.load(Ordering::SeqCst), 1);
        assert_eq!(
            second_paints.load(Ordering::SeqCst),
            0,
            "Handlers after a Replace must not run"
        );
    }

    #[test]
    fn test_continue_reaches_the_host_default() {
        let mut chain = PaintChain::new();
        let (handler, _, _) = counting(ChainAction::Continue, ChainAction::Continue);
        chain.register(Box::new(handler));

        let mut context = RecordingContext::new();
        assert!(
            !chain.paint_inside(&mut context, &frame()),
            "No Replace means the host default still applies"
        );
    }

    #[test]
    fn test_backdrop_replace_is_reported() {
        let mut chain = PaintChain::new();
        let (handler, _, _) = counting(ChainAction::Continue, ChainAction::Replace);
        chain.register(Box::new(handler));

        let mut context = RecordingContext::new();
        let view = BackdropView {
            x_rotate: 0.0,
            v_rotate: 0.0,
            viewer_inside: false,
        };
        assert!(chain.clear_backdrop(&mut context, &view));
    }

    #[test]
    fn test_empty_chain_is_a_no_op() {
        let mut chain = PaintChain::new();
        let mut context = RecordingContext::new();
        assert!(chain.is_empty());
        assert!(!chain.paint_inside(&mut context, &frame()));
    }
}
