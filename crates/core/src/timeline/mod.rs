use crate::scene::PointerState;

/// Elapsed time and frame counter for the render loop.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    pub time_seconds: f32,
    pub frame: u64,
}

impl FrameClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
        self.frame = 0;
    }

    /// Steps one frame forward. Negative deltas count as zero.
    pub fn advance(&mut self, delta: f32) -> FrameContext {
        let delta = delta.max(0.0);
        self.time_seconds += delta;
        let ctx = FrameContext {
            frame: self.frame,
            elapsed: self.time_seconds,
            delta,
            pointer: PointerState::default(),
        };
        self.frame += 1;
        ctx
    }
}

/// What a per-frame callback gets to see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub frame: u64,
    pub elapsed: f32,
    pub delta: f32,
    pub pointer: PointerState,
}

impl FrameContext {
    pub fn with_pointer(mut self, pointer: PointerState) -> Self {
        self.pointer = pointer;
        self
    }
}

/// Work that runs once per rendered frame.
pub trait FrameCallback {
    fn on_frame(&mut self, ctx: &FrameContext);
}

impl<F: FnMut(&FrameContext)> FrameCallback for F {
    fn on_frame(&mut self, ctx: &FrameContext) {
        self(ctx)
    }
}

/// Ordered list of per-frame callbacks.
#[derive(Default)]
pub struct FrameHooks {
    hooks: Vec<Box<dyn FrameCallback>>,
}

impl FrameHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: FrameCallback + 'static>(&mut self, callback: C) {
        self.hooks.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Invokes every callback in registration order.
    pub fn run(&mut self, ctx: &FrameContext) {
        for hook in &mut self.hooks {
            hook.on_frame(ctx);
        }
    }
}

impl std::fmt::Debug for FrameHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHooks")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn clock_counts_frames_and_time() {
        let mut clock = FrameClock::default();
        let first = clock.advance(0.5);
        let second = clock.advance(-1.0);

        assert_eq!(first.frame, 0);
        assert_eq!(second.frame, 1);
        assert_eq!(second.delta, 0.0);
        assert_eq!(clock.time_seconds, 0.5);

        clock.reset();
        assert_eq!(clock.frame, 0);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = FrameHooks::new();
        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            hooks.register(move |ctx: &FrameContext| log.borrow_mut().push((name, ctx.frame)));
        }

        let mut clock = FrameClock::default();
        hooks.run(&clock.advance(1.0 / 60.0));
        hooks.run(&clock.advance(1.0 / 60.0));

        assert_eq!(
            *log.borrow(),
            vec![("first", 0), ("second", 0), ("first", 1), ("second", 1)]
        );
    }
}
