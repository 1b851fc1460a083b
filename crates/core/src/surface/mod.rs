//! Playback surface capability.
//!
//! A [`PlaybackSurface`] decodes one media stream at a time and presents it
//! frame by frame. Media signals are not delivered through callbacks; a
//! listener is an `mpsc` sender and the owner drains the matching receiver on
//! its own schedule.

mod simulated;

use std::sync::mpsc::Sender;

use crate::{texture::VideoFrame, Result};

pub use simulated::{ClipCatalog, ClipInfo, SimulatedSurface, SurfaceLedger, SurfaceStats};

/// Signals raised by a playback surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// The loaded source decoded its first frame.
    Ready,
    /// The loaded source reached its end.
    Finished,
    /// The loaded source could not be loaded or decoded.
    Error(String),
}

/// Handle returned by [`PlaybackSurface::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub trait PlaybackSurface {
    /// Points the surface at `locator` and rewinds to its beginning.
    fn load(&mut self, locator: &str);

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn set_looping(&mut self, looping: bool);

    fn set_muted(&mut self, muted: bool);

    fn subscribe(&mut self, listener: Sender<MediaEvent>) -> ListenerId;

    /// Removes a listener. Returns `false` if it was not registered.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;

    fn current_source(&self) -> Option<&str>;

    fn current_frame(&self) -> Option<VideoFrame>;

    /// Called once per rendered frame with the frame delta. Backends that
    /// decode on their own thread leave this empty.
    fn tick(&mut self, _delta: f32) {}
}
