//! Playlist-driven video texture.
//!
//! [`PlaylistVideoTexture`] owns exactly one playback surface for as long as it
//! is active. Media signals arrive over a channel, are mapped onto
//! [`PlaylistEvent`]s and run through [`transition`]. When the resulting index
//! differs from the loaded one, or a clip has finished, the surface is pointed
//! at the current source and restarted. Releasing the surface always detaches
//! the listener first.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{debug, info, warn};

use crate::{
    playlist::{transition, PlaybackPhase, PlaylistEvent, PlaylistState},
    surface::{ListenerId, MediaEvent, PlaybackSurface},
    texture::{FrameSampler, TransferFunction, VideoFrame},
    Result, SceneError,
};

struct ActiveSurface<S> {
    surface: S,
    listener: ListenerId,
    events: Receiver<MediaEvent>,
}

/// Cycles a fixed list of clips on a single surface and exposes its frames.
pub struct PlaylistVideoTexture<S: PlaybackSurface> {
    playlist: PlaylistState,
    phase: PlaybackPhase,
    encoding: TransferFunction,
    active: Option<ActiveSurface<S>>,
}

impl<S: PlaybackSurface> PlaylistVideoTexture<S> {
    /// Creates the surface with `create_surface` and starts `sources[0]`.
    ///
    /// Fails with [`SceneError::Configuration`] on an empty list, in which case
    /// `create_surface` is never called.
    pub fn activate<I, T, F>(sources: I, create_surface: F) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
        F: FnOnce() -> Result<S>,
    {
        let playlist = PlaylistState::new(sources)?;
        let mut surface = create_surface()?;

        let (tx, events) = mpsc::channel();
        let listener = surface.subscribe(tx);
        surface.set_looping(false);
        // Muted playback is never blocked by autoplay policies.
        surface.set_muted(true);

        let mut texture = Self {
            playlist,
            phase: PlaybackPhase::Inactive,
            encoding: TransferFunction::Srgb,
            active: Some(ActiveSurface {
                surface,
                listener,
                events,
            }),
        };

        info!(sources = texture.playlist.len(), "activating playlist video texture");
        texture.phase = transition(texture.phase, PlaylistEvent::Activate, texture.playlist.len());
        if let Err(err) = texture.start_current() {
            texture.deactivate();
            return Err(err);
        }

        Ok(texture)
    }

    /// Sets the transfer function frames are sampled in. Defaults to sRGB.
    pub fn with_encoding(mut self, encoding: TransferFunction) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.playlist.current_index()
    }

    pub fn current_source(&self) -> &str {
        self.playlist.current_source()
    }

    pub fn playlist(&self) -> &PlaylistState {
        &self.playlist
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.active.as_ref().map(|active| &active.surface)
    }

    /// Mutable access for hosts that drive the surface clock themselves.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.active.as_mut().map(|active| &mut active.surface)
    }

    /// Drains pending media events and applies them in delivery order.
    ///
    /// A load failure is returned as [`SceneError::MediaLoad`] after the
    /// remaining events have been applied; the index does not move past the
    /// failing source.
    pub fn pump(&mut self) -> Result<()> {
        let mut failure = None;
        loop {
            let event = match self.active.as_ref().map(|active| active.events.try_recv()) {
                Some(Ok(event)) => event,
                Some(Err(TryRecvError::Empty)) | None => break,
                Some(Err(TryRecvError::Disconnected)) => {
                    return Err(failure.unwrap_or_else(|| {
                        SceneError::msg("playback surface dropped its listener")
                    }));
                }
            };

            match event {
                MediaEvent::Ready => self.apply(PlaylistEvent::MediaReady)?,
                MediaEvent::Finished => self.on_playback_finished()?,
                MediaEvent::Error(reason) => {
                    let locator = self.playlist.current_source().to_string();
                    warn!(%locator, %reason, "media source failed to load");
                    self.apply(PlaylistEvent::Failed)?;
                    failure = Some(SceneError::MediaLoad { locator, reason });
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Handles the end of the current clip by moving to the next source.
    pub fn on_playback_finished(&mut self) -> Result<()> {
        self.apply(PlaylistEvent::Finished)
    }

    /// Stops playback, detaches the listener and releases the surface.
    ///
    /// Calling this again, or after the texture was never fully activated, is
    /// a no-op.
    pub fn deactivate(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };

        active.surface.pause();
        active.surface.unsubscribe(active.listener);
        self.phase = transition(self.phase, PlaylistEvent::Deactivate, self.playlist.len());
        info!(index = self.playlist.current_index(), "deactivated playlist video texture");
        drop(active);
    }

    fn apply(&mut self, event: PlaylistEvent) -> Result<()> {
        let next = transition(self.phase, event, self.playlist.len());
        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, ?event, "playlist transition");
        }
        self.phase = next;

        // A finished clip is reloaded even when the index wraps onto itself.
        let index_changed = self.playlist.sync_to(next);
        let restart =
            event == PlaylistEvent::Finished && matches!(next, PlaybackPhase::Loading(_));
        if index_changed || restart {
            self.start_current()?;
        }
        Ok(())
    }

    fn start_current(&mut self) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let locator = self.playlist.current_source();
        debug!(index = self.playlist.current_index(), %locator, "loading playlist source");
        active.surface.load(locator);
        active.surface.play()
    }
}

impl<S: PlaybackSurface> FrameSampler for PlaylistVideoTexture<S> {
    fn sample_frame(&self) -> Option<VideoFrame> {
        let frame = self.active.as_ref()?.surface.current_frame()?;
        Some(frame.converted_to(self.encoding))
    }

    fn transfer_function(&self) -> TransferFunction {
        self.encoding
    }
}

impl<S: PlaybackSurface> Drop for PlaylistVideoTexture<S> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl<S: PlaybackSurface> std::fmt::Debug for PlaylistVideoTexture<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistVideoTexture")
            .field("playlist", &self.playlist)
            .field("phase", &self.phase)
            .field("encoding", &self.encoding)
            .field("active", &self.active.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::surface::{ClipCatalog, SimulatedSurface, SurfaceLedger};

    fn activate(
        sources: &[&str],
        ledger: &SurfaceLedger,
    ) -> PlaylistVideoTexture<SimulatedSurface> {
        let catalog = ClipCatalog::uniform(sources.iter().copied(), 1.0);
        let ledger = ledger.clone();
        PlaylistVideoTexture::activate(sources.iter().copied(), move || {
            Ok(SimulatedSurface::new(catalog, ledger))
        })
        .unwrap()
    }

    fn play_through(texture: &mut PlaylistVideoTexture<SimulatedSurface>) {
        texture.surface_mut().unwrap().advance(0.5);
        texture.surface_mut().unwrap().advance(0.6);
        texture.pump().unwrap();
    }

    #[test]
    fn empty_sources_fail_without_creating_surface() {
        let created = Cell::new(false);
        let result = PlaylistVideoTexture::<SimulatedSurface>::activate(Vec::<String>::new(), || {
            created.set(true);
            Err(SceneError::msg("unreachable"))
        });

        assert!(matches!(result, Err(SceneError::Configuration(_))));
        assert!(!created.get());
    }

    #[test]
    fn activation_loads_first_source_muted_and_not_looping() {
        let ledger = SurfaceLedger::new();
        let texture = activate(&["A", "B", "C"], &ledger);

        assert_eq!(texture.phase(), PlaybackPhase::Loading(0));
        assert_eq!(texture.surface().unwrap().current_source(), Some("A"));
        let stats = ledger.snapshot();
        assert!(stats.muted);
        assert!(!stats.looping);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.live_listeners, 1);
        assert_eq!(stats.loads, vec!["A".to_string()]);
    }

    #[test]
    fn finished_signals_cycle_in_order() {
        let ledger = SurfaceLedger::new();
        let mut texture = activate(&["A", "B", "C"], &ledger);

        let mut seen = vec![texture.current_source().to_string()];
        for _ in 0..3 {
            texture.on_playback_finished().unwrap();
            seen.push(texture.surface().unwrap().current_source().unwrap().to_string());
        }

        assert_eq!(seen, ["A", "B", "C", "A"]);
        assert_eq!(texture.current_index(), 0);
    }

    #[test]
    fn surface_events_drive_the_cycle() {
        let ledger = SurfaceLedger::new();
        let mut texture = activate(&["A", "B"], &ledger);

        texture.surface_mut().unwrap().advance(0.1);
        texture.pump().unwrap();
        assert_eq!(texture.phase(), PlaybackPhase::Playing(0));

        play_through(&mut texture);
        assert_eq!(texture.phase(), PlaybackPhase::Loading(1));
        play_through(&mut texture);
        assert_eq!(texture.phase(), PlaybackPhase::Loading(0));
        assert_eq!(ledger.snapshot().loads, ["A", "B", "A"]);
    }

    #[test]
    fn deactivate_twice_releases_once() {
        let ledger = SurfaceLedger::new();
        let mut texture = activate(&["A"], &ledger);

        texture.deactivate();
        texture.deactivate();
        drop(texture);

        let stats = ledger.snapshot();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.live_listeners, 0);
        assert!(stats.paused);
    }

    #[test]
    fn deactivate_while_loading_releases_everything() {
        let ledger = SurfaceLedger::new();
        let mut texture = activate(&["A", "B"], &ledger);
        assert_eq!(texture.phase(), PlaybackPhase::Loading(0));

        texture.deactivate();

        assert_eq!(texture.phase(), PlaybackPhase::Inactive);
        assert!(!texture.is_active());
        assert!(texture.sample_frame().is_none());
        let stats = ledger.snapshot();
        assert_eq!(stats.live_surfaces(), 0);
        assert_eq!(stats.live_listeners, 0);
    }

    #[test]
    fn dropping_without_deactivate_still_releases() {
        let ledger = SurfaceLedger::new();
        {
            let _texture = activate(&["A", "B"], &ledger);
        }
        let stats = ledger.snapshot();
        assert_eq!(stats.live_surfaces(), 0);
        assert_eq!(stats.live_listeners, 0);
    }

    #[test]
    fn load_failure_is_reported_and_stalls() {
        let ledger = SurfaceLedger::new();
        let catalog = ClipCatalog::uniform(["A"], 1.0);
        let surface_ledger = ledger.clone();
        let mut texture = PlaylistVideoTexture::activate(["A", "broken", "C"], move || {
            Ok(SimulatedSurface::new(catalog, surface_ledger))
        })
        .unwrap();

        play_through(&mut texture);
        assert_eq!(texture.current_source(), "broken");

        texture.surface_mut().unwrap().advance(0.1);
        let err = texture.pump().unwrap_err();
        assert!(matches!(err, SceneError::MediaLoad { ref locator, .. } if locator == "broken"));

        for _ in 0..5 {
            texture.surface_mut().unwrap().advance(1.0);
            texture.pump().unwrap();
        }
        assert_eq!(texture.phase(), PlaybackPhase::Loading(1));
        assert_eq!(texture.current_source(), "broken");
    }

    #[test]
    fn samples_frames_in_configured_encoding() {
        let ledger = SurfaceLedger::new();
        let mut texture = activate(&["A"], &ledger).with_encoding(TransferFunction::Linear);
        assert!(texture.sample_frame().is_none());

        texture.surface_mut().unwrap().advance(0.1);
        texture.pump().unwrap();

        let frame = texture.sample_frame().expect("frame once playing");
        assert_eq!(frame.transfer, TransferFunction::Linear);
        assert_eq!(texture.transfer_function(), TransferFunction::Linear);
    }

    #[test]
    fn failing_surface_factory_propagates() {
        let result = PlaylistVideoTexture::<SimulatedSurface>::activate(["A"], || {
            Err(SceneError::msg("no decoder"))
        });
        assert!(matches!(result, Err(SceneError::Message(_))));
    }

    #[test]
    fn single_source_restarts_after_each_finish() {
        let ledger = SurfaceLedger::new();
        let mut texture = activate(&["A"], &ledger);

        for _ in 0..10 {
            texture.surface_mut().unwrap().advance(0.6);
            texture.pump().unwrap();
        }

        let surface = texture.surface().unwrap();
        assert!(surface.is_playing());
        assert_eq!(surface.current_source(), Some("A"));
        assert!(ledger.snapshot().loads.len() >= 5);
        assert_eq!(texture.current_index(), 0);
    }

    /// Surface that reports one error and then hangs up its only listener.
    #[derive(Default)]
    struct HangUpSurface {
        listener: Option<mpsc::Sender<MediaEvent>>,
        source: Option<String>,
    }

    impl HangUpSurface {
        fn fail_and_hang_up(&mut self, reason: &str) {
            if let Some(listener) = self.listener.take() {
                listener.send(MediaEvent::Error(reason.to_string())).unwrap();
            }
        }
    }

    impl PlaybackSurface for HangUpSurface {
        fn load(&mut self, locator: &str) {
            self.source = Some(locator.to_string());
        }

        fn play(&mut self) -> Result<()> {
            Ok(())
        }

        fn pause(&mut self) {}

        fn set_looping(&mut self, _looping: bool) {}

        fn set_muted(&mut self, _muted: bool) {}

        fn subscribe(&mut self, listener: mpsc::Sender<MediaEvent>) -> ListenerId {
            self.listener = Some(listener);
            ListenerId(0)
        }

        fn unsubscribe(&mut self, _id: ListenerId) -> bool {
            self.listener.take().is_some()
        }

        fn current_source(&self) -> Option<&str> {
            self.source.as_deref()
        }

        fn current_frame(&self) -> Option<VideoFrame> {
            None
        }
    }

    #[test]
    fn load_failure_wins_over_disconnect() {
        let mut texture =
            PlaylistVideoTexture::activate(["A", "B"], || Ok(HangUpSurface::default())).unwrap();
        texture.surface_mut().unwrap().fail_and_hang_up("codec missing");

        let err = texture.pump().unwrap_err();
        match err {
            SceneError::MediaLoad { locator, reason } => {
                assert_eq!(locator, "A");
                assert_eq!(reason, "codec missing");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(texture.phase(), PlaybackPhase::Loading(0));
    }
}
