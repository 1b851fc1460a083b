//! Playlist sequencing for the video texture.
//!
//! The playlist is a plain value type: an ordered list of media locators and
//! the index currently selected. Phase changes go through [`transition`], which
//! takes the current phase and an event and returns the next phase without
//! touching any media resource. The provider applies the side effects.

use serde::{Deserialize, Serialize};

use crate::{Result, SceneError};

/// Ordered, fixed list of media locators plus the active index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistState {
    sources: Vec<String>,
    current_index: usize,
}

impl PlaylistState {
    /// Builds a playlist positioned on the first source.
    pub fn new<I, T>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        if sources.is_empty() {
            return Err(SceneError::configuration(
                "playlist requires at least one media source",
            ));
        }

        Ok(Self {
            sources,
            current_index: 0,
        })
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_source(&self) -> &str {
        &self.sources[self.current_index]
    }

    /// Moves the index to the phase's index. Returns `true` when it changed.
    pub fn sync_to(&mut self, phase: PlaybackPhase) -> bool {
        match phase.index() {
            Some(index) if index != self.current_index => {
                self.current_index = index;
                true
            }
            _ => false,
        }
    }
}

/// Lifecycle of the playback surface as seen by the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackPhase {
    #[default]
    Inactive,
    /// Source `i` has been requested but has not reported ready yet.
    Loading(usize),
    Playing(usize),
}

impl PlaybackPhase {
    pub fn index(self) -> Option<usize> {
        match self {
            PlaybackPhase::Inactive => None,
            PlaybackPhase::Loading(index) | PlaybackPhase::Playing(index) => Some(index),
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, PlaybackPhase::Inactive)
    }
}

/// Inputs accepted by [`transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistEvent {
    Activate,
    MediaReady,
    Finished,
    /// The current source failed to load. The phase does not move.
    Failed,
    Deactivate,
}

/// Computes the next phase for a playlist of `len` sources.
///
/// `Finished` advances to `(i + 1) % len` from either `Loading(i)` or
/// `Playing(i)`. Events other than `Activate` are ignored while inactive.
pub fn transition(phase: PlaybackPhase, event: PlaylistEvent, len: usize) -> PlaybackPhase {
    if len == 0 {
        return PlaybackPhase::Inactive;
    }

    match (phase, event) {
        (_, PlaylistEvent::Deactivate) => PlaybackPhase::Inactive,
        (PlaybackPhase::Inactive, PlaylistEvent::Activate) => PlaybackPhase::Loading(0),
        (PlaybackPhase::Inactive, _) => PlaybackPhase::Inactive,
        (active, PlaylistEvent::Activate) => active,
        (PlaybackPhase::Loading(index), PlaylistEvent::MediaReady) => PlaybackPhase::Playing(index),
        (playing @ PlaybackPhase::Playing(_), PlaylistEvent::MediaReady) => playing,
        (
            PlaybackPhase::Loading(index) | PlaybackPhase::Playing(index),
            PlaylistEvent::Finished,
        ) => PlaybackPhase::Loading((index + 1) % len),
        (stalled, PlaylistEvent::Failed) => stalled,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rejects_empty_source_list() {
        let err = PlaylistState::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, SceneError::Configuration(_)));
    }

    #[test]
    fn starts_on_first_source() {
        let playlist = PlaylistState::new(["a.mp4", "b.mp4"]).unwrap();
        assert_eq!(playlist.current_index(), 0);
        assert_eq!(playlist.current_source(), "a.mp4");
    }

    #[test]
    fn walks_sources_in_order_and_wraps() {
        let mut playlist = PlaylistState::new(["A", "B", "C"]).unwrap();
        let mut phase = transition(PlaybackPhase::Inactive, PlaylistEvent::Activate, 3);
        assert_eq!(phase, PlaybackPhase::Loading(0));

        let mut seen = vec![playlist.current_source().to_string()];
        for _ in 0..3 {
            phase = transition(phase, PlaylistEvent::MediaReady, 3);
            phase = transition(phase, PlaylistEvent::Finished, 3);
            playlist.sync_to(phase);
            seen.push(playlist.current_source().to_string());
        }

        assert_eq!(seen, ["A", "B", "C", "A"]);
    }

    #[test]
    fn failure_stalls_on_the_same_index() {
        let phase = PlaybackPhase::Loading(2);
        assert_eq!(transition(phase, PlaylistEvent::Failed, 4), phase);
    }

    #[test]
    fn inactive_ignores_media_events() {
        for event in [PlaylistEvent::MediaReady, PlaylistEvent::Finished, PlaylistEvent::Failed] {
            assert_eq!(
                transition(PlaybackPhase::Inactive, event, 3),
                PlaybackPhase::Inactive
            );
        }
    }

    #[test]
    fn deactivate_from_any_phase() {
        for phase in [PlaybackPhase::Loading(1), PlaybackPhase::Playing(0)] {
            assert_eq!(
                transition(phase, PlaylistEvent::Deactivate, 2),
                PlaybackPhase::Inactive
            );
        }
    }

    #[test]
    fn single_source_cycles_onto_itself() {
        let phase = transition(PlaybackPhase::Playing(0), PlaylistEvent::Finished, 1);
        assert_eq!(phase, PlaybackPhase::Loading(0));
    }

    proptest! {
        #[test]
        fn cycle_closes_after_len_finishes(
            len in 1usize..64,
            start in 0usize..64,
            warmup in 0usize..200
        ) {
            let start = start % len;
            let mut phase = PlaybackPhase::Playing(start);
            for _ in 0..warmup {
                phase = transition(phase, PlaylistEvent::Finished, len);
            }
            let before = phase.index();
            for _ in 0..len {
                phase = transition(phase, PlaylistEvent::MediaReady, len);
                phase = transition(phase, PlaylistEvent::Finished, len);
            }
            prop_assert_eq!(phase.index(), before);
            prop_assert!(phase.index().unwrap() < len);
        }
    }
}
