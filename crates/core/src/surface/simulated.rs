use std::{
    collections::BTreeMap,
    sync::{mpsc::Sender, Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};

use super::{ListenerId, MediaEvent, PlaybackSurface};
use crate::{texture::VideoFrame, Result, SceneError, TransferFunction};

/// Decoding properties of a clip known to the simulated backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub duration_seconds: f32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Solid colour of every frame. Derived from the locator when absent.
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

fn default_width() -> u32 {
    16
}

fn default_height() -> u32 {
    9
}

impl ClipInfo {
    pub fn new(duration_seconds: f32) -> Self {
        Self {
            duration_seconds,
            width: default_width(),
            height: default_height(),
            color: None,
        }
    }
}

/// Locator to clip mapping. Locators missing from the catalog fail to load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipCatalog {
    clips: BTreeMap<String, ClipInfo>,
}

impl ClipCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every locator with the same duration.
    pub fn uniform<I, T>(locators: I, duration_seconds: f32) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut catalog = Self::new();
        for locator in locators {
            catalog.insert(locator, ClipInfo::new(duration_seconds));
        }
        catalog
    }

    pub fn insert(&mut self, locator: impl Into<String>, clip: ClipInfo) {
        self.clips.insert(locator.into(), clip);
    }

    pub fn get(&self, locator: &str) -> Option<&ClipInfo> {
        self.clips.get(locator)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Counters describing what happened to the simulated surfaces sharing a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub created: usize,
    pub released: usize,
    pub live_listeners: usize,
    pub paused: bool,
    pub muted: bool,
    pub looping: bool,
    pub loads: Vec<String>,
}

impl SurfaceStats {
    pub fn live_surfaces(&self) -> usize {
        self.created - self.released
    }
}

/// Shared audit trail for simulated surfaces.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLedger {
    shared: Arc<Mutex<SurfaceStats>>,
}

impl SurfaceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SurfaceStats {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceStats> {
        // Counters stay readable after a poisoned lock.
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Deterministic in-memory playback surface driven by [`SimulatedSurface::advance`].
#[derive(Debug)]
pub struct SimulatedSurface {
    catalog: ClipCatalog,
    ledger: SurfaceLedger,
    listeners: Vec<(ListenerId, Sender<MediaEvent>)>,
    next_listener: u64,
    source: Option<String>,
    position: f32,
    playing: bool,
    looping: bool,
    muted: bool,
    ready: bool,
    failed: bool,
}

impl SimulatedSurface {
    pub fn new(catalog: ClipCatalog, ledger: SurfaceLedger) -> Self {
        ledger.lock().created += 1;
        Self {
            catalog,
            ledger,
            listeners: Vec::new(),
            next_listener: 0,
            source: None,
            position: 0.0,
            playing: false,
            looping: true,
            muted: false,
            ready: false,
            failed: false,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Moves playback forward by `delta` seconds, raising media events.
    pub fn advance(&mut self, delta: f32) {
        if !self.playing || self.failed {
            return;
        }
        let Some(locator) = self.source.clone() else {
            return;
        };
        let Some(duration) = self.catalog.get(&locator).map(|clip| clip.duration_seconds) else {
            self.failed = true;
            self.playing = false;
            self.emit(MediaEvent::Error(format!("no decodable media at `{locator}`")));
            return;
        };

        if !self.ready {
            self.ready = true;
            self.emit(MediaEvent::Ready);
        }

        self.position += delta.max(0.0);
        if self.position >= duration {
            if self.looping && duration > 0.0 {
                self.position %= duration;
            } else {
                self.position = duration;
                self.playing = false;
                self.emit(MediaEvent::Finished);
            }
        }
    }

    fn emit(&mut self, event: MediaEvent) {
        let before = self.listeners.len();
        self.listeners
            .retain(|(_, listener)| listener.send(event.clone()).is_ok());
        let dropped = before - self.listeners.len();
        if dropped > 0 {
            let mut stats = self.ledger.lock();
            stats.live_listeners = stats.live_listeners.saturating_sub(dropped);
        }
    }

    fn frame_color(&self, locator: &str, clip: &ClipInfo) -> [u8; 3] {
        clip.color.unwrap_or_else(|| {
            let hash = locator
                .bytes()
                .fold(0x811c_9dc5_u32, |acc, byte| (acc ^ byte as u32).wrapping_mul(0x0100_0193));
            [(hash >> 16) as u8, (hash >> 8) as u8, hash as u8]
        })
    }
}

impl PlaybackSurface for SimulatedSurface {
    fn load(&mut self, locator: &str) {
        self.source = Some(locator.to_string());
        self.position = 0.0;
        self.ready = false;
        self.failed = false;
        self.playing = false;
        self.ledger.lock().loads.push(locator.to_string());
    }

    fn play(&mut self) -> Result<()> {
        if self.source.is_none() {
            return Err(SceneError::msg("cannot play a surface without a source"));
        }
        self.playing = true;
        self.ledger.lock().paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        self.ledger.lock().paused = true;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.ledger.lock().looping = looping;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.ledger.lock().muted = muted;
    }

    fn subscribe(&mut self, listener: Sender<MediaEvent>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        self.ledger.lock().live_listeners += 1;
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        let removed = before != self.listeners.len();
        if removed {
            let mut stats = self.ledger.lock();
            stats.live_listeners = stats.live_listeners.saturating_sub(1);
        }
        removed
    }

    fn current_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if !self.ready {
            return None;
        }
        let locator = self.source.as_deref()?;
        let clip = self.catalog.get(locator)?;
        let [r, g, b] = self.frame_color(locator, clip);
        Some(VideoFrame::solid(
            clip.width,
            clip.height,
            [r, g, b, 255],
            TransferFunction::Srgb,
        ))
    }

    fn tick(&mut self, delta: f32) {
        self.advance(delta);
    }
}

impl Drop for SimulatedSurface {
    fn drop(&mut self) {
        self.ledger.lock().released += 1;
    }
}
