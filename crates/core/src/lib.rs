//! Core library for the video text scene.
//!
//! The scene shows a character model, a mirrored floor and a line of text
//! whose surface plays a list of video clips one after another. The crate
//! keeps each concern in its own module: the playlist state machine, the
//! playback surface capability, the video texture that ties the two
//! together, and the scene, camera and render loop that consume it.

pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod playlist;
pub mod provider;
pub mod render;
pub mod scene;
pub mod surface;
pub mod texture;
pub mod timeline;

pub use assets::{AssetKind, AssetRef, AssetStore};
pub use camera::IntroCamera;
pub use config::{AppConfig, CameraConfig, EnvironmentConfig, PlaylistConfig};
pub use error::{Result, SceneError};
pub use playlist::{transition, PlaybackPhase, PlaylistEvent, PlaylistState};
pub use provider::PlaylistVideoTexture;
pub use render::{FrameReport, RenderGraph};
pub use scene::{PointerState, SceneDescriptor, SceneNode, Transform};
pub use surface::{
    ClipCatalog, ClipInfo, ListenerId, MediaEvent, PlaybackSurface, SimulatedSurface,
    SurfaceLedger, SurfaceStats,
};
pub use texture::{FrameSampler, TransferFunction, VideoFrame, VideoMaterial};
pub use timeline::{FrameCallback, FrameClock, FrameContext, FrameHooks};
