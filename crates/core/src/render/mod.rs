use serde::Serialize;

use crate::{
    camera::IntroCamera,
    playlist::PlaybackPhase,
    provider::PlaylistVideoTexture,
    scene::{PointerState, SceneDescriptor},
    surface::PlaybackSurface,
    timeline::{FrameCallback, FrameClock, FrameHooks},
    Result, SceneError,
};

/// Summary of one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub elapsed: f32,
    pub camera_position: [f32; 3],
    pub camera_fov_degrees: f32,
    pub phase: PlaybackPhase,
    pub video_source: Option<String>,
    /// Whether the text material received a fresh video frame.
    pub uploaded: bool,
}

/// Headless render loop. Owns the scene tree, the intro camera, the user
/// frame hooks and the video texture bound to the text material.
#[derive(Debug)]
pub struct RenderGraph<S: PlaybackSurface> {
    scene: SceneDescriptor,
    camera: IntroCamera,
    clock: FrameClock,
    hooks: FrameHooks,
    video: Option<PlaylistVideoTexture<S>>,
}

impl<S: PlaybackSurface> RenderGraph<S> {
    pub fn new(scene: SceneDescriptor, camera: IntroCamera) -> Self {
        Self {
            scene,
            camera,
            clock: FrameClock::default(),
            hooks: FrameHooks::new(),
            video: None,
        }
    }

    pub fn scene(&self) -> &SceneDescriptor {
        &self.scene
    }

    pub fn camera(&self) -> &IntroCamera {
        &self.camera
    }

    pub fn video(&self) -> Option<&PlaylistVideoTexture<S>> {
        self.video.as_ref()
    }

    pub fn video_mut(&mut self) -> Option<&mut PlaylistVideoTexture<S>> {
        self.video.as_mut()
    }

    /// Registers a callback that runs after the camera update each frame.
    pub fn on_frame<C: FrameCallback + 'static>(&mut self, callback: C) {
        self.hooks.register(callback);
    }

    /// Binds an active video texture to the text material, replacing and
    /// releasing any previous one.
    pub fn mount_video(&mut self, video: PlaylistVideoTexture<S>) -> Result<()> {
        if self.scene.text_material_mut().is_none() {
            return Err(SceneError::msg("scene has no text node to show video on"));
        }
        self.unmount_video();
        self.video = Some(video);
        Ok(())
    }

    /// Releases the video texture and clears the material's map.
    pub fn unmount_video(&mut self) {
        if let Some(mut video) = self.video.take() {
            video.deactivate();
        }
        if let Some(material) = self.scene.text_material_mut() {
            material.clear();
        }
    }

    /// Renders a single frame.
    ///
    /// Media load failures are returned after the frame state has been
    /// updated, so the caller can report them and keep rendering.
    pub fn render_frame(&mut self, pointer: PointerState, delta: f32) -> Result<FrameReport> {
        let ctx = self.clock.advance(delta).with_pointer(pointer);
        self.camera.on_frame(&ctx);
        self.hooks.run(&ctx);

        let mut media = Ok(());
        let mut uploaded = false;
        if let Some(video) = self.video.as_mut() {
            if let Some(surface) = video.surface_mut() {
                surface.tick(ctx.delta);
            }
            media = video.pump();
            if let Some(material) = self.scene.text_material_mut() {
                uploaded = material.upload_from(&*video);
            }
        }

        let position = self.camera.position();
        let report = FrameReport {
            frame: ctx.frame,
            elapsed: ctx.elapsed,
            camera_position: [position.x, position.y, position.z],
            camera_fov_degrees: self.camera.fov().0,
            phase: self
                .video
                .as_ref()
                .map_or(PlaybackPhase::Inactive, PlaylistVideoTexture::phase),
            video_source: self
                .video
                .as_ref()
                .filter(|video| video.is_active())
                .map(|video| video.current_source().to_string()),
            uploaded,
        };

        media.map(|()| report)
    }
}

impl<S: PlaybackSurface> Drop for RenderGraph<S> {
    fn drop(&mut self) {
        self.unmount_video();
    }
}
