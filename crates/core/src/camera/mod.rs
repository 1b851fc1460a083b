use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3, VectorSpace};

use crate::{config::CameraConfig, scene::PointerState, timeline::FrameCallback, FrameContext};

/// Camera that glides in from far away and then follows the pointer.
///
/// Each frame the position moves a fixed fraction toward a target derived
/// from the pointer and the camera keeps looking at a fixed point.
#[derive(Debug, Clone)]
pub struct IntroCamera {
    position: Vector3<f32>,
    rest: Vector3<f32>,
    pointer_gain: [f32; 2],
    damping: f32,
    look_at: Point3<f32>,
    fov: Deg<f32>,
}

impl IntroCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: Vector3::from(config.start_position),
            rest: Vector3::from(config.rest_position),
            pointer_gain: config.pointer_gain,
            damping: config.damping,
            look_at: Point3::from(config.look_at),
            fov: Deg(config.fov_degrees),
        }
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from_vec(self.position)
    }

    pub fn fov(&self) -> Deg<f32> {
        self.fov
    }

    /// Where the camera is heading for the given pointer.
    pub fn target_for(&self, pointer: PointerState) -> Vector3<f32> {
        Vector3::new(
            self.rest.x + pointer.x * self.pointer_gain[0],
            self.rest.y + pointer.y * self.pointer_gain[1],
            self.rest.z,
        )
    }

    pub fn update(&mut self, pointer: PointerState) {
        let target = self.target_for(pointer);
        self.position = self.position.lerp(target, self.damping);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.look_at, Vector3::unit_y())
    }

    /// Unit vector from the camera toward its look-at point.
    pub fn forward(&self) -> Vector3<f32> {
        (self.look_at - self.position()).normalize()
    }
}

impl FrameCallback for IntroCamera {
    fn on_frame(&mut self, ctx: &FrameContext) {
        self.update(ctx.pointer);
    }
}
