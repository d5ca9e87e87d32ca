use regatta_math::*;

/// A first-person / chase camera described by its position, a point it
/// looks at and the world up direction.
///
/// The view matrix is rebuilt whenever the camera moves or turns, never in
/// the render path.
#[derive(Debug, Clone)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    forward: Vec3,
    right: Vec3,
    world_up: Vec3,
    eye_from_world: Mat4,
}

impl FirstPersonCamera {
    pub fn new(position: Vec3, look: Vec3, world_up: Vec3) -> Self {
        let mut camera = Self {
            position,
            forward: (look - position).normalize(),
            right: Vec3::ZERO,
            world_up,
            eye_from_world: Mat4::IDENTITY,
        };
        camera.reorient();
        camera
    }

    /// The world-to-eye matrix the renderer uploads.
    pub fn eye_from_world(&self) -> Mat4 {
        self.eye_from_world
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    fn reorient(&mut self) {
        self.right = self.forward.cross(self.world_up).normalize();
        self.eye_from_world =
            Mat4::look_at_rh(self.position, self.position + self.forward, self.world_up);
    }

    /// Sidesteps along the right vector without turning.
    pub fn strafe(&mut self, distance: f32) {
        self.position += self.right * distance;
        self.reorient();
    }

    /// Moves along the forward vector.
    pub fn advance(&mut self, distance: f32) {
        self.position += self.forward * distance;
        self.reorient();
    }

    /// Turns about the world up axis.
    pub fn yaw(&mut self, degrees: f32) {
        self.forward = Quat::from_axis_angle(self.world_up, degrees.to_radians()) * self.forward;
        self.reorient();
    }

    /// Tilts about the current right axis.
    pub fn pitch(&mut self, degrees: f32) {
        self.forward = Quat::from_axis_angle(self.right, degrees.to_radians()) * self.forward;
        self.reorient();
    }
}

/// Projection matrix matching the camera's clip conventions.
pub fn perspective(fov_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect_ratio, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn eye_from_world_maps_the_camera_to_the_origin() {
        let camera = FirstPersonCamera::new(
            Vec3::new(15.0, 12.0, -5.0),
            Vec3::new(15.0, 10.0, -20.0),
            Vec3::Y,
        );
        let eye = camera.eye_from_world().transform_point3(camera.position);
        assert!(eye.length() < EPS);
    }

    #[test]
    fn look_target_lands_on_the_negative_z_axis() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let look = Vec3::new(4.0, 2.0, 3.0);
        let camera = FirstPersonCamera::new(position, look, Vec3::Y);

        let mapped = camera.eye_from_world().transform_point3(look);
        assert!(mapped.x.abs() < EPS);
        assert!(mapped.y.abs() < EPS);
        assert!((mapped.z - -(look - position).length()).abs() < EPS);
    }

    #[test]
    fn strafing_keeps_the_heading() {
        let mut camera =
            FirstPersonCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), Vec3::Y);
        let forward = camera.forward();
        camera.strafe(3.0);
        assert!((camera.forward() - forward).length() < EPS);
        assert!((camera.position - Vec3::new(3.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn yaw_rotates_the_forward_vector_about_world_up() {
        let mut camera =
            FirstPersonCamera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), Vec3::Y);
        camera.yaw(90.0);
        assert!((camera.forward() - Vec3::new(-1.0, 0.0, 0.0)).length() < EPS);
    }
}
