/// Camera, view orbit and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

/// A point projected onto the screen. `depth` grows away from the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: std::f64::consts::FRAC_PI_4, // 45 degrees
            aspect: width as f64 / height.max(1) as f64,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Aim at the centre of a bounding box from far enough away to see all of it.
    pub fn frame_bounds(&mut self, min: &Point3<f64>, max: &Point3<f64>) {
        let center = nalgebra::center(min, max);
        let radius = ((max - min).norm() / 2.0).max(1e-3);
        let distance = radius / (self.fov / 2.0).sin() * 1.1;

        self.target = center;
        self.position = center + Vector3::z() * distance;
        self.near = (distance - radius * 2.0).max(distance * 1e-3);
        self.far = distance + radius * 2.0;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a 3D point to screen space. Points behind the near plane
    /// yield `None`; points off to the side are returned unclipped.
    pub fn project_to_screen(
        &self,
        point: &Point3<f64>,
        model_matrix: &Matrix4<f64>,
        width: u32,
        height: u32,
    ) -> Option<ScreenPoint> {
        let eye = (self.view_matrix() * model_matrix).transform_point(point);
        // Right-handed view space looks down -z
        if -eye.z < self.near {
            return None;
        }

        let ndc = self.projection_matrix().transform_point(&eye);
        Some(ScreenPoint {
            x: (ndc.x + 1.0) * 0.5 * width as f64,
            y: (1.0 - ndc.y) * 0.5 * height as f64,
            depth: ndc.z,
        })
    }

    /// Unit vector from the target towards the camera.
    pub fn view_direction(&self) -> Vector3<f64> {
        (self.position - self.target)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::z)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// View-only rotation around three axes (radians). Turning the view never
/// touches mesh geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewOrbit {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl ViewOrbit {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_pitch: f64, d_yaw: f64, d_roll: f64) {
        self.pitch += d_pitch;
        self.yaw += d_yaw;
        self.roll += d_roll;
    }

    /// Model matrix turning the scene around `pivot`.
    pub fn model_matrix(&self, pivot: &Point3<f64>) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(self.pitch, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.yaw, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.roll));

        // Apply rotations in order: Z, Y, X
        Matrix4::new_translation(&pivot.coords)
            * (rz * ry * rx)
            * Matrix4::new_translation(&-pivot.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-12);
        assert!((camera.fov - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = Camera::new(80, 40);
        let p = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 80, 40)
            .unwrap();
        assert_relative_eq!(p.x, 40.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = Camera::new(80, 40);
        let p = camera
            .project_to_screen(&Point3::new(0.0, 1.0, 0.0), &Matrix4::identity(), 80, 40)
            .unwrap();
        assert!(p.y < 20.0);
    }

    #[test]
    fn test_nearer_points_have_smaller_depth() {
        let camera = Camera::new(80, 40);
        let model = Matrix4::identity();
        let near = camera.project_to_screen(&Point3::new(0.0, 0.0, 1.0), &model, 80, 40).unwrap();
        let far = camera.project_to_screen(&Point3::new(0.0, 0.0, -1.0), &model, 80, 40).unwrap();
        assert!(near.depth < far.depth);
    }

    #[test]
    fn test_point_behind_camera_is_dropped() {
        let camera = Camera::new(80, 40);
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera.project_to_screen(&behind, &Matrix4::identity(), 80, 40).is_none());
    }

    #[test]
    fn test_frame_bounds_keeps_box_visible() {
        let mut camera = Camera::new(80, 40);
        let min = Point3::new(10.0, 10.0, 10.0);
        let max = Point3::new(30.0, 12.0, 14.0);
        camera.frame_bounds(&min, &max);

        assert_relative_eq!(camera.target, Point3::new(20.0, 11.0, 12.0));
        for corner in [min, max] {
            let p = camera.project_to_screen(&corner, &Matrix4::identity(), 80, 40);
            assert!(p.is_some());
        }
    }

    #[test]
    fn test_identity_orbit() {
        let orbit = ViewOrbit::default();
        let matrix = orbit.model_matrix(&Point3::new(1.0, 2.0, 3.0));
        assert!((matrix - Matrix4::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_orbit_keeps_pivot_fixed() {
        let mut orbit = ViewOrbit::new(0.3, 0.3, 0.0);
        orbit.rotate(0.1, 0.2, 0.3);
        assert_relative_eq!(orbit.roll, 0.3);

        let pivot = Point3::new(1.0, -2.0, 0.5);
        let moved = orbit.model_matrix(&pivot).transform_point(&pivot);
        assert_relative_eq!(moved, pivot, epsilon = 1e-12);
    }
}
