use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3};

/// World up axis. Both navigation modes yaw around it.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Camera state published to the GPU (272 bytes).
///
/// Layout matches `CameraUniforms` in `preprocess.wgsl` and `gaussian.wgsl`:
///
///  offset   0  view       mat4x4<f32>
///  offset  64  view_inv   mat4x4<f32>
///  offset 128  proj       mat4x4<f32>
///  offset 192  proj_inv   mat4x4<f32>
///  offset 256  viewport   vec2<f32>   (physical px)
///  offset 264  focal      vec2<f32>   (px)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub view_inv: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub proj_inv: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub focal: [f32; 2],
}

/// GPU side of an attached camera.
struct CameraBinding {
    buffer: wgpu::Buffer,
    queue: wgpu::Queue,
}

/// Perspective camera.
///
/// Orientation is an orthonormal basis whose columns are the camera's right,
/// up and back axes in world space. `look`, `right` and `up` are read straight
/// from it, so they can never disagree with the orientation.
pub struct Camera {
    pub position: Vec3,
    rotation: Mat3,

    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    /// Drawable size in physical pixels.
    viewport: Vec2,

    uniform: CameraUniform,
    revision: u64,
    binding: Option<CameraBinding>,
}

impl Camera {
    pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;

    pub fn new(position: Vec3, rotation: Mat3, viewport: Vec2) -> Self {
        let mut camera = Self {
            position,
            rotation,
            fov_y: Self::DEFAULT_FOV_Y,
            near: 0.1,
            far: 1000.0,
            viewport: viewport.max(Vec2::ONE),
            uniform: CameraUniform::zeroed(),
            revision: 0,
            binding: None,
        };
        camera.uniform = camera.compute_uniform();
        camera
    }

    /// Camera at `position` looking at `target`.
    ///
    /// Falls back to the identity orientation when the direction is degenerate.
    pub fn looking_at(position: Vec3, target: Vec3, viewport: Vec2) -> Self {
        let rotation = basis_from_look(target - position).unwrap_or(Mat3::IDENTITY);
        Self::new(position, rotation, viewport)
    }

    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Mat3) {
        self.rotation = rotation;
    }

    pub fn look(&self) -> Vec3 {
        -self.rotation.z_axis
    }

    pub fn right(&self) -> Vec3 {
        self.rotation.x_axis
    }

    pub fn up(&self) -> Vec3 {
        self.rotation.y_axis
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Updates the drawable size. Zero sizes (minimized windows) are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// Focal lengths in pixels (square pixels, so both derive from `fov_y`).
    pub fn focal(&self) -> Vec2 {
        let f = self.viewport.y / (2.0 * (self.fov_y * 0.5).tan());
        Vec2::splat(f)
    }

    /// World to camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(self.rotation.transpose()) * Mat4::from_translation(-self.position)
    }

    /// Camera to clip transform (right-handed, depth in [0, 1]).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    /// Creates the uniform buffer and binds it to this camera.
    ///
    /// The current state is uploaded immediately. The returned handle is shared
    /// with pipelines that read the camera.
    pub fn attach(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Buffer {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.binding = Some(CameraBinding {
            buffer: buffer.clone(),
            queue: queue.clone(),
        });
        self.update_buffer();
        buffer
    }

    /// Re-serializes the camera into its uniform buffer.
    ///
    /// Must be called after any mutation that should be visible to the next
    /// frame. Before `attach` only the CPU-side snapshot is refreshed.
    pub fn update_buffer(&mut self) {
        self.uniform = self.compute_uniform();
        self.revision = self.revision.wrapping_add(1);

        if let Some(binding) = &self.binding {
            binding
                .queue
                .write_buffer(&binding.buffer, 0, bytemuck::bytes_of(&self.uniform));
        }
    }

    /// Last published uniform.
    pub fn uniform(&self) -> &CameraUniform {
        &self.uniform
    }

    /// Number of publishes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn compute_uniform(&self) -> CameraUniform {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        CameraUniform {
            view: view.to_cols_array_2d(),
            view_inv: view.inverse().to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            proj_inv: proj.inverse().to_cols_array_2d(),
            viewport: self.viewport.to_array(),
            focal: self.focal().to_array(),
        }
    }
}

/// Builds a right/up/back basis whose look axis is `direction`.
///
/// Returns `None` when `direction` is zero or parallel to [`WORLD_UP`].
pub(crate) fn basis_from_look(direction: Vec3) -> Option<Mat3> {
    let look = direction.try_normalize()?;
    let right = look.cross(WORLD_UP).try_normalize()?;
    let up = right.cross(look);
    Some(Mat3::from_cols(right, up, -look))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn camera() -> Camera {
        Camera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn looking_down_negative_z_is_identity() {
        let cam = camera();
        assert!(cam.rotation().abs_diff_eq(Mat3::IDENTITY, EPS));
        assert!(cam.look().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn basis_is_orthonormal() {
        let rot = basis_from_look(Vec3::new(1.0, -2.0, 0.5)).unwrap();
        let (r, u, b) = (rot.x_axis, rot.y_axis, rot.z_axis);
        assert!((r.length() - 1.0).abs() < EPS);
        assert!((u.length() - 1.0).abs() < EPS);
        assert!((b.length() - 1.0).abs() < EPS);
        assert!(r.dot(u).abs() < EPS);
        assert!(r.dot(b).abs() < EPS);
        assert!(u.dot(b).abs() < EPS);
    }

    #[test]
    fn basis_rejects_degenerate_directions() {
        assert!(basis_from_look(Vec3::ZERO).is_none());
        assert!(basis_from_look(Vec3::Y * 3.0).is_none());
        assert!(basis_from_look(Vec3::NEG_Y).is_none());
    }

    #[test]
    fn view_matrix_maps_position_to_origin() {
        let cam = camera();
        let p = cam.view_matrix().transform_point3(cam.position);
        assert!(p.abs_diff_eq(Vec3::ZERO, EPS));
        // A point in front of the camera lands on the negative z axis.
        let t = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(t.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), EPS));
    }

    #[test]
    fn focal_matches_vertical_fov() {
        let mut cam = camera();
        cam.fov_y = std::f32::consts::FRAC_PI_2;
        // tan(45deg) == 1, so focal == height / 2.
        assert!((cam.focal().y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn update_buffer_without_gpu_refreshes_snapshot() {
        let mut cam = camera();
        let before = cam.revision();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        cam.update_buffer();
        assert_eq!(cam.revision(), before + 1);
        let view_inv = Mat4::from_cols_array_2d(&cam.uniform().view_inv);
        assert!(view_inv.w_axis.truncate().abs_diff_eq(cam.position, 1e-4));
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut cam = camera();
        cam.set_viewport(0, 100);
        assert_eq!(cam.viewport(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn uniform_is_272_bytes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 272);
    }
}
