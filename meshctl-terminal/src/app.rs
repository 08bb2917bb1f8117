/// Mesh control application: the state behind the view and panel callbacks
use std::ops::ControlFlow;

use meshctl_core::{Edge, Mesh, Renderable, SceneData, TransformError, TransformParams};
use nalgebra::{Matrix3, Point3};

use crate::ui::{MenuPanel, Ui};

/// Length of each coordinate indicator arm, in world units.
pub const AXIS_LENGTH: f64 = 0.2;

const PANEL_TITLE: &str = "Mesh Control Panel";

/// Owns the mesh and the pending transform parameters.
#[derive(Debug)]
pub struct MeshControlApp {
    mesh: Mesh,
    params: TransformParams,
    status: Option<String>,
}

impl MeshControlApp {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            params: TransformParams::default(),
            status: None,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut TransformParams {
        &mut self.params
    }

    /// Last applied or rejected transform, as shown in the panel.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Scale the mesh by the current scale parameter.
    pub fn scale_mesh(&mut self) {
        let result = self.params.apply_scale(&mut self.mesh);
        let done = format!("scaled by {}x", self.params.scale);
        self.record(result, done);
    }

    /// Rotate the mesh by the current angle around the current axis.
    pub fn rotate_mesh(&mut self) {
        let result = self.params.apply_rotation(&mut self.mesh);
        let axis = self.params.rotation_axis;
        let done = format!(
            "rotated by {} rad around ({}, {}, {})",
            self.params.rotation_angle, axis.x, axis.y, axis.z
        );
        self.record(result, done);
    }

    fn record(&mut self, result: Result<(), TransformError>, done: String) {
        self.status = Some(match result {
            Ok(()) => done,
            Err(err) => {
                tracing::warn!(%err, "transform rejected");
                format!("rejected: {err}")
            }
        });
    }
}

/// Three arms from the origin, colored by the rows of the identity matrix:
/// x red, y green, z blue.
pub fn coordinate_indicator() -> [Edge; 3] {
    let basis = Matrix3::<f64>::identity();
    [0, 1, 2].map(|i| {
        let direction = basis.row(i).transpose();
        Edge {
            from: Point3::origin(),
            to: Point3::from(direction * AXIS_LENGTH),
            color: direction,
        }
    })
}

impl Renderable for MeshControlApp {
    fn pre_draw(&mut self, data: &mut SceneData) -> ControlFlow<()> {
        data.clear();
        data.add_edges(coordinate_indicator());
        data.set_mesh(&self.mesh);
        ControlFlow::Continue(())
    }
}

impl MenuPanel for MeshControlApp {
    fn draw_menu(&mut self, ui: &mut Ui) {
        if !ui.collapsing_header(PANEL_TITLE, true) {
            return;
        }

        ui.input_double("Scale Factor", &mut self.params.scale);
        if ui.button("Scale Mesh") {
            self.scale_mesh();
        }

        ui.input_double("Rotation Angle (Radians)", &mut self.params.rotation_angle);
        ui.input_double3("Rotation Axis", &mut self.params.rotation_axis);
        if ui.button("Rotate Mesh") {
            self.rotate_mesh();
        }

        ui.text(format!(
            "{} vertices, {} faces",
            self.mesh.vertex_count(),
            self.mesh.face_count()
        ));
        if let Some(status) = &self.status {
            ui.text(status.clone());
        }
    }
}
