/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use meshctl_core::geometry::triangle_normal;
use meshctl_core::{Camera, Edge, SceneData, ScreenPoint};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Edges win depth ties against the surfaces they lie on.
const EDGE_DEPTH_BIAS: f64 = 1e-3;

/// Base surface color, dimmed by the facing ratio.
const SURFACE_RGB: (f64, f64, f64) = (40.0, 70.0, 150.0);

/// One terminal cell of output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        color: Color::Reset,
    };

    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}

/// ASCII renderer that converts submitted scene data to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f64>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f64::INFINITY; size],
            cells: vec![Cell::BLANK; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f64::INFINITY);
        self.cells.fill(Cell::BLANK);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Rasterize the mesh triangles, then the edges.
    pub fn render_scene(&mut self, scene: &SceneData, model_matrix: &Matrix4<f64>, camera: &Camera) {
        let vertices = scene.vertices();
        for face in scene.faces() {
            let corners = face.map(|i| vertices[i]);
            self.render_triangle(&corners, model_matrix, camera);
        }

        for edge in scene.edges() {
            self.render_edge(edge, model_matrix, camera);
        }
    }

    fn project(&self, point: &Point3<f64>, model_matrix: &Matrix4<f64>, camera: &Camera) -> Option<ScreenPoint> {
        camera.project_to_screen(point, model_matrix, self.width as u32, self.height as u32)
    }

    fn render_triangle(&mut self, corners: &[Point3<f64>; 3], model_matrix: &Matrix4<f64>, camera: &Camera) {
        // Project vertices to screen space; drop triangles crossing the near plane
        let mut screen = [ScreenPoint { x: 0.0, y: 0.0, depth: 0.0 }; 3];
        for (out, corner) in screen.iter_mut().zip(corners) {
            match self.project(corner, model_matrix, camera) {
                Some(point) => *out = point,
                None => return,
            }
        }

        // Shade both sides by how squarely the face looks at the camera
        let [a, b, c] = corners.map(|p| model_matrix.transform_point(&p));
        let Some(normal) = triangle_normal(&a, &b, &c) else {
            return;
        };
        let facing = normal.dot(&camera.view_direction()).abs();

        let steps = (LUMINOSITY_RAMP.len() - 2) as f64;
        let index = 1 + (facing * steps).round() as usize;
        let character = LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)];
        let color = surface_color(facing);

        self.rasterize_triangle(&screen, Cell { ch: character, color });
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], cell: Cell) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i64;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i64;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i64;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i64;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i64 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f64 + 0.5, y as f64 + 0.5);

                let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), p) else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                    self.plot(x as usize, y as usize, depth, cell);
                }
            }
        }
    }

    fn render_edge(&mut self, edge: &Edge, model_matrix: &Matrix4<f64>, camera: &Camera) {
        let (Some(from), Some(to)) = (
            self.project(&edge.from, model_matrix, camera),
            self.project(&edge.to, model_matrix, camera),
        ) else {
            return;
        };

        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let cell = Cell {
            ch: slope_char(dx, dy),
            color: rgb(&edge.color),
        };

        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = from.x + dx * t;
            let y = from.y + dy * t;
            if x < 0.0 || y < 0.0 {
                continue;
            }

            let depth = from.depth + (to.depth - from.depth) * t - EDGE_DEPTH_BIAS;
            let (x, y) = (x as usize, y as usize);
            if x < self.width && y < self.height {
                self.plot(x, y, depth, cell);
            }
        }
    }

    fn plot(&mut self, x: usize, y: usize, depth: f64, cell: Cell) {
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.cells[idx] = cell;
        }
    }

    /// Write every cell, row by row, over `background`.
    pub fn draw<W: Write>(&self, writer: &mut W, background: Color) -> std::io::Result<()> {
        writer.queue(SetBackgroundColor(background))?;
        let mut current = None;

        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.ch))?;
            }
        }

        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn surface_color(facing: f64) -> Color {
    let k = 0.4 + 0.6 * facing.clamp(0.0, 1.0);
    let (r, g, b) = SURFACE_RGB;
    Color::Rgb {
        r: (r * k) as u8,
        g: (g * k) as u8,
        b: (b * k) as u8,
    }
}

/// Edge color from `0.0..=1.0` components.
pub fn rgb(color: &Vector3<f64>) -> Color {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color.x),
        g: channel(color.y),
        b: channel(color.z),
    }
}

/// Line character for a screen-space direction (y grows downwards).
fn slope_char(dx: f64, dy: f64) -> char {
    if dy.abs() <= dx.abs() * 0.5 {
        '-'
    } else if dx.abs() <= dy.abs() * 0.5 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
