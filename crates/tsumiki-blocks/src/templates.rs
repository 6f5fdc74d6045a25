//! Builtin shape geometry.
//!
//! Templates are authored in the block's local frame (block facing `Zplus`,
//! spanning `±0.5` on X/Z and `±0.25` on Y) and stored mirrored on X and Z,
//! the source-mesh convention that the mesh merger undoes.

use serde::Deserialize;
use tsumiki_geom::{Aabb, Vec2, Vec3};

use crate::types::{Connection, Direction};

/// Number of auto-placement variants: ten groups of four quadrants.
pub const AUTO_VARIANTS: usize = 40;

const HALF_W: f32 = 0.5;
const HALF_H: f32 = 0.25;
// Surface height of auto-placement tiles with nothing above them.
const AUTO_SURFACE_Y: f32 = 0.125;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl ShapeMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a quad as triangles `(0,1,2)` and `(0,2,3)`.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uvs: [Vec2; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 4]);
        self.uvs.extend_from_slice(&uvs);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn push_triangle(&mut self, corners: [Vec3; 3], normal: Vec3, uvs: [Vec2; 3]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 3]);
        self.uvs.extend_from_slice(&uvs);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    pub fn append(&mut self, other: &ShapeMesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Negates X and Z of positions and normals.
    pub fn mirrored(mut self) -> ShapeMesh {
        for p in self.positions.iter_mut().chain(self.normals.iter_mut()) {
            p.x = -p.x;
            p.z = -p.z;
        }
        self
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold(Aabb::new(first, first), |b, p| Aabb::new(b.min.min(*p), b.max.max(*p))),
        )
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Cube,
    Slope,
    Auto,
    Empty,
}

/// Geometry and default occlusion metadata produced by a template.
#[derive(Clone, Debug, Default)]
pub struct TemplateParts {
    pub faces: [Option<ShapeMesh>; 6],
    pub objects: Vec<ShapeMesh>,
    pub variants: Vec<Option<ShapeMesh>>,
    pub connection: [Connection; 6],
    pub connection_dir: [Direction; 6],
    pub panel_vertices: [i32; 4],
    pub auto_placement: bool,
}

impl TemplateKind {
    pub fn build(self) -> TemplateParts {
        let parts = match self {
            TemplateKind::Cube => cube(),
            TemplateKind::Slope => slope(),
            TemplateKind::Auto => auto(),
            TemplateKind::Empty => TemplateParts {
                panel_vertices: [1; 4],
                ..TemplateParts::default()
            },
        };
        mirror_parts(parts)
    }
}

fn mirror_parts(mut parts: TemplateParts) -> TemplateParts {
    for face in parts.faces.iter_mut() {
        *face = face.take().map(ShapeMesh::mirrored);
    }
    parts.objects = parts.objects.into_iter().map(ShapeMesh::mirrored).collect();
    parts.variants = parts
        .variants
        .into_iter()
        .map(|v| v.map(ShapeMesh::mirrored))
        .collect();
    parts
}

#[inline]
fn uv(u: f32, v: f32) -> Vec2 {
    Vec2::new(u, v)
}

/// Full-width side quad on a horizontal face between heights `y0` and `y1`.
fn side_quad(dir: Direction, y0: f32, y1: f32) -> ShapeMesh {
    let n = dir.normal();
    let right = n.cross(Vec3::UP) * HALF_W;
    let center = n * HALF_W;
    let (v0, v1) = ((y0 + HALF_H) / (2.0 * HALF_H), (y1 + HALF_H) / (2.0 * HALF_H));
    let mut mesh = ShapeMesh::default();
    mesh.push_quad(
        [
            center - right + Vec3::UP * y0,
            center + right + Vec3::UP * y0,
            center + right + Vec3::UP * y1,
            center - right + Vec3::UP * y1,
        ],
        n,
        [uv(0.0, v0), uv(1.0, v0), uv(1.0, v1), uv(0.0, v1)],
    );
    mesh
}

fn cap_quad(top: bool) -> ShapeMesh {
    let (y, n) = if top {
        (HALF_H, Vec3::UP)
    } else {
        (-HALF_H, -Vec3::UP)
    };
    let mut xz = [(-HALF_W, HALF_W), (HALF_W, HALF_W), (HALF_W, -HALF_W), (-HALF_W, -HALF_W)];
    if !top {
        xz.reverse();
    }
    let corners = xz.map(|(x, z)| Vec3::new(x, y, z));
    let uvs = xz.map(|(x, z)| uv(x + HALF_W, HALF_W - z));
    let mut mesh = ShapeMesh::default();
    mesh.push_quad(corners, n, uvs);
    mesh
}

fn cube() -> TemplateParts {
    let mut faces: [Option<ShapeMesh>; 6] = Default::default();
    for dir in Direction::HORIZONTAL {
        faces[dir.index()] = Some(side_quad(dir, -HALF_H, HALF_H));
    }
    faces[Direction::Yplus.index()] = Some(cap_quad(true));
    faces[Direction::Yminus.index()] = Some(cap_quad(false));
    TemplateParts {
        faces,
        connection: [Connection::Square; 6],
        panel_vertices: [1; 4],
        ..TemplateParts::default()
    }
}

fn slope_side(x: f32) -> ShapeMesh {
    let n = Vec3::new(x.signum(), 0.0, 0.0);
    let mut corners = [
        Vec3::new(x, -HALF_H, -HALF_W),
        Vec3::new(x, -HALF_H, HALF_W),
        Vec3::new(x, HALF_H, HALF_W),
    ];
    if x < 0.0 {
        corners.swap(1, 2);
    }
    let uvs = corners.map(|p| uv(p.z + HALF_W, (p.y + HALF_H) / (2.0 * HALF_H)));
    let mut mesh = ShapeMesh::default();
    mesh.push_triangle(corners, n, uvs);
    mesh
}

// Rises from the local back edge to the local front (`Zplus`) edge.
fn slope() -> TemplateParts {
    let mut faces: [Option<ShapeMesh>; 6] = Default::default();
    faces[Direction::Zplus.index()] = Some(side_quad(Direction::Zplus, -HALF_H, HALF_H));
    faces[Direction::Xplus.index()] = Some(slope_side(HALF_W));
    faces[Direction::Xminus.index()] = Some(slope_side(-HALF_W));
    let mut top = ShapeMesh::default();
    let corners = [
        Vec3::new(-HALF_W, -HALF_H, -HALF_W),
        Vec3::new(-HALF_W, HALF_H, HALF_W),
        Vec3::new(HALF_W, HALF_H, HALF_W),
        Vec3::new(HALF_W, -HALF_H, -HALF_W),
    ];
    top.push_quad(
        corners,
        Vec3::new(0.0, 1.0, -0.5).normalized(),
        corners.map(|p| uv(p.x + HALF_W, p.z + HALF_W)),
    );
    faces[Direction::Yplus.index()] = Some(top);
    faces[Direction::Yminus.index()] = Some(cap_quad(false));
    TemplateParts {
        faces,
        connection: [
            Connection::Square,
            Connection::None,
            Connection::Slope,
            Connection::Slope,
            Connection::None,
            Connection::Square,
        ],
        connection_dir: [Direction::Zplus; 6],
        panel_vertices: [1, 1, 0, 0],
        ..TemplateParts::default()
    }
}

/// Cardinal neighbors in the order auto placement samples them.
fn cardinal(i: usize) -> Vec3 {
    match i % 4 {
        0 => Vec3::new(0.0, 0.0, 1.0),
        1 => Vec3::new(-1.0, 0.0, 0.0),
        2 => Vec3::new(0.0, 0.0, -1.0),
        _ => Vec3::new(1.0, 0.0, 0.0),
    }
}

fn quadrant_top(i: usize) -> ShapeMesh {
    let (a, b) = (cardinal(i) * HALF_W, cardinal(i + 1) * HALF_W);
    let lift = Vec3::UP * AUTO_SURFACE_Y;
    let corners = [Vec3::ZERO + lift, b + lift, a + b + lift, a + lift];
    let mut mesh = ShapeMesh::default();
    mesh.push_quad(
        corners,
        Vec3::UP,
        corners.map(|p| uv(p.x + HALF_W, HALF_W - p.z)),
    );
    mesh
}

// Skirt along the quadrant edge that faces `side`, spanning toward `along`.
fn quadrant_skirt(side: Vec3, along: Vec3, top_y: f32) -> ShapeMesh {
    let a = side * HALF_W;
    let b = a + along * HALF_W;
    let v1 = (top_y + HALF_H) / (2.0 * HALF_H);
    let mut mesh = ShapeMesh::default();
    mesh.push_quad(
        [
            a - Vec3::UP * HALF_H,
            b - Vec3::UP * HALF_H,
            b + Vec3::UP * top_y,
            a + Vec3::UP * top_y,
        ],
        side,
        [uv(0.0, 0.0), uv(0.5, 0.0), uv(0.5, v1), uv(0.0, v1)],
    );
    mesh
}

fn auto_variant(group: usize, i: usize) -> ShapeMesh {
    let (ci, cn) = (cardinal(i), cardinal(i + 1));
    let mut mesh = ShapeMesh::default();
    let low = AUTO_SURFACE_Y;
    match group {
        0 | 16 => mesh.append(&quadrant_top(i)),
        4 => {
            mesh.append(&quadrant_top(i));
            mesh.append(&quadrant_skirt(ci, cn, low));
            mesh.append(&quadrant_skirt(cn, ci, low));
        }
        8 => {
            mesh.append(&quadrant_top(i));
            mesh.append(&quadrant_skirt(cn, ci, low));
        }
        12 => {
            mesh.append(&quadrant_top(i));
            mesh.append(&quadrant_skirt(ci, cn, low));
        }
        20 => {
            mesh.append(&quadrant_skirt(ci, cn, HALF_H));
            mesh.append(&quadrant_skirt(cn, ci, HALF_H));
        }
        24 => mesh.append(&quadrant_skirt(cn, ci, HALF_H)),
        28 => mesh.append(&quadrant_skirt(ci, cn, HALF_H)),
        32 => {
            mesh.append(&quadrant_top(i));
            mesh.append(&quadrant_skirt(cn, ci, HALF_H));
        }
        _ => {
            mesh.append(&quadrant_top(i));
            mesh.append(&quadrant_skirt(ci, cn, HALF_H));
        }
    }
    mesh
}

fn auto() -> TemplateParts {
    let variants = (0..AUTO_VARIANTS)
        .map(|slot| Some(auto_variant(slot / 4 * 4, slot % 4)))
        .collect();
    TemplateParts {
        variants,
        panel_vertices: [1; 4],
        auto_placement: true,
        ..TemplateParts::default()
    }
}
