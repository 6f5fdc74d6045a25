//! Authored long-range walk connections between enterable blocks.

use tsumiki_geom::{Vec3, snap_to_lattice};
use tsumiki_mesh_cpu::BlockGroup;

/// Segments per edge in [`RoutePaths::arc_polyline`].
pub const ARC_DIVISIONS: usize = 8;

/// Anything that can tell whether a lattice cell holds an enterable block.
pub trait Walkable {
    fn is_enterable(&self, position: Vec3) -> bool;
}

impl Walkable for BlockGroup {
    fn is_enterable(&self, position: Vec3) -> bool {
        BlockGroup::is_enterable(self, position)
    }
}

/// Unordered pair of lattice positions; `(a, b)` equals `(b, a)`.
#[derive(Copy, Clone, Debug)]
pub struct RouteEdge {
    pub p1: Vec3,
    pub p2: Vec3,
}

impl RouteEdge {
    pub fn new(p1: Vec3, p2: Vec3) -> Self {
        RouteEdge {
            p1: snap_to_lattice(p1),
            p2: snap_to_lattice(p2),
        }
    }

    /// The far end when `position` is one endpoint.
    pub fn other(&self, position: Vec3) -> Option<Vec3> {
        let p = snap_to_lattice(position);
        if self.p1 == p {
            Some(self.p2)
        } else if self.p2 == p {
            Some(self.p1)
        } else {
            None
        }
    }
}

impl PartialEq for RouteEdge {
    fn eq(&self, other: &Self) -> bool {
        (self.p1 == other.p1 && self.p2 == other.p2) || (self.p1 == other.p2 && self.p2 == other.p1)
    }
}

/// Line-list geometry for an edge preview: `divs + 1` points and `divs` segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Flat list of edges; there are few enough that linear scans are fine.
#[derive(Clone, Debug, Default)]
pub struct RoutePaths {
    paths: Vec<RouteEdge>,
}

impl RoutePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoints must be enterable, share exactly one of X or Z, and be more than one cell apart.
    pub fn can_add(walk: &impl Walkable, p1: Vec3, p2: Vec3) -> bool {
        let edge = RouteEdge::new(p1, p2);
        let (a, b) = (edge.p1, edge.p2);
        if !walk.is_enterable(a) || !walk.is_enterable(b) {
            return false;
        }
        if a.x == b.x && a.z == b.z {
            return false;
        }
        if a.x != b.x && a.z != b.z {
            return false;
        }
        (a.x - b.x).abs() + (a.z - b.z).abs() > 1.0
    }

    /// Appends `edge` unless an equal edge is already present.
    pub fn add(&mut self, edge: RouteEdge) -> bool {
        if self.contains(&edge) {
            return false;
        }
        self.paths.push(edge);
        true
    }

    pub fn remove(&mut self, edge: &RouteEdge) -> bool {
        match self.paths.iter().position(|e| e == edge) {
            Some(i) => {
                self.paths.remove(i);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, edge: &RouteEdge) -> bool {
        self.paths.contains(edge)
    }

    /// Every position connected to `position` by an edge, in either direction.
    pub fn find_paths(&self, position: Vec3) -> Vec<Vec3> {
        self.paths.iter().filter_map(|e| e.other(position)).collect()
    }

    #[inline]
    pub fn paths(&self) -> &[RouteEdge] {
        &self.paths
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Arc lifted by a sine bump; taller when the endpoints differ in height.
    pub fn arc_polyline(edge: &RouteEdge, divs: usize) -> Polyline {
        let divs = divs.max(1);
        let diff = edge.p2 - edge.p1;
        let lift = diff.y.abs() * 0.5 + 0.5;
        let points = (0..=divs)
            .map(|j| {
                let t = j as f32 / divs as f32;
                let s = (std::f32::consts::PI * t).sin();
                edge.p1 + diff * t + Vec3::UP * (0.25 + lift * s)
            })
            .collect();
        let indices = (0..divs as u32).flat_map(|j| [j, j + 1]).collect();
        Polyline { points, indices }
    }

    /// All edges as one line list, offsetting each edge's indices.
    pub fn line_mesh(&self) -> Polyline {
        let mut out = Polyline::default();
        for edge in &self.paths {
            let arc = Self::arc_polyline(edge, ARC_DIVISIONS);
            let base = out.points.len() as u32;
            out.points.extend(arc.points);
            out.indices.extend(arc.indices.iter().map(|i| base + i));
        }
        out
    }
}
