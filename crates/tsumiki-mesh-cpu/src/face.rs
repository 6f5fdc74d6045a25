use tsumiki_blocks::Direction;

use crate::constants::CUBE_QUAD_INDICES;

const PANEL_VERTEX_ORDER: [[usize; 4]; 4] = [
    [0, 1, 2, 3],
    [3, 2, 1, 0],
    [1, 3, 0, 2],
    [2, 0, 3, 1],
];

/// Which local panel corner lands on world corner `vertex` for a block facing `dir`.
#[inline]
pub fn reverse_panel_vertex_index(vertex: usize, dir: Direction) -> usize {
    let row = match dir {
        Direction::Zplus => 0,
        Direction::Zminus => 1,
        Direction::Xplus => 3,
        Direction::Xminus => 2,
        Direction::Yplus | Direction::Yminus => return vertex,
    };
    PANEL_VERTEX_ORDER[row][vertex & 3]
}

/// Triangle list for a route panel; X-facing blocks split along the other diagonal.
#[inline]
pub fn route_panel_indices(dir: Direction) -> [u32; 6] {
    match dir {
        Direction::Xplus | Direction::Xminus => [0, 1, 3, 0, 3, 2],
        _ => [0, 1, 2, 1, 3, 2],
    }
}

/// Guide-box triangles for one world face, relative to the box's first vertex.
#[inline]
pub fn cube_face_triangles(face: Direction) -> [u32; 6] {
    let q = &CUBE_QUAD_INDICES[face.index() * 4..face.index() * 4 + 4];
    [q[0], q[1], q[2], q[0], q[2], q[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CUBE_VERTICES, PANEL_VERTICES};

    #[test]
    fn cube_faces_lie_on_their_planes() {
        for face in Direction::ALL {
            let n = face.normal();
            for i in cube_face_triangles(face) {
                let v = CUBE_VERTICES[i as usize];
                let extent = if face.is_horizontal() { 0.5 } else { 0.25 };
                assert_eq!(v.dot(n), extent, "{face:?}");
            }
        }
    }

    #[test]
    fn reverse_index_undoes_rotation() {
        for dir in Direction::HORIZONTAL {
            for j in 0..4 {
                let local = reverse_panel_vertex_index(j, dir);
                let world = dir.rotate_position(PANEL_VERTICES[local]);
                assert_eq!(world, PANEL_VERTICES[j], "{dir:?} corner {j}");
            }
        }
    }
}
