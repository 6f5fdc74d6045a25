use hashbrown::HashMap;
use tsumiki_blocks::{ChipAtlas, Direction, ShapeMesh};
use tsumiki_geom::Vec3;

/// Flat vertex/index arrays ready for upload or export.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    /// Face slot per vertex (world face `0..6`, `6` for objects).
    pub meta: Vec<u8>,
}

impl MeshBuild {
    /// Clears all arrays but retains capacity for the next rebuild.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        self.meta.clear();
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.idx.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a bare position (guide and route buffers carry no normals or UVs).
    #[inline]
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        let i = self.vertex_count() as u32;
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        i
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.idx.extend_from_slice(&[a, b, c]);
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }
    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
    pub fn uvs(&self) -> &[f32] {
        &self.uv
    }
    pub fn indices(&self) -> &[u32] {
        &self.idx
    }
    pub fn face_slots(&self) -> &[u8] {
        &self.meta
    }

    /// Line-list indices outlining every triangle. A triangle pair `(a,b,c)(a,c,d)`
    /// is drawn as the quad `a-b-c-d` without its diagonal.
    pub fn wire_indices(&self) -> Vec<u32> {
        let tris = &self.idx;
        let count = tris.len() / 3;
        let mut lines = Vec::with_capacity(count * 6);
        let mut t = 0;
        while t < count {
            let (i0, i1, i2) = (tris[t * 3], tris[t * 3 + 1], tris[t * 3 + 2]);
            if t + 1 < count && tris[t * 3 + 3] == i0 && tris[t * 3 + 4] == i2 {
                let i3 = tris[t * 3 + 5];
                lines.extend_from_slice(&[i0, i1, i1, i2, i2, i3, i3, i0]);
                t += 2;
            } else {
                lines.extend_from_slice(&[i0, i1, i1, i2, i2, i0]);
                t += 1;
            }
        }
        lines
    }
}

/// Placement of one source mesh into a merge buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MergeParams {
    pub position: Vec3,
    pub direction: Direction,
    pub scale: Vec3,
    /// Map the face onto the lower or upper half of its chip by the block's height.
    pub divide_vertically: bool,
    pub texture_chip: i32,
    pub face_slot: u8,
}

impl Default for MergeParams {
    fn default() -> Self {
        MergeParams {
            position: Vec3::ZERO,
            direction: Direction::Zplus,
            scale: Vec3::ONE,
            divide_vertically: false,
            texture_chip: 0,
            face_slot: 0,
        }
    }
}

/// Render-culling cell of a merge position. Z is negated for the key only.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BucketKey {
    #[inline]
    pub fn of(position: Vec3, cell_size: f32) -> BucketKey {
        BucketKey {
            x: (position.x / cell_size).floor() as i32,
            y: (position.y / cell_size).floor() as i32,
            z: (-position.z / cell_size).floor() as i32,
        }
    }
}

/// Accumulates transformed shape meshes, optionally mirrored into spatial buckets.
#[derive(Default, Clone, Debug)]
pub struct MeshMergeBuffer {
    main: MeshBuild,
    bucket_size: Option<f32>,
    buckets: HashMap<BucketKey, MeshBuild>,
}

impl MeshMergeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket_size(cell_size: Option<f32>) -> Self {
        let mut buf = Self::default();
        buf.set_bucket_size(cell_size);
        buf
    }

    /// Non-positive sizes disable bucketing. Existing buckets are dropped.
    pub fn set_bucket_size(&mut self, cell_size: Option<f32>) {
        self.bucket_size = cell_size.filter(|c| *c > 0.0);
        self.buckets.clear();
    }

    #[inline]
    pub fn bucket_size(&self) -> Option<f32> {
        self.bucket_size
    }

    pub fn clear(&mut self) {
        self.main.clear_keep_capacity();
        self.buckets.clear();
    }

    #[inline]
    pub fn mesh(&self) -> &MeshBuild {
        &self.main
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&BucketKey, &MeshBuild)> {
        self.buckets.iter()
    }

    pub fn bucket(&self, key: BucketKey) -> Option<&MeshBuild> {
        self.buckets.get(&key)
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.main.vertex_count()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.main.index_count()
    }

    #[inline]
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        self.main.push_vertex(p)
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.main.push_triangle(a, b, c);
    }

    pub fn wire_indices(&self) -> Vec<u32> {
        self.main.wire_indices()
    }

    /// Appends `mesh` placed by `params`. Not idempotent: merging twice duplicates geometry.
    pub fn merge(&mut self, mesh: &ShapeMesh, atlas: &ChipAtlas, params: &MergeParams) {
        merge_into(&mut self.main, mesh, atlas, params);
        if let Some(cell) = self.bucket_size {
            let key = BucketKey::of(params.position, cell);
            merge_into(self.buckets.entry(key).or_default(), mesh, atlas, params);
        }
    }
}

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn merge_into(out: &mut MeshBuild, mesh: &ShapeMesh, atlas: &ChipAtlas, p: &MergeParams) {
    let base = out.vertex_count() as u32;
    let chip = atlas.chip_rect(p.texture_chip);

    // Triangles whose V leaves [0,1] were authored across a seam; pull them back by half a chip.
    let mut v_offset = vec![0.0f32; mesh.positions.len()];
    let upper = p.position.y.rem_euclid(1.0) >= 0.5;
    let v_base = if upper { 0.5 } else { 0.0 };
    if p.divide_vertically {
        for tri in mesh.indices.chunks_exact(3) {
            let vs = [tri[0], tri[1], tri[2]].map(|i| mesh.uvs.get(i as usize).map_or(0.0, |uv| uv.y));
            let shift = if vs.iter().any(|v| *v > 1.0) {
                -0.5
            } else if vs.iter().any(|v| *v < 0.0) {
                0.5
            } else {
                continue;
            };
            for &i in tri {
                if let Some(o) = v_offset.get_mut(i as usize) {
                    *o = shift;
                }
            }
        }
    }

    for (i, src) in mesh.positions.iter().enumerate() {
        let local = Vec3::new(-src.x, src.y, -src.z).scaled(p.scale);
        let world = p.direction.rotate_position(local) + p.position;
        out.pos.extend_from_slice(&[world.x, world.y, world.z]);

        let n = mesh.normals.get(i).copied().unwrap_or(Vec3::UP);
        let n = p.direction.rotate_position(Vec3::new(-n.x, n.y, -n.z));
        out.norm.extend_from_slice(&[n.x, n.y, n.z]);

        let src_uv = mesh.uvs.get(i).copied().unwrap_or_default();
        let t = if p.divide_vertically {
            clamp01(v_base + src_uv.y * 0.5 + v_offset[i])
        } else {
            clamp01(src_uv.y)
        };
        let (u, v) = chip.map(clamp01(src_uv.x), t);
        out.uv.extend_from_slice(&[u, v]);
        out.meta.push(p.face_slot);
    }
    out.idx.extend(mesh.indices.iter().map(|i| base + i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsumiki_geom::Vec2;

    fn unit_quad() -> ShapeMesh {
        let mut m = ShapeMesh::default();
        m.push_quad(
            [
                Vec3::new(-0.5, -0.25, 0.5),
                Vec3::new(0.5, -0.25, 0.5),
                Vec3::new(0.5, 0.25, 0.5),
                Vec3::new(-0.5, 0.25, 0.5),
            ],
            Vec3::new(0.0, 0.0, 1.0),
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
        );
        m
    }

    #[test]
    fn merge_offsets_indices_by_running_count() {
        let atlas = ChipAtlas::default();
        let mut buf = MeshMergeBuffer::new();
        let q = unit_quad();
        buf.merge(&q, &atlas, &MergeParams::default());
        buf.merge(&q, &atlas, &MergeParams::default());
        assert_eq!(buf.mesh().indices()[6..], [4, 5, 6, 4, 6, 7]);
        assert_eq!(buf.mesh().face_slots().len(), 8);
    }

    #[test]
    fn merge_mirrors_then_rotates_then_translates() {
        let atlas = ChipAtlas::default();
        let mut buf = MeshMergeBuffer::new();
        let params = MergeParams {
            position: Vec3::new(3.0, 0.5, -1.0),
            direction: Direction::Xplus,
            ..MergeParams::default()
        };
        buf.merge(&unit_quad(), &atlas, &params);
        // Source z=+0.5 mirrors to -0.5, Xplus turns (x,y,z) into (z,y,-x).
        let p = buf.mesh().position(0);
        assert_eq!(p, Vec3::new(3.0 - 0.5, 0.25, -1.0 - 0.5));
        let n = &buf.mesh().normals()[0..3];
        assert_eq!(n, [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn divided_faces_use_half_the_chip() {
        let atlas = ChipAtlas::new(1, 1);
        let lower = MergeParams {
            divide_vertically: true,
            ..MergeParams::default()
        };
        let upper = MergeParams {
            position: Vec3::new(0.0, 0.5, 0.0),
            ..lower
        };
        let mut buf = MeshMergeBuffer::new();
        buf.merge(&unit_quad(), &atlas, &lower);
        buf.merge(&unit_quad(), &atlas, &upper);
        let v: Vec<f32> = buf.mesh().uvs().chunks(2).map(|uv| uv[1]).collect();
        assert_eq!(v, [0.0, 0.0, 0.5, 0.5, 0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn seam_triangles_shift_by_half() {
        let atlas = ChipAtlas::new(1, 1);
        let mut m = ShapeMesh::default();
        m.push_triangle(
            [Vec3::ZERO, Vec3::UP, Vec3::new(1.0, 0.0, 0.0)],
            Vec3::UP,
            [Vec2::new(0.0, 1.0), Vec2::new(0.0, 2.0), Vec2::new(1.0, 1.0)],
        );
        let mut buf = MeshMergeBuffer::new();
        let params = MergeParams {
            divide_vertically: true,
            ..MergeParams::default()
        };
        buf.merge(&m, &atlas, &params);
        let v: Vec<f32> = buf.mesh().uvs().chunks(2).map(|uv| uv[1]).collect();
        assert_eq!(v, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn buckets_follow_floor_of_position() {
        let atlas = ChipAtlas::default();
        let mut buf = MeshMergeBuffer::with_bucket_size(Some(4.0));
        let q = unit_quad();
        for x in [-5.0, -1.0, 0.0, 3.0, 4.0] {
            let params = MergeParams {
                position: Vec3::new(x, 0.0, 1.0),
                ..MergeParams::default()
            };
            buf.merge(&q, &atlas, &params);
        }
        assert_eq!(buf.bucket_count(), 4);
        let zero = buf.bucket(BucketKey { x: 0, y: 0, z: -1 }).unwrap();
        assert_eq!(zero.vertex_count(), 8);
        assert_eq!(zero.indices()[..6], [0, 1, 2, 0, 2, 3]);
        let total: usize = buf.buckets().map(|(_, b)| b.vertex_count()).sum();
        assert_eq!(total, buf.vertex_count());
    }

    #[test]
    fn wire_collapses_quad_pairs() {
        let mut b = MeshBuild::default();
        for p in [Vec3::ZERO, Vec3::UP, Vec3::ONE, Vec3::new(1.0, 0.0, 0.0)] {
            b.push_vertex(p);
        }
        b.push_triangle(0, 1, 2);
        b.push_triangle(0, 2, 3);
        b.push_triangle(3, 2, 1);
        assert_eq!(b.wire_indices(), [0, 1, 1, 2, 2, 3, 3, 0, 3, 2, 2, 1, 1, 3]);
    }
}
