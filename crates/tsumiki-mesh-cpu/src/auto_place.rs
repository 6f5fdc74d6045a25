//! Neighbor-driven variant selection for auto-placement shapes (water, ground cover).
//!
//! Each block is split into four quadrants. Quadrant `i` sits between cardinal
//! neighbors `i` and `(i + 1) % 4`, next to diagonal `i + 4`. The 13-bit pattern
//! below selects one of ten variant groups per quadrant.

use tsumiki_blocks::Block;
use tsumiki_geom::Vec3;
use tsumiki_grid::SpatialIndex;

/// Sampled neighbors; bit `k` of the pattern is set when offset `k` is occupied.
pub const NEIGHBOR_OFFSETS: [Vec3; 13] = [
    // cardinals
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, -1.0),
    Vec3::new(1.0, 0.0, 0.0),
    // diagonals
    Vec3::new(-1.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, -1.0),
    Vec3::new(1.0, 0.0, -1.0),
    Vec3::new(1.0, 0.0, 1.0),
    // directly above
    Vec3::new(0.0, 0.5, 0.0),
    // above the cardinals
    Vec3::new(0.0, 0.5, 1.0),
    Vec3::new(-1.0, 0.5, 0.0),
    Vec3::new(0.0, 0.5, -1.0),
    Vec3::new(1.0, 0.5, 0.0),
];

const ABOVE_BIT: usize = 8;
const ABOVE_CARDINAL_BASE: usize = 9;
const DIAGONAL_BASE: usize = 4;

pub fn neighbor_pattern(index: &SpatialIndex<Block>, position: Vec3) -> u16 {
    NEIGHBOR_OFFSETS
        .iter()
        .enumerate()
        .filter(|(_, off)| index.contains(position + **off))
        .fold(0u16, |pattern, (k, _)| pattern | (1 << k))
}

/// The six neighbor bits one quadrant depends on.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct QuadrantSample {
    /// Cardinal neighbor `i`.
    pub s1: bool,
    /// Cardinal neighbor `(i + 1) % 4`.
    pub s2: bool,
    /// Diagonal between them.
    pub s3: bool,
    /// Directly above.
    pub s4: bool,
    /// Above cardinal `i`.
    pub s5: bool,
    /// Above cardinal `(i + 1) % 4`.
    pub s6: bool,
}

impl QuadrantSample {
    pub fn decode(pattern: u16, quadrant: usize) -> QuadrantSample {
        let i = quadrant % 4;
        let next = (i + 1) % 4;
        let bit = |k: usize| pattern & (1 << k) != 0;
        QuadrantSample {
            s1: bit(i),
            s2: bit(next),
            s3: bit(DIAGONAL_BASE + i),
            s4: bit(ABOVE_BIT),
            s5: bit(ABOVE_CARDINAL_BASE + i),
            s6: bit(ABOVE_CARDINAL_BASE + next),
        }
    }

    /// Packs as `s1` in bit 0 through `s6` in bit 5.
    pub fn from_bits(bits: u8) -> QuadrantSample {
        let bit = |k: u8| bits & (1 << k) != 0;
        QuadrantSample {
            s1: bit(0),
            s2: bit(1),
            s3: bit(2),
            s4: bit(3),
            s5: bit(4),
            s6: bit(5),
        }
    }
}

/// Variant group for one quadrant, or `None` when the quadrant is fully enclosed.
pub fn mesh_offset(s: QuadrantSample) -> Option<usize> {
    let QuadrantSample {
        s1,
        s2,
        s3,
        s4,
        s5,
        s6,
    } = s;
    let offset = if s1 && s2 {
        if s3 {
            if s4 && (s5 || s6) {
                return None;
            }
            0
        } else {
            16
        }
    } else if s1 {
        if s4 {
            if s5 { 24 } else { 32 }
        } else {
            8
        }
    } else if s2 {
        if s4 {
            if s6 { 28 } else { 36 }
        } else {
            12
        }
    } else if s4 {
        20
    } else {
        4
    };
    Some(offset)
}

/// Variant indices (group plus quadrant) to merge for each quadrant.
pub fn quadrant_variants(pattern: u16) -> [Option<usize>; 4] {
    core::array::from_fn(|i| mesh_offset(QuadrantSample::decode(pattern, i)).map(|o| o + i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsumiki_blocks::{Direction, ShapeId};

    // Reference table, one row per (s1, s2, s3) and the s4/s5/s6 response.
    fn expected(s: QuadrantSample) -> i32 {
        let above = |side: bool, hidden: i32, open: i32, flat: i32| {
            if !s.s4 {
                flat
            } else if side {
                hidden
            } else {
                open
            }
        };
        match (s.s1, s.s2, s.s3) {
            (true, true, true) => {
                if s.s4 && (s.s5 || s.s6) {
                    -1
                } else {
                    0
                }
            }
            (true, true, false) => 16,
            (true, false, _) => above(s.s5, 24, 32, 8),
            (false, true, _) => above(s.s6, 28, 36, 12),
            (false, false, _) => {
                if s.s4 {
                    20
                } else {
                    4
                }
            }
        }
    }

    #[test]
    fn all_sixty_four_samples_match_the_table() {
        for bits in 0u8..64 {
            let s = QuadrantSample::from_bits(bits);
            let got = mesh_offset(s).map_or(-1, |o| o as i32);
            assert_eq!(got, expected(s), "sample {s:?}");
        }
    }

    #[test]
    fn enclosed_quadrant_skips_only_with_cover_above() {
        let mut s = QuadrantSample {
            s1: true,
            s2: true,
            s3: true,
            ..QuadrantSample::default()
        };
        assert_eq!(mesh_offset(s), Some(0));
        s.s4 = true;
        assert_eq!(mesh_offset(s), Some(0));
        s.s6 = true;
        assert_eq!(mesh_offset(s), None);
        s.s3 = false;
        assert_eq!(mesh_offset(s), Some(16));
    }

    #[test]
    fn decode_reads_the_next_cardinal_with_wraparound() {
        // Cardinal 0 and above-cardinal 0 only.
        let pattern = (1 << 0) | (1 << 9);
        let q3 = QuadrantSample::decode(pattern, 3);
        assert!(!q3.s1 && q3.s2 && !q3.s5 && q3.s6);
        let q0 = QuadrantSample::decode(pattern, 0);
        assert!(q0.s1 && !q0.s2 && q0.s5 && !q0.s6);
    }

    #[test]
    fn isolated_block_uses_open_variants() {
        let index = SpatialIndex::new();
        let pattern = neighbor_pattern(&index, Vec3::ZERO);
        assert_eq!(pattern, 0);
        assert_eq!(quadrant_variants(pattern), [Some(4), Some(5), Some(6), Some(7)]);
    }

    #[test]
    fn pattern_sets_one_bit_per_neighbor() {
        let mut index = SpatialIndex::new();
        for off in NEIGHBOR_OFFSETS {
            index.add(Block::new(off, Direction::Zplus, ShapeId(0)));
        }
        assert_eq!(neighbor_pattern(&index, Vec3::ZERO), (1 << 13) - 1);
        index.remove(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(neighbor_pattern(&index, Vec3::ZERO), (1 << 13) - 1 - (1 << 8));
    }
}
