//! Texture chip lookup in a grid-shaped atlas.

/// Normalized sub-rectangle of the atlas. `v0` is the bottom edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChipRect {
    pub u0: f32,
    pub v0: f32,
    pub width: f32,
    pub height: f32,
}

impl ChipRect {
    #[inline]
    pub fn map(&self, u: f32, v: f32) -> (f32, f32) {
        (self.u0 + u * self.width, self.v0 + v * self.height)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChipAtlas {
    pub columns: u32,
    pub rows: u32,
}

impl Default for ChipAtlas {
    fn default() -> Self {
        ChipAtlas {
            columns: 8,
            rows: 8,
        }
    }
}

impl ChipAtlas {
    pub fn new(columns: u32, rows: u32) -> Self {
        ChipAtlas {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    #[inline]
    pub fn chip_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Chips are numbered row-major from the top-left; out-of-range ids wrap.
    pub fn chip_rect(&self, chip: i32) -> ChipRect {
        let count = self.chip_count().max(1) as i64;
        let id = (chip as i64).rem_euclid(count) as u32;
        let col = id % self.columns;
        let row = id / self.columns;
        let width = 1.0 / self.columns as f32;
        let height = 1.0 / self.rows as f32;
        ChipRect {
            u0: col as f32 * width,
            v0: 1.0 - (row + 1) as f32 * height,
            width,
            height,
        }
    }
}
