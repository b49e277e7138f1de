/// Dot bit for (x % 2, y % 4) inside one Braille cell.
///
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

const BLANK: char = '\u{2800}';

/// Braille Unicode canvas. Each character cell is a 2x4 dot grid, so a
/// canvas of `cols` x `rows` cells has `cols*2` x `rows*4` pixels.
#[derive(Clone, Debug)]
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    /// Dot pattern per cell, row-major
    cells: Vec<u8>,
}

impl BrailleCanvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
        }
    }

    #[inline(always)]
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.cols || cy >= self.rows {
            return None;
        }
        Some((cy * self.cols + cx, DOT_BITS[x % 2][y % 4]))
    }

    /// Set a dot. Out-of-range coordinates are ignored.
    #[inline(always)]
    pub fn set(&mut self, x: i32, y: i32) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.cells[idx] |= bit;
        }
    }

    /// Clear a dot, used to punch occluders out of layers drawn behind.
    #[inline(always)]
    pub fn unset(&mut self, x: i32, y: i32) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.cells[idx] &= !bit;
        }
    }

    #[cfg(test)]
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .is_some_and(|(idx, bit)| self.cells[idx] & bit != 0)
    }

    /// Glyph for a cell; blank cells are U+2800.
    pub fn glyph(&self, col: usize, row: usize) -> char {
        let bits = self.cells.get(row * self.cols + col).copied().unwrap_or(0);
        char::from_u32(0x2800 + bits as u32).unwrap_or(BLANK)
    }

    /// Non-blank cells as (col, row, glyph).
    pub fn glyphs(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &bits)| bits != 0)
            .map(|(i, _)| {
                let (col, row) = (i % self.cols, i / self.cols);
                (col, row, self.glyph(col, row))
            })
    }

    pub fn dot_count(&self) -> usize {
        self.cells.iter().map(|b| b.count_ones() as usize).sum()
    }

    #[cfg(test)]
    pub fn rows_text(&self) -> String {
        (0..self.rows)
            .map(|row| (0..self.cols).map(|col| self.glyph(col, row)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
