//! ASCII Plot
//!
//! Draws the response curve over the live spectrum on a character canvas.
//! One column per grid tick (so the x axis is log frequency), rows spanning
//! ±`MAX_AMP_DB`.

use contour_core::{FrequencyGrid, ResponseCurve};

/// Vertical range of the plot in dB, symmetric around 0
pub const MAX_AMP_DB: f32 = 16.0;

const GUIDE_LEVELS_DB: [f32; 3] = [12.0, 0.0, -12.0];
const DECADES: [(f32, &str); 3] = [(100.0, "100"), (1000.0, "1k"), (10000.0, "10k")];
const LABEL_WIDTH: usize = 5;

const CURVE: char = '*';
const SPECTRUM: char = ':';
const LEVEL_GUIDE: char = '-';
const DECADE_GUIDE: char = '|';

/// Row for `db` on a canvas `height` rows tall (row 0 is the top)
///
/// Values outside ±`MAX_AMP_DB` stick to the edge rows.
pub fn db_to_row(db: f32, height: usize) -> usize {
    let last = height.saturating_sub(1) as f32;
    let fraction = (MAX_AMP_DB - db) / (2.0 * MAX_AMP_DB);
    (fraction * last).round().clamp(0.0, last) as usize
}

fn level_label(db: f32) -> String {
    if db == 0.0 {
        "0".to_string()
    } else {
        format!("{:+}", db as i32)
    }
}

pub struct Plot<'a> {
    grid: &'a FrequencyGrid,
    height: usize,
    cells: Vec<char>,
}

impl<'a> Plot<'a> {
    /// Empty canvas with level and decade guides
    pub fn new(grid: &'a FrequencyGrid, height: usize) -> Self {
        let mut plot = Self {
            grid,
            height,
            cells: vec![' '; grid.len() * height],
        };
        plot.draw_guides();
        plot
    }

    fn width(&self) -> usize {
        self.grid.len()
    }

    fn cell_mut(&mut self, row: usize, column: usize) -> &mut char {
        let width = self.width();
        &mut self.cells[row * width + column]
    }

    fn decade_columns(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        DECADES
            .iter()
            .filter(|(freq, _)| {
                *freq >= self.grid.min_frequency() && *freq <= self.grid.max_frequency()
            })
            .map(|&(freq, label)| (self.grid.index_of(freq), label))
    }

    fn draw_guides(&mut self) {
        if self.cells.is_empty() {
            return;
        }
        for level in GUIDE_LEVELS_DB {
            let row = db_to_row(level, self.height);
            for column in 0..self.width() {
                *self.cell_mut(row, column) = LEVEL_GUIDE;
            }
        }
        let columns: Vec<usize> = self.decade_columns().map(|(column, _)| column).collect();
        for column in columns {
            for row in 0..self.height {
                *self.cell_mut(row, column) = DECADE_GUIDE;
            }
        }
    }

    /// Fill each column from the bottom by the analyser level at its frequency
    ///
    /// `bytes` is the analyser output scaled to 0-255, `bin_width_hz` the
    /// spacing of its bins. Guides stay visible through the fill.
    pub fn draw_spectrum(&mut self, bytes: &[u8], bin_width_hz: f32) {
        if bin_width_hz <= 0.0 {
            return;
        }
        let grid = self.grid;
        for (column, freq) in grid.iter().enumerate() {
            let bin = (freq / bin_width_hz).round() as usize;
            let Some(&byte) = bytes.get(bin) else {
                continue;
            };
            let filled = (usize::from(byte) * self.height + 127) / 255;
            for row in self.height - filled..self.height {
                let cell = self.cell_mut(row, column);
                if *cell == ' ' {
                    *cell = SPECTRUM;
                }
            }
        }
    }

    /// Draw one curve point per column
    pub fn draw_curve(&mut self, curve: &ResponseCurve) {
        if self.cells.is_empty() {
            return;
        }
        let height = self.height;
        let width = self.width();
        for (column, db) in curve.iter().enumerate().take(width) {
            *self.cell_mut(db_to_row(db, height), column) = CURVE;
        }
    }

    /// The canvas with dB labels on the left and a frequency axis below
    pub fn render(&self) -> String {
        let width = self.width();
        let mut out = String::with_capacity((width + LABEL_WIDTH + 1) * (self.height + 1));

        for (row, cells) in self.cells.chunks(width.max(1)).enumerate() {
            let label = GUIDE_LEVELS_DB
                .iter()
                .find(|&&level| db_to_row(level, self.height) == row)
                .map(|&level| level_label(level))
                .unwrap_or_default();
            out.push_str(&format!("{:>width$} ", label, width = LABEL_WIDTH - 1));
            out.extend(cells.iter());
            out.push('\n');
        }

        let mut axis = vec![' '; width];
        for (column, label) in self.decade_columns() {
            for (offset, ch) in label.chars().enumerate() {
                if let Some(slot) = axis.get_mut(column + offset) {
                    *slot = ch;
                }
            }
        }
        out.push_str(&" ".repeat(LABEL_WIDTH));
        out.extend(axis);
        out.push('\n');
        out
    }
}
