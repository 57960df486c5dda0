// Copyright (c) 2026 rezky_nightky

//! The cell grid the renderer paints into.
//!
//! Cells are retained between frames and every write that changes a cell is
//! recorded, so the terminal only has to repaint what moved. Scene drawing
//! happens in passes: [`Frame::begin_pass`] invalidates the depth buffer,
//! [`Frame::plot`] keeps the nearest write per cell, and [`Frame::end_pass`]
//! blanks whatever the pass did not reach.

use crossterm::style::Color;

use crate::cell::Cell;

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
    pass: u32,
    stamp: Vec<u32>,
    depth: Vec<f32>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            gen: 1,
            cell_gen: vec![1; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
            pass: 0,
            stamp: vec![0; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    #[cfg(test)]
    pub fn clear_with_bg(&mut self, bg: Option<Color>) {
        self.blank = Cell::blank_with_bg(bg);
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
        }
        self.dirty_all = true;
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }
        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn index_signed(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        self.index(u16::try_from(x).ok()?, u16::try_from(y).ok()?)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| {
            if self.cell_gen[i] == self.gen {
                &self.cells[i]
            } else {
                &self.blank
            }
        })
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            self.blank
        }
    }

    fn write(&mut self, i: usize, cell: Cell) {
        if self.cell_at_index(i) == cell {
            return;
        }
        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    #[cfg(test)]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.write(i, cell);
        }
    }

    pub fn begin_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1);
        if self.pass == 0 {
            self.stamp.fill(0);
            self.pass = 1;
        }
    }

    /// Depth-tested write. Returns `false` when something nearer already
    /// owns the cell in this pass, or the cell is off screen.
    pub fn plot(&mut self, x: i32, y: i32, depth: f32, cell: Cell) -> bool {
        let Some(i) = self.index_signed(x, y) else {
            return false;
        };
        if self.stamp[i] == self.pass && depth >= self.depth[i] {
            return false;
        }
        self.stamp[i] = self.pass;
        self.depth[i] = depth;
        self.write(i, cell);
        true
    }

    /// Like [`Frame::plot`], but a cell without its own background takes
    /// the background already painted there in this pass.
    pub fn plot_over(&mut self, x: i32, y: i32, depth: f32, mut cell: Cell) -> bool {
        if cell.bg.is_none() {
            if let Some(i) = self.index_signed(x, y) {
                if self.stamp[i] == self.pass {
                    cell.bg = self.cell_at_index(i).bg;
                }
            }
        }
        self.plot(x, y, depth, cell)
    }

    /// Fill an axis-aligned block of cells centred on `(cx, cy)`.
    pub fn splat(&mut self, cx: f32, cy: f32, half_w: f32, half_h: f32, depth: f32, cell: Cell) {
        let x0 = (cx - half_w).round() as i32;
        let x1 = (cx + half_w).round() as i32;
        let y0 = (cy - half_h).round() as i32;
        let y1 = (cy + half_h).round() as i32;
        for y in y0.max(0)..=y1.min(self.height as i32 - 1) {
            for x in x0.max(0)..=x1.min(self.width as i32 - 1) {
                self.plot(x, y, depth, cell);
            }
        }
    }

    /// Write on top of everything drawn in this pass.
    pub fn overlay(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.stamp[i] = self.pass;
            self.depth[i] = f32::NEG_INFINITY;
            self.write(i, cell);
        }
    }

    /// Overlay a run of text. Returns the number of columns written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, proto: Cell) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            self.overlay(col, y, Cell { ch, ..proto });
            col += 1;
        }
        col - x
    }

    pub fn end_pass(&mut self) {
        for i in 0..self.cells.len() {
            if self.stamp[i] != self.pass {
                let blank = self.blank;
                self.write(i, blank);
            }
        }
    }
}
