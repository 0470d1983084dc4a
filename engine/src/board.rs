#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// 3x3 board in row-major order: index 0 is the top-left cell, 8 the
/// bottom-right. An empty cell is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Mark>; 9],
}

impl Board {
    pub const CELL_COUNT: usize = 9;

    pub fn new() -> Self {
        Self { cells: [None; 9] }
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells[index]
    }

    pub fn set(&mut self, index: usize, mark: Mark) {
        self.cells[index] = Some(mark);
    }

    pub fn clear(&mut self, index: usize) {
        self.cells[index] = None;
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| if cell.is_none() { Some(index) } else { None })
            .collect()
    }

    pub fn cells(&self) -> &[Option<Mark>; 9] {
        &self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
