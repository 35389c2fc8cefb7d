use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::game::{CellState, Sweeper, SweeperError};

const HIDDEN: char = '#';
const FLAGGED: char = 'F';
const OPEN: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cover {
    Hidden,
    Flagged,
    Open,
}

/// Classic rectangular minesweeper.
///
/// Revealing a zero cell opens its whole zero region plus the numbered rim;
/// flags stop the cascade. Hitting a bomb uncovers every bomb on the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SavedField", try_from = "SavedField")]
pub struct ClassicSweeper {
    width: usize,
    height: usize,
    bomb_count: usize,
    /// Row-major, `y * width + x`
    bombs: Vec<bool>,
    covers: Vec<Cover>,
}

impl ClassicSweeper {
    /// A field with bombs exactly where asked. Duplicate positions count once.
    pub fn with_bombs(width: usize, height: usize, bombs: &[(usize, usize)]) -> Result<Self, SweeperError> {
        let mut field = Self::new(width, height, 0)?;
        for &(x, y) in bombs {
            let idx = field.index(x, y)?;
            field.bombs[idx] = true;
        }
        field.bomb_count = field.bombs.iter().filter(|b| **b).count();
        Ok(field)
    }

    /// Fresh layout drawn from `rng`
    pub fn reset_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let cells = self.width * self.height;
        self.bombs = vec![false; cells];
        self.covers = vec![Cover::Hidden; cells];
        for idx in rand::seq::index::sample(rng, cells, self.bomb_count) {
            self.bombs[idx] = true;
        }
    }

    pub fn is_bomb(&self, x: usize, y: usize) -> bool {
        self.index(x, y).map(|idx| self.bombs[idx]).unwrap_or(false)
    }

    pub fn flags(&self) -> usize {
        self.covers.iter().filter(|c| **c == Cover::Flagged).count()
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, SweeperError> {
        if x < self.width && y < self.height {
            Ok(y * self.width + x)
        } else {
            Err(SweeperError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn neighbours(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let (width, height) = (self.width, self.height);
        (-1i64..=1)
            .flat_map(|dy| (-1i64..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| (dx, dy) != (0, 0))
            .filter_map(move |(dx, dy)| {
                let nx = usize::try_from(x as i64 + dx).ok()?;
                let ny = usize::try_from(y as i64 + dy).ok()?;
                (nx < width && ny < height).then_some((nx, ny))
            })
    }

    fn adjacent_bombs(&self, x: usize, y: usize) -> u8 {
        self.neighbours(x, y)
            .filter(|&(nx, ny)| self.bombs[ny * self.width + nx])
            .count() as u8
    }

    fn explode(&mut self) {
        for (cover, bomb) in self.covers.iter_mut().zip(&self.bombs) {
            if *bomb {
                *cover = Cover::Open;
            }
        }
    }

    fn flood(&mut self, x: usize, y: usize) {
        let mut stack = vec![(x, y)];
        while let Some((cx, cy)) = stack.pop() {
            let idx = cy * self.width + cx;
            if self.covers[idx] != Cover::Hidden || self.bombs[idx] {
                continue;
            }
            self.covers[idx] = Cover::Open;
            if self.adjacent_bombs(cx, cy) == 0 {
                stack.extend(self.neighbours(cx, cy));
            }
        }
    }
}

impl Sweeper for ClassicSweeper {
    fn new(width: usize, height: usize, bomb_count: usize) -> Result<Self, SweeperError> {
        if width == 0 || height == 0 {
            return Err(SweeperError::InvalidDimensions { width, height });
        }
        let cells = width
            .checked_mul(height)
            .ok_or(SweeperError::InvalidDimensions { width, height })?;
        if bomb_count > cells {
            return Err(SweeperError::TooManyBombs { bombs: bomb_count, cells });
        }
        Ok(Self {
            width,
            height,
            bomb_count,
            bombs: vec![false; cells],
            covers: vec![Cover::Hidden; cells],
        })
    }

    fn reset(&mut self) {
        self.reset_with(&mut rand::rng());
    }

    fn reveal(&mut self, x: usize, y: usize) -> Result<(), SweeperError> {
        let idx = self.index(x, y)?;
        if self.is_over() || self.covers[idx] != Cover::Hidden {
            return Ok(());
        }
        if self.bombs[idx] {
            self.explode();
        } else {
            self.flood(x, y);
        }
        Ok(())
    }

    fn toggle_flag(&mut self, x: usize, y: usize) -> Result<(), SweeperError> {
        let idx = self.index(x, y)?;
        if self.is_over() {
            return Ok(());
        }
        self.covers[idx] = match self.covers[idx] {
            Cover::Hidden => Cover::Flagged,
            Cover::Flagged => Cover::Hidden,
            Cover::Open => Cover::Open,
        };
        Ok(())
    }

    fn has_won(&self) -> bool {
        !self.has_lost()
            && self
                .bombs
                .iter()
                .zip(&self.covers)
                .all(|(bomb, cover)| *bomb || *cover == Cover::Open)
    }

    fn has_lost(&self) -> bool {
        self.bombs
            .iter()
            .zip(&self.covers)
            .any(|(bomb, cover)| *bomb && *cover == Cover::Open)
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn bomb_count(&self) -> usize {
        self.bomb_count
    }

    fn cell_state(&self, x: usize, y: usize) -> Result<CellState, SweeperError> {
        let idx = self.index(x, y)?;
        Ok(match self.covers[idx] {
            Cover::Hidden => CellState::Hidden,
            Cover::Flagged => CellState::Flagged,
            Cover::Open if self.bombs[idx] => CellState::Bomb,
            Cover::Open => CellState::Number(self.adjacent_bombs(x, y)),
        })
    }
}

/// Save format: bomb positions plus one string of cover marks per row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedField {
    width: usize,
    height: usize,
    bomb_count: usize,
    bombs: Vec<[usize; 2]>,
    rows: Vec<String>,
}

impl From<ClassicSweeper> for SavedField {
    fn from(field: ClassicSweeper) -> Self {
        let bombs: Vec<[usize; 2]> = field
            .bombs
            .iter()
            .enumerate()
            .filter(|(_, bomb)| **bomb)
            .map(|(idx, _)| [idx % field.width, idx / field.width])
            .collect();
        let rows: Vec<String> = field
            .covers
            .chunks(field.width)
            .map(|row| {
                row.iter()
                    .map(|cover| match cover {
                        Cover::Hidden => HIDDEN,
                        Cover::Flagged => FLAGGED,
                        Cover::Open => OPEN,
                    })
                    .collect()
            })
            .collect();
        SavedField {
            width: field.width,
            height: field.height,
            bomb_count: field.bomb_count,
            bombs,
            rows,
        }
    }
}

impl TryFrom<SavedField> for ClassicSweeper {
    type Error = SweeperError;

    fn try_from(saved: SavedField) -> Result<Self, Self::Error> {
        let mut field = ClassicSweeper::new(saved.width, saved.height, saved.bomb_count)?;

        // an empty bomb list is a field that was never laid out
        if saved.bombs.is_empty() {
            field.reset();
        } else if saved.bombs.len() != saved.bomb_count {
            return Err(SweeperError::Corrupt(format!(
                "{} bombs listed but bombCount is {}",
                saved.bombs.len(),
                saved.bomb_count
            )));
        }
        for [x, y] in saved.bombs {
            let idx = field.index(x, y)?;
            if field.bombs[idx] {
                return Err(SweeperError::Corrupt(format!("bomb ({}, {}) listed twice", x, y)));
            }
            field.bombs[idx] = true;
        }

        if saved.rows.len() != saved.height {
            return Err(SweeperError::Corrupt(format!(
                "expected {} rows, found {}",
                saved.height,
                saved.rows.len()
            )));
        }
        for (y, row) in saved.rows.iter().enumerate() {
            if row.chars().count() != saved.width {
                return Err(SweeperError::Corrupt(format!("row {} is not {} cells wide", y, saved.width)));
            }
            for (x, mark) in row.chars().enumerate() {
                field.covers[y * saved.width + x] = match mark {
                    HIDDEN => Cover::Hidden,
                    FLAGGED => Cover::Flagged,
                    OPEN => Cover::Open,
                    other => return Err(SweeperError::Corrupt(format!("unknown cell mark {:?}", other))),
                };
            }
        }
        Ok(field)
    }
}
