use std::io;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome 64x32 grid, row-major, plus the "needs redraw" flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pub cells: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
    pub draw_flag: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            cells: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            draw_flag: false,
        }
    }
}

impl Framebuffer {
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.cells[x + y * DISPLAY_WIDTH]
    }

    pub fn clear(&mut self) {
        self.cells = [false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        self.draw_flag = true;
    }

    /// XORs an 8-pixel-wide sprite onto the grid. The origin wraps around the
    /// screen and pixels past the right or bottom edge are clipped. Returns
    /// true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let origin_x = x as usize % DISPLAY_WIDTH;
        let origin_y = y as usize % DISPLAY_HEIGHT;
        let mut collision = false;

        for (row, bits) in rows.iter().enumerate() {
            let py = origin_y + row;
            if py >= DISPLAY_HEIGHT {
                break;
            }
            for column in 0..8 {
                let px = origin_x + column;
                if px >= DISPLAY_WIDTH {
                    break;
                }
                if bits & (0x80 >> column) == 0 {
                    continue;
                }
                let cell = &mut self.cells[px + py * DISPLAY_WIDTH];
                collision |= *cell;
                *cell ^= true;
            }
        }

        self.draw_flag = true;
        collision
    }

    /// Hands the draw flag to the presentation side, clearing it.
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::take(&mut self.draw_flag)
    }
}

/// Presentation collaborator. Called by the interpreter loop whenever the
/// framebuffer has changed.
pub trait Chip8Display {
    fn present(&mut self, frame: &Framebuffer) -> io::Result<()>;
}
