use std::ops::Range;

use log::debug;

use crate::{display::Framebuffer, keyboard::Keypad, FaultKind, LoadError};

pub const MEMORY_SIZE: usize = 4096;
pub const REGISTER_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;

pub const FONT_START: u16 = 0x000;
pub const FONT_GLYPH_SIZE: u16 = 5;
pub const PROGRAM_START: u16 = 0x200;
pub const PROGRAM_END: u16 = 0xFFF;
pub const MAX_PROGRAM_SIZE: usize = (PROGRAM_END - PROGRAM_START) as usize;

/// Highest program counter from which a whole instruction can be fetched.
pub const LAST_INSTRUCTION_ADDRESS: u16 = (MEMORY_SIZE - 2) as u16;

const FLAG_REGISTER: u8 = 0xF;

pub const FONT: [u8; 16 * FONT_GLYPH_SIZE as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The whole machine. Owned by whoever drives the cycles; the input side
/// writes `keys`, the presentation side reads `display` and clears its draw
/// flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8State {
    pub ram: [u8; MEMORY_SIZE],
    pub data_registers: [u8; REGISTER_COUNT],
    pub index_register: u16,
    pub program_counter: u16,
    pub stack: [u16; STACK_SIZE],
    pub stack_pointer: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub display: Framebuffer,
    pub keys: Keypad,
}

impl Default for Chip8State {
    fn default() -> Self {
        let mut state = Self {
            ram: [0; MEMORY_SIZE],
            data_registers: [0; REGISTER_COUNT],
            index_register: 0,
            program_counter: PROGRAM_START,
            stack: [0; STACK_SIZE],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            display: Framebuffer::default(),
            keys: [false; 16],
        };
        state.load_font_data(&FONT);
        state
    }
}

impl Chip8State {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_font_data(&mut self, fonts: &[u8]) {
        let start = FONT_START as usize;
        self.ram[start..start + fonts.len()].copy_from_slice(fonts);
    }

    /// Copies a ROM image verbatim to the program area.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.ram[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    /// Writes instruction words big-endian from the program start.
    pub fn load_instructions(&mut self, opcodes: &[u16]) -> Result<(), LoadError> {
        let program: Vec<u8> = opcodes.iter().flat_map(|word| word.to_be_bytes()).collect();
        self.load_program(&program)
    }

    pub fn register(&self, register_index: u8) -> u8 {
        self.data_registers[register_index as usize]
    }

    pub fn register_mut(&mut self, register_index: u8) -> &mut u8 {
        &mut self.data_registers[register_index as usize]
    }

    pub fn set_flag(&mut self, flag: bool) {
        *self.register_mut(FLAG_REGISTER) = flag as u8;
    }

    /// The word at the program counter, without moving it.
    pub fn current_opcode(&self) -> Option<u16> {
        let pc = self.program_counter as usize;
        match (self.ram.get(pc), self.ram.get(pc + 1)) {
            (Some(&high), Some(&low)) => Some(u16::from_be_bytes([high, low])),
            _ => None,
        }
    }

    /// Checks that `len` bytes starting at `start` lie inside memory.
    pub fn memory_range(&self, start: u16, len: usize) -> Result<Range<usize>, FaultKind> {
        let start = start as usize;
        let end = start + len;
        if end > MEMORY_SIZE {
            return Err(FaultKind::OutOfBoundsAddress { address: end - 1 });
        }
        Ok(start..end)
    }

    pub fn stack_entries(&self) -> &[u16] {
        &self.stack[..self.stack_pointer as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = Chip8State::new();
        assert_eq!(state.program_counter, 0x200);
        assert_eq!(state.index_register, 0);
        assert_eq!(state.stack_pointer, 0);
        assert_eq!(state.data_registers, [0; 16]);
        assert!(!state.display.draw_flag);
        assert_eq!(state.ram[FONT_START as usize..][..FONT.len()], FONT);
        // NB. everything past the font is zeroed
        assert!(state.ram[FONT.len()..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut state = Chip8State::new();
        state.load_program(&[0x00, 0xE0])?;
        assert_eq!(state.ram[0x200..0x202], [0x00, 0xE0]);
        assert_eq!(state.current_opcode(), Some(0x00E0));
        Ok(())
    }

    #[test]
    fn test_load_instructions_big_endian() -> Result<(), LoadError> {
        let mut state = Chip8State::new();
        state.load_instructions(&[0x20FC, 0xA2F0])?;
        assert_eq!(state.ram[0x200..0x204], [0x20, 0xFC, 0xA2, 0xF0]);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut state = Chip8State::new();
        assert!(state.load_program(&[0xAA; MAX_PROGRAM_SIZE]).is_ok());
        assert_eq!(
            state.load_program(&[0; MAX_PROGRAM_SIZE + 1]),
            Err(LoadError::ProgramTooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max: MAX_PROGRAM_SIZE
            })
        );
    }

    #[test]
    fn test_current_opcode_at_end_of_memory() {
        let mut state = Chip8State::new();
        state.program_counter = LAST_INSTRUCTION_ADDRESS;
        assert_eq!(state.current_opcode(), Some(0x0000));
        state.program_counter = 0xFFF;
        assert_eq!(state.current_opcode(), None);
    }

    #[test]
    fn test_memory_range_bounds() {
        let state = Chip8State::new();
        assert_eq!(state.memory_range(0xFFD, 3), Ok(0xFFD..0x1000));
        assert_eq!(
            state.memory_range(0xFFE, 3),
            Err(FaultKind::OutOfBoundsAddress { address: 0x1000 })
        );
    }

    #[test]
    fn test_flag_register() {
        let mut state = Chip8State::new();
        state.set_flag(true);
        assert_eq!(state.register(0xF), 1);
        state.set_flag(false);
        assert_eq!(state.register(0xF), 0);
    }
}
