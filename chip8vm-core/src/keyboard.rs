use std::io;

pub const KEY_COUNT: usize = 16;

/// Key-down latches for the hex keypad, indexed 0x0..=0xF.
pub type Keypad = [bool; KEY_COUNT];

/// Lowest-numbered key currently held, if any.
pub fn first_pressed(keys: &Keypad) -> Option<u8> {
    keys.iter().position(|&down| down).map(|key| key as u8)
}

/// Input collaborator. Owns the mapping from host keys to keypad latches.
pub trait Chip8Keyboard {
    /// Refresh `keys`, blocking for at most `max_duration_microseconds`.
    fn update_keystates(&mut self, keys: &mut Keypad, max_duration_microseconds: u64)
        -> io::Result<()>;

    /// Whether the user asked to stop the machine.
    fn quit_requested(&self) -> bool;
}
