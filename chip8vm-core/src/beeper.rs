use std::io;

/// Audio collaborator, fired once each time the sound timer runs out.
pub trait Chip8Beeper {
    fn beep(&mut self) -> io::Result<()>;
}
