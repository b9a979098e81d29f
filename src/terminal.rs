use std::{
    collections::HashMap,
    io::{self, stdout, Stdout, Write},
    time::{Duration, Instant},
};

use chip8vm_core::{
    Chip8Beeper, Chip8Display, Chip8Keyboard, Framebuffer, Keypad, DISPLAY_HEIGHT, DISPLAY_WIDTH,
    KEY_COUNT,
};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue, style, terminal,
};

/// Left-hand side of a qwerty keyboard laid over the hex keypad:
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D      q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
const CONVENTIONAL_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x0),
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('z', 0xA),
    ('c', 0xB),
    ('4', 0xC),
    ('r', 0xD),
    ('f', 0xE),
    ('v', 0xF),
];

/// Terminals only report presses, so a key counts as held for this long
/// after its last press (or auto-repeat).
const KEY_HOLD: Duration = Duration::from_millis(120);

/// Raw mode plus the alternate screen, undone on drop.
pub struct TerminalSession;

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Draws two pixel rows per character cell with half-block glyphs.
pub struct TerminalDisplay {
    stdout: Stdout,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self { stdout: stdout() }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Display for TerminalDisplay {
    fn present(&mut self, frame: &Framebuffer) -> io::Result<()> {
        for row in 0..DISPLAY_HEIGHT / 2 {
            let line: String = (0..DISPLAY_WIDTH)
                .map(|x| match (frame.pixel(x, row * 2), frame.pixel(x, row * 2 + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                })
                .collect();
            queue!(self.stdout, cursor::MoveTo(0, row as u16), style::Print(line))?;
        }
        self.stdout.flush()
    }
}

pub struct TerminalKeyboard {
    keymap: HashMap<char, u8>,
    pressed_at: [Option<Instant>; KEY_COUNT],
    quit: bool,
}

impl TerminalKeyboard {
    pub fn new() -> Self {
        Self {
            keymap: HashMap::from(CONVENTIONAL_KEYMAP),
            pressed_at: [None; KEY_COUNT],
            quit: false,
        }
    }
}

impl Default for TerminalKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Keyboard for TerminalKeyboard {
    fn update_keystates(
        &mut self,
        keys: &mut Keypad,
        max_duration_microseconds: u64,
    ) -> io::Result<()> {
        let deadline = Instant::now() + Duration::from_micros(max_duration_microseconds);

        while event::poll(deadline.saturating_duration_since(Instant::now()))? {
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind == KeyEventKind::Release {
                continue;
            }
            match key_event.code {
                KeyCode::Esc => self.quit = true,
                KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.quit = true
                }
                KeyCode::Char(character) => {
                    if let Some(&key) = self.keymap.get(&character.to_ascii_lowercase()) {
                        self.pressed_at[key as usize] = Some(Instant::now());
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        for (latch, pressed_at) in keys.iter_mut().zip(&self.pressed_at) {
            *latch = pressed_at.map_or(false, |at| now.duration_since(at) < KEY_HOLD);
        }
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// Rings the terminal bell.
pub struct TerminalBell {
    stdout: Stdout,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self { stdout: stdout() }
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Beeper for TerminalBell {
    fn beep(&mut self) -> io::Result<()> {
        self.stdout.write_all(b"\x07")?;
        self.stdout.flush()
    }
}
