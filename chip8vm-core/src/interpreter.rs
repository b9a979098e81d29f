use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::{Chip8Beeper, Chip8Display, Chip8Keyboard, Chip8State, RunError, StepOutcome};

pub const DEFAULT_CLOCK_SPEED: u32 = 60;
pub const DEFAULT_FRAME_RATE: u32 = 60;

struct Timer {
    interval: Duration,
    last_tick: Instant,
}

impl Timer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: Instant::now(),
        }
    }

    fn tick(&mut self) -> bool {
        if self.last_tick.elapsed() >= self.interval {
            self.last_tick += self.interval;
            true
        } else {
            false
        }
    }
}

/// Paces `Chip8State::step` against the wall clock and wires the machine to
/// its collaborators.
pub struct Chip8Interpreter<D: Chip8Display, K: Chip8Keyboard, B: Chip8Beeper> {
    /// Cycles per second. Timers tick once per cycle, so 60 runs them at their
    /// nominal rate.
    pub max_clock_speed: u32,
    /// Upper bound on presented frames per second.
    pub frame_rate: u32,
    pub display: D,
    pub keyboard: K,
    pub beeper: B,
}

impl<D: Chip8Display, K: Chip8Keyboard, B: Chip8Beeper> Chip8Interpreter<D, K, B> {
    pub fn new(display: D, keyboard: K, beeper: B) -> Self {
        Self {
            max_clock_speed: DEFAULT_CLOCK_SPEED,
            frame_rate: DEFAULT_FRAME_RATE,
            display,
            keyboard,
            beeper,
        }
    }

    /// Loads `program` into a fresh machine and runs it until the keyboard
    /// asks to quit or the machine faults. The machine is handed back either
    /// way so the caller can inspect it.
    pub fn run_program(&mut self, program: &[u8]) -> (Chip8State, Result<(), RunError>) {
        let mut state = Chip8State::default();
        if let Err(error) = state.load_program(program) {
            return (state, Err(error.into()));
        }
        let result = self.run(&mut state);
        (state, result)
    }

    /// Drives `state` from wherever it currently is.
    pub fn run(&mut self, state: &mut Chip8State) -> Result<(), RunError> {
        let cpu_frame_time_micros = 1_000_000 / self.max_clock_speed.max(1) as u64;
        let mut next_cpu_frame = Instant::now() + Duration::from_micros(cpu_frame_time_micros);
        let mut frame_timer = Timer::new(Duration::from_secs_f64(
            1. / self.frame_rate.max(1) as f64,
        ));

        loop {
            let outcome = state.step().map_err(|fault| {
                warn!("machine stopped: {}", fault);
                fault
            })?;

            if outcome.sound_expired() {
                self.beeper.beep()?;
            }
            if let StepOutcome::Blocked { register, .. } = outcome {
                debug!("waiting for a key into V{:X}", register);
            }

            if state.display.draw_flag && frame_timer.tick() {
                self.display.present(&state.display)?;
                state.display.take_draw_flag();
            }

            let time_left = next_cpu_frame.saturating_duration_since(Instant::now());
            next_cpu_frame += Duration::from_micros(cpu_frame_time_micros);

            self.keyboard
                .update_keystates(&mut state.keys, time_left.as_micros() as u64)?;
            if self.keyboard.quit_requested() {
                return Ok(());
            }
        }
    }
}
