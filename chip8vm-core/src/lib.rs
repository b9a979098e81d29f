//! A CHIP-8 virtual machine: machine state, instruction set and the
//! fetch-decode-execute cycle, plus the traits a front end implements to
//! show the screen, feed the keypad and play the beep.
//!
//! ```
//! use chip8vm_core::{Chip8State, StepOutcome};
//!
//! let mut state = Chip8State::new();
//! state.load_instructions(&[0x6122, 0x8114]).unwrap();
//! state.step().unwrap();
//! let outcome = state.step().unwrap();
//!
//! assert!(matches!(outcome, StepOutcome::Executed { .. }));
//! assert_eq!(state.register(1), 0x44);
//! ```

mod beeper;
mod display;
mod dump;
mod engine;
mod error;
mod instruction;
mod interpreter;
mod keyboard;
mod state;

pub use beeper::*;
pub use display::*;
pub use dump::*;
pub use engine::*;
pub use error::*;
pub use instruction::*;
pub use interpreter::*;
pub use keyboard::*;
pub use state::*;
