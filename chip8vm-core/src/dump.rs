use std::fmt;

use crate::Chip8State;

const MEMORY_ROW_WIDTH: usize = 16;

/// Which optional sections a dump includes. The summary lines are always
/// written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    pub memory: bool,
    pub registers: bool,
    pub stack: bool,
}

impl DumpOptions {
    pub const SUMMARY: Self = Self {
        memory: false,
        registers: false,
        stack: false,
    };

    pub const FULL: Self = Self {
        memory: true,
        registers: true,
        stack: true,
    };
}

/// Borrowed, printable view of a machine.
#[derive(Debug, Clone, Copy)]
pub struct StateDump<'a> {
    state: &'a Chip8State,
    options: DumpOptions,
}

impl Chip8State {
    pub fn dump(&self, options: DumpOptions) -> StateDump<'_> {
        StateDump {
            state: self,
            options,
        }
    }
}

impl fmt::Display for StateDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;

        writeln!(f, "ProgramCounter: {:#05X}", state.program_counter)?;
        writeln!(f, "IndexCounter: {:#05X}", state.index_register)?;
        match state.current_opcode() {
            Some(opcode) => writeln!(f, "CurrentOpcode: {:#06X}", opcode)?,
            None => writeln!(f, "CurrentOpcode: ------")?,
        }
        writeln!(f, "StackPointer: {}", state.stack_pointer)?;
        writeln!(
            f,
            "Timers: delay {} sound {}",
            state.delay_timer, state.sound_timer
        )?;

        if self.options.registers {
            let registers: Vec<String> = state
                .data_registers
                .iter()
                .enumerate()
                .map(|(index, value)| format!("V{:X}={:02X}", index, value))
                .collect();
            writeln!(f, "Registers: {}", registers.join(" "))?;
        }

        if self.options.stack {
            let stack: Vec<String> = state
                .stack
                .iter()
                .map(|address| format!("{:03X}", address))
                .collect();
            writeln!(f, "Stack: {}", stack.join(" "))?;
        }

        if self.options.memory {
            writeln!(f, "Memory:")?;
            for (row, bytes) in state.ram.chunks(MEMORY_ROW_WIDTH).enumerate() {
                write!(f, "{:03X}:", row * MEMORY_ROW_WIDTH)?;
                for byte in bytes {
                    write!(f, " {:02X}", byte)?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MEMORY_SIZE;

    #[test]
    fn test_summary() {
        let mut state = Chip8State::new();
        state.load_instructions(&[0xA2F0]).unwrap();
        state.stack_pointer = 1;

        assert_eq!(
            state.dump(DumpOptions::SUMMARY).to_string(),
            "ProgramCounter: 0x200\n\
             IndexCounter: 0x000\n\
             CurrentOpcode: 0xA2F0\n\
             StackPointer: 1\n\
             Timers: delay 0 sound 0\n"
        );
    }

    #[test]
    fn test_registers_and_stack_sections() {
        let mut state = Chip8State::new();
        state.data_registers[0xA] = 0x7F;
        state.stack[0] = 0x200;

        let report = state
            .dump(DumpOptions {
                registers: true,
                stack: true,
                ..DumpOptions::default()
            })
            .to_string();
        assert!(report.contains("VA=7F"));
        assert!(report.contains("Stack: 200 000"));
        assert!(!report.contains("Memory:"));
    }

    #[test]
    fn test_memory_section() {
        let state = Chip8State::new();
        let report = state
            .dump(DumpOptions {
                memory: true,
                ..DumpOptions::default()
            })
            .to_string();
        assert!(report.contains("000: F0 90 90 90 F0 20 60 20"));
        assert_eq!(
            report.lines().filter(|line| line.ends_with(" 00")).count(),
            MEMORY_SIZE / MEMORY_ROW_WIDTH - 5
        );
    }

    #[test]
    fn test_unfetchable_opcode() {
        let mut state = Chip8State::new();
        state.program_counter = 0xFFF;
        assert!(state
            .dump(DumpOptions::SUMMARY)
            .to_string()
            .contains("CurrentOpcode: ------"));
    }

    #[test]
    fn test_dump_leaves_state_untouched() {
        let mut state = Chip8State::new();
        state.load_instructions(&[0x6122, 0xF10A]).unwrap();
        state.step().unwrap();
        let before = state.clone();

        let _ = state.dump(DumpOptions::FULL).to_string();
        assert_eq!(state, before);
    }
}
