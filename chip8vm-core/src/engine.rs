use log::trace;
use rand::{thread_rng, Rng};

use crate::{
    keyboard::first_pressed,
    state::{FONT_GLYPH_SIZE, FONT_START, LAST_INSTRUCTION_ADDRESS, MEMORY_SIZE, STACK_SIZE},
    Chip8State, Fault, FaultKind, Instruction,
};

/// Result of a cycle that did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction ran to completion.
    Executed {
        instruction: Instruction,
        sound_expired: bool,
    },
    /// `FX0A` saw no key down. The program counter did not move, so the next
    /// call retries the same instruction.
    Blocked { register: u8, sound_expired: bool },
}

impl StepOutcome {
    /// True on the cycle where the sound timer went from 1 to 0.
    pub fn sound_expired(&self) -> bool {
        match *self {
            StepOutcome::Executed { sound_expired, .. } => sound_expired,
            StepOutcome::Blocked { sound_expired, .. } => sound_expired,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, StepOutcome::Blocked { .. })
    }
}

/// How the program counter moves once an instruction has executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Wait(u8),
}

fn skip_if(condition: bool) -> Flow {
    if condition {
        Flow::Skip
    } else {
        Flow::Next
    }
}

/// Rejects program counters from which no whole instruction can be fetched.
fn check_target(address: usize) -> Result<u16, FaultKind> {
    if address > LAST_INSTRUCTION_ADDRESS as usize {
        return Err(FaultKind::OutOfBoundsAddress { address });
    }
    Ok(address as u16)
}

impl Chip8State {
    /// Runs one fetch-decode-execute cycle using the thread-local RNG.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        self.step_with(&mut thread_rng())
    }

    /// Runs one cycle, drawing `CXNN` bytes from `rng`.
    ///
    /// On a fault the program counter stays on the failing instruction and
    /// the timers are not ticked.
    pub fn step_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepOutcome, Fault> {
        let pc = self.program_counter;
        let fault = |opcode: u16, kind: FaultKind| Fault { pc, opcode, kind };

        let opcode = self.current_opcode().ok_or_else(|| {
            let address = (pc as usize).max(MEMORY_SIZE - 1) + 1;
            fault(0, FaultKind::OutOfBoundsAddress { address })
        })?;
        let instruction =
            Instruction::decode(opcode).ok_or_else(|| fault(opcode, FaultKind::UnsupportedOpcode))?;

        trace!("{:#05X}: {:04X} {:?}", pc, opcode, instruction);

        // Control flow checks its own target. Everything else must be able to
        // move past itself before it touches the machine.
        if !matches!(
            instruction,
            Instruction::Return
                | Instruction::Jump { .. }
                | Instruction::Call { .. }
                | Instruction::JumpWithOffset { .. }
                | Instruction::WaitForKey { .. }
        ) {
            check_target(pc as usize + 2).map_err(|kind| fault(opcode, kind))?;
        }

        let flow = self
            .execute(instruction, rng)
            .map_err(|kind| fault(opcode, kind))?;

        let next = match flow {
            Flow::Next => check_target(pc as usize + 2),
            Flow::Skip => check_target(pc as usize + 4),
            Flow::Jump(target) => Ok(target),
            Flow::Wait(_) => Ok(pc),
        }
        .map_err(|kind| fault(opcode, kind))?;
        self.program_counter = next;

        let sound_expired = self.tick_timers();

        Ok(match flow {
            Flow::Wait(register) => StepOutcome::Blocked {
                register,
                sound_expired,
            },
            _ => StepOutcome::Executed {
                instruction,
                sound_expired,
            },
        })
    }

    /// Returns true when the sound timer has just run out.
    fn tick_timers(&mut self) -> bool {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            self.sound_timer == 0
        } else {
            false
        }
    }

    fn execute<R: Rng + ?Sized>(
        &mut self,
        instruction: Instruction,
        rng: &mut R,
    ) -> Result<Flow, FaultKind> {
        let flow = match instruction {
            Instruction::ClearScreen => {
                self.display.clear();
                Flow::Next
            }
            Instruction::Return => {
                if self.stack_pointer == 0 {
                    return Err(FaultKind::StackUnderflow);
                }
                let call_site = self.stack[self.stack_pointer as usize - 1];
                let target = check_target(call_site as usize + 2)?;
                self.stack_pointer -= 1;
                Flow::Jump(target)
            }
            Instruction::Jump { nnn } => Flow::Jump(check_target(nnn as usize)?),
            Instruction::Call { nnn } => {
                if self.stack_pointer as usize >= STACK_SIZE {
                    return Err(FaultKind::StackOverflow);
                }
                let target = check_target(nnn as usize)?;
                self.stack[self.stack_pointer as usize] = self.program_counter;
                self.stack_pointer += 1;
                Flow::Jump(target)
            }
            Instruction::SkipIfEqual { x, nn } => skip_if(self.register(x) == nn),
            Instruction::SkipIfNotEqual { x, nn } => skip_if(self.register(x) != nn),
            Instruction::SkipIfRegistersEqual { x, y } => {
                skip_if(self.register(x) == self.register(y))
            }
            Instruction::SetRegister { x, nn } => {
                *self.register_mut(x) = nn;
                Flow::Next
            }
            Instruction::AddImmediate { x, nn } => {
                *self.register_mut(x) = self.register(x).wrapping_add(nn);
                Flow::Next
            }
            Instruction::Assign { x, y } => {
                *self.register_mut(x) = self.register(y);
                Flow::Next
            }
            Instruction::Or { x, y } => {
                *self.register_mut(x) |= self.register(y);
                Flow::Next
            }
            Instruction::And { x, y } => {
                *self.register_mut(x) &= self.register(y);
                Flow::Next
            }
            Instruction::Xor { x, y } => {
                *self.register_mut(x) ^= self.register(y);
                Flow::Next
            }
            Instruction::Add { x, y } => {
                let (result, overflow) = self.register(x).overflowing_add(self.register(y));
                *self.register_mut(x) = result;
                self.set_flag(overflow);
                Flow::Next
            }
            Instruction::Subtract { x, y } => {
                let (result, borrow) = self.register(x).overflowing_sub(self.register(y));
                *self.register_mut(x) = result;
                self.set_flag(!borrow);
                Flow::Next
            }
            Instruction::ShiftRight { x, .. } => {
                let value = self.register(x);
                *self.register_mut(x) = value >> 1;
                self.set_flag(value & 0x01 != 0);
                Flow::Next
            }
            Instruction::SubtractReversed { x, y } => {
                let (result, borrow) = self.register(y).overflowing_sub(self.register(x));
                *self.register_mut(x) = result;
                self.set_flag(!borrow);
                Flow::Next
            }
            Instruction::ShiftLeft { x, .. } => {
                let value = self.register(x);
                *self.register_mut(x) = value << 1;
                self.set_flag(value & 0x80 != 0);
                Flow::Next
            }
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                skip_if(self.register(x) != self.register(y))
            }
            Instruction::SetIndex { nnn } => {
                self.index_register = nnn;
                Flow::Next
            }
            Instruction::JumpWithOffset { nnn } => {
                Flow::Jump(check_target(nnn as usize + self.register(0x0) as usize)?)
            }
            Instruction::Random { x, nn } => {
                *self.register_mut(x) = rng.gen::<u8>() & nn;
                Flow::Next
            }
            Instruction::Draw { x, y, n } => {
                let rows = self.memory_range(self.index_register, n as usize)?;
                let (vx, vy) = (self.register(x), self.register(y));
                let collision = self.display.draw_sprite(vx, vy, &self.ram[rows]);
                self.set_flag(collision);
                Flow::Next
            }
            // only the low nibble selects a key
            Instruction::SkipIfKeyDown { x } => {
                skip_if(self.keys[(self.register(x) & 0x0F) as usize])
            }
            Instruction::SkipIfKeyUp { x } => {
                skip_if(!self.keys[(self.register(x) & 0x0F) as usize])
            }
            Instruction::ReadDelayTimer { x } => {
                *self.register_mut(x) = self.delay_timer;
                Flow::Next
            }
            Instruction::WaitForKey { x } => match first_pressed(&self.keys) {
                Some(key) => {
                    check_target(self.program_counter as usize + 2)?;
                    *self.register_mut(x) = key;
                    Flow::Next
                }
                None => Flow::Wait(x),
            },
            Instruction::SetDelayTimer { x } => {
                self.delay_timer = self.register(x);
                Flow::Next
            }
            Instruction::SetSoundTimer { x } => {
                self.sound_timer = self.register(x);
                Flow::Next
            }
            Instruction::AddToIndex { x } => {
                let value = self.register(x) as u16;
                let overflow = self.index_register as u32 + value as u32 > 0x0FFF;
                self.index_register = self.index_register.wrapping_add(value);
                self.set_flag(overflow);
                Flow::Next
            }
            Instruction::FontGlyph { x } => {
                self.index_register = FONT_START + self.register(x) as u16 * FONT_GLYPH_SIZE;
                Flow::Next
            }
            Instruction::StoreDecimal { x } => {
                let digits = self.memory_range(self.index_register, 3)?;
                let value = self.register(x);
                self.ram[digits].copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
                Flow::Next
            }
            Instruction::StoreRegisters { x } => {
                let count = x as usize + 1;
                let target = self.memory_range(self.index_register, count)?;
                self.ram[target].copy_from_slice(&self.data_registers[..count]);
                self.index_register += count as u16;
                Flow::Next
            }
            Instruction::LoadRegisters { x } => {
                let count = x as usize + 1;
                let source = self.memory_range(self.index_register, count)?;
                self.data_registers[..count].copy_from_slice(&self.ram[source]);
                self.index_register += count as u16;
                Flow::Next
            }
        };

        Ok(flow)
    }
}
