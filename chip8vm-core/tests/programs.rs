use chip8vm_core::{
    Chip8State, DumpOptions, Fault, FaultKind, Instruction, LoadError, StepOutcome,
    LAST_INSTRUCTION_ADDRESS,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn assemble(program: &[Instruction]) -> Vec<u16> {
    program.iter().map(Instruction::encode).collect()
}

#[test]
fn call_and_return_are_balanced() -> Result<(), Fault> {
    let mut state = Chip8State::new();
    state
        .load_instructions(&assemble(&[
            Instruction::Call { nnn: 0x206 },
            Instruction::SetRegister { x: 0x2, nn: 0x02 },
            Instruction::Jump { nnn: 0x204 },
            // subroutine: nested call, then return
            Instruction::Call { nnn: 0x20A },
            Instruction::Return,
            Instruction::SetRegister { x: 0x1, nn: 0x01 },
            Instruction::Return,
        ]))
        .unwrap();

    state.step()?;
    assert_eq!(state.stack_entries(), &[0x200]);
    state.step()?;
    assert_eq!(state.stack_entries(), &[0x200, 0x206]);
    state.step()?;
    state.step()?;
    assert_eq!(state.program_counter, 0x208);
    assert_eq!(state.stack_pointer, 1);
    state.step()?;
    assert_eq!(state.program_counter, 0x202);
    assert_eq!(state.stack_pointer, 0);
    state.step()?;
    assert_eq!(state.register(0x1), 0x01);
    assert_eq!(state.register(0x2), 0x02);
    Ok(())
}

#[test]
fn carry_example() -> Result<(), Fault> {
    let mut state = Chip8State::new();
    state.load_instructions(&[0x8134]).unwrap();
    state.data_registers[0x1] = 0xFF;
    state.data_registers[0x3] = 0x01;

    state.step()?;
    assert_eq!(state.register(0x1), 0x00);
    assert_eq!(state.register(0xF), 1);
    Ok(())
}

#[test]
fn skip_lands_past_trap_word() -> Result<(), Fault> {
    let mut state = Chip8State::new();
    state
        .load_instructions(&[0x3000, 0xFFFF, 0x4001, 0xFFFF, 0x6AAA])
        .unwrap();

    state.step()?;
    assert_eq!(state.program_counter, 0x204);
    state.step()?;
    assert_eq!(state.program_counter, 0x208);
    state.step()?;
    assert_eq!(state.program_counter, 0x20A);
    assert_eq!(state.register(0xA), 0xAA);
    Ok(())
}

#[test]
fn missed_skip_hits_trap_word() -> Result<(), Fault> {
    let mut state = Chip8State::new();
    state.load_instructions(&[0x3001, 0xFFFF]).unwrap();

    state.step()?;
    assert_eq!(
        state.step(),
        Err(Fault {
            pc: 0x202,
            opcode: 0xFFFF,
            kind: FaultKind::UnsupportedOpcode
        })
    );
    Ok(())
}

#[test]
fn return_on_fresh_machine_underflows() {
    let mut state = Chip8State::new();
    state.load_instructions(&[0x00EE]).unwrap();

    let fault = state.step().unwrap_err();
    assert_eq!(fault.kind, FaultKind::StackUnderflow);
    assert_eq!(fault.pc, 0x200);
    assert_eq!(state.program_counter, 0x200);
}

#[test]
fn program_counter_stays_in_range_for_random_programs() {
    let mut rng = StdRng::seed_from_u64(0x0C8);

    for _ in 0..200 {
        let mut state = Chip8State::new();
        let program: Vec<u8> = (0..512).map(|_| rng.gen()).collect();
        state.load_program(&program).unwrap();
        state.data_registers = rng.gen();
        state.keys[rng.gen_range(0..16)] = true;

        for _ in 0..500 {
            match state.step_with(&mut rng) {
                Ok(_) => assert!(state.program_counter <= LAST_INSTRUCTION_ADDRESS),
                Err(fault) => {
                    assert_eq!(fault.pc, state.program_counter);
                    break;
                }
            }
        }
    }
}

#[test]
fn waiting_for_key_ticks_timers_but_holds_pc() -> Result<(), Fault> {
    let mut state = Chip8State::new();
    state.load_instructions(&[0xF30A]).unwrap();
    state.delay_timer = 2;
    state.sound_timer = 1;

    let outcome = state.step()?;
    assert_eq!(
        outcome,
        StepOutcome::Blocked {
            register: 3,
            sound_expired: true
        }
    );
    assert_eq!(state.delay_timer, 1);
    assert_eq!(state.program_counter, 0x200);

    state.keys[0x0] = true;
    let outcome = state.step()?;
    assert_eq!(
        outcome,
        StepOutcome::Executed {
            instruction: Instruction::WaitForKey { x: 3 },
            sound_expired: false
        }
    );
    assert_eq!(state.register(3), 0x0);
    assert_eq!(state.program_counter, 0x202);
    Ok(())
}

#[test]
fn dump_is_read_only() {
    let mut state = Chip8State::new();
    state.load_instructions(&[0x2204, 0x0000, 0xA123]).unwrap();
    state.step().unwrap();
    let before = state.clone();

    let report = state.dump(DumpOptions::FULL).to_string();
    assert!(report.starts_with("ProgramCounter: 0x204\n"));
    assert!(report.contains("CurrentOpcode: 0xA123"));
    assert!(report.contains("StackPointer: 1"));
    assert_eq!(state, before);
}

#[test]
fn oversized_rom_is_rejected() {
    let mut state = Chip8State::new();
    let rom = vec![0x12; 0xFFF - 0x200 + 1];
    assert!(matches!(
        state.load_program(&rom),
        Err(LoadError::ProgramTooLarge { size: 0xE00, .. })
    ));
    assert!(state.ram[0x200..].iter().all(|&byte| byte == 0));
}
