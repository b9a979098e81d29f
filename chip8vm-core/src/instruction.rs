use chip8vm_macros::Decode;

/// The CHIP-8 instruction set with operands already pulled out of the word.
///
/// `x` and `y` name registers, `n`/`nn`/`nnn` are 4, 8 and 12 bit immediates.
/// The legacy `0NNN` machine-code call is deliberately absent, so it decodes to
/// `None` like any other unknown word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode)]
pub enum Instruction {
    #[opcode("00E0")]
    ClearScreen,
    #[opcode("00EE")]
    Return,
    #[opcode("1NNN")]
    Jump { nnn: u16 },
    #[opcode("2NNN")]
    Call { nnn: u16 },
    #[opcode("3XNN")]
    SkipIfEqual { x: u8, nn: u8 },
    #[opcode("4XNN")]
    SkipIfNotEqual { x: u8, nn: u8 },
    #[opcode("5XY0")]
    SkipIfRegistersEqual { x: u8, y: u8 },
    #[opcode("6XNN")]
    SetRegister { x: u8, nn: u8 },
    #[opcode("7XNN")]
    AddImmediate { x: u8, nn: u8 },
    #[opcode("8XY0")]
    Assign { x: u8, y: u8 },
    #[opcode("8XY1")]
    Or { x: u8, y: u8 },
    #[opcode("8XY2")]
    And { x: u8, y: u8 },
    #[opcode("8XY3")]
    Xor { x: u8, y: u8 },
    #[opcode("8XY4")]
    Add { x: u8, y: u8 },
    #[opcode("8XY5")]
    Subtract { x: u8, y: u8 },
    #[opcode("8XY6")]
    ShiftRight { x: u8, y: u8 },
    #[opcode("8XY7")]
    SubtractReversed { x: u8, y: u8 },
    #[opcode("8XYE")]
    ShiftLeft { x: u8, y: u8 },
    #[opcode("9XY0")]
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    #[opcode("ANNN")]
    SetIndex { nnn: u16 },
    #[opcode("BNNN")]
    JumpWithOffset { nnn: u16 },
    #[opcode("CXNN")]
    Random { x: u8, nn: u8 },
    #[opcode("DXYN")]
    Draw { x: u8, y: u8, n: u8 },
    #[opcode("EX9E")]
    SkipIfKeyDown { x: u8 },
    #[opcode("EXA1")]
    SkipIfKeyUp { x: u8 },
    #[opcode("FX07")]
    ReadDelayTimer { x: u8 },
    #[opcode("FX0A")]
    WaitForKey { x: u8 },
    #[opcode("FX15")]
    SetDelayTimer { x: u8 },
    #[opcode("FX18")]
    SetSoundTimer { x: u8 },
    #[opcode("FX1E")]
    AddToIndex { x: u8 },
    #[opcode("FX29")]
    FontGlyph { x: u8 },
    #[opcode("FX33")]
    StoreDecimal { x: u8 },
    #[opcode("FX55")]
    StoreRegisters { x: u8 },
    #[opcode("FX65")]
    LoadRegisters { x: u8 },
}
