use std::io;

use thiserror::Error;

/// What went wrong on a faulted cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultKind {
    #[error("return with an empty call stack")]
    StackUnderflow,
    #[error("call with a full call stack")]
    StackOverflow,
    #[error("address {address:#05X} is outside of memory")]
    OutOfBoundsAddress { address: usize },
    #[error("unsupported opcode")]
    UnsupportedOpcode,
}

/// A fatal cycle fault. The program counter is left on the failing
/// instruction so the driver can inspect, reset or halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} (pc: {pc:#05X}, opcode: {opcode:#06X})")]
pub struct Fault {
    pub pc: u16,
    pub opcode: u16,
    pub kind: FaultKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },
}

/// Reasons for the interpreter loop to stop early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("collaborator i/o failed: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_message_carries_pc_and_opcode() {
        let fault = Fault {
            pc: 0x204,
            opcode: 0xFFFF,
            kind: FaultKind::UnsupportedOpcode,
        };
        assert_eq!(
            fault.to_string(),
            "unsupported opcode (pc: 0x204, opcode: 0xFFFF)"
        );
    }

    #[test]
    fn test_out_of_bounds_message() {
        let kind = FaultKind::OutOfBoundsAddress { address: 0x1000 };
        assert_eq!(kind.to_string(), "address 0x1000 is outside of memory");
    }
}
