/// Faults that stop the current run. None of them are recoverable: the host
/// is expected to report the fault and restart or end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("unknown opcode {opcode:#06X} at {pc:#05X}")]
    UnknownOpcode { pc: u16, opcode: u16 },

    #[error("stack overflow: opcode {opcode:#06X} at {pc:#05X} called with a full stack")]
    StackOverflow { pc: u16, opcode: u16 },

    #[error("stack underflow: opcode {opcode:#06X} at {pc:#05X} returned with an empty stack")]
    StackUnderflow { pc: u16, opcode: u16 },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("program byte offset {offset:#06X} is outside of memory")]
    OutOfBoundsWrite { offset: usize },
}

impl Fault {
    /// Address of the opcode that faulted, for executor faults.
    pub fn pc(&self) -> Option<u16> {
        match *self {
            Fault::UnknownOpcode { pc, .. }
            | Fault::StackOverflow { pc, .. }
            | Fault::StackUnderflow { pc, .. } => Some(pc),
            _ => None,
        }
    }

    /// The opcode that faulted, for executor faults.
    pub fn opcode(&self) -> Option<u16> {
        match *self {
            Fault::UnknownOpcode { opcode, .. }
            | Fault::StackOverflow { opcode, .. }
            | Fault::StackUnderflow { opcode, .. } => Some(opcode),
            _ => None,
        }
    }
}
