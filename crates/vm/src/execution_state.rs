use serde::{Deserialize, Serialize};

/// Status of a script execution.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionState {
    /// Execution is in progress or has not yet begun.
    #[default]
    Running = 0,

    /// Execution completed successfully.
    Halt = 1,

    /// Execution ended with an error that cannot be caught.
    Fault = 2,

    /// Execution stopped at a breakpoint. Never produced by the interpreter.
    Break = 3,
}

impl ExecutionState {
    #[inline]
    pub fn is_running(self) -> bool {
        self == ExecutionState::Running
    }

    #[inline]
    pub fn is_halt(self) -> bool {
        self == ExecutionState::Halt
    }

    #[inline]
    pub fn is_fault(self) -> bool {
        self == ExecutionState::Fault
    }

    #[inline]
    pub fn is_break(self) -> bool {
        self == ExecutionState::Break
    }

    /// Whether the execution has reached a final state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }
}
