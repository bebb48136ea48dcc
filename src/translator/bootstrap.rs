use super::{at, calls, LabelCounters};

/// Initial value of the stack pointer.
pub const STACK_BASE: u16 = 256;

/// Function the bootstrap hands control to.
pub const ENTRY_POINT: &str = "Sys.init";

pub fn bootstrap(counters: &mut LabelCounters) -> Vec<String> {
    let mut instructions = svec![at(STACK_BASE), "D=A", "@SP", "M=D"];
    instructions.extend(calls::call(ENTRY_POINT, 0, counters));
    instructions
}
