pub mod interrupt;
pub mod models;
pub mod parser;
pub mod session;
#[cfg(test)]
pub mod testing;

pub use models::{BreakpointInfo, Instruction, MemoryBlock, RawRegister, Result, StoppedLocation};
pub use session::MiSession;
