//! `forge8`: assembler, TAPE container codec, and CPU emulator for a
//! fictional 8-bit machine.
//!
//! The three subsystems are layered leaf-first: [`tape`] depends on
//! nothing, [`asm`] depends on nothing but its own AST, and [`cpu`] is
//! driven by bytes either of those stages produced. [`ram`] and [`bus`]
//! are the shared seams the CPU crosses into memory and peripherals.

pub mod asm;
pub mod bus;
pub mod cpu;
pub mod error;
pub mod opcode;
pub mod ram;
pub mod tape;

/// Convenience re-exports for consumers who only want the common types.
pub mod prelude {
    pub use crate::asm::Assembler;
    pub use crate::bus::{DeviceBus, DeviceRegistry, MachineConfig, NullBus};
    pub use crate::cpu::Cpu;
    pub use crate::error::{AssemblyError, CpuFault, RamError, TapeError};
    pub use crate::ram::Ram;
    pub use crate::tape::TapeMetadata;
}

/// Physical address boot code is loaded at by convention.
pub const DEFAULT_LOAD_ADDRESS: u16 = 0x00FF;
