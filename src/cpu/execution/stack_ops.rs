use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::ram::Ram;

impl Cpu {
    /// `PUSH_R r` -> pushes `reg[r]` onto the stack.
    pub(in crate::cpu) fn op_push_r(&mut self, ram: &mut Ram, at: u16) -> Result<(), CpuFault> {
        let r_sel = self.fetch(ram)?;
        let value = self.get_reg8(r_sel, at)?;
        self.push(ram, value)
    }

    /// `POP_R r` -> `reg[r] <- pop()`.
    pub(in crate::cpu) fn op_pop_r(&mut self, ram: &mut Ram, at: u16) -> Result<(), CpuFault> {
        let r_sel = self.fetch(ram)?;
        let value = self.pop(ram)?;
        self.set_reg8(r_sel, value, at)
    }
}
