use crate::cpu::alu;
use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::ram::Ram;

impl Cpu {
    /// `INC_R r` -> `reg[r] <- reg[r] + 1`; flags updated.
    pub(in crate::cpu) fn op_inc_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let r_sel = self.fetch(ram)?;
        let value = self.get_reg8(r_sel, at)?;
        let result = alu::inc(value);
        self.flags = result.flags;
        self.set_reg8(r_sel, result.value, at)
    }

    /// `DEC_R r` -> `reg[r] <- reg[r] - 1`; flags updated.
    pub(in crate::cpu) fn op_dec_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let r_sel = self.fetch(ram)?;
        let value = self.get_reg8(r_sel, at)?;
        let result = alu::dec(value);
        self.flags = result.flags;
        self.set_reg8(r_sel, result.value, at)
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::NullBus;
    use crate::cpu::{selector, Cpu};
    use crate::ram::Ram;

    #[test]
    fn inc_r_increments_and_sets_zero_flag_on_wraparound() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.a = 0xFF;
        ram.load(0, &[0x17, selector::A]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flags.z);
    }

    #[test]
    fn dec_r_decrements() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.b = 5;
        ram.load(0, &[0x18, selector::B]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.b, 4);
        assert!(!cpu.flags.z);
    }
}
