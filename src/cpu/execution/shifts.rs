use crate::cpu::alu;
use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::ram::Ram;

impl Cpu {
    /// `SHL_R r` -> `r <- r << 1`; C <- old bit 7.
    pub(in crate::cpu) fn op_shl_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.shift(ram, at, alu::shl)
    }

    /// `SHR_R r` -> `r <- r >> 1`; C <- old bit 0.
    pub(in crate::cpu) fn op_shr_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.shift(ram, at, alu::shr)
    }

    fn shift(
        &mut self,
        ram: &Ram,
        at: u16,
        op: fn(u8) -> alu::AluResult,
    ) -> Result<(), CpuFault> {
        let r_sel = self.fetch(ram)?;
        let value = self.get_reg8(r_sel, at)?;
        let result = op(value);
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
    fn shl_shifts_left_and_carries_bit_seven() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.a = 0b1000_0001;
        ram.load(0, &[0x0D, selector::A]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, 0b0000_0010);
        assert!(cpu.flags.c);
    }

    #[test]
    fn shr_shifts_right_and_carries_bit_zero() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.a = 0b0000_0011;
        ram.load(0, &[0x0E, selector::A]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, 0b0000_0001);
        assert!(cpu.flags.c);
    }
}
