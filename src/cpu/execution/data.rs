use super::pack;
use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::ram::Ram;

impl Cpu {
    /// `MOV_R dst, src, bias` -> `dst <- reg[src] + bias (mod 256)`.
    pub(in crate::cpu) fn op_mov_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let dst = self.fetch(ram)?;
        let src = self.fetch(ram)?;
        let bias = self.fetch(ram)?;

        let value = self.get_reg8(src, at)?.wrapping_add(bias);
        self.set_reg8(dst, value, at)
    }

    /// `LD_R dst, imm, _pad` -> `dst <- imm`.
    pub(in crate::cpu) fn op_ld_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let dst = self.fetch(ram)?;
        let imm = self.fetch(ram)?;
        let _pad = self.fetch(ram)?;

        self.set_reg8(dst, imm, at)
    }

    /// `LDM dst, hi, lo` -> `dst <- ram[(hi<<8)|lo]`.
    pub(in crate::cpu) fn op_ldm(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let dst = self.fetch(ram)?;
        let hi = self.fetch(ram)?;
        let lo = self.fetch(ram)?;

        let addr = pack(hi, lo);
        let value = ram
            .read(addr)
            .map_err(|_| CpuFault::OutOfBounds { address: addr })?;
        self.set_reg8(dst, value, at)
    }

    /// `LDM_PAIR dst, hi_reg, lo_reg` -> `dst <- ram[(reg[hi_reg]<<8)|reg[lo_reg]]`.
    pub(in crate::cpu) fn op_ldm_pair(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let dst = self.fetch(ram)?;
        let hi_reg = self.fetch(ram)?;
        let lo_reg = self.fetch(ram)?;

        let hi = self.get_reg8(hi_reg, at)?;
        let lo = self.get_reg8(lo_reg, at)?;
        let addr = pack(hi, lo);
        let value = ram
            .read(addr)
            .map_err(|_| CpuFault::OutOfBounds { address: addr })?;
        self.set_reg8(dst, value, at)
    }

    /// `STM hi, lo, src` -> `ram[(hi<<8)|lo] <- reg[src]`.
    pub(in crate::cpu) fn op_stm(&mut self, ram: &mut Ram, at: u16) -> Result<(), CpuFault> {
        let hi = self.fetch(ram)?;
        let lo = self.fetch(ram)?;
        let src = self.fetch(ram)?;

        let addr = pack(hi, lo);
        let value = self.get_reg8(src, at)?;
        ram.write(addr, value)
            .map_err(|_| CpuFault::OutOfBounds { address: addr })
    }

    /// `STM_PAIR hi_reg, lo_reg, src` -> `ram[pair] <- reg[src]`.
    pub(in crate::cpu) fn op_stm_pair(&mut self, ram: &mut Ram, at: u16) -> Result<(), CpuFault> {
        let hi_reg = self.fetch(ram)?;
        let lo_reg = self.fetch(ram)?;
        let src = self.fetch(ram)?;

        let hi = self.get_reg8(hi_reg, at)?;
        let lo = self.get_reg8(lo_reg, at)?;
        let addr = pack(hi, lo);
        let value = self.get_reg8(src, at)?;
        ram.write(addr, value)
            .map_err(|_| CpuFault::OutOfBounds { address: addr })
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::NullBus;
    use crate::cpu::{selector, Cpu};
    use crate::ram::Ram;

    #[test]
    fn mov_r_applies_bias_mod_256() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.b = 0xFE;
        // MOV_R A, B, 5  ->  A = 0xFE + 5 (mod 256) = 0x03
        ram.load(0, &[0x01, selector::A, selector::B, 5, 0xFF])
            .unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, 0x03);
    }

    #[test]
    fn ldm_pair_reads_through_register_addressed_memory() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(0x300);
        cpu.reset(0);
        cpu.b = 0x02; // high byte of target address
        cpu.c = 0x10; // low byte of target address
        ram.write(0x0210, 0x99).unwrap();
        // LDM_PAIR A, B, C
        ram.load(0, &[0x14, selector::A, selector::B, selector::C])
            .unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, 0x99);
    }

    #[test]
    fn stm_writes_register_to_direct_address() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(0x300);
        cpu.reset(0);
        cpu.a = 0x77;
        // STM 0x0200, A
        ram.load(0, &[0x19, 0x02, 0x00, selector::A]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(ram.read(0x0200).unwrap(), 0x77);
    }
}
