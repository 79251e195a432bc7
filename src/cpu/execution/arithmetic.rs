use crate::cpu::alu;
use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::opcode::cmp_mode;
use crate::ram::Ram;

impl Cpu {
    /// `ADD_R a, b` -> `reg[a] <- reg[a] + reg[b]`; flags updated.
    pub(in crate::cpu) fn op_add_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.binary_alu_r(ram, at, alu::add)
    }

    /// `SUB_R a, b` -> `reg[a] <- reg[a] - reg[b]`; flags updated.
    pub(in crate::cpu) fn op_sub_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.binary_alu_r(ram, at, alu::sub)
    }

    /// `XOR_R a, b`; Z set, C cleared.
    pub(in crate::cpu) fn op_xor_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.binary_alu_r(ram, at, alu::xor)
    }

    /// `OR_R a, b`; Z set, C cleared.
    pub(in crate::cpu) fn op_or_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.binary_alu_r(ram, at, alu::or)
    }

    /// `AND_R a, b`; Z set, C cleared.
    pub(in crate::cpu) fn op_and_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        self.binary_alu_r(ram, at, alu::and)
    }

    /// `NOT_R a, (b)` -> `reg[a] <- ~reg[a]`. The second operand byte is
    /// fetched (so the instruction stream stays four bytes wide) but
    /// never consulted.
    pub(in crate::cpu) fn op_not_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let a_sel = self.fetch(ram)?;
        let _unused_b = self.fetch(ram)?;

        let a = self.get_reg8(a_sel, at)?;
        let result = alu::not(a);
        self.flags = result.flags;
        self.set_reg8(a_sel, result.value, at)
    }

    /// `CMP_R x, y, mode` -> flags only, no register write.
    pub(in crate::cpu) fn op_cmp_r(&mut self, ram: &Ram, at: u16) -> Result<(), CpuFault> {
        let x = self.fetch(ram)?;
        let y = self.fetch(ram)?;
        let mode = self.fetch(ram)?;

        let (val_x, val_y) = match mode {
            cmp_mode::REG_REG => (self.get_reg8(x, at)?, self.get_reg8(y, at)?),
            cmp_mode::REG_IMM => (self.get_reg8(x, at)?, y),
            cmp_mode::IMM_REG => (x, self.get_reg8(y, at)?),
            cmp_mode::IMM_IMM => (x, y),
            _ => {
                return Err(CpuFault::IllegalOpcode {
                    address: at,
                    opcode: mode,
                })
            }
        };

        self.flags = alu::cmp(val_x, val_y);
        Ok(())
    }

    fn binary_alu_r(
        &mut self,
        ram: &Ram,
        at: u16,
        op: fn(u8, u8) -> alu::AluResult,
    ) -> Result<(), CpuFault> {
        let a_sel = self.fetch(ram)?;
        let b_sel = self.fetch(ram)?;

        let a = self.get_reg8(a_sel, at)?;
        let b = self.get_reg8(b_sel, at)?;
        let result = op(a, b);
        self.flags = result.flags;
        self.set_reg8(a_sel, result.value, at)
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::NullBus;
    use crate::cpu::{selector, Cpu};
    use crate::ram::Ram;

    #[test]
    fn add_r_updates_register_and_flags() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.a = 5;
        cpu.b = 3;
        ram.load(0, &[0x03, selector::A, selector::B]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, 8);
        assert!(!cpu.flags.z);
        assert!(!cpu.flags.c);
    }

    #[test]
    fn cmp_imm_imm_sets_flags_without_touching_registers() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.a = 0xAA;
        // CMP 5, 5, mode=IMM_IMM
        ram.load(0, &[0x09, 5, 5, 0x03]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert!(cpu.flags.z);
        assert_eq!(cpu.a, 0xAA);
    }

    #[test]
    fn not_r_consumes_and_ignores_second_byte() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        cpu.reset(0);
        cpu.a = 0x0F;
        // NOT_R A, <ignored>
        ram.load(0, &[0x08, selector::A, 0xEE, 0xFF]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.a, !0x0F);
        assert_eq!(cpu.ip, 3); // advanced past the discarded byte
    }
}
