use super::pack;
use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::ram::Ram;

impl Cpu {
    /// `JMP hi, lo` -> `IP <- (hi<<8)|lo` unconditionally.
    pub(in crate::cpu) fn op_jmp(&mut self, ram: &Ram, _at: u16) -> Result<(), CpuFault> {
        let hi = self.fetch(ram)?;
        let lo = self.fetch(ram)?;
        self.ip = pack(hi, lo);
        Ok(())
    }

    /// `JE hi, lo` -> jumps if Z=1.
    pub(in crate::cpu) fn op_je(&mut self, ram: &Ram, _at: u16) -> Result<(), CpuFault> {
        let hi = self.fetch(ram)?;
        let lo = self.fetch(ram)?;
        if self.flags.z {
            self.ip = pack(hi, lo);
        }
        Ok(())
    }

    /// `JNE hi, lo` -> jumps if Z=0.
    pub(in crate::cpu) fn op_jne(&mut self, ram: &Ram, _at: u16) -> Result<(), CpuFault> {
        let hi = self.fetch(ram)?;
        let lo = self.fetch(ram)?;
        if !self.flags.z {
            self.ip = pack(hi, lo);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::NullBus;
    use crate::cpu::Cpu;
    use crate::ram::Ram;

    #[test]
    fn jmp_sets_ip_unconditionally() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(0x300);
        cpu.reset(0);
        ram.load(0, &[0x0A, 0x01, 0x00]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.ip, 0x0100);
    }

    #[test]
    fn je_only_jumps_when_zero_flag_set() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(0x300);
        cpu.reset(0);
        cpu.flags.z = false;
        ram.load(0, &[0x0B, 0x01, 0x00]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.ip, 3); // fell through
    }

    #[test]
    fn jne_jumps_when_zero_flag_clear() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(0x300);
        cpu.reset(0);
        cpu.flags.z = false;
        ram.load(0, &[0x0C, 0x01, 0x00]).unwrap();

        cpu.step(&mut ram, &mut NullBus).unwrap();
        assert_eq!(cpu.ip, 0x0100);
    }
}
