use crate::bus::DeviceBus;
use crate::cpu::Cpu;
use crate::error::CpuFault;
use crate::ram::Ram;

impl Cpu {
    /// `IN_R port_reg, dst_reg` -> `reg[dst] <- bus.read(reg[port])`.
    pub(in crate::cpu) fn op_in_r<B: DeviceBus>(
        &mut self,
        ram: &Ram,
        bus: &mut B,
        at: u16,
    ) -> Result<(), CpuFault> {
        let port_sel = self.fetch(ram)?;
        let dst_sel = self.fetch(ram)?;

        let port = self.get_reg8(port_sel, at)?;
        let value = bus.read(port);
        self.set_reg8(dst_sel, value, at)
    }

    /// `OUT_R port_reg, val_reg` -> `bus.write(reg[port], reg[val])`.
    pub(in crate::cpu) fn op_out_r<B: DeviceBus>(
        &mut self,
        ram: &Ram,
        bus: &mut B,
        at: u16,
    ) -> Result<(), CpuFault> {
        let port_sel = self.fetch(ram)?;
        let val_sel = self.fetch(ram)?;

        let port = self.get_reg8(port_sel, at)?;
        let value = self.get_reg8(val_sel, at)?;
        bus.write(port, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::{selector, Cpu};
    use crate::ram::Ram;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Echo {
        last_write: Rc<Cell<u8>>,
        serial: u8,
    }

    impl crate::bus::DeviceBus for Echo {
        fn read(&mut self, _port: u8) -> u8 {
            self.serial
        }

        fn write(&mut self, _port: u8, value: u8) {
            self.last_write.set(value);
        }
    }

    #[test]
    fn in_r_reads_from_the_device_at_the_selected_port() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        let mut bus = Echo {
            last_write: Rc::new(Cell::new(0)),
            serial: 0x9A,
        };
        cpu.reset(0);
        cpu.c = 3; // port number
        // IN_R C, A
        ram.load(0, &[0x11, selector::C, selector::A]).unwrap();

        cpu.step(&mut ram, &mut bus).unwrap();
        assert_eq!(cpu.a, 0x9A);
    }

    #[test]
    fn out_r_writes_the_value_register_to_the_port_register() {
        let mut cpu = Cpu::new();
        let mut ram = Ram::new(16);
        let last_write = Rc::new(Cell::new(0));
        let mut bus = Echo {
            last_write: last_write.clone(),
            serial: 0,
        };
        cpu.reset(0);
        cpu.c = 3;
        cpu.a = 0x55;
        // OUT_R C, A
        ram.load(0, &[0x12, selector::C, selector::A]).unwrap();

        cpu.step(&mut ram, &mut bus).unwrap();
        assert_eq!(last_write.get(), 0x55);
    }
}
