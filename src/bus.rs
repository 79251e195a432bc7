//! The port-based I/O bus and a static device registry built once at
//! startup, rather than discovered by scanning a directory at runtime.

use std::collections::HashMap;

/// Capability the CPU uses to perform port I/O. Implementors are
/// peripherals; only the two-method contract lives in the core, not any
/// rendering, sound, or input handling a device might do internally.
pub trait DeviceBus {
    /// Called by `IN`. Returns 0 if no device is attached at `port`.
    fn read(&mut self, port: u8) -> u8;

    /// Called by `OUT`. No-op if no device is attached at `port`.
    fn write(&mut self, port: u8, value: u8);
}

/// A bus with nothing attached. `IN` always returns 0, `OUT` is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBus;

impl DeviceBus for NullBus {
    fn read(&mut self, port: u8) -> u8 {
        log::trace!("NullBus: read from unattached port {:#04x}", port);
        0
    }

    fn write(&mut self, port: u8, value: u8) {
        log::trace!(
            "NullBus: discarded write of {:#04x} to unattached port {:#04x}",
            value,
            port
        );
    }
}

/// Declares which port a device occupies. Built from configuration, not
/// discovered at runtime.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PortAssignment {
    pub port: u8,
    pub device: String,
}

/// Plain configuration consumed by the core at construction; it performs
/// no file I/O of its own.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MachineConfig {
    pub ram_size: Option<usize>,
    pub load_address: Option<u16>,
    pub ports: Vec<PortAssignment>,
}

/// Static port -> device dispatch table. Each attached device is a boxed
/// `DeviceBus`; a read/write to an unmapped port behaves like `NullBus`.
pub struct DeviceRegistry {
    devices: HashMap<u8, Box<dyn DeviceBus>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: HashMap::new(),
        }
    }

    /// Attaches a device at `port`, replacing anything already there.
    pub fn attach(&mut self, port: u8, device: Box<dyn DeviceBus>) {
        self.devices.insert(port, device);
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBus for DeviceRegistry {
    fn read(&mut self, port: u8) -> u8 {
        match self.devices.get_mut(&port) {
            Some(device) => device.read(port),
            None => {
                log::warn!("IN from unattached port {:#04x}", port);
                0
            }
        }
    }

    fn write(&mut self, port: u8, value: u8) {
        match self.devices.get_mut(&port) {
            Some(device) => device.write(port, value),
            None => {
                log::warn!(
                    "OUT of {:#04x} discarded: no device at port {:#04x}",
                    value,
                    port
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Echo {
        last_write: Rc<Cell<u8>>,
        serial: u8,
    }

    impl DeviceBus for Echo {
        fn read(&mut self, _port: u8) -> u8 {
            self.serial
        }

        fn write(&mut self, _port: u8, value: u8) {
            self.last_write.set(value);
        }
    }

    #[test]
    fn null_bus_reads_zero_and_discards_writes() {
        let mut bus = NullBus;
        assert_eq!(bus.read(0x42), 0);
        bus.write(0x42, 0xFF); // must not panic
    }

    #[test]
    fn registry_dispatches_to_attached_device() {
        let last_write = Rc::new(Cell::new(0));
        let mut registry = DeviceRegistry::new();
        registry.attach(
            3,
            Box::new(Echo {
                last_write: last_write.clone(),
                serial: 0x7E,
            }),
        );

        assert_eq!(registry.read(3), 0x7E);
        registry.write(3, 0x12);
        assert_eq!(last_write.get(), 0x12);
    }

    #[test]
    fn registry_falls_back_to_null_behavior_on_unmapped_port() {
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.read(9), 0);
        registry.write(9, 1); // must not panic
    }
}
