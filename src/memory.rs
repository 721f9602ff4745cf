use crate::constants::MEMORY_SIZE;
use crate::error::{LoadError, MachineError};

/// # Memory
/// 256 bytes of RAM shared by the program, its data, and the stack.
///
/// Every access is bounds checked; an address past the end is an `AddressOutOfRange`
/// error rather than a wrap back to zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cells: [0; MEMORY_SIZE],
        }
    }

    /// Read the byte stored at `address`
    pub fn read(&self, address: usize) -> Result<u8, MachineError> {
        self.cells
            .get(address)
            .copied()
            .ok_or(MachineError::AddressOutOfRange { address })
    }

    /// Store `value` at `address`
    ///
    /// # Arguments
    /// * `value` the byte to store
    /// * `address` where to store it
    pub fn write(&mut self, value: u8, address: usize) -> Result<(), MachineError> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(MachineError::AddressOutOfRange { address })?;
        *cell = value;
        Ok(())
    }

    /// Copy `program` to the start of memory; the rest is left as it was
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        let region = self
            .cells
            .get_mut(..program.len())
            .ok_or(LoadError::ProgramTooLarge {
                len: program.len(),
                max: MEMORY_SIZE,
            })?;
        region.copy_from_slice(program);
        Ok(())
    }

    /// Read without failing; used by the trace which may look past the end of memory
    pub fn peek(&self, address: usize) -> Option<u8> {
        self.cells.get(address).copied()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_memory {
    use super::*;

    #[test]
    fn test_memory_starts_zeroed() {
        let memory = Memory::new();
        assert!((0..MEMORY_SIZE).all(|address| memory.read(address).unwrap() == 0));
    }

    #[test]
    fn test_memory_writes_then_reads() {
        let mut memory = Memory::new();
        memory.write(0xAB, 0xFF).unwrap();
        assert_eq!(memory.read(0xFF).unwrap(), 0xAB);
    }

    #[test]
    fn test_memory_rejects_read_past_end() {
        let memory = Memory::new();
        match memory.read(MEMORY_SIZE) {
            Err(MachineError::AddressOutOfRange { address }) => assert_eq!(address, 0x100),
            other => panic!("expected AddressOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_rejects_write_past_end() {
        let mut memory = Memory::new();
        assert!(memory.write(0x1, MEMORY_SIZE + 1).is_err());
        assert_eq!(memory, Memory::new());
    }

    #[test]
    fn test_memory_loads_at_zero() {
        let mut memory = Memory::new();
        memory.load(&[0x1, 0x2, 0x3]).unwrap();
        assert_eq!(memory.read(0x0).unwrap(), 0x1);
        assert_eq!(memory.read(0x2).unwrap(), 0x3);
        assert_eq!(memory.read(0x3).unwrap(), 0x0);
    }

    #[test]
    fn test_memory_rejects_oversized_load() {
        let mut memory = Memory::new();
        assert!(memory.load(&[0x1; MEMORY_SIZE + 1]).is_err());
        assert_eq!(memory, Memory::new());
    }

    #[test]
    fn test_memory_peek_past_end() {
        let memory = Memory::new();
        assert_eq!(memory.peek(0xFF), Some(0));
        assert_eq!(memory.peek(0x100), None);
    }
}
