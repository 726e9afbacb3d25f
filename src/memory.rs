//! Harvard architecture (separate instruction and data) memory interface.
//!
//! Both memories are byte-addressed and fixed-size (`consts::MEM_SIZE`).
//! Images are loaded from `imem.txt`/`dmem.txt`: one line per byte, each
//! line an 8-character ASCII binary string, read top to bottom as
//! increasing addresses starting at 0. Words are packed big-endian per
//! spec.md §3.

use crate::consts::MEM_SIZE;
use crate::error::MemoryLoadError;
use log::warn;
use std::fs;
use std::path::Path;

fn load_image(path: &Path) -> Result<Vec<u8>, MemoryLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| MemoryLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bytes = Vec::with_capacity(MEM_SIZE);
    for (line_no, line) in contents.lines().enumerate() {
        if line.len() != 8 || !line.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(MemoryLoadError::MalformedLine {
                path: path.to_path_buf(),
                line: line_no + 1,
                content: line.to_string(),
            });
        }
        bytes.push(u8::from_str_radix(line, 2).expect("validated above"));
    }
    bytes.resize(MEM_SIZE, 0);
    Ok(bytes)
}

/// Byte-addressed, read-only instruction store.
#[derive(Debug, Clone)]
pub struct InstructionMemory {
    bytes: Vec<u8>,
}

impl InstructionMemory {
    pub fn load(path: &Path) -> Result<InstructionMemory, MemoryLoadError> {
        Ok(InstructionMemory {
            bytes: load_image(path)?,
        })
    }

    fn byte(&self, addr: u32) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }

    /// Big-endian 32-bit fetch: `(mem[A]<<24)|(mem[A+1]<<16)|(mem[A+2]<<8)|mem[A+3]`.
    pub fn read_word(&self, addr: u32) -> u32 {
        ((self.byte(addr) as u32) << 24)
            | ((self.byte(addr.wrapping_add(1)) as u32) << 16)
            | ((self.byte(addr.wrapping_add(2)) as u32) << 8)
            | (self.byte(addr.wrapping_add(3)) as u32)
    }
}

/// Byte-addressed, read/write data store.
#[derive(Debug, Clone)]
pub struct DataMemory {
    bytes: Vec<u8>,
}

impl DataMemory {
    pub fn load(path: &Path) -> Result<DataMemory, MemoryLoadError> {
        Ok(DataMemory {
            bytes: load_image(path)?,
        })
    }

    fn byte(&self, addr: u32) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn read_word(&self, addr: u32) -> u32 {
        ((self.byte(addr) as u32) << 24)
            | ((self.byte(addr.wrapping_add(1)) as u32) << 16)
            | ((self.byte(addr.wrapping_add(2)) as u32) << 8)
            | (self.byte(addr.wrapping_add(3)) as u32)
    }

    /// Writes a 32-bit word big-endian. An out-of-range address is logged
    /// and the write is dropped; the simulation continues (spec.md §7).
    pub fn write_word(&mut self, addr: u32, value: u32) {
        if addr as usize + 4 > self.bytes.len() {
            warn!("store to out-of-range address {addr:#x} dropped");
            return;
        }
        let addr = addr as usize;
        self.bytes[addr] = (value >> 24) as u8;
        self.bytes[addr + 1] = (value >> 16) as u8;
        self.bytes[addr + 2] = (value >> 8) as u8;
        self.bytes[addr + 3] = value as u8;
    }

    /// Dumps the byte array to `path`, one 8-bit binary line per byte.
    pub fn dump(&self, path: &Path) -> std::io::Result<()> {
        let contents: String = self
            .bytes
            .iter()
            .map(|b| format!("{b:08b}\n"))
            .collect();
        fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_image(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn short_image_zero_pads() {
        let file = write_image(&["00000000", "00000000", "00000000", "01000010"]);
        let mem = InstructionMemory::load(file.path()).unwrap();
        assert_eq!(mem.read_word(0), 0x42);
        assert_eq!(mem.read_word(996), 0);
    }

    #[test]
    fn out_of_range_read_is_zero() {
        let file = write_image(&["00000001"]);
        let mem = InstructionMemory::load(file.path()).unwrap();
        assert_eq!(mem.read_word(10_000), 0);
    }

    #[test]
    fn store_round_trips_big_endian() {
        let file = write_image(&["00000000"]);
        let mut mem = DataMemory::load(file.path()).unwrap();
        mem.write_word(0, 0x0000_0055);
        assert_eq!(mem.read_word(0), 0x55);
        assert_eq!(mem.byte(3), 0x55);
    }

    #[test]
    fn out_of_range_store_is_dropped() {
        let file = write_image(&["00000000"]);
        let mut mem = DataMemory::load(file.path()).unwrap();
        mem.write_word(u32::MAX - 1, 0xdead_beef);
        assert_eq!(mem.read_word(u32::MAX - 1), 0);
    }

    #[test]
    fn malformed_line_is_input_error() {
        let file = write_image(&["not-binary"]);
        assert!(InstructionMemory::load(file.path()).is_err());
    }
}
