// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A sequential-append / random-seek byte buffer with chunked backing storage, used to hold a
//! fully-buffered raw data matrix between a first pass (discovering `ydim`) and a second pass
//! (emitting typed cells).

use log::trace;

use crate::errors::{precondition_error, PorError, Result};

/// Bytes packed per 32-bit word.
const BYTES_IN_ELEMENT: usize = 4;

/// A fixed-size block of 32-bit words.
#[derive(Clone)]
struct Block {
    words: Vec<u32>,
}

impl Block {
    fn new(elements_per_block: usize) -> Block {
        Block { words: vec![0u32; elements_per_block] }
    }
}

/// Chunked, block-backed byte store addressed by 32-bit offsets.
pub struct ByteVectorStore {
    block_size: usize,
    elements_per_block: usize,
    blocks: Vec<Block>,
    size: u64,
    capacity_locked: bool,
}

impl ByteVectorStore {
    /// `block_size` must be a multiple of `BYTES_IN_ELEMENT` (4).
    pub fn new(block_size: usize) -> Result<ByteVectorStore> {
        if block_size == 0 || block_size % BYTES_IN_ELEMENT != 0 {
            return precondition_error(format!(
                "block_size {} must be a positive multiple of {}",
                block_size, BYTES_IN_ELEMENT
            ));
        }
        Ok(ByteVectorStore {
            block_size,
            elements_per_block: block_size / BYTES_IN_ELEMENT,
            blocks: Vec::new(),
            size: 0,
            capacity_locked: false,
        })
    }

    /// Forbids growing past the blocks currently allocated; further writes past `capacity()`
    /// then fail rather than allocating a new block.
    pub fn lock_capacity(&mut self) {
        self.capacity_locked = true;
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        (self.blocks.len() * self.block_size) as u64
    }

    fn ensure_block(&mut self, block_index: usize) -> Result<()> {
        if block_index < self.blocks.len() {
            return Ok(());
        }
        if self.capacity_locked {
            return Err(PorError::Buffer { limit: self.capacity() as usize });
        }
        while self.blocks.len() <= block_index {
            self.blocks.push(Block::new(self.elements_per_block));
        }
        trace!("grew store to {} blocks ({} bytes)", self.blocks.len(), self.capacity());
        Ok(())
    }

    fn byte_at(&self, offset: u64) -> Option<u8> {
        let block_index = (offset as usize / self.block_size) as usize;
        let within_block = offset as usize % self.block_size;
        let word_index = within_block / BYTES_IN_ELEMENT;
        let byte_index = within_block % BYTES_IN_ELEMENT;
        self.blocks.get(block_index).map(|block| {
            let word = block.words[word_index];
            word.to_le_bytes()[byte_index]
        })
    }

    fn set_byte_at(&mut self, offset: u64, byte: u8) -> Result<()> {
        let block_index = offset as usize / self.block_size;
        let within_block = offset as usize % self.block_size;
        let word_index = within_block / BYTES_IN_ELEMENT;
        let byte_index = within_block % BYTES_IN_ELEMENT;

        self.ensure_block(block_index)?;
        let mut bytes = self.blocks[block_index].words[word_index].to_le_bytes();
        bytes[byte_index] = byte;
        self.blocks[block_index].words[word_index] = u32::from_le_bytes(bytes);
        Ok(())
    }

    /// Writes `byte` at `cursor`'s current head, growing the store if the head is at `size()`.
    pub fn write(&mut self, cursor: &mut Cursor, byte: u8) -> Result<()> {
        self.set_byte_at(cursor.offset, byte)?;
        if cursor.offset == self.size {
            self.size += 1;
        }
        cursor.offset += 1;
        Ok(())
    }

    /// Reads one byte at `cursor`'s head, or `None` at end-of-store.
    pub fn read(&self, cursor: &mut Cursor) -> Option<u8> {
        if cursor.offset >= self.size {
            return None;
        }
        let byte = self.byte_at(cursor.offset);
        cursor.offset += 1;
        byte
    }

    /// Bulk write; equivalent to, but faster than, repeated `write()` calls.
    pub fn write_bulk(&mut self, cursor: &mut Cursor, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.write(cursor, b)?;
        }
        Ok(())
    }

    /// Bulk read; fills `out` completely or returns an `UnexpectedEof` error.
    pub fn read_bulk(&self, cursor: &mut Cursor, out: &mut [u8]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.read(cursor).ok_or(PorError::UnexpectedEof)?;
        }
        Ok(())
    }

    /// Flushing is a no-op for this representation: every byte write lands directly in its
    /// backing word, so there is no partially-filled word to reconcile.
    pub fn flush(&mut self) {}
}

/// A cursor into a [`ByteVectorStore`]; holds only the logical head position. Multiple cursors
/// may traverse the same store independently.
#[derive(Copy, Clone, Debug, Default)]
pub struct Cursor {
    offset: u64,
}

impl Cursor {
    pub fn new() -> Cursor {
        Cursor { offset: 0 }
    }

    pub fn seek(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut store = ByteVectorStore::new(16).unwrap();
        let mut cursor = Cursor::new();
        for b in 0..40u8 {
            store.write(&mut cursor, b).unwrap();
        }
        assert_eq!(store.size(), 40);

        let mut reader = Cursor::new();
        for expected in 0..40u8 {
            assert_eq!(store.read(&mut reader), Some(expected));
        }
        assert_eq!(store.read(&mut reader), None);
    }

    #[test]
    fn seek_allows_random_access() {
        let mut store = ByteVectorStore::new(8).unwrap();
        let mut cursor = Cursor::new();
        store.write_bulk(&mut cursor, b"hello!!!").unwrap();

        let mut reader = Cursor::new();
        reader.seek(2);
        let mut buf = [0u8; 3];
        store.read_bulk(&mut reader, &mut buf).unwrap();
        assert_eq!(&buf, b"llo");
    }

    #[test]
    fn locked_capacity_rejects_growth_past_allocated_blocks() {
        let mut store = ByteVectorStore::new(4).unwrap();
        let mut cursor = Cursor::new();
        store.write(&mut cursor, 1).unwrap();
        store.lock_capacity();
        // Exhaust the rest of the first (only) block.
        for _ in 0..3 {
            store.write(&mut cursor, 2).unwrap();
        }
        assert!(store.write(&mut cursor, 3).is_err());
    }

    #[test]
    fn rejects_non_multiple_block_size() {
        assert!(ByteVectorStore::new(6).is_err());
    }
}
