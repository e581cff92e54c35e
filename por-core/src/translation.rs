// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `translation` module holds the bidirectional byte translation table a Portable file
//! declares in its header: which raw byte on disk stands for which canonical symbol.

/// The canonical symbol assigned to each of the 256 translation-table positions, or `None` for
/// reserved/undefined positions. Position `i` in a file's 256-byte translation record declares
/// which file byte the producer used to represent `CANONICAL[i]`.
const CANONICAL: [Option<u8>; 256] = build_canonical();

const fn build_canonical() -> [Option<u8>; 256] {
    let mut table: [Option<u8>; 256] = [None; 256];

    let mut i = 64;
    while i <= 73 {
        table[i] = Some(b'0' + (i - 64) as u8);
        i += 1;
    }
    let mut i = 74;
    while i <= 99 {
        table[i] = Some(b'A' + (i - 74) as u8);
        i += 1;
    }
    let mut i = 100;
    while i <= 125 {
        table[i] = Some(b'a' + (i - 100) as u8);
        i += 1;
    }
    table[126] = Some(b' ');

    const BAND_127: &[u8] = b".<(+";
    let mut i = 0;
    while i < BAND_127.len() {
        table[127 + i] = Some(BAND_127[i]);
        i += 1;
    }

    const BAND_132: &[u8] = b"&[]!$*);^-/";
    let mut i = 0;
    while i < BAND_132.len() {
        table[132 + i] = Some(BAND_132[i]);
        i += 1;
    }

    const BAND_144: &[u8] = b",%_>?`:";
    let mut i = 0;
    while i < BAND_144.len() {
        table[144 + i] = Some(BAND_144[i]);
        i += 1;
    }

    const BAND_152: &[u8] = b"@'=\"";
    let mut i = 0;
    while i < BAND_152.len() {
        table[152 + i] = Some(BAND_152[i]);
        i += 1;
    }

    table
}

/// A bidirectional 256-entry byte map between a file's declared character set and the canonical
/// symbol set used internally by the numeric and matrix codecs.
#[derive(Clone, Debug)]
pub struct TranslationTable {
    decode: [u8; 256],
    encode: [u8; 256],
}

impl Default for TranslationTable {
    /// An identity translation, used when a file declares no translation record.
    fn default() -> TranslationTable {
        let mut identity = [0u8; 256];
        for (i, slot) in identity.iter_mut().enumerate() {
            *slot = i as u8;
        }
        TranslationTable { decode: identity, encode: identity }
    }
}

impl TranslationTable {
    /// Builds a table from a file's 256-byte translation record: `file_translation_bytes[i]` is
    /// the file byte standing in for canonical position `i`. Per the format, the byte the file
    /// uses for digit `0` (position 64) doubles as the filler for "this position is unused".
    pub fn from_file_bytes(file_translation_bytes: &[u8; 256]) -> TranslationTable {
        let mut decode = [0u8; 256];
        for (i, slot) in decode.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let in_zero = file_translation_bytes[64];

        for (i, &canonical) in CANONICAL.iter().enumerate() {
            let canonical = match canonical {
                Some(c) => c,
                None => continue,
            };
            let file_byte = file_translation_bytes[i];
            if file_byte == in_zero && i != 64 {
                continue;
            }
            decode[file_byte as usize] = canonical;
        }
        decode[in_zero as usize] = b'0';

        TranslationTable { decode, encode: invert(&decode) }
    }

    #[inline]
    pub fn decode(&self, file_byte: u8) -> u8 {
        self.decode[file_byte as usize]
    }

    #[inline]
    pub fn encode(&self, canonical_byte: u8) -> u8 {
        self.encode[canonical_byte as usize]
    }
}

/// Builds the inverse of a `decode` table. Positions with no preimage keep their identity value,
/// matching an implicit identity mapping for symbols the file never declared.
fn invert(decode: &[u8; 256]) -> [u8; 256] {
    let mut encode = [0u8; 256];
    for (i, slot) in encode.iter_mut().enumerate() {
        *slot = i as u8;
    }
    for (file_byte, &canonical) in decode.iter().enumerate() {
        encode[canonical as usize] = file_byte as u8;
    }
    encode
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_table_round_trips_every_byte() {
        let table = TranslationTable::default();
        for b in 0..=255u8 {
            assert_eq!(table.decode(b), b);
            assert_eq!(table.encode(b), b);
        }
    }

    #[test]
    fn canonical_digit_zero_is_position_sixty_four() {
        assert_eq!(CANONICAL[64], Some(b'0'));
        assert_eq!(CANONICAL[73], Some(b'9'));
        assert_eq!(CANONICAL[74], Some(b'A'));
        assert_eq!(CANONICAL[126], Some(b' '));
    }

    #[test]
    fn from_identity_file_bytes_decodes_to_itself() {
        let mut file_bytes = [0u8; 256];
        for (i, slot) in file_bytes.iter_mut().enumerate() {
            *slot = i as u8;
        }
        let table = TranslationTable::from_file_bytes(&file_bytes);
        for (i, &canonical) in CANONICAL.iter().enumerate() {
            if let Some(c) = canonical {
                assert_eq!(table.decode(i as u8), c);
            }
        }
    }

    #[test]
    fn unused_positions_fall_back_to_in_zero() {
        let mut file_bytes = [0u8; 256];
        for (i, slot) in file_bytes.iter_mut().enumerate() {
            *slot = i as u8;
        }
        // Declare position 127 ('.') as unused by pointing it at in_zero.
        file_bytes[127] = file_bytes[64];
        let table = TranslationTable::from_file_bytes(&file_bytes);
        // The file byte for position 64 still decodes to '0'; '.' has no distinct file byte.
        assert_eq!(table.decode(file_bytes[64]), b'0');
    }
}
