//! CRC-16 used to protect both frame directions.
//!
//! **Polynomial**: 0xA001 (reflected 0x8005)
//! **Initial Value**: 0xFFFF, no final XOR
//!
//! The accumulator is folded one byte at a time so the same routine serves
//! the receive check and the transmit trailer.

use crate::consts::CRC_SEED;

const CRC16_POLY: u16 = 0xa001;

/// Precomputed lookup table, generated at compile time.
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Folds one byte into a running CRC accumulator.
///
/// This is the per-byte accumulator step with the new value returned
/// instead of written back through a pointer, so it plugs into `fold`.
pub fn crc16_update(crc: u16, data: &u8) -> u16 {
    (crc >> 8) ^ CRC16_TABLE[lo8(crc ^ *data as u16) as usize]
}

/// Computes the CRC of `data` starting from [`CRC_SEED`].
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(CRC_SEED, crc16_update)
}

pub(crate) fn lo8(x: u16) -> u8 {
    (x & 0xff) as u8
}

pub(crate) fn hi8(x: u16) -> u8 {
    (x >> 8) as u8
}
