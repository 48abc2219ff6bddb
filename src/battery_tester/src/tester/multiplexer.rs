use rtt_target::rprintln;
use tester_board::{TesterBoard, MAX_MULTIPLEXER_LINES};

use super::TesterError;

/// Control lines needed to address `variants` channels, ceil(log2(variants)).
pub const fn multiplexer_bits(variants: u8) -> u8 {
    let mut bits = 0;
    while (1u16 << bits) < variants as u16 {
        bits += 1;
    }
    bits
}

/// Level of control line `line` when selecting `offset`. Line 0 carries the
/// most significant bit.
pub fn line_level(offset: u8, bits: u8, line: u8) -> bool {
    (offset >> (bits - 1 - line)) & 1 == 1
}

pub fn select(board: &mut impl TesterBoard, offset: u8, bits: u8) -> Result<(), TesterError> {
    if bits > MAX_MULTIPLEXER_LINES || offset as u16 >= (1u16 << bits) {
        rprintln!("multiplexer offset {} out of range for {} lines", offset, bits);
        return Err(TesterError::InvalidMultiplexerOffset);
    }

    for line in 0..bits {
        board.write_multiplexer_line(line, line_level(offset, bits, line));
    }
    Ok(())
}
