use tester_board::TesterBoard;

use crate::tester::layout::SlotId;
use crate::tester::machine::LineCommand;

/// Drives the charge and discharge lines of the slot's channel.
///
/// The line being released is always written before the other one is
/// asserted, so both are never high together.
pub fn apply(board: &mut impl TesterBoard, slot: &SlotId, command: LineCommand) {
    match command {
        LineCommand::StartCharging => {
            board.write_discharge_line(slot.channel, false);
            board.write_charge_line(slot.channel, true);
        }
        LineCommand::StartDischarging => {
            board.write_charge_line(slot.channel, false);
            board.write_discharge_line(slot.channel, true);
        }
        LineCommand::StopCharging | LineCommand::StopDischarging => {
            release(board, slot.channel);
        }
    }
}

pub fn release(board: &mut impl TesterBoard, channel: u8) {
    board.write_charge_line(channel, false);
    board.write_discharge_line(channel, false);
}

pub fn release_all(board: &mut impl TesterBoard, channels: u8) {
    for channel in 0..channels {
        release(board, channel);
    }
}
