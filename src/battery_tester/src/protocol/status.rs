use alloc::format;
use rtt_target::rprintln;
use serde_json::json;
use tester_board::TesterBoard;

use crate::alloc::string::ToString;
use crate::services::sensor_service::SensorError;
use crate::tester::state::{annotation_text, Annotation};

fn send_line(board: &mut impl TesterBoard, line: &str) {
    board.serial_send(line);
    board.serial_send("\n");
}

pub fn send_status(board: &mut impl TesterBoard, slot: usize, annotation: &Annotation) {
    let line = format!("Battery #{} {}", slot, annotation_text(annotation));
    rprintln!("{}", line);
    send_line(board, line.as_str());
}

pub fn send_voltage(board: &mut impl TesterBoard, slot: usize, voltage: f32) {
    send_line(board, format!("Battery #{} voltage {}", slot, voltage).as_str());
}

pub fn send_temperature(board: &mut impl TesterBoard, slot: usize, temperature: f32) {
    send_line(
        board,
        format!("Battery #{} temperature {}", slot, temperature).as_str(),
    );
}

pub fn send_sensor_fault(board: &mut impl TesterBoard, slot: usize, error: &SensorError) {
    rprintln!("battery {} sensor fault {:?}", slot, error);
    send_line(board, format!("Battery #{} sensor fault", slot).as_str());
}

pub fn send_protocol_fault(board: &mut impl TesterBoard, slot: usize, raw_state: u8) {
    rprintln!("battery {} unknown state {}", slot, raw_state);
    send_line(
        board,
        format!("Battery #{} unknown state {}, resetting", slot, raw_state).as_str(),
    );
}

pub fn send_setup_message(board: &mut impl TesterBoard, message: &str) {
    rprintln!("{}", message);
    send_line(board, message);
}

pub fn send_ready_status(board: &mut impl TesterBoard, slots: usize) {
    send_line(
        board,
        json!({"status":"battery-tester-ready", "slots": slots})
            .to_string()
            .as_str(),
    );
}
