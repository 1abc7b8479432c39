//! Unit tests for the keyboard and mouse profiles

use super::keyboard::*;
use super::mouse::*;
use super::profile::HidProfile;
use crate::gatt::ReportKind;
use crate::report::input_report_queue;

fn drain(queue: &crate::report::InputReportQueue) -> Vec<Vec<u8>> {
    std::iter::from_fn(|| queue.poll()).collect()
}

#[test]
fn test_key_code_ignores_case() {
    for (lower, upper) in ('a'..='z').zip('A'..='Z') {
        assert_eq!(key_code(lower), key_code(upper));
        assert_eq!(modifier(lower), Modifiers::NONE);
        assert_eq!(modifier(upper), Modifiers::SHIFT);
    }
    assert_eq!(key_code('a'), Some(0x04));
    assert_eq!(key_code('z'), Some(0x1D));
}

#[test]
fn test_shifted_symbols_share_keys() {
    let pairs = [
        ('1', '!'), ('2', '@'), ('9', '('), ('0', ')'),
        ('-', '_'), ('=', '+'), ('[', '{'), (']', '}'), ('\\', '|'),
        (';', ':'), ('\'', '"'), ('`', '~'), (',', '<'), ('.', '>'), ('/', '?'),
    ];
    for (plain, shifted) in pairs {
        assert_eq!(key_code(plain), key_code(shifted), "{plain} / {shifted}");
        assert_eq!(modifier(plain), Modifiers::NONE);
        assert_eq!(modifier(shifted), Modifiers::SHIFT);
    }
    assert_eq!(key_code('0'), Some(0x27));
    assert_eq!(key_code('\n'), Some(KEY_ENTER));
    assert_eq!(key_code(' '), Some(KEY_SPACE));
    assert_eq!(key_code('é'), None);
}

#[test]
fn test_send_keys_queues_press_and_release() {
    let (sender, queue) = input_report_queue();
    let keyboard = KeyboardEncoder::new(sender);

    assert_eq!(keyboard.send_keys("Hi"), 4);
    let reports = drain(&queue);
    assert_eq!(reports.len(), 4);
    for report in &reports {
        assert_eq!(report.len(), KEYBOARD_REPORT_LEN);
        assert_eq!(report[0], 0x01);
    }
    assert_eq!(reports[0], vec![0x01, 0x02, 0, 0x0B, 0, 0, 0, 0, 0]);
    assert_eq!(reports[1], KEY_UP_REPORT.to_vec());
    assert_eq!(reports[2], vec![0x01, 0x00, 0, 0x0C, 0, 0, 0, 0, 0]);
    assert_eq!(reports[3], KEY_UP_REPORT.to_vec());
}

#[test]
fn test_send_keys_skips_unknown_characters() {
    let (sender, queue) = input_report_queue();
    let keyboard = KeyboardEncoder::new(sender);

    assert_eq!(keyboard.send_keys("a€b"), 4);
    assert_eq!(drain(&queue).len(), 4);
    assert_eq!(keyboard.send_keys(""), 0);
    assert!(queue.poll().is_none());
}

#[test]
fn test_key_down_and_up() {
    let (sender, queue) = input_report_queue();
    let keyboard = KeyboardEncoder::new(sender);

    keyboard.send_key_down(Modifiers::CTRL | Modifiers::ALT, KEY_DELETE);
    keyboard.send_key_up();
    let reports = drain(&queue);
    assert_eq!(reports[0], vec![0x01, 0x05, 0, KEY_DELETE, 0, 0, 0, 0, 0]);
    assert_eq!(reports[1], vec![0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_led_report_decoding() {
    assert_eq!(decode_led_report(&[0x01, 0x02]), Some(LedState::CAPS_LOCK));
    assert_eq!(decode_led_report(&[0x03]), Some(LedState::NUM_LOCK | LedState::CAPS_LOCK));
    assert_eq!(decode_led_report(&[]), None);
    assert_eq!(decode_led_report(&[0x02, 0x01]), None);

    let mut profile = KeyboardProfile::new();
    profile.handle_output_report(&[0x01, 0x01]);
    assert_eq!(profile.leds(), LedState::NUM_LOCK);
    profile.handle_output_report(&[0x07, 0x07, 0x07]);
    assert_eq!(profile.leds(), LedState::NUM_LOCK);
}

#[test]
fn test_keyboard_report_map() {
    let profile = KeyboardProfile::new();
    let map = profile.report_descriptor();
    assert_eq!(&map[..8], &[0x05, 0x01, 0x09, 0x06, 0xA1, 0x01, 0x85, 0x01]);
    assert_eq!(map.last(), Some(&0xC0));
    assert_eq!(profile.reports().kinds(), vec![ReportKind::Input, ReportKind::Output]);
    assert_eq!(profile.report_interval().as_millis(), 20);
}

#[test]
fn test_movement_wraps_deltas() {
    let (sender, queue) = input_report_queue();
    let mouse = MouseEncoder::new(sender);

    mouse.send_movement(200, -5, 0, MouseButtons::LEFT);
    let report = queue.poll().unwrap();
    assert_eq!(report.len(), MOUSE_REPORT_LEN);
    assert_eq!(report[0], 0x01);
    assert_eq!(report[1], 0x01);
    assert_eq!(report[2] as i8, -56);
    assert_eq!(report[3] as i8, -5);
    assert_eq!(report[4], 0);

    assert_eq!(movement_report(-129, 127, -1, MouseButtons::empty())[2..], [0x7F, 0x7F, 0xFF]);
}

#[test]
fn test_click_presses_then_releases() {
    let (sender, queue) = input_report_queue();
    let mouse = MouseEncoder::new(sender);

    assert!(mouse.send_click(MouseButtons::RIGHT));
    assert_eq!(drain(&queue), vec![vec![1, 0x02, 0, 0, 0], vec![1, 0, 0, 0, 0]]);
}

#[test]
fn test_mouse_report_map() {
    let mut profile = MouseProfile::new();
    let map = profile.report_descriptor();
    assert_eq!(&map[..6], &[0x05, 0x01, 0x09, 0x02, 0xA1, 0x01]);
    assert_eq!(&map[map.len() - 2..], &[0xC0, 0xC0]);
    assert_eq!(profile.reports().kinds(), vec![ReportKind::Input]);
    assert_eq!(profile.report_interval().as_millis(), 10);
    profile.handle_output_report(&[1, 2, 3]);
}
