use sdl2::keyboard::{KeyboardState, Scancode};

use chip8_vm::{key_mask, Button, ButtonConfig};

/// Host keys standing in for the device buttons.
const BUTTON_KEYS: [(Scancode, Button); 6] = [
    (Scancode::Up, Button::Up),
    (Scancode::Down, Button::Down),
    (Scancode::Left, Button::Left),
    (Scancode::Right, Button::Right),
    (Scancode::Return, Button::Ok),
    (Scancode::Space, Button::Ok),
];

/// The usual QWERTY layout of the hex keypad:
///
/// ```text
/// 1 2 3 C          1 2 3 4
/// 4 5 6 D          Q W E R
/// 7 8 9 E          A S D F
/// A 0 B F          Z X C V
/// ```
const KEYPAD_KEYS: [(Scancode, u8); 16] = [
    (Scancode::Num1, 0x1),
    (Scancode::Num2, 0x2),
    (Scancode::Num3, 0x3),
    (Scancode::Num4, 0xc),
    (Scancode::Q, 0x4),
    (Scancode::W, 0x5),
    (Scancode::E, 0x6),
    (Scancode::R, 0xd),
    (Scancode::A, 0x7),
    (Scancode::S, 0x8),
    (Scancode::D, 0x9),
    (Scancode::F, 0xe),
    (Scancode::Z, 0xa),
    (Scancode::X, 0x0),
    (Scancode::C, 0xb),
    (Scancode::V, 0xf),
];

/// Keypad bitmask for everything held down right now, through the button
/// mapping and the direct keypad keys.
pub fn pressed_keys(state: &KeyboardState, buttons: &ButtonConfig) -> u16 {
    let pressed: Vec<Button> = BUTTON_KEYS
        .iter()
        .filter(|(scancode, _)| state.is_scancode_pressed(*scancode))
        .map(|(_, button)| *button)
        .collect();

    KEYPAD_KEYS
        .iter()
        .filter(|(scancode, _)| state.is_scancode_pressed(*scancode))
        .fold(buttons.keys_for(&pressed), |keys, (_, key)| keys | key_mask(*key))
}
