use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, error, warn};

use crate::chip8::NUM_KEYS;

/// Bitmask with only `key` set, as `Machine::set_keys` expects.
pub fn key_mask(key: u8) -> u16 {
    1 << (key & 0xf)
}

/// Physical buttons of the host device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Right,
    Left,
    Ok,
}

impl Button {
    pub const ALL: [Button; 5] = [Button::Up, Button::Down, Button::Right, Button::Left, Button::Ok];

    pub fn name(&self) -> &'static str {
        match self {
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Right => "Right",
            Button::Left => "Left",
            Button::Ok => "Ok",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Which CHIP-8 keys each button presses. One button may press several
/// keys, and a key may be bound to several buttons.
///
/// Stored as text, one binding per line: `<hex key> -> <button name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonConfig {
    map: [[bool; NUM_KEYS]; Button::ALL.len()],
}

impl Default for ButtonConfig {
    /// Arrows on the 5/7/8/9 diamond most games steer with, Ok on every
    /// other key.
    fn default() -> Self {
        let mut config = Self::empty();
        for key in 0..NUM_KEYS as u8 {
            let button = match key {
                0x5 => Button::Up,
                0x7 => Button::Left,
                0x8 => Button::Down,
                0x9 => Button::Right,
                _ => Button::Ok,
            };
            config.connect(button, key);
        }
        config
    }
}

impl ButtonConfig {
    pub fn empty() -> Self {
        Self {
            map: [[false; NUM_KEYS]; Button::ALL.len()],
        }
    }

    pub fn connect(&mut self, button: Button, key: u8) {
        self.map[button.index()][(key & 0xf) as usize] = true;
    }

    pub fn is_connected(&self, button: Button, key: u8) -> bool {
        self.map[button.index()][(key & 0xf) as usize]
    }

    /// Parse config text. Lines that don't start with a hex digit or don't
    /// end with a button name are skipped.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::empty();

        for line in text.lines() {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            let key = line.chars().next().and_then(|c| c.to_digit(16));
            let button = Button::ALL.iter().find(|button| line.ends_with(button.name()));
            match (key, button) {
                (Some(key), Some(button)) => config.connect(*button, key as u8),
                _ => warn!("ignoring button config line {:?}", line),
            }
        }

        config
    }

    /// Read the config at `path`, or fall back to the default mapping if it
    /// can't be read.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        debug!("reading button config {}", path.display());

        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) => {
                error!("failed to open button config {} ({}), using default config", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        debug!("saving button config {}", path.display());
        fs::write(path, self.to_string())
    }

    /// Full keypad snapshot for the buttons currently held down.
    pub fn keys_for(&self, pressed: &[Button]) -> u16 {
        let mut keys = 0;
        for button in pressed {
            for (key, connected) in self.map[button.index()].iter().enumerate() {
                if *connected {
                    keys |= 1 << key;
                }
            }
        }
        keys
    }
}

impl std::fmt::Display for ButtonConfig {
    /// Bindings in key order, in the format `parse` reads back.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        for key in 0..NUM_KEYS as u8 {
            for button in Button::ALL {
                if self.is_connected(button, key) {
                    writeln!(out, "{:X} -> {}", key, button.name())?;
                }
            }
        }
        f.write_str(&out)
    }
}
