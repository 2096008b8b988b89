//! Desktop host for the CHIP-8 machine.
//!
//! ```bash
//! RUST_LOG=debug chip8 roms/pong.ch8 --hz 700
//! ```
//!
//! Arrow keys and Return/Space are the device buttons, mapped to keypad keys
//! through the button config file. The 1234/QWER/ASDF/ZXCV block presses
//! keypad keys directly. Escape quits.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::EventPump;

use chip8_vm::{ButtonConfig, Config, Machine, Variant, CPU_HZ};

use crate::frontend::audio::Beeper;
use crate::frontend::keyboard;
use crate::frontend::window::Window;

mod frontend;

const POLL_INTERVAL: Duration = Duration::from_millis(4);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(help = "Path to the ROM file to run")]
    rom: PathBuf,

    #[arg(long, default_value_t = CPU_HZ, help = "Instructions per second")]
    hz: u32,

    #[arg(long, help = "Enable the Super-CHIP instructions")]
    super_chip: bool,

    #[arg(short, long, default_value = "chip8.config", help = "Button config file")]
    config: PathBuf,

    #[arg(short, long, default_value_t = 10, help = "Window pixels per low-res pixel")]
    scale: u32,
}

struct Session {
    machine: Machine,
    window: Window,
    beeper: Beeper,
    event_pump: EventPump,
    buttons: ButtonConfig,
}

impl Session {
    fn run(&mut self) -> Result<(), String> {
        let started = Instant::now();
        // wraps after ~49 days; the machine re-anchors when time goes back
        let now_ms = || started.elapsed().as_millis() as u32;

        self.machine.start(now_ms());

        'mainloop: loop {
            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'mainloop,
                    _ => {}
                }
            }

            let keys = keyboard::pressed_keys(&self.event_pump.keyboard_state(), &self.buttons);
            self.machine.set_keys(keys);

            // advance logs the fault itself
            self.machine.advance(now_ms()).map_err(|fault| fault.to_string())?;

            if self.machine.take_redraw() {
                self.window.present(&self.machine)?;
            }
            self.beeper.set_active(self.machine.is_tone_active());

            std::thread::sleep(POLL_INTERVAL);
        }

        Ok(())
    }
}

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom).map_err(|e| format!("failed to read {}: {}", args.rom.display(), e))?;

    let variant = if args.super_chip {
        Variant::SuperChip
    } else {
        Variant::Chip8
    };
    let config = Config {
        variant,
        ..Config::default()
    }
    .with_cpu_hz(args.hz);

    let mut machine = Machine::new(config);
    machine.load_program(&rom).map_err(|fault| fault.to_string())?;
    info!("loaded {} ({} bytes, {:?} at {} Hz)", args.rom.display(), rom.len(), variant, config.cpu_hz);

    let sdl_context = sdl2::init()?;
    let window = Window::new(&sdl_context.video()?, args.scale)?;
    let beeper = Beeper::new(&sdl_context.audio()?)?;
    let event_pump = sdl_context.event_pump()?;

    let mut session = Session {
        machine,
        window,
        beeper,
        event_pump,
        buttons: ButtonConfig::load(&args.config),
    };
    let result = session.run();
    session.beeper.set_active(false);

    // keep the mapping, default included, for the next session
    if let Err(err) = session.buttons.save(&args.config) {
        error!("failed to save button config {}: {}", args.config.display(), err);
    }

    result
}
