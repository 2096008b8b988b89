//! CHIP-8 virtual machine core with the Super-CHIP display extensions.
//!
//! The crate owns no window, audio device or file handles. A host drives a
//! [`Machine`] through a handful of calls:
//!
//! ```
//! use chip8_vm::{Config, Machine};
//!
//! let mut machine = Machine::new(Config::default());
//! // V0 = 0x2A; loop forever
//! machine.load_program(&[0x60, 0x2a, 0x12, 0x02]).unwrap();
//! machine.start(0);
//!
//! machine.set_keys(0);
//! machine.advance(100).unwrap();
//!
//! assert_eq!(machine.v()[0], 0x2a);
//! if machine.take_redraw() {
//!     let _lit = machine.pixel(0, 0);
//! }
//! ```

pub mod chip8;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
mod scheduler;

pub use chip8::{Machine, MEMORY_SIZE, NUM_FLAGS, NUM_KEYS, PROG_START, STACK_SIZE};
pub use config::{Config, Variant, CPU_HZ, TIMER_HZ};
pub use display::{HIRES_HEIGHT, HIRES_WIDTH, LORES_HEIGHT, LORES_WIDTH};
pub use error::Fault;
pub use input::{key_mask, Button, ButtonConfig};
pub use instruction::{decode, Instruction};
