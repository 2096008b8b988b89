/// Default CPU speed in instructions per second
pub const CPU_HZ: u32 = 500;
/// Delay and sound timers always count down at 60Hz
pub const TIMER_HZ: u32 = 60;

/// Which instruction set the machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Chip8,
    /// CHIP-8 plus the Super-CHIP scroll, hi-res, large sprite and RPL flag opcodes
    SuperChip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub cpu_hz: u32,
    pub variant: Variant,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_hz: CPU_HZ,
            variant: Variant::Chip8,
        }
    }
}

impl Config {
    pub fn super_chip() -> Self {
        Self {
            variant: Variant::SuperChip,
            ..Default::default()
        }
    }

    pub fn with_cpu_hz(self, cpu_hz: u32) -> Self {
        // a zero rate would never schedule a tick
        Self {
            cpu_hz: cpu_hz.max(1),
            ..self
        }
    }
}
