use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, Variant};
use crate::display::Screen;
use crate::error::Fault;
use crate::instruction::{decode, Instruction};
use crate::scheduler::Clock;

pub const MEMORY_SIZE: usize = 0x1000;
/// Programs are loaded here; everything below belongs to the interpreter
pub const PROG_START: usize = 0x200;
pub const STACK_SIZE: usize = 0xff;
pub const NUM_KEYS: usize = 16;
/// Super-CHIP RPL user flags
pub const NUM_FLAGS: usize = 8;

const ADDR_MASK: usize = MEMORY_SIZE - 1;
const VF: usize = 0xf;

const SMALL_FONT_ADDR: usize = 0x00;
const SMALL_GLYPH_BYTES: u16 = 5;
const LARGE_FONT_ADDR: usize = 0x50;
const LARGE_GLYPH_BYTES: u16 = 10;

#[rustfmt::skip]
const SMALL_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[rustfmt::skip]
const LARGE_FONT: [u8; 160] = [
    0x3C, 0x7E, 0xE7, 0xC3, 0xC3, 0xC3, 0xC3, 0xE7, 0x7E, 0x3C, // 0
    0x18, 0x38, 0x58, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, // 1
    0x3E, 0x7F, 0xC3, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFF, 0xFF, // 2
    0x3C, 0x7E, 0xC3, 0x03, 0x0E, 0x0E, 0x03, 0xC3, 0x7E, 0x3C, // 3
    0x06, 0x0E, 0x1E, 0x36, 0x66, 0xC6, 0xFF, 0xFF, 0x06, 0x06, // 4
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFE, 0x03, 0xC3, 0x7E, 0x3C, // 5
    0x3E, 0x7C, 0xE0, 0xC0, 0xFC, 0xFE, 0xC3, 0xC3, 0x7E, 0x3C, // 6
    0xFF, 0xFF, 0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x60, 0x60, // 7
    0x3C, 0x7E, 0xC3, 0xC3, 0x7E, 0x7E, 0xC3, 0xC3, 0x7E, 0x3C, // 8
    0x3C, 0x7E, 0xC3, 0xC3, 0x7F, 0x3F, 0x03, 0x03, 0x3E, 0x7C, // 9
    0x7E, 0xFF, 0xC3, 0xC3, 0xC3, 0xFF, 0xFF, 0xC3, 0xC3, 0xC3, // A
    0xFC, 0xFC, 0xC3, 0xC3, 0xFC, 0xFC, 0xC3, 0xC3, 0xFC, 0xFC, // B
    0x3C, 0xFF, 0xC3, 0xC0, 0xC0, 0xC0, 0xC0, 0xC3, 0xFF, 0x3C, // C
    0xFC, 0xFE, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xC3, 0xFE, 0xFC, // D
    0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, // E
    0xFF, 0xFF, 0xC0, 0xC0, 0xFF, 0xFF, 0xC0, 0xC0, 0xC0, 0xC0, // F
];

/// The whole CHIP-8 virtual machine. One instance per running program,
/// owned by the host and mutated only through `&mut self`.
pub struct Machine {
    memory: [u8; MEMORY_SIZE],
    pc: u16,
    i: u16,
    v: [u8; 16],
    stack: [u16; STACK_SIZE],
    sp: u8,
    delay_timer: u8,
    sound_timer: u8,
    keys: [bool; NUM_KEYS],
    waiting_for_key: Option<usize>,
    halted: bool,
    draw_pending: bool,
    flags: [u8; NUM_FLAGS],
    screen: Screen,
    config: Config,
    rng: StdRng,
    pub(crate) clock: Clock,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Machine {
    /// Allocate a machine with default run state. No program is loaded and
    /// the clock is anchored at 0 until `start` is called.
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as `new`, with a deterministic source for the RND opcode.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        let mut machine = Self {
            memory: [0; MEMORY_SIZE],
            pc: PROG_START as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; NUM_KEYS],
            waiting_for_key: None,
            halted: false,
            draw_pending: false,
            flags: [0; NUM_FLAGS],
            screen: Screen::new(),
            config,
            rng,
            clock: Clock::new(0),
        };
        machine.start(0);
        machine
    }

    /// Reset to a fresh run. Program memory is left alone, so a program
    /// written before `start` runs from the top.
    pub fn start(&mut self, now_ms: u32) {
        self.pc = PROG_START as u16;
        self.i = 0;
        self.v = [0; 16];
        self.stack = [0; STACK_SIZE];
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys = [false; NUM_KEYS];
        self.waiting_for_key = None;
        self.halted = false;
        self.screen.reset();
        self.draw_pending = true;

        // interpreter area: fonts, then zeroes up to the program
        let font_end = match self.config.variant {
            Variant::Chip8 => SMALL_FONT_ADDR + SMALL_FONT.len(),
            Variant::SuperChip => LARGE_FONT_ADDR + LARGE_FONT.len(),
        };
        self.memory[SMALL_FONT_ADDR..SMALL_FONT_ADDR + SMALL_FONT.len()].copy_from_slice(&SMALL_FONT);
        if self.config.variant == Variant::SuperChip {
            self.memory[LARGE_FONT_ADDR..LARGE_FONT_ADDR + LARGE_FONT.len()].copy_from_slice(&LARGE_FONT);
        }
        self.memory[font_end..PROG_START].fill(0);

        self.clock.reset(now_ms);
        debug!("machine started at {} ms ({:?}, {} Hz)", now_ms, self.config.variant, self.config.cpu_hz);
    }

    /// Write one program byte at `PROG_START + offset`.
    pub fn write_program_byte(&mut self, offset: usize, value: u8) -> Result<(), Fault> {
        let addr = PROG_START
            .checked_add(offset)
            .filter(|addr| *addr < MEMORY_SIZE)
            .ok_or(Fault::OutOfBoundsWrite { offset })?;
        self.memory[addr] = value;
        Ok(())
    }

    /// Write a whole program image. Nothing is written if it doesn't fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Fault> {
        let max = MEMORY_SIZE - PROG_START;
        if program.len() > max {
            return Err(Fault::ProgramTooLarge {
                size: program.len(),
                max,
            });
        }
        for (offset, byte) in program.iter().enumerate() {
            self.write_program_byte(offset, *byte)?;
        }
        debug!("loaded {} program bytes", program.len());
        Ok(())
    }

    /// Replace the whole keypad state; bit i set means key i is down.
    pub fn set_keys(&mut self, bitmask: u16) {
        for (key, pressed) in self.keys.iter_mut().enumerate() {
            *pressed = bitmask & (1 << key) != 0;
        }
    }

    pub fn keys(&self) -> u16 {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .fold(0, |mask, (key, _)| mask | 1 << key)
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.screen.pixel(x, y)
    }

    pub fn screen_width(&self) -> usize {
        self.screen.width()
    }

    pub fn screen_height(&self) -> usize {
        self.screen.height()
    }

    pub fn is_tone_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn needs_redraw(&self) -> bool {
        self.draw_pending
    }

    /// Returns whether the screen changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.draw_pending, false)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn waiting_for_key(&self) -> Option<usize> {
        self.waiting_for_key
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn cpu_ticks(&self) -> u64 {
        self.clock.cpu_ticks()
    }

    pub fn timer_ticks(&self) -> u64 {
        self.clock.timer_ticks()
    }

    pub(crate) fn decrement_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    /// Finish a pending key wait if any key is down, lowest key first.
    /// Returns true if a wait ended.
    pub(crate) fn resume_key_wait(&mut self) -> bool {
        let Some(x) = self.waiting_for_key else {
            return false;
        };
        match self.keys.iter().position(|pressed| *pressed) {
            Some(key) => {
                self.v[x] = key as u8;
                self.waiting_for_key = None;
                debug!("key {:X} resumed wait into V{:X}", key, x);
                true
            }
            None => false,
        }
    }

    /// One CPU cycle: fetch and execute, unless the machine is suspended on
    /// a key wait or has exited.
    pub fn step(&mut self) -> Result<(), Fault> {
        if self.waiting_for_key.is_some() || self.halted {
            return Ok(());
        }
        let opcode = self.fetch();
        self.execute(opcode)
    }

    fn fetch(&mut self) -> u16 {
        let addr = self.pc as usize & ADDR_MASK;
        let hi = self.memory[addr] as u16;
        let lo = self.memory[(addr + 1) & ADDR_MASK] as u16;
        self.pc = self.pc.wrapping_add(2);

        hi << 8 | lo
    }

    fn read(&self, addr: usize) -> u8 {
        self.memory[addr & ADDR_MASK]
    }

    fn write(&mut self, addr: usize, value: u8) {
        self.memory[addr & ADDR_MASK] = value;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    /// Execute one opcode. `pc` must already point past it, as `step` leaves
    /// it; a fault leaves the rest of the machine untouched.
    pub fn execute(&mut self, opcode: u16) -> Result<(), Fault> {
        use Instruction::*;

        let at = self.pc.wrapping_sub(2);
        let instruction = decode(opcode, self.config.variant).ok_or(Fault::UnknownOpcode { pc: at, opcode })?;
        trace!("{:#05x}: {:#06x} {:?}", at, opcode, instruction);

        match instruction {
            ClearScreen => {
                self.screen.clear();
                self.draw_pending = true;
            }
            Return => {
                if self.sp == 0 {
                    return Err(Fault::StackUnderflow { pc: at, opcode });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
            }
            Jump { addr } => self.pc = addr,
            Call { addr } => {
                if self.sp as usize == STACK_SIZE {
                    return Err(Fault::StackOverflow { pc: at, opcode });
                }
                self.stack[self.sp as usize] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            SkipEqByte { x, kk } => self.skip_if(self.v[x] == kk),
            SkipNeByte { x, kk } => self.skip_if(self.v[x] != kk),
            SkipEqReg { x, y } => self.skip_if(self.v[x] == self.v[y]),
            SkipNeReg { x, y } => self.skip_if(self.v[x] != self.v[y]),
            LoadByte { x, kk } => self.v[x] = kk,
            AddByte { x, kk } => self.v[x] = self.v[x].wrapping_add(kk),

            // binary ops; VF is written before the result, so VF as the
            // destination ends up holding the result
            Move { x, y } => self.v[x] = self.v[y],
            Or { x, y } => self.v[x] |= self.v[y],
            And { x, y } => self.v[x] &= self.v[y],
            Xor { x, y } => self.v[x] ^= self.v[y],
            Add { x, y } => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[VF] = carry as u8;
                self.v[x] = sum;
            }
            Sub { x, y } => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[VF] = (vx > vy) as u8;
                self.v[x] = vx.wrapping_sub(vy);
            }
            ShiftRight { x } => {
                let vx = self.v[x];
                self.v[VF] = vx & 0x1;
                self.v[x] = vx >> 1;
            }
            SubN { x, y } => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[VF] = (vx > vy) as u8;
                self.v[x] = vy.wrapping_sub(vx);
            }
            ShiftLeft { x } => {
                let vx = self.v[x];
                self.v[VF] = vx >> 7;
                self.v[x] = vx << 1;
            }

            LoadI { addr } => self.i = addr,
            JumpV0 { addr } => self.pc = addr + self.v[0] as u16,
            Random { x, kk } => self.v[x] = self.rng.gen::<u8>() & kk,
            Draw { x, y, n } => self.draw(x, y, n),
            SkipKey { x } => self.skip_if(self.keys[(self.v[x] & 0xf) as usize]),
            SkipNotKey { x } => self.skip_if(!self.keys[(self.v[x] & 0xf) as usize]),
            LoadDelay { x } => self.v[x] = self.delay_timer,
            WaitKey { x } => {
                self.waiting_for_key = Some(x);
                debug!("waiting for key into V{:X}", x);
            }
            SetDelay { x } => self.delay_timer = self.v[x],
            SetSound { x } => self.sound_timer = self.v[x],
            AddI { x } => self.i = self.i.wrapping_add(self.v[x] as u16),
            LoadFont { x } => self.i = SMALL_FONT_ADDR as u16 + SMALL_GLYPH_BYTES * self.v[x] as u16,
            StoreBcd { x } => {
                let vx = self.v[x];
                let i = self.i as usize;
                self.write(i, vx / 100);
                self.write(i + 1, (vx / 10) % 10);
                self.write(i + 2, vx % 10);
            }
            StoreRegs { x } => {
                let i = self.i as usize;
                for offset in 0..=x {
                    self.write(i + offset, self.v[offset]);
                }
            }
            LoadRegs { x } => {
                let i = self.i as usize;
                for offset in 0..=x {
                    self.v[offset] = self.read(i + offset);
                }
            }

            ScrollDown { n } => {
                self.screen.scroll_down(n);
                self.draw_pending = true;
            }
            ScrollRight => {
                self.screen.scroll_right(4);
                self.draw_pending = true;
            }
            ScrollLeft => {
                self.screen.scroll_left(4);
                self.draw_pending = true;
            }
            Exit => {
                self.halted = true;
                debug!("program exited at {:#05x}", at);
            }
            LowRes | HighRes => {
                let hires = instruction == HighRes;
                self.screen.set_hires(hires);
                self.draw_pending = true;
                debug!("resolution {}x{}", self.screen.width(), self.screen.height());
            }
            LoadLargeFont { x } => self.i = LARGE_FONT_ADDR as u16 + LARGE_GLYPH_BYTES * self.v[x] as u16,
            StoreFlags { x } => self.flags[..=x].copy_from_slice(&self.v[..=x]),
            LoadFlags { x } => self.v[..=x].copy_from_slice(&self.flags[..=x]),
        }

        Ok(())
    }

    /// DXYN: XOR an 8 pixel wide, `n` row sprite from memory at I onto the
    /// screen at (VX, VY). With `n == 0` Super-CHIP draws a 16x16 sprite of
    /// two bytes per row. VF reports whether any lit pixel was erased.
    fn draw(&mut self, x: usize, y: usize, n: u8) {
        let vx = self.v[x] as usize;
        let vy = self.v[y] as usize;
        let i = self.i as usize;
        let mut collision = false;

        if n == 0 {
            if self.config.variant == Variant::SuperChip {
                for row in 0..16 {
                    let hi = self.read(i + 2 * row) as u16;
                    let lo = self.read(i + 2 * row + 1) as u16;
                    collision |= self.screen.draw_row(vx, vy + row, hi << 8 | lo, 16);
                }
            }
        } else {
            for row in 0..n as usize {
                let sprite = self.read(i + row) as u16;
                collision |= self.screen.draw_row(vx, vy + row, sprite, 8);
            }
        }

        self.v[VF] = collision as u8;
        self.draw_pending = true;
    }
}
