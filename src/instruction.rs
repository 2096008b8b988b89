use crate::config::Variant;

const NNN: u16 = 0x0fff;
const NN: u16 = 0x00ff;
const N: u16 = 0x000f;
const X: u16 = 0x0f00;
const Y: u16 = 0x00f0;

/// A decoded opcode. `x` and `y` are register indices, `kk` an immediate
/// byte, `addr` a 12-bit address and `n` a nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,
    Return,
    Jump { addr: u16 },
    Call { addr: u16 },
    SkipEqByte { x: usize, kk: u8 },
    SkipNeByte { x: usize, kk: u8 },
    SkipEqReg { x: usize, y: usize },
    SkipNeReg { x: usize, y: usize },
    LoadByte { x: usize, kk: u8 },
    AddByte { x: usize, kk: u8 },
    Move { x: usize, y: usize },
    Or { x: usize, y: usize },
    And { x: usize, y: usize },
    Xor { x: usize, y: usize },
    Add { x: usize, y: usize },
    Sub { x: usize, y: usize },
    ShiftRight { x: usize },
    SubN { x: usize, y: usize },
    ShiftLeft { x: usize },
    LoadI { addr: u16 },
    JumpV0 { addr: u16 },
    Random { x: usize, kk: u8 },
    Draw { x: usize, y: usize, n: u8 },
    SkipKey { x: usize },
    SkipNotKey { x: usize },
    LoadDelay { x: usize },
    WaitKey { x: usize },
    SetDelay { x: usize },
    SetSound { x: usize },
    AddI { x: usize },
    LoadFont { x: usize },
    StoreBcd { x: usize },
    StoreRegs { x: usize },
    LoadRegs { x: usize },

    // Super-CHIP
    ScrollDown { n: u8 },
    ScrollRight,
    ScrollLeft,
    Exit,
    LowRes,
    HighRes,
    LoadLargeFont { x: usize },
    StoreFlags { x: usize },
    LoadFlags { x: usize },
}

/// Decode an opcode for the given instruction set. Returns `None` for
/// anything the variant doesn't define.
pub fn decode(opcode: u16, variant: Variant) -> Option<Instruction> {
    use Instruction::*;

    let nnn = opcode & NNN;
    let kk = (opcode & NN) as u8;
    let n = (opcode & N) as u8;
    let x = ((opcode & X) >> 8) as usize;
    let y = ((opcode & Y) >> 4) as usize;
    let schip = variant == Variant::SuperChip;

    let instruction = match (opcode & 0xf000) >> 12 {
        0x0 => match nnn {
            0x0e0 => ClearScreen,
            0x0ee => Return,
            0x0c0..=0x0cf if schip => ScrollDown { n },
            0x0fb if schip => ScrollRight,
            0x0fc if schip => ScrollLeft,
            0x0fd if schip => Exit,
            0x0fe if schip => LowRes,
            0x0ff if schip => HighRes,
            // machine code routines (0nnn) are not supported
            _ => return None,
        },
        0x1 => Jump { addr: nnn },
        0x2 => Call { addr: nnn },
        0x3 => SkipEqByte { x, kk },
        0x4 => SkipNeByte { x, kk },
        0x5 if n == 0 => SkipEqReg { x, y },
        0x6 => LoadByte { x, kk },
        0x7 => AddByte { x, kk },
        0x8 => match n {
            0x0 => Move { x, y },
            0x1 => Or { x, y },
            0x2 => And { x, y },
            0x3 => Xor { x, y },
            0x4 => Add { x, y },
            0x5 => Sub { x, y },
            0x6 => ShiftRight { x },
            0x7 => SubN { x, y },
            0xe => ShiftLeft { x },
            _ => return None,
        },
        0x9 if n == 0 => SkipNeReg { x, y },
        0xa => LoadI { addr: nnn },
        0xb => JumpV0 { addr: nnn },
        0xc => Random { x, kk },
        0xd => Draw { x, y, n },
        0xe => match kk {
            0x9e => SkipKey { x },
            0xa1 => SkipNotKey { x },
            _ => return None,
        },
        0xf => match kk {
            0x07 => LoadDelay { x },
            0x0a => WaitKey { x },
            0x15 => SetDelay { x },
            0x18 => SetSound { x },
            0x1e => AddI { x },
            0x29 => LoadFont { x },
            0x30 if schip => LoadLargeFont { x },
            0x33 => StoreBcd { x },
            0x55 => StoreRegs { x },
            0x65 => LoadRegs { x },
            // only eight RPL flags exist
            0x75 if schip && x < 8 => StoreFlags { x },
            0x85 if schip && x < 8 => LoadFlags { x },
            _ => return None,
        },
        _ => return None,
    };

    Some(instruction)
}
