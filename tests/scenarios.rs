//! End-to-end runs through the public API, the way a host drives a machine.

use chip8_vm::{Button, ButtonConfig, Config, Fault, Machine, STACK_SIZE};

const T0: u32 = 50_000;

fn program(instrs: &[u16]) -> Vec<u8> {
    instrs.iter().flat_map(|instr| instr.to_be_bytes()).collect()
}

fn started(config: Config, instrs: &[u16]) -> Machine {
    let mut machine = Machine::with_seed(config, 42);
    machine.load_program(&program(instrs)).unwrap();
    machine.start(T0);
    machine
}

fn lit(machine: &Machine) -> usize {
    let mut count = 0;
    for y in 0..machine.screen_height() {
        for x in 0..machine.screen_width() {
            count += machine.pixel(x, y) as usize;
        }
    }
    count
}

#[test]
fn test_start_gives_default_state() {
    let mut machine = started(Config::default(), &[0x6aff, 0x1202]);

    machine.advance(T0).unwrap();

    assert_eq!(machine.pc(), 0x200);
    assert_eq!(machine.i(), 0);
    assert_eq!(machine.sp(), 0);
    assert_eq!(machine.v(), &[0; 16]);
    assert_eq!(machine.cpu_ticks(), 0);
    assert_eq!(machine.waiting_for_key(), None);
    assert!(!machine.is_tone_active());
    assert_eq!((machine.screen_width(), machine.screen_height()), (64, 32));
}

#[test]
fn test_single_clear_screen_tick() {
    let mut machine = started(Config::default(), &[0x00e0]);

    // only the tick at T0 is due
    machine.advance(T0 + 1).unwrap();

    assert_eq!(machine.cpu_ticks(), 1);
    assert_eq!(machine.pc(), 0x202);
    assert_eq!(lit(&machine), 0);
}

#[test]
fn test_clear_screen_after_filling_it() {
    // 8x8 all-ones sprite stored behind the code
    let mut instrs = vec![0xa300];
    for y in (0..32).step_by(8) {
        for x in (0..64).step_by(8) {
            instrs.extend([0x6000 | x, 0x6100 | y, 0xd018]);
        }
    }
    instrs.push(0x00e0);
    let mut machine = started(Config::default(), &instrs);
    for offset in 0..8 {
        machine.write_program_byte(0x100 + offset, 0xff).unwrap();
    }

    for _ in 0..instrs.len() - 1 {
        machine.step().unwrap();
    }
    assert_eq!(lit(&machine), 64 * 32);
    let pc = machine.pc();

    machine.step().unwrap();

    assert_eq!(lit(&machine), 0);
    assert_eq!(machine.pc(), pc + 2);
}

#[test]
fn test_one_second_runs_500_instructions() {
    let mut machine = started(Config::default(), &[0x1200]);

    machine.advance(T0 + 1000).unwrap();

    assert_eq!(machine.cpu_ticks(), 500);
    assert_eq!(machine.pc(), 0x200);
}

#[test]
fn test_configured_rate() {
    let mut machine = started(Config::default().with_cpu_hz(1000), &[0x1200]);

    machine.advance(T0 + 1000).unwrap();

    assert_eq!(machine.cpu_ticks(), 1000);
    assert_eq!(machine.timer_ticks(), 60);
}

#[test]
fn test_delay_timer_drops_60_per_second() {
    let mut machine = started(Config::default(), &[0x60ff, 0xf015, 0x1204]);
    machine.advance(T0 + 3).unwrap();
    assert_eq!(machine.delay_timer(), 255);

    machine.advance(T0 + 1003).unwrap();
    assert_eq!(machine.delay_timer(), 255 - 60);

    machine.advance(T0 + 10_000).unwrap();
    assert_eq!(machine.delay_timer(), 0);
}

#[test]
fn test_key_wait_resumes_on_key_press() {
    let mut machine = started(Config::default(), &[0xf70a, 0x1202]);

    machine.advance(T0 + 10).unwrap();
    assert_eq!(machine.waiting_for_key(), Some(7));
    assert_eq!(machine.pc(), 0x202);

    // nothing pressed, still suspended
    machine.advance(T0 + 20).unwrap();
    assert_eq!(machine.waiting_for_key(), Some(7));
    let ticks = machine.cpu_ticks();

    machine.set_keys(1 << 3);
    machine.advance(T0 + 30).unwrap();

    assert_eq!(machine.v()[7], 3);
    assert_eq!(machine.waiting_for_key(), None);
    assert_eq!(machine.cpu_ticks(), ticks);
}

#[test]
fn test_draw_twice_collides() {
    let mut machine = started(Config::default(), &[0xa208, 0xd011, 0xd011, 0x1206, 0xff00]);

    machine.step().unwrap();
    machine.step().unwrap();
    assert_eq!(lit(&machine), 8);
    assert_eq!(machine.v()[0xf], 0);

    machine.step().unwrap();
    assert_eq!(lit(&machine), 0);
    assert_eq!(machine.v()[0xf], 1);
    assert!(machine.take_redraw());
}

#[test]
fn test_256th_nested_call_overflows() {
    let mut machine = started(Config::default(), &[0x2200]);

    for _ in 0..STACK_SIZE {
        machine.step().unwrap();
    }

    assert_eq!(machine.step(), Err(Fault::StackOverflow { pc: 0x200, opcode: 0x2200 }));
}

#[test]
fn test_fault_surfaces_from_advance() {
    let mut machine = started(Config::default(), &[0x6001, 0x6102, 0x0000]);

    let fault = machine.advance(T0 + 1000).unwrap_err();

    assert_eq!(fault, Fault::UnknownOpcode { pc: 0x204, opcode: 0x0000 });
    assert_eq!(&machine.v()[..2], &[1, 2]);
    assert_eq!(machine.cpu_ticks(), 2);
}

#[test]
fn test_button_press_reaches_program() {
    // skip the jump-to-self while key 5 is down, then set V2
    let mut machine = started(Config::default(), &[0x6005, 0xe09e, 0x1202, 0x6201, 0x1208]);
    let buttons = ButtonConfig::default();

    machine.advance(T0 + 100).unwrap();
    assert_eq!(machine.v()[2], 0);

    machine.set_keys(buttons.keys_for(&[Button::Up]));
    machine.advance(T0 + 200).unwrap();

    assert_eq!(machine.v()[2], 1);
}

#[test]
fn test_super_chip_large_digit_in_high_res() {
    let mut machine = started(Config::super_chip(), &[0x00ff, 0x6009, 0xf030, 0xd11a]);

    for _ in 0..4 {
        machine.step().unwrap();
    }

    assert_eq!((machine.screen_width(), machine.screen_height()), (128, 64));
    // top row of the large 9 is 0x3C
    assert!(!machine.pixel(1, 0));
    assert!(machine.pixel(2, 0));
    assert!(machine.pixel(5, 0));
    assert!(!machine.pixel(6, 0));
}

#[test]
fn test_restart_runs_program_again() {
    let mut machine = started(Config::default(), &[0x7001, 0x1200]);
    machine.advance(T0 + 100).unwrap();
    assert_ne!(machine.v()[0], 0);

    machine.start(T0 + 100);
    machine.advance(T0 + 101).unwrap();

    assert_eq!(machine.v()[0], 1);
    assert_eq!(machine.cpu_ticks(), 1);
}
