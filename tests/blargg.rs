//! Blargg `cpu_instrs` conformance suite, observed through the serial
//! test hook. The suite is skipped when the ROM bundle can't be fetched.

mod common;

use dmg_core::cartridge::Cartridge;
use dmg_core::machine::Machine;

const CYCLE_LIMIT: u64 = 1_000_000_000;

fn run_blargg_rom(name: &str, expected_newlines: usize) {
    let Some(path) = common::blargg_cpu_instrs_rom(name) else {
        eprintln!("skipping {name}: test ROMs unavailable");
        return;
    };

    let mut machine = Machine::new();
    machine.load_cartridge(Cartridge::from_file(&path).expect("valid test ROM"));

    let mut output = Vec::new();
    let mut cycles = 0u64;
    loop {
        cycles += machine.step() as u64;
        output.extend(machine.bus.io_mut().serial.take_output());
        if output.iter().filter(|&&b| b == b'\n').count() >= expected_newlines {
            break;
        }
        assert!(
            cycles < CYCLE_LIMIT,
            "{name} timed out; serial output so far: {}",
            String::from_utf8_lossy(&output)
        );
    }

    let text = String::from_utf8_lossy(&output);
    println!("-------- {name} --------\n{text}");
    assert!(text.contains("Passed"), "{name} reported: {text}");
}

#[test]
fn blargg_01_special() {
    run_blargg_rom("01-special.gb", 4);
}

#[test]
fn blargg_02_interrupts() {
    run_blargg_rom("02-interrupts.gb", 4);
}

#[test]
fn blargg_03_op_sp_hl() {
    run_blargg_rom("03-op sp,hl.gb", 4);
}

#[test]
fn blargg_04_op_r_imm() {
    run_blargg_rom("04-op r,imm.gb", 4);
}

#[test]
fn blargg_05_op_rp() {
    run_blargg_rom("05-op rp.gb", 4);
}

#[test]
fn blargg_06_ld_r_r() {
    run_blargg_rom("06-ld r,r.gb", 4);
}

#[test]
fn blargg_07_jr_jp_call_ret_rst() {
    run_blargg_rom("07-jr,jp,call,ret,rst.gb", 4);
}

#[test]
fn blargg_08_misc_instrs() {
    run_blargg_rom("08-misc instrs.gb", 4);
}

#[test]
fn blargg_09_op_r_r() {
    run_blargg_rom("09-op r,r.gb", 4);
}

#[test]
fn blargg_10_bit_ops() {
    run_blargg_rom("10-bit ops.gb", 4);
}

#[test]
fn blargg_11_op_a_hl() {
    run_blargg_rom("11-op a,(hl).gb", 4);
}
