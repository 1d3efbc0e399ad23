use crate::bus::Bus;
use crate::interrupts::Interrupt;
use crate::opcodes::{self, OPCODES};

// CPU flag bits as documented in gbdev.io/pandocs/The_CPU_Flags.html
pub const FLAG_Z: u8 = 0x80; // Zero
pub const FLAG_N: u8 = 0x40; // Subtract
pub const FLAG_H: u8 = 0x20; // Half Carry
pub const FLAG_C: u8 = 0x10; // Carry

// Post-boot CPU state from gbdev.io/pandocs/Power_Up_State.html
const BOOT_PC: u16 = 0x0100;
const BOOT_SP: u16 = 0xFFFE;

// Servicing an interrupt takes 5 machine cycles.
const INTERRUPT_DISPATCH_CYCLES: u32 = 20;

pub struct Cpu {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub pc: u16,
    pub sp: u16,
    pub halted: bool,
    pub stopped: bool,
    cycles: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            a: 0x01,
            f: 0x00,
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            pc: BOOT_PC,
            sp: BOOT_SP,
            halted: false,
            stopped: false,
            cycles: 0,
        }
    }

    /// Total cycles consumed since power-on.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn get_bc(&self) -> u16 {
        ((self.b as u16) << 8) | self.c as u16
    }

    pub fn set_bc(&mut self, val: u16) {
        self.b = (val >> 8) as u8;
        self.c = val as u8;
    }

    pub fn get_de(&self) -> u16 {
        ((self.d as u16) << 8) | self.e as u16
    }

    pub fn set_de(&mut self, val: u16) {
        self.d = (val >> 8) as u8;
        self.e = val as u8;
    }

    pub fn get_hl(&self) -> u16 {
        ((self.h as u16) << 8) | self.l as u16
    }

    pub fn set_hl(&mut self, val: u16) {
        self.h = (val >> 8) as u8;
        self.l = val as u8;
    }

    pub fn get_af(&self) -> u16 {
        ((self.a as u16) << 8) | self.f as u16
    }

    pub fn set_af(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        // The low nibble of F does not exist in hardware.
        self.f = val as u8 & 0xF0;
    }

    /// Execute one instruction (or service one interrupt, or idle while
    /// halted) and return its cycle cost. The caller feeds that cost to the
    /// timer and PPU, so interrupts those units raise become visible at the
    /// start of the next step.
    pub fn step(&mut self, bus: &mut Bus) -> u32 {
        let scheduled_before = bus.io().interrupts.ime_scheduled();
        let mut cycles = 0u32;

        // A pending interrupt ends HALT even with IME off.
        if self.halted && bus.io().interrupts.pending() {
            self.halted = false;
        }

        if let Some(intr) = bus.io().interrupts.ready() {
            cycles += INTERRUPT_DISPATCH_CYCLES;
            self.halted = false;
            if self.stopped && intr == Interrupt::Joypad {
                self.stopped = false;
                bus.io_mut().timer.resume_div();
            }
            self.push_word(bus, self.pc);
            self.pc = intr.vector();
            let io = bus.io_mut();
            io.interrupts.disable();
            io.interrupts.acknowledge(intr);
        }

        if self.halted || self.stopped {
            // Idle as an implicit NOP.
            cycles += 4;
        } else {
            let opcode = bus.read_byte(self.pc);
            let info = &OPCODES[opcode as usize];
            let mut params = [0u8; 2];
            for i in 0..info.length as u16 - 1 {
                params[i as usize] = bus.read_byte(self.pc.wrapping_add(1 + i));
            }
            #[cfg(feature = "cpu-trace")]
            log::trace!(
                target: "cpu",
                "{:04X}: {}",
                self.pc,
                opcodes::disassemble(opcode, params)
            );
            self.pc = self.pc.wrapping_add(info.length as u16);
            cycles += info.cycles;
            cycles += self.exec(opcode, params, bus);
        }

        bus.io_mut().interrupts.commit_schedule(scheduled_before);
        self.cycles += cycles as u64;
        cycles
    }

    /// Execute a decoded instruction. Returns the cycles it costs beyond
    /// the table's base value (taken branches and CB-prefixed ops).
    fn exec(&mut self, opcode: u8, params: [u8; 2], bus: &mut Bus) -> u32 {
        let d8 = params[0];
        let d16 = u16::from_le_bytes(params);

        match opcode {
            0x00 => {} // NOP
            0x01 => self.set_bc(d16),
            0x02 => bus.write_byte(self.get_bc(), self.a),
            0x03 => self.set_bc(self.get_bc().wrapping_add(1)),
            0x04 => self.b = self.inc8(self.b),
            0x05 => self.b = self.dec8(self.b),
            0x06 => self.b = d8,
            0x07 => self.a = self.rlc(self.a, false),
            0x08 => bus.write_word(d16, self.sp),
            0x09 => self.add_hl(self.get_bc()),
            0x0A => self.a = bus.read_byte(self.get_bc()),
            0x0B => self.set_bc(self.get_bc().wrapping_sub(1)),
            0x0C => self.c = self.inc8(self.c),
            0x0D => self.c = self.dec8(self.c),
            0x0E => self.c = d8,
            0x0F => self.a = self.rrc(self.a, false),

            0x10 => {
                self.stopped = true;
                bus.io_mut().timer.stop_div();
            }
            0x11 => self.set_de(d16),
            0x12 => bus.write_byte(self.get_de(), self.a),
            0x13 => self.set_de(self.get_de().wrapping_add(1)),
            0x14 => self.d = self.inc8(self.d),
            0x15 => self.d = self.dec8(self.d),
            0x16 => self.d = d8,
            0x17 => self.a = self.rl(self.a, false),
            0x18 => self.pc = self.pc.wrapping_add(d8 as i8 as u16),
            0x19 => self.add_hl(self.get_de()),
            0x1A => self.a = bus.read_byte(self.get_de()),
            0x1B => self.set_de(self.get_de().wrapping_sub(1)),
            0x1C => self.e = self.inc8(self.e),
            0x1D => self.e = self.dec8(self.e),
            0x1E => self.e = d8,
            0x1F => self.a = self.rr(self.a, false),

            0x20 => return self.jr_cond(self.f & FLAG_Z == 0, d8),
            0x21 => self.set_hl(d16),
            0x22 => {
                bus.write_byte(self.get_hl(), self.a);
                self.set_hl(self.get_hl().wrapping_add(1));
            }
            0x23 => self.set_hl(self.get_hl().wrapping_add(1)),
            0x24 => self.h = self.inc8(self.h),
            0x25 => self.h = self.dec8(self.h),
            0x26 => self.h = d8,
            0x27 => self.daa(),
            0x28 => return self.jr_cond(self.f & FLAG_Z != 0, d8),
            0x29 => self.add_hl(self.get_hl()),
            0x2A => {
                self.a = bus.read_byte(self.get_hl());
                self.set_hl(self.get_hl().wrapping_add(1));
            }
            0x2B => self.set_hl(self.get_hl().wrapping_sub(1)),
            0x2C => self.l = self.inc8(self.l),
            0x2D => self.l = self.dec8(self.l),
            0x2E => self.l = d8,
            0x2F => {
                self.a = !self.a;
                self.f |= FLAG_N | FLAG_H;
            }

            0x30 => return self.jr_cond(self.f & FLAG_C == 0, d8),
            0x31 => self.sp = d16,
            0x32 => {
                bus.write_byte(self.get_hl(), self.a);
                self.set_hl(self.get_hl().wrapping_sub(1));
            }
            0x33 => self.sp = self.sp.wrapping_add(1),
            0x34 => {
                let val = self.inc8(bus.read_byte(self.get_hl()));
                bus.write_byte(self.get_hl(), val);
            }
            0x35 => {
                let val = self.dec8(bus.read_byte(self.get_hl()));
                bus.write_byte(self.get_hl(), val);
            }
            0x36 => bus.write_byte(self.get_hl(), d8),
            0x37 => self.f = (self.f & FLAG_Z) | FLAG_C,
            0x38 => return self.jr_cond(self.f & FLAG_C != 0, d8),
            0x39 => self.add_hl(self.sp),
            0x3A => {
                self.a = bus.read_byte(self.get_hl());
                self.set_hl(self.get_hl().wrapping_sub(1));
            }
            0x3B => self.sp = self.sp.wrapping_sub(1),
            0x3C => self.a = self.inc8(self.a),
            0x3D => self.a = self.dec8(self.a),
            0x3E => self.a = d8,
            0x3F => self.f = (self.f & FLAG_Z) | ((self.f & FLAG_C) ^ FLAG_C),

            0x76 => self.halted = true,
            // LD r,r'
            0x40..=0x7F => {
                let val = self.read_reg(opcode & 0x07, bus);
                self.write_reg((opcode >> 3) & 0x07, val, bus);
            }

            // ALU A,r
            0x80..=0xBF => {
                let val = self.read_reg(opcode & 0x07, bus);
                self.alu((opcode >> 3) & 0x07, val);
            }

            0xC0 => return self.ret_cond(self.f & FLAG_Z == 0, bus),
            0xC1 => {
                let val = self.pop_word(bus);
                self.set_bc(val);
            }
            0xC2 => return self.jp_cond(self.f & FLAG_Z == 0, d16),
            0xC3 => self.pc = d16,
            0xC4 => return self.call_cond(self.f & FLAG_Z == 0, d16, bus),
            0xC5 => self.push_word(bus, self.get_bc()),
            0xC6 => self.alu(0, d8),
            0xC8 => return self.ret_cond(self.f & FLAG_Z != 0, bus),
            0xC9 => self.pc = self.pop_word(bus),
            0xCA => return self.jp_cond(self.f & FLAG_Z != 0, d16),
            0xCB => return self.exec_cb(d8, bus),
            0xCC => return self.call_cond(self.f & FLAG_Z != 0, d16, bus),
            0xCD => {
                self.push_word(bus, self.pc);
                self.pc = d16;
            }
            0xCE => self.alu(1, d8),

            0xD0 => return self.ret_cond(self.f & FLAG_C == 0, bus),
            0xD1 => {
                let val = self.pop_word(bus);
                self.set_de(val);
            }
            0xD2 => return self.jp_cond(self.f & FLAG_C == 0, d16),
            0xD4 => return self.call_cond(self.f & FLAG_C == 0, d16, bus),
            0xD5 => self.push_word(bus, self.get_de()),
            0xD6 => self.alu(2, d8),
            0xD8 => return self.ret_cond(self.f & FLAG_C != 0, bus),
            0xD9 => {
                self.pc = self.pop_word(bus);
                bus.io_mut().interrupts.enable_now();
            }
            0xDA => return self.jp_cond(self.f & FLAG_C != 0, d16),
            0xDC => return self.call_cond(self.f & FLAG_C != 0, d16, bus),
            0xDE => self.alu(3, d8),

            0xE0 => bus.write_byte(0xFF00 + d8 as u16, self.a),
            0xE1 => {
                let val = self.pop_word(bus);
                self.set_hl(val);
            }
            0xE2 => bus.write_byte(0xFF00 + self.c as u16, self.a),
            0xE5 => self.push_word(bus, self.get_hl()),
            0xE6 => self.alu(4, d8),
            0xE8 => self.sp = self.add_sp_signed(d8),
            0xE9 => self.pc = self.get_hl(),
            0xEA => bus.write_byte(d16, self.a),
            0xEE => self.alu(5, d8),

            0xF0 => self.a = bus.read_byte(0xFF00 + d8 as u16),
            0xF1 => {
                let val = self.pop_word(bus);
                self.set_af(val);
            }
            0xF2 => self.a = bus.read_byte(0xFF00 + self.c as u16),
            0xF3 => bus.io_mut().interrupts.disable(),
            0xF5 => self.push_word(bus, self.get_af()),
            0xF6 => self.alu(6, d8),
            0xF8 => {
                let val = self.add_sp_signed(d8);
                self.set_hl(val);
            }
            0xF9 => self.sp = self.get_hl(),
            0xFA => self.a = bus.read_byte(d16),
            0xFB => bus.io_mut().interrupts.schedule_enable(),
            0xFE => self.alu(7, d8),

            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.push_word(bus, self.pc);
                self.pc = (opcode & 0x38) as u16;
            }

            _ => {
                // Undefined encodings execute as a logged no-op.
                log::warn!(
                    target: "cpu",
                    "undefined opcode {opcode:#04X} at {:#06X}",
                    self.pc.wrapping_sub(1)
                );
            }
        }
        0
    }

    fn exec_cb(&mut self, ext: u8, bus: &mut Bus) -> u32 {
        let reg = ext & 0x07;
        let bit = (ext >> 3) & 0x07;
        match ext {
            0x00..=0x07 => {
                let val = self.read_reg(reg, bus);
                let res = self.rlc(val, true);
                self.write_reg(reg, res, bus);
            }
            0x08..=0x0F => {
                let val = self.read_reg(reg, bus);
                let res = self.rrc(val, true);
                self.write_reg(reg, res, bus);
            }
            0x10..=0x17 => {
                let val = self.read_reg(reg, bus);
                let res = self.rl(val, true);
                self.write_reg(reg, res, bus);
            }
            0x18..=0x1F => {
                let val = self.read_reg(reg, bus);
                let res = self.rr(val, true);
                self.write_reg(reg, res, bus);
            }
            0x20..=0x27 => {
                let val = self.read_reg(reg, bus);
                let res = val << 1;
                self.set_shift_flags(res, val & 0x80 != 0);
                self.write_reg(reg, res, bus);
            }
            0x28..=0x2F => {
                let val = self.read_reg(reg, bus);
                let res = (val >> 1) | (val & 0x80);
                self.set_shift_flags(res, val & 0x01 != 0);
                self.write_reg(reg, res, bus);
            }
            0x30..=0x37 => {
                let val = self.read_reg(reg, bus);
                let res = val.rotate_left(4);
                self.f = if res == 0 { FLAG_Z } else { 0 };
                self.write_reg(reg, res, bus);
            }
            0x38..=0x3F => {
                let val = self.read_reg(reg, bus);
                let res = val >> 1;
                self.set_shift_flags(res, val & 0x01 != 0);
                self.write_reg(reg, res, bus);
            }
            // BIT: Z from the complement of the tested bit, C untouched.
            0x40..=0x7F => {
                let val = self.read_reg(reg, bus);
                self.f = (self.f & FLAG_C)
                    | FLAG_H
                    | if val & (1 << bit) == 0 { FLAG_Z } else { 0 };
            }
            0x80..=0xBF => {
                let val = self.read_reg(reg, bus);
                self.write_reg(reg, val & !(1 << bit), bus);
            }
            0xC0..=0xFF => {
                let val = self.read_reg(reg, bus);
                self.write_reg(reg, val | (1 << bit), bus);
            }
        }
        // The table carries the prefix fetch; the rest is per-operand.
        opcodes::cb_cycles(ext) - 4
    }

    fn read_reg(&self, idx: u8, bus: &Bus) -> u8 {
        match idx {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => bus.read_byte(self.get_hl()),
            _ => self.a,
        }
    }

    fn write_reg(&mut self, idx: u8, val: u8, bus: &mut Bus) {
        match idx {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            6 => bus.write_byte(self.get_hl(), val),
            _ => self.a = val,
        }
    }

    fn alu(&mut self, op: u8, val: u8) {
        match op {
            0 => self.add_a(val, false),
            1 => self.add_a(val, true),
            2 => self.sub_a(val, false, true),
            3 => self.sub_a(val, true, true),
            4 => {
                self.a &= val;
                self.f = if self.a == 0 { FLAG_Z } else { 0 } | FLAG_H;
            }
            5 => {
                self.a ^= val;
                self.f = if self.a == 0 { FLAG_Z } else { 0 };
            }
            6 => {
                self.a |= val;
                self.f = if self.a == 0 { FLAG_Z } else { 0 };
            }
            _ => self.sub_a(val, false, false),
        }
    }

    fn add_a(&mut self, val: u8, with_carry: bool) {
        let carry = (with_carry && self.f & FLAG_C != 0) as u8;
        let result = self.a as u16 + val as u16 + carry as u16;
        let half = (self.a & 0x0F) + (val & 0x0F) + carry > 0x0F;
        self.a = result as u8;
        self.f = if self.a == 0 { FLAG_Z } else { 0 }
            | if half { FLAG_H } else { 0 }
            | if result > 0xFF { FLAG_C } else { 0 };
    }

    fn sub_a(&mut self, val: u8, with_carry: bool, store: bool) {
        let borrow = (with_carry && self.f & FLAG_C != 0) as u8;
        let result = (self.a as i16) - (val as i16) - (borrow as i16);
        let half = (self.a & 0x0F) < (val & 0x0F) + borrow;
        let out = result as u8;
        self.f = FLAG_N
            | if out == 0 { FLAG_Z } else { 0 }
            | if half { FLAG_H } else { 0 }
            | if result < 0 { FLAG_C } else { 0 };
        if store {
            self.a = out;
        }
    }

    fn inc8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.f = (self.f & FLAG_C)
            | if result == 0 { FLAG_Z } else { 0 }
            | if val & 0x0F == 0x0F { FLAG_H } else { 0 };
        result
    }

    fn dec8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.f = (self.f & FLAG_C)
            | FLAG_N
            | if result == 0 { FLAG_Z } else { 0 }
            | if val & 0x0F == 0 { FLAG_H } else { 0 };
        result
    }

    fn add_hl(&mut self, val: u16) {
        let hl = self.get_hl();
        let result = hl as u32 + val as u32;
        self.f = (self.f & FLAG_Z)
            | if (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF { FLAG_H } else { 0 }
            | if result > 0xFFFF { FLAG_C } else { 0 };
        self.set_hl(result as u16);
    }

    /// ADD SP,r8 and LD HL,SP+r8: the offset is signed but H and C come
    /// from the unsigned 8-bit adds at bits 3 and 7.
    fn add_sp_signed(&mut self, offset: u8) -> u16 {
        let result = self.sp.wrapping_add(offset as i8 as u16);
        let half = (self.sp & 0x0F) + (offset as u16 & 0x0F) > 0x0F;
        let carry = (self.sp & 0xFF) + (offset as u16 & 0xFF) > 0xFF;
        self.f = if half { FLAG_H } else { 0 } | if carry { FLAG_C } else { 0 };
        result
    }

    fn daa(&mut self) {
        let mut carry = self.f & FLAG_C != 0;
        if self.f & FLAG_N == 0 {
            let mut adjust = 0u8;
            if self.f & FLAG_H != 0 || self.a & 0x0F > 0x09 {
                adjust |= 0x06;
            }
            if carry || self.a > 0x99 {
                adjust |= 0x60;
                carry = true;
            }
            self.a = self.a.wrapping_add(adjust);
        } else {
            let mut adjust = 0u8;
            if self.f & FLAG_H != 0 {
                adjust |= 0x06;
            }
            if carry {
                adjust |= 0x60;
            }
            self.a = self.a.wrapping_sub(adjust);
        }
        self.f = (self.f & FLAG_N)
            | if self.a == 0 { FLAG_Z } else { 0 }
            | if carry { FLAG_C } else { 0 };
    }

    // The accumulator rotates (RLCA etc.) always clear Z; the CB forms
    // compute it.
    fn rlc(&mut self, val: u8, calc_z: bool) -> u8 {
        let result = val.rotate_left(1);
        self.set_rotate_flags(result, val & 0x80 != 0, calc_z);
        result
    }

    fn rrc(&mut self, val: u8, calc_z: bool) -> u8 {
        let result = val.rotate_right(1);
        self.set_rotate_flags(result, val & 0x01 != 0, calc_z);
        result
    }

    fn rl(&mut self, val: u8, calc_z: bool) -> u8 {
        let carry_in = (self.f & FLAG_C != 0) as u8;
        let result = (val << 1) | carry_in;
        self.set_rotate_flags(result, val & 0x80 != 0, calc_z);
        result
    }

    fn rr(&mut self, val: u8, calc_z: bool) -> u8 {
        let carry_in = (self.f & FLAG_C != 0) as u8;
        let result = (val >> 1) | (carry_in << 7);
        self.set_rotate_flags(result, val & 0x01 != 0, calc_z);
        result
    }

    fn set_rotate_flags(&mut self, result: u8, carry: bool, calc_z: bool) {
        self.f = if calc_z && result == 0 { FLAG_Z } else { 0 }
            | if carry { FLAG_C } else { 0 };
    }

    fn set_shift_flags(&mut self, result: u8, carry: bool) {
        self.f = if result == 0 { FLAG_Z } else { 0 } | if carry { FLAG_C } else { 0 };
    }

    // Stack grows downward; the high byte lands at the higher address.
    fn push_word(&mut self, bus: &mut Bus, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        bus.write_byte(self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        bus.write_byte(self.sp, val as u8);
    }

    fn pop_word(&mut self, bus: &Bus) -> u16 {
        let lo = bus.read_byte(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let hi = bus.read_byte(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    // Conditional branches consume their operands either way; taking the
    // branch adds the documented penalty.
    fn jr_cond(&mut self, cond: bool, offset: u8) -> u32 {
        if cond {
            self.pc = self.pc.wrapping_add(offset as i8 as u16);
            opcodes::JR_TAKEN_EXTRA
        } else {
            0
        }
    }

    fn jp_cond(&mut self, cond: bool, addr: u16) -> u32 {
        if cond {
            self.pc = addr;
            opcodes::JP_TAKEN_EXTRA
        } else {
            0
        }
    }

    fn call_cond(&mut self, cond: bool, addr: u16, bus: &mut Bus) -> u32 {
        if cond {
            self.push_word(bus, self.pc);
            self.pc = addr;
            opcodes::CALL_TAKEN_EXTRA
        } else {
            0
        }
    }

    fn ret_cond(&mut self, cond: bool, bus: &Bus) -> u32 {
        if cond {
            self.pc = self.pop_word(bus);
            opcodes::RET_TAKEN_EXTRA
        } else {
            0
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cpu, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};
    use crate::bus::Bus;

    fn run_one(cpu: &mut Cpu, bus: &mut Bus, code: &[u8]) -> u32 {
        for (i, &byte) in code.iter().enumerate() {
            bus.write_byte(cpu.pc.wrapping_add(i as u16), byte);
        }
        cpu.step(bus)
    }

    #[test]
    fn post_boot_register_state() {
        let cpu = Cpu::new();
        assert_eq!(cpu.pc, 0x0100);
        assert_eq!(cpu.sp, 0xFFFE);
        assert_eq!(cpu.get_af(), 0x0100);
        assert_eq!(cpu.get_bc(), 0x0013);
        assert_eq!(cpu.get_de(), 0x00D8);
        assert_eq!(cpu.get_hl(), 0x014D);
    }

    #[test]
    fn rlca_rotates_through_bit7_without_z() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        cpu.a = 0x80;
        run_one(&mut cpu, &mut bus, &[0x07]);
        assert_eq!(cpu.a, 0x01);
        assert_eq!(cpu.f, FLAG_C);

        // A rotate producing zero still leaves Z clear.
        cpu.a = 0x00;
        run_one(&mut cpu, &mut bus, &[0x07]);
        assert_eq!(cpu.f, 0);
    }

    #[test]
    fn sub_immediate_flags() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        cpu.a = 0xD6;
        run_one(&mut cpu, &mut bus, &[0xD6, 0xDE]);
        assert_eq!(cpu.a, 0xF8);
        assert_eq!(cpu.f, FLAG_N | FLAG_H | FLAG_C);
    }

    #[test]
    fn pop_af_masks_the_low_nibble() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        cpu.sp = 0xD000;
        bus.write_word(0xD000, 0x12FF);
        run_one(&mut cpu, &mut bus, &[0xF1]);
        assert_eq!(cpu.get_af(), 0x12F0);
    }

    #[test]
    fn daa_after_bcd_addition() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        // 0x15 + 0x27 = 0x3C, DAA corrects to 0x42.
        cpu.a = 0x15;
        cpu.b = 0x27;
        run_one(&mut cpu, &mut bus, &[0x80]);
        run_one(&mut cpu, &mut bus, &[0x27]);
        assert_eq!(cpu.a, 0x42);
        assert_eq!(cpu.f & FLAG_N, 0);
    }

    #[test]
    fn bit_test_preserves_carry() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        cpu.b = 0x00;
        cpu.f = FLAG_C;
        // BIT 3,B
        let cycles = run_one(&mut cpu, &mut bus, &[0xCB, 0x58]);
        assert_eq!(cycles, 8);
        assert_eq!(cpu.f, FLAG_Z | FLAG_H | FLAG_C);
    }

    #[test]
    fn conditional_jr_cycle_counts() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        cpu.f = 0;

        // JR NZ,+2 taken.
        let cycles = run_one(&mut cpu, &mut bus, &[0x20, 0x02]);
        assert_eq!(cycles, 12);
        assert_eq!(cpu.pc, 0xC004);

        // JR Z,+2 not taken: operand still consumed.
        let cycles = run_one(&mut cpu, &mut bus, &[0x28, 0x02]);
        assert_eq!(cycles, 8);
        assert_eq!(cpu.pc, 0xC006);
    }

    #[test]
    fn undefined_opcode_is_a_four_cycle_noop() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        let cycles = run_one(&mut cpu, &mut bus, &[0xD3]);
        assert_eq!(cycles, 4);
        assert_eq!(cpu.pc, 0xC001);
    }

    #[test]
    fn halt_idles_until_an_interrupt_is_pending() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.pc = 0xC000;
        bus.io_mut().interrupts.if_reg = 0;
        bus.io_mut().interrupts.ie_reg = 0x04;

        run_one(&mut cpu, &mut bus, &[0x76]);
        assert!(cpu.halted);
        assert_eq!(cpu.step(&mut bus), 4);
        assert_eq!(cpu.pc, 0xC001);

        // Pending interrupt wakes the CPU even with IME off; with IME off
        // it is not dispatched, execution just continues.
        bus.io_mut().interrupts.if_reg = 0x04;
        bus.write_byte(0xC001, 0x00);
        cpu.step(&mut bus);
        assert!(!cpu.halted);
        assert_eq!(cpu.pc, 0xC002);
    }
}
