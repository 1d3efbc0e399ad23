//! Per-opcode metadata shared by the executor and the trace disassembler.
//!
//! `cycles` is the not-taken cost; conditional branches add their taken
//! penalty in the executor. CB-prefixed opcodes are uniform (8 cycles, 16
//! via (HL)) and are described by [`cb_cycles`] / [`cb_mnemonic`] instead
//! of a second table.

pub struct Opcode {
    pub mnemonic: &'static str,
    pub length: u8,
    pub cycles: u32,
}

const fn op(mnemonic: &'static str, length: u8, cycles: u32) -> Opcode {
    Opcode { mnemonic, length, cycles }
}

/// Extra cycles when a conditional branch is taken.
pub const JR_TAKEN_EXTRA: u32 = 4;
pub const JP_TAKEN_EXTRA: u32 = 4;
pub const CALL_TAKEN_EXTRA: u32 = 12;
pub const RET_TAKEN_EXTRA: u32 = 12;

#[rustfmt::skip]
pub const OPCODES: [Opcode; 256] = [
    // 0x00
    op("NOP", 1, 4),           op("LD BC,d16", 3, 12),  op("LD (BC),A", 1, 8),   op("INC BC", 1, 8),
    op("INC B", 1, 4),         op("DEC B", 1, 4),       op("LD B,d8", 2, 8),     op("RLCA", 1, 4),
    op("LD (a16),SP", 3, 20),  op("ADD HL,BC", 1, 8),   op("LD A,(BC)", 1, 8),   op("DEC BC", 1, 8),
    op("INC C", 1, 4),         op("DEC C", 1, 4),       op("LD C,d8", 2, 8),     op("RRCA", 1, 4),
    // 0x10
    op("STOP", 2, 4),          op("LD DE,d16", 3, 12),  op("LD (DE),A", 1, 8),   op("INC DE", 1, 8),
    op("INC D", 1, 4),         op("DEC D", 1, 4),       op("LD D,d8", 2, 8),     op("RLA", 1, 4),
    op("JR r8", 2, 12),        op("ADD HL,DE", 1, 8),   op("LD A,(DE)", 1, 8),   op("DEC DE", 1, 8),
    op("INC E", 1, 4),         op("DEC E", 1, 4),       op("LD E,d8", 2, 8),     op("RRA", 1, 4),
    // 0x20
    op("JR NZ,r8", 2, 8),      op("LD HL,d16", 3, 12),  op("LD (HL+),A", 1, 8),  op("INC HL", 1, 8),
    op("INC H", 1, 4),         op("DEC H", 1, 4),       op("LD H,d8", 2, 8),     op("DAA", 1, 4),
    op("JR Z,r8", 2, 8),       op("ADD HL,HL", 1, 8),   op("LD A,(HL+)", 1, 8),  op("DEC HL", 1, 8),
    op("INC L", 1, 4),         op("DEC L", 1, 4),       op("LD L,d8", 2, 8),     op("CPL", 1, 4),
    // 0x30
    op("JR NC,r8", 2, 8),      op("LD SP,d16", 3, 12),  op("LD (HL-),A", 1, 8),  op("INC SP", 1, 8),
    op("INC (HL)", 1, 12),     op("DEC (HL)", 1, 12),   op("LD (HL),d8", 2, 12), op("SCF", 1, 4),
    op("JR C,r8", 2, 8),       op("ADD HL,SP", 1, 8),   op("LD A,(HL-)", 1, 8),  op("DEC SP", 1, 8),
    op("INC A", 1, 4),         op("DEC A", 1, 4),       op("LD A,d8", 2, 8),     op("CCF", 1, 4),
    // 0x40
    op("LD B,B", 1, 4),        op("LD B,C", 1, 4),      op("LD B,D", 1, 4),      op("LD B,E", 1, 4),
    op("LD B,H", 1, 4),        op("LD B,L", 1, 4),      op("LD B,(HL)", 1, 8),   op("LD B,A", 1, 4),
    op("LD C,B", 1, 4),        op("LD C,C", 1, 4),      op("LD C,D", 1, 4),      op("LD C,E", 1, 4),
    op("LD C,H", 1, 4),        op("LD C,L", 1, 4),      op("LD C,(HL)", 1, 8),   op("LD C,A", 1, 4),
    // 0x50
    op("LD D,B", 1, 4),        op("LD D,C", 1, 4),      op("LD D,D", 1, 4),      op("LD D,E", 1, 4),
    op("LD D,H", 1, 4),        op("LD D,L", 1, 4),      op("LD D,(HL)", 1, 8),   op("LD D,A", 1, 4),
    op("LD E,B", 1, 4),        op("LD E,C", 1, 4),      op("LD E,D", 1, 4),      op("LD E,E", 1, 4),
    op("LD E,H", 1, 4),        op("LD E,L", 1, 4),      op("LD E,(HL)", 1, 8),   op("LD E,A", 1, 4),
    // 0x60
    op("LD H,B", 1, 4),        op("LD H,C", 1, 4),      op("LD H,D", 1, 4),      op("LD H,E", 1, 4),
    op("LD H,H", 1, 4),        op("LD H,L", 1, 4),      op("LD H,(HL)", 1, 8),   op("LD H,A", 1, 4),
    op("LD L,B", 1, 4),        op("LD L,C", 1, 4),      op("LD L,D", 1, 4),      op("LD L,E", 1, 4),
    op("LD L,H", 1, 4),        op("LD L,L", 1, 4),      op("LD L,(HL)", 1, 8),   op("LD L,A", 1, 4),
    // 0x70
    op("LD (HL),B", 1, 8),     op("LD (HL),C", 1, 8),   op("LD (HL),D", 1, 8),   op("LD (HL),E", 1, 8),
    op("LD (HL),H", 1, 8),     op("LD (HL),L", 1, 8),   op("HALT", 1, 4),        op("LD (HL),A", 1, 8),
    op("LD A,B", 1, 4),        op("LD A,C", 1, 4),      op("LD A,D", 1, 4),      op("LD A,E", 1, 4),
    op("LD A,H", 1, 4),        op("LD A,L", 1, 4),      op("LD A,(HL)", 1, 8),   op("LD A,A", 1, 4),
    // 0x80
    op("ADD A,B", 1, 4),       op("ADD A,C", 1, 4),     op("ADD A,D", 1, 4),     op("ADD A,E", 1, 4),
    op("ADD A,H", 1, 4),       op("ADD A,L", 1, 4),     op("ADD A,(HL)", 1, 8),  op("ADD A,A", 1, 4),
    op("ADC A,B", 1, 4),       op("ADC A,C", 1, 4),     op("ADC A,D", 1, 4),     op("ADC A,E", 1, 4),
    op("ADC A,H", 1, 4),       op("ADC A,L", 1, 4),     op("ADC A,(HL)", 1, 8),  op("ADC A,A", 1, 4),
    // 0x90
    op("SUB B", 1, 4),         op("SUB C", 1, 4),       op("SUB D", 1, 4),       op("SUB E", 1, 4),
    op("SUB H", 1, 4),         op("SUB L", 1, 4),       op("SUB (HL)", 1, 8),    op("SUB A", 1, 4),
    op("SBC A,B", 1, 4),       op("SBC A,C", 1, 4),     op("SBC A,D", 1, 4),     op("SBC A,E", 1, 4),
    op("SBC A,H", 1, 4),       op("SBC A,L", 1, 4),     op("SBC A,(HL)", 1, 8),  op("SBC A,A", 1, 4),
    // 0xA0
    op("AND B", 1, 4),         op("AND C", 1, 4),       op("AND D", 1, 4),       op("AND E", 1, 4),
    op("AND H", 1, 4),         op("AND L", 1, 4),       op("AND (HL)", 1, 8),    op("AND A", 1, 4),
    op("XOR B", 1, 4),         op("XOR C", 1, 4),       op("XOR D", 1, 4),       op("XOR E", 1, 4),
    op("XOR H", 1, 4),         op("XOR L", 1, 4),       op("XOR (HL)", 1, 8),    op("XOR A", 1, 4),
    // 0xB0
    op("OR B", 1, 4),          op("OR C", 1, 4),        op("OR D", 1, 4),        op("OR E", 1, 4),
    op("OR H", 1, 4),          op("OR L", 1, 4),        op("OR (HL)", 1, 8),     op("OR A", 1, 4),
    op("CP B", 1, 4),          op("CP C", 1, 4),        op("CP D", 1, 4),        op("CP E", 1, 4),
    op("CP H", 1, 4),          op("CP L", 1, 4),        op("CP (HL)", 1, 8),     op("CP A", 1, 4),
    // 0xC0
    op("RET NZ", 1, 8),        op("POP BC", 1, 12),     op("JP NZ,a16", 3, 12),  op("JP a16", 3, 16),
    op("CALL NZ,a16", 3, 12),  op("PUSH BC", 1, 16),    op("ADD A,d8", 2, 8),    op("RST 00H", 1, 16),
    op("RET Z", 1, 8),         op("RET", 1, 16),        op("JP Z,a16", 3, 12),   op("PREFIX CB", 2, 4),
    op("CALL Z,a16", 3, 12),   op("CALL a16", 3, 24),   op("ADC A,d8", 2, 8),    op("RST 08H", 1, 16),
    // 0xD0
    op("RET NC", 1, 8),        op("POP DE", 1, 12),     op("JP NC,a16", 3, 12),  op("??", 1, 4),
    op("CALL NC,a16", 3, 12),  op("PUSH DE", 1, 16),    op("SUB d8", 2, 8),      op("RST 10H", 1, 16),
    op("RET C", 1, 8),         op("RETI", 1, 16),       op("JP C,a16", 3, 12),   op("??", 1, 4),
    op("CALL C,a16", 3, 12),   op("??", 1, 4),          op("SBC A,d8", 2, 8),    op("RST 18H", 1, 16),
    // 0xE0
    op("LDH (a8),A", 2, 12),   op("POP HL", 1, 12),     op("LD (C),A", 1, 8),    op("??", 1, 4),
    op("??", 1, 4),            op("PUSH HL", 1, 16),    op("AND d8", 2, 8),      op("RST 20H", 1, 16),
    op("ADD SP,r8", 2, 16),    op("JP (HL)", 1, 4),     op("LD (a16),A", 3, 16), op("??", 1, 4),
    op("??", 1, 4),            op("??", 1, 4),          op("XOR d8", 2, 8),      op("RST 28H", 1, 16),
    // 0xF0
    op("LDH A,(a8)", 2, 12),   op("POP AF", 1, 12),     op("LD A,(C)", 1, 8),    op("DI", 1, 4),
    op("??", 1, 4),            op("PUSH AF", 1, 16),    op("OR d8", 2, 8),       op("RST 30H", 1, 16),
    op("LD HL,SP+r8", 2, 12),  op("LD SP,HL", 1, 8),    op("LD A,(a16)", 3, 16), op("??", 1, 4),
    op("??", 1, 4),            op("??", 1, 4),          op("CP d8", 2, 8),       op("RST 38H", 1, 16),
];

/// Opcodes the LR35902 leaves undefined.
pub fn is_undefined(opcode: u8) -> bool {
    OPCODES[opcode as usize].mnemonic == "??"
}

const CB_REG_NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

pub fn cb_cycles(ext: u8) -> u32 {
    if ext & 0x07 == 6 { 16 } else { 8 }
}

pub fn cb_mnemonic(ext: u8) -> String {
    let reg = CB_REG_NAMES[(ext & 0x07) as usize];
    let bit = (ext >> 3) & 0x07;
    match ext {
        0x00..=0x07 => format!("RLC {reg}"),
        0x08..=0x0F => format!("RRC {reg}"),
        0x10..=0x17 => format!("RL {reg}"),
        0x18..=0x1F => format!("RR {reg}"),
        0x20..=0x27 => format!("SLA {reg}"),
        0x28..=0x2F => format!("SRA {reg}"),
        0x30..=0x37 => format!("SWAP {reg}"),
        0x38..=0x3F => format!("SRL {reg}"),
        0x40..=0x7F => format!("BIT {bit},{reg}"),
        0x80..=0xBF => format!("RES {bit},{reg}"),
        _ => format!("SET {bit},{reg}"),
    }
}

/// Render one fetched instruction as text, substituting its operands.
pub fn disassemble(opcode: u8, params: [u8; 2]) -> String {
    if opcode == 0xCB {
        return cb_mnemonic(params[0]);
    }
    let info = &OPCODES[opcode as usize];
    let mn = info.mnemonic;
    if let Some(pos) = mn.find("d16").or_else(|| mn.find("a16")) {
        let val = u16::from_le_bytes(params);
        return format!("{}{val:#06X}{}", &mn[..pos], &mn[pos + 3..]);
    }
    if let Some(pos) = mn.find("d8").or_else(|| mn.find("a8")) {
        return format!("{}{:#04X}{}", &mn[..pos], params[0], &mn[pos + 2..]);
    }
    if let Some(pos) = mn.find("r8") {
        return format!("{}{:+}{}", &mn[..pos], params[0] as i8, &mn[pos + 2..]);
    }
    mn.to_string()
}
