use crate::diagnostics;
use crate::interrupts::{Interrupt, Interrupts};

pub trait LinkPort: Send {
    /// Transfer a byte over the link. Returns the byte received from the
    /// partner. Implementations may perform the transfer immediately.
    fn transfer(&mut self, byte: u8) -> u8;
}

/// A stub link port used when no cable is attached.
/// By default it emulates a "line dead" scenario where incoming bits are all 1,
/// so any transfer receives 0xFF. When `loopback` is true the sent byte is
/// echoed back instead.
#[derive(Default)]
pub struct NullLinkPort {
    loopback: bool,
}

impl NullLinkPort {
    pub fn new(loopback: bool) -> Self {
        Self { loopback }
    }
}

impl LinkPort for NullLinkPort {
    fn transfer(&mut self, byte: u8) -> u8 {
        if self.loopback { byte } else { 0xFF }
    }
}

/// SB/SC serial registers with the test-ROM transfer hook.
///
/// Writing 0x81 to SC completes the transfer immediately: the SB byte is
/// pushed to the output buffer, SB takes the partner's reply, SC bit 7
/// clears, and the Serial interrupt is raised. Conformance ROMs report
/// results one character at a time this way; completed lines are also
/// forwarded to the diagnostics sink.
pub struct Serial {
    sb: u8,
    sc: u8,
    out_buf: Vec<u8>,
    line_buf: String,
    port: Box<dyn LinkPort + Send>,
}

impl Serial {
    pub fn new() -> Self {
        Self {
            sb: 0,
            sc: 0x7E,
            out_buf: Vec::new(),
            line_buf: String::new(),
            port: Box::new(NullLinkPort::default()),
        }
    }

    pub fn connect(&mut self, port: Box<dyn LinkPort + Send>) {
        self.port = port;
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF01 => self.sb,
            0xFF02 => self.sc | 0x7E,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8, interrupts: &mut Interrupts) {
        match addr {
            0xFF01 => self.sb = val,
            0xFF02 => {
                self.sc = val;
                // Internal-clock transfer start: complete it at once.
                if val == 0x81 {
                    let outgoing = self.sb;
                    self.out_buf.push(outgoing);
                    self.emit_text(outgoing);
                    self.sb = self.port.transfer(outgoing);
                    self.sc &= 0x7F;
                    interrupts.signal(Interrupt::Serial);
                }
            }
            _ => {}
        }
    }

    /// Drain everything the program has written out over the link.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.out_buf)
    }

    pub fn peek_output(&self) -> &[u8] {
        &self.out_buf
    }

    fn emit_text(&mut self, byte: u8) {
        if byte == b'\n' {
            diagnostics::emit_serial_line(&self.line_buf);
            self.line_buf.clear();
        } else if byte.is_ascii() && !byte.is_ascii_control() {
            self.line_buf.push(byte as char);
        }
    }
}

impl Default for Serial {
    fn default() -> Self {
        Self::new()
    }
}
