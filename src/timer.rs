use crate::interrupts::{Interrupt, Interrupts};

/// CPU cycles per TIMA increment for each TAC clock-select value.
const CLK_DIVIDER_LOOKUP: [u32; 4] = [1024, 16, 64, 256];

/// DIV increments at 16384 Hz, once every 256 CPU cycles.
const DIV_PERIOD: u32 = 256;

/// DIV/TIMA timer unit at 0xFF04-0xFF07.
///
/// Driven in batches: the machine calls [`tick`] with the cycle cost of the
/// instruction that just executed, and the accumulators carry the remainder
/// across calls. STOP freezes DIV until the CPU resumes.
///
/// [`tick`]: Timer::tick
pub struct Timer {
    div: u8,
    tima: u8,
    tma: u8,
    tac: u8,
    div_counter: u32,
    tima_counter: u32,
    div_stopped: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            div: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            div_counter: 0,
            tima_counter: 0,
            div_stopped: false,
        }
    }

    /// Advance the timer by `cycles` CPU cycles.
    pub fn tick(&mut self, cycles: u32, interrupts: &mut Interrupts) {
        if !self.div_stopped {
            self.div_counter += cycles;
            while self.div_counter >= DIV_PERIOD {
                self.div_counter -= DIV_PERIOD;
                self.div = self.div.wrapping_add(1);
            }
        }

        if self.tac & 0x04 != 0 {
            let period = CLK_DIVIDER_LOOKUP[(self.tac & 0x03) as usize];
            self.tima_counter += cycles;
            while self.tima_counter >= period {
                self.tima_counter -= period;
                if self.tima == 0xFF {
                    // Overflow reloads from TMA and raises the interrupt in
                    // the same tick.
                    self.tima = self.tma;
                    interrupts.signal(Interrupt::Timer);
                } else {
                    self.tima += 1;
                }
            }
        }
    }

    /// STOP freezes and clears DIV.
    pub fn stop_div(&mut self) {
        self.reset_div();
        self.div_stopped = true;
    }

    /// Leaving STOP lets DIV count again.
    pub fn resume_div(&mut self) {
        self.div_stopped = false;
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF04 => self.div,
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            0xFF07 => self.tac | 0xF8,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            // Any write clears DIV, whatever the value.
            0xFF04 => self.reset_div(),
            0xFF05 => self.tima = val,
            0xFF06 => self.tma = val,
            0xFF07 => self.tac = val & 0x07,
            _ => {}
        }
    }

    fn reset_div(&mut self) {
        self.div = 0;
        self.div_counter = 0;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Timer;
    use crate::interrupts::Interrupts;

    #[test]
    fn div_increments_every_256_cycles() {
        let mut timer = Timer::new();
        let mut intr = Interrupts::new();
        intr.if_reg = 0;

        timer.tick(255, &mut intr);
        assert_eq!(timer.read(0xFF04), 0);
        timer.tick(1, &mut intr);
        assert_eq!(timer.read(0xFF04), 1);
        timer.tick(256 * 4, &mut intr);
        assert_eq!(timer.read(0xFF04), 5);
    }

    #[test]
    fn div_carries_remainder_across_batches() {
        let mut timer = Timer::new();
        let mut intr = Interrupts::new();
        intr.if_reg = 0;

        // 200 + 60 = 260: one increment with 4 left over.
        timer.tick(200, &mut intr);
        timer.tick(60, &mut intr);
        assert_eq!(timer.read(0xFF04), 1);
        timer.tick(252, &mut intr);
        assert_eq!(timer.read(0xFF04), 2);
    }

    #[test]
    fn div_write_resets_counter() {
        let mut timer = Timer::new();
        let mut intr = Interrupts::new();
        intr.if_reg = 0;

        timer.tick(256 * 3 + 100, &mut intr);
        timer.write(0xFF04, 0xAB);
        assert_eq!(timer.read(0xFF04), 0);
        timer.tick(255, &mut intr);
        assert_eq!(timer.read(0xFF04), 0);
    }

    #[test]
    fn tima_counts_only_when_enabled() {
        let mut timer = Timer::new();
        let mut intr = Interrupts::new();
        intr.if_reg = 0;

        timer.tick(4096, &mut intr);
        assert_eq!(timer.read(0xFF05), 0);

        // TAC = enabled, divider 16.
        timer.write(0xFF07, 0x05);
        timer.tick(16 * 3, &mut intr);
        assert_eq!(timer.read(0xFF05), 3);
    }

    #[test]
    fn tima_overflow_reloads_tma_and_signals() {
        let mut timer = Timer::new();
        let mut intr = Interrupts::new();
        intr.if_reg = 0;

        timer.write(0xFF06, 0x23);
        timer.write(0xFF05, 0xFF);
        timer.write(0xFF07, 0x05);

        timer.tick(16, &mut intr);
        assert_eq!(timer.read(0xFF05), 0x23);
        assert_ne!(intr.if_reg & 0x04, 0);
    }

    #[test]
    fn stop_freezes_div_until_resume() {
        let mut timer = Timer::new();
        let mut intr = Interrupts::new();
        intr.if_reg = 0;

        timer.tick(256 * 2, &mut intr);
        timer.stop_div();
        assert_eq!(timer.read(0xFF04), 0);
        timer.tick(256 * 8, &mut intr);
        assert_eq!(timer.read(0xFF04), 0);

        timer.resume_div();
        timer.tick(256, &mut intr);
        assert_eq!(timer.read(0xFF04), 1);
    }

    #[test]
    fn tac_reads_back_with_upper_bits_set() {
        let mut timer = Timer::new();
        timer.write(0xFF07, 0x05);
        assert_eq!(timer.read(0xFF07), 0xFD);
    }
}
