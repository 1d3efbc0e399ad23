/// The five DMG interrupt sources, in priority order (lowest bit wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    pub fn bit(self) -> u8 {
        match self {
            Interrupt::VBlank => 0,
            Interrupt::LcdStat => 1,
            Interrupt::Timer => 2,
            Interrupt::Serial => 3,
            Interrupt::Joypad => 4,
        }
    }

    pub fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Handler address the CPU jumps to when this interrupt is serviced.
    pub fn vector(self) -> u16 {
        0x0040 + 8 * self.bit() as u16
    }
}

/// IF/IE registers plus the master-enable state machine.
///
/// EI does not enable IME directly; it schedules the enable, which lands
/// only after the following instruction has executed. The CPU captures the
/// schedule state before each opcode and calls [`commit_schedule`] after,
/// so `EI; NOP` dispatches after the NOP and `EI; DI` never enables.
///
/// [`commit_schedule`]: Interrupts::commit_schedule
pub struct Interrupts {
    pub if_reg: u8,
    pub ie_reg: u8,
    ime: bool,
    ime_scheduled: bool,
}

impl Interrupts {
    pub fn new() -> Self {
        Self {
            if_reg: 0xE1,
            ie_reg: 0x00,
            ime: false,
            ime_scheduled: false,
        }
    }

    pub fn ime(&self) -> bool {
        self.ime
    }

    pub fn ime_scheduled(&self) -> bool {
        self.ime_scheduled
    }

    /// Request an interrupt by setting its IF bit.
    pub fn signal(&mut self, intr: Interrupt) {
        self.if_reg |= intr.mask();
    }

    /// Acknowledge a serviced interrupt by clearing its IF bit.
    pub fn acknowledge(&mut self, intr: Interrupt) {
        self.if_reg &= !intr.mask();
    }

    /// True when any enabled interrupt is requested, regardless of IME.
    /// This is what wakes a halted CPU.
    pub fn pending(&self) -> bool {
        self.ie_reg & self.if_reg & 0x1F != 0
    }

    /// The highest-priority interrupt that is enabled, requested, and
    /// allowed by IME, or `None`.
    pub fn ready(&self) -> Option<Interrupt> {
        if !self.ime {
            return None;
        }
        Interrupt::ALL
            .into_iter()
            .find(|intr| self.ie_reg & self.if_reg & intr.mask() != 0)
    }

    /// EI: arrange for IME to be enabled after the next instruction.
    pub fn schedule_enable(&mut self) {
        self.ime_scheduled = true;
    }

    /// RETI enables IME with no delay.
    pub fn enable_now(&mut self) {
        self.ime = true;
        self.ime_scheduled = false;
    }

    /// DI: disable IME and cancel any schedule still in flight.
    pub fn disable(&mut self) {
        self.ime = false;
        self.ime_scheduled = false;
    }

    /// Apply a scheduled enable captured before the opcode that just ran.
    /// The enable lands only if it was scheduled before the opcode *and*
    /// the opcode did not cancel it (DI).
    pub fn commit_schedule(&mut self, scheduled_before_opcode: bool) {
        if scheduled_before_opcode && self.ime_scheduled {
            self.ime = true;
            self.ime_scheduled = false;
        }
    }
}

impl Default for Interrupts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Interrupt, Interrupts};

    #[test]
    fn vectors_and_masks() {
        assert_eq!(Interrupt::VBlank.vector(), 0x0040);
        assert_eq!(Interrupt::Joypad.vector(), 0x0060);
        assert_eq!(Interrupt::Timer.mask(), 0x04);
    }

    #[test]
    fn ready_respects_priority_order() {
        let mut intr = Interrupts::new();
        intr.ie_reg = 0x1F;
        intr.if_reg = 0x00;
        intr.enable_now();

        intr.signal(Interrupt::Joypad);
        intr.signal(Interrupt::Timer);
        assert_eq!(intr.ready(), Some(Interrupt::Timer));

        intr.signal(Interrupt::VBlank);
        assert_eq!(intr.ready(), Some(Interrupt::VBlank));
    }

    #[test]
    fn ready_requires_ime_but_pending_does_not() {
        let mut intr = Interrupts::new();
        intr.ie_reg = 0x04;
        intr.if_reg = 0x00;
        intr.signal(Interrupt::Timer);

        assert!(intr.pending());
        assert_eq!(intr.ready(), None);

        intr.enable_now();
        assert_eq!(intr.ready(), Some(Interrupt::Timer));
    }

    #[test]
    fn schedule_commits_only_across_a_full_opcode() {
        let mut intr = Interrupts::new();

        // EI runs: schedule was clear before it.
        let before = intr.ime_scheduled();
        intr.schedule_enable();
        intr.commit_schedule(before);
        assert!(!intr.ime());

        // Next opcode runs with the schedule armed.
        let before = intr.ime_scheduled();
        intr.commit_schedule(before);
        assert!(intr.ime());
    }

    #[test]
    fn di_cancels_a_scheduled_enable() {
        let mut intr = Interrupts::new();

        let before = intr.ime_scheduled();
        intr.schedule_enable();
        intr.commit_schedule(before);

        // DI as the very next opcode.
        let before = intr.ime_scheduled();
        intr.disable();
        intr.commit_schedule(before);
        assert!(!intr.ime());
        assert!(!intr.ime_scheduled());
    }
}
