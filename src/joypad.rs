use crate::interrupts::{Interrupt, Interrupts};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

/// Joypad register at 0xFF00.
///
/// Bits 4 and 5 (active-low) select the direction or action row; the low
/// nibble reads back the selected row's buttons, also active-low. A fresh
/// press raises the Joypad interrupt, which is also what ends STOP.
pub struct Joypad {
    // Pressed state per Button discriminant, true = held.
    pressed: [bool; 8],
    select: u8,
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            pressed: [false; 8],
            select: 0x30,
        }
    }

    pub fn set_button(&mut self, button: Button, down: bool, interrupts: &mut Interrupts) {
        let idx = button as usize;
        if down && !self.pressed[idx] {
            interrupts.signal(Interrupt::Joypad);
        }
        self.pressed[idx] = down;
    }

    pub fn read(&self) -> u8 {
        let mut nibble = 0x0F;
        if self.select & 0x10 == 0 {
            // Direction row selected.
            nibble &= self.row([Button::Right, Button::Left, Button::Up, Button::Down]);
        }
        if self.select & 0x20 == 0 {
            // Action row selected.
            nibble &= self.row([Button::A, Button::B, Button::Select, Button::Start]);
        }
        0xC0 | self.select | nibble
    }

    pub fn write(&mut self, val: u8) {
        self.select = val & 0x30;
    }

    fn row(&self, buttons: [Button; 4]) -> u8 {
        let mut nibble = 0x0F;
        for (bit, button) in buttons.into_iter().enumerate() {
            if self.pressed[button as usize] {
                nibble &= !(1 << bit);
            }
        }
        nibble
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}
