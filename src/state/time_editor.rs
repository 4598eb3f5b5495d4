//! Manual mm:ss entry through a four-digit shift register

use tracing::debug;

use crate::error::TimerError;

/// Pending `MMSS` input, always exactly four ASCII digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditBuffer {
    digits: [u8; 4],
    /// Total the buffer was seeded from, committed as-is while untouched
    seed: u64,
    touched: bool,
}

impl EditBuffer {
    /// Seed from a total, zero-padded as `MMSS`.
    ///
    /// Minutes above 99 do not fit in two digits and show as `99`.
    pub fn seeded(total_seconds: u64) -> Self {
        let minutes = (total_seconds / 60).min(99);
        let seconds = total_seconds % 60;
        let digits = [
            b'0' + (minutes / 10) as u8,
            b'0' + (minutes % 10) as u8,
            b'0' + (seconds / 10) as u8,
            b'0' + (seconds % 10) as u8,
        ];
        Self {
            digits,
            seed: total_seconds,
            touched: false,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored
        std::str::from_utf8(&self.digits).unwrap_or("0000")
    }

    /// Shift a digit in from the right, dropping the oldest on the left
    pub fn push(&mut self, digit: u8) {
        self.digits.copy_within(1.., 0);
        self.digits[3] = digit;
        self.touched = true;
    }

    /// Shift right and refill the front with `0`
    pub fn backspace(&mut self) {
        self.digits.copy_within(..3, 1);
        self.digits[0] = b'0';
        self.touched = true;
    }

    fn field(&self, range: std::ops::Range<usize>) -> u64 {
        self.digits[range].iter().fold(0, |acc, d| acc * 10 + u64::from(d - b'0'))
    }

    pub fn minutes(&self) -> u64 {
        self.field(0..2)
    }

    pub fn seconds(&self) -> u64 {
        self.field(2..4)
    }

    /// Total in seconds. A seconds field above 59 is plain arithmetic.
    pub fn total_seconds(&self) -> u64 {
        if self.touched {
            self.minutes() * 60 + self.seconds()
        } else {
            self.seed
        }
    }

    /// `m:ss` as shown in the edit field, minutes without leading zero
    pub fn display(&self) -> String {
        format!("{}:{}", self.minutes(), &self.as_str()[2..4])
    }
}

/// Edit mode controller.
///
/// Holds a buffer only while editing; every operation outside edit mode is a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct TimeEditor {
    buffer: Option<EditBuffer>,
}

impl TimeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        self.buffer.as_ref()
    }

    /// Enter edit mode seeded from the current remaining time.
    /// Returns false if already editing.
    pub fn begin_edit(&mut self, current_total_seconds: u64) -> bool {
        if self.buffer.is_some() {
            return false;
        }
        let buffer = EditBuffer::seeded(current_total_seconds);
        debug!("Editing started with buffer {}", buffer.as_str());
        self.buffer = Some(buffer);
        true
    }

    pub fn push_digit(&mut self, digit: char) -> Result<(), TimerError> {
        if !digit.is_ascii_digit() {
            return Err(TimerError::invalid(format!("not a digit: {digit:?}")));
        }
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.push(digit as u8);
            debug!("Edit buffer {}", buffer.as_str());
        }
        Ok(())
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.backspace();
            debug!("Edit buffer {}", buffer.as_str());
        }
    }

    /// Leave edit mode without committing
    pub fn cancel(&mut self) {
        if self.buffer.take().is_some() {
            debug!("Editing cancelled");
        }
    }

    /// Leave edit mode, returning the total to commit
    pub fn commit(&mut self) -> Option<u64> {
        let total = self.buffer.take()?.total_seconds();
        debug!("Editing committed {}s", total);
        Some(total)
    }
}
