pub const CODE_LENGTH: usize = 6;

/// Six single-digit slots for the emailed one-time code.
///
/// Typing fills the focused slot and moves right; backspace on an empty slot
/// moves left and clears that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeInput {
    digits: [Option<char>; CODE_LENGTH],
    focus: usize,
}

impl CodeInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-digits are ignored
    pub fn input(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        self.digits[self.focus] = Some(c);
        if self.focus < CODE_LENGTH - 1 {
            self.focus += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.digits[self.focus].is_some() {
            self.digits[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
            self.digits[self.focus] = None;
        }
    }

    pub fn move_left(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.focus = (self.focus + 1).min(CODE_LENGTH - 1);
    }

    /// Fill from a pasted string, keeping only digits
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(char::is_ascii_digit) {
            self.input(c);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn slot(&self, index: usize) -> Option<char> {
        self.digits.get(index).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// Entered digits in slot order, skipping empty slots
    pub fn code(&self) -> String {
        self.digits.iter().flatten().collect()
    }
}
