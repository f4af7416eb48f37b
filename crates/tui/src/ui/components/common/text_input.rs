//! Reusable UTF-8 safe text input state with cursor management.
//!
//! Shared by the compare inputs and the model form. Rendering is left to the
//! owning component; this only manages the buffer and cursor.

use crossterm::event::{KeyCode, KeyEvent};

#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
    /// Render the content as bullets (API keys)
    pub masked: bool,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty()
    }

    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    /// The text to draw: masked inputs render one bullet per scalar.
    pub fn display_text(&self) -> String {
        if self.masked {
            self.input.chars().map(|_| '•').collect()
        } else {
            self.input.clone()
        }
    }

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor]
            .chars()
            .last()
            .map(|c| c.len_utf8())
            .unwrap_or(1);
        self.cursor = self.cursor.saturating_sub(prev);
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if self.cursor >= self.input.len() {
            return;
        }
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor = self.cursor.saturating_add(next.len_utf8());
        }
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor]
            .chars()
            .last()
            .map(|c| c.len_utf8())
            .unwrap_or(1);
        let start = self.cursor - prev;
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    /// Routes an editing key into the buffer; returns whether it was handled.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Left => {
                self.move_left();
                true
            }
            KeyCode::Right => {
                self.move_right();
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.input.len();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_is_utf8_safe() {
        let mut input = TextInputState::new();
        for c in "模型x".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.backspace();
        assert_eq!(input.input(), "模x");
        input.move_right();
        input.insert_char('!');
        assert_eq!(input.input(), "模x!");
    }

    #[test]
    fn masked_display_hides_content() {
        let mut input = TextInputState::masked();
        input.set_input("sk-secret");
        assert_eq!(input.display_text(), "•••••••••");
    }
}
