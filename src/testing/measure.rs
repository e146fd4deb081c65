//! Fixed-advance text backend.

use crate::text::TextMeasure;

/// Every character is `char_width` wide and every line `line_height` tall.
///
/// Wrapping is greedy on whitespace; a word wider than the limit gets a line
/// of its own rather than being broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonoMeasure {
    pub char_width: i32,
    pub line_height: i32,
}

impl MonoMeasure {
    pub fn new(char_width: i32, line_height: i32) -> Self {
        Self { char_width, line_height }
    }
}

impl TextMeasure for MonoMeasure {
    fn measure_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.char_width
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }

    fn wrap_lines(&self, text: &str, max_width: i32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if self.measure_width(&candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(word);
                }
            }
            lines.push(current);
        }
        lines
    }
}
