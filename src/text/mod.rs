//! Text measurement boundary and the per-frame text layout memo.
//!
//! The engine never shapes text itself. A host supplies a [`TextMeasure`]
//! backend; [`TextCache`] makes sure each distinct (text, width) pair is
//! measured at most once per frame.

use std::collections::HashMap;
use std::rc::Rc;

use crate::geometry::Size;

/// Measurement and wrapping service provided by the host.
///
/// Treated as a pure function of its inputs.
pub trait TextMeasure {
    /// Width in pixels of `text` on a single line.
    fn measure_width(&self, text: &str) -> i32;

    /// Height of one line in pixels.
    fn line_height(&self) -> i32;

    /// Break `text` into lines no wider than `max_width` where possible.
    fn wrap_lines(&self, text: &str, max_width: i32) -> Vec<String>;
}

/// A measured block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub size: Size,
}

/// Memoizes text layouts for the duration of one frame.
#[derive(Debug, Default)]
pub struct TextCache {
    entries: HashMap<(String, Option<i32>), Rc<TextLayout>>,
    misses: usize,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry. Called at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.entries.clear();
        self.misses = 0;
    }

    /// Lay `text` out, wrapping to `width` if given, otherwise splitting
    /// only on hard line breaks.
    pub fn layout(
        &mut self,
        measure: &dyn TextMeasure,
        text: &str,
        width: Option<i32>,
    ) -> Rc<TextLayout> {
        let key = (text.to_owned(), width);
        if let Some(hit) = self.entries.get(&key) {
            return Rc::clone(hit);
        }
        self.misses += 1;
        let lines: Vec<String> = match width {
            Some(w) => measure.wrap_lines(text, w.max(0)),
            None => text.split('\n').map(str::to_owned).collect(),
        };
        let widest = lines.iter().map(|l| measure.measure_width(l)).max().unwrap_or(0);
        let size = Size::new(widest, measure.line_height() * lines.len() as i32);
        let layout = Rc::new(TextLayout { lines, size });
        self.entries.insert(key, Rc::clone(&layout));
        layout
    }

    /// Number of distinct layouts computed since the frame began.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
