pub use ca65_inputs::Point;
use text_size::{TextRange, TextSize};

/// One text change, in byte offsets and row/column points.
///
/// A list of edits is applied in order, each in the coordinates left by the ones
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start_byte: TextSize,
    pub old_end_byte: TextSize,
    pub new_end_byte: TextSize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl Edit {
    /// The edit that replaces `range` of `old_text` with `replacement`.
    pub fn replace(old_text: &[u8], range: TextRange, replacement: &[u8]) -> Self {
        let start_point = Point::at(old_text, range.start());
        let inserted = Point::at(replacement, TextSize::new(replacement.len() as u32));
        let new_end_point = match inserted.row {
            0 => Point::new(start_point.row, start_point.column + inserted.column),
            rows => Point::new(start_point.row + rows, inserted.column),
        };

        Self {
            start_byte: range.start(),
            old_end_byte: range.end(),
            new_end_byte: range.start() + TextSize::new(replacement.len() as u32),
            start_point,
            old_end_point: Point::at(old_text, range.end()),
            new_end_point,
        }
    }

    /// Signed change in length.
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(self.new_end_byte)) - i64::from(u32::from(self.old_end_byte))
    }

    /// Byte bounds with inverted ends clamped to the start.
    pub(crate) fn bounds(&self) -> (TextSize, TextSize, TextSize) {
        let start = self.start_byte;
        (start, self.old_end_byte.max(start), self.new_end_byte.max(start))
    }
}
