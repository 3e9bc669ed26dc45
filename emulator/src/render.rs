//! ASCII rendering of the multiplexed display and the counter LEDs.

use speedtrap_core::display::{DIGIT_COUNT, Segment, Segments};
use speedtrap_core::indicator::LED_COUNT;

/// Text rows making up one rendered display.
pub const DISPLAY_ROWS: usize = 3;

fn mark(segments: Segments, segment: Segment, lit: char) -> char {
    if segments.is_lit(segment) { lit } else { ' ' }
}

fn glyph_rows(segments: Segments) -> [[char; 3]; DISPLAY_ROWS] {
    [
        [' ', mark(segments, Segment::A, '_'), ' '],
        [
            mark(segments, Segment::F, '|'),
            mark(segments, Segment::G, '_'),
            mark(segments, Segment::B, '|'),
        ],
        [
            mark(segments, Segment::E, '|'),
            mark(segments, Segment::D, '_'),
            mark(segments, Segment::C, '|'),
        ],
    ]
}

/// Renders the four positions (ones first) as they read on the panel,
/// thousands on the left.
#[must_use]
pub fn display_rows(shown: &[Segments; DIGIT_COUNT]) -> [String; DISPLAY_ROWS] {
    let mut rows: [String; DISPLAY_ROWS] = Default::default();
    for segments in shown.iter().rev() {
        for (row, cells) in rows.iter_mut().zip(glyph_rows(*segments)) {
            row.extend(cells);
            row.push(' ');
        }
    }
    for row in &mut rows {
        row.truncate(row.trim_end().len());
    }
    rows
}

/// Renders the LEDs most significant bit first, `#` for on.
#[must_use]
pub fn led_row(states: &[bool; LED_COUNT]) -> String {
    states
        .iter()
        .rev()
        .map(|on| if *on { "#" } else { "." })
        .collect::<Vec<_>>()
        .join(" ")
}
