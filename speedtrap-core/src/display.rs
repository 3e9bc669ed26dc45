//! Four-digit multiplexed 7-segment display.
//!
//! Only one digit position is strobed at a time. [`render_frame`] walks the
//! four positions, driving each pattern for a fixed dwell so persistence of
//! vision merges them into a steady readout. The dwell is a hard lower bound
//! on control-loop latency, and brightness depends on the ratio between the
//! dwell and the rest of the loop.

use core::fmt;

use embedded_hal::delay::DelayNs;

/// Number of digit positions on the display.
pub const DIGIT_COUNT: usize = 4;

/// Number of entries in [`SEGMENT_PATTERNS`].
pub const GLYPH_COUNT: usize = 12;

const PATTERNS: [u8; GLYPH_COUNT] = [
    0b111_1110, // 0
    0b011_0000, // 1
    0b110_1101, // 2
    0b111_1001, // 3
    0b011_0011, // 4
    0b101_1011, // 5
    0b101_1111, // 6
    0b111_0000, // 7
    0b111_1111, // 8
    0b111_1011, // 9
    0b100_1111, // A
    0b001_1111, // b
];

// Every glyph must light something and stay within the seven segment bits.
const _: () = {
    let mut index = 0;
    while index < GLYPH_COUNT {
        assert!(PATTERNS[index] & !Segments::ALL.bits() == 0);
        assert!(PATTERNS[index] != 0);
        index += 1;
    }
};

/// Segment patterns indexed by glyph: digits `0`-`9`, then `A` and `b`.
///
/// Bit 6 drives segment A down to bit 1 for segment F; bit 0 drives segment G.
pub static SEGMENT_PATTERNS: [u8; GLYPH_COUNT] = PATTERNS;

/// A decimal digit, `0..=9`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Self = Self(0);

    /// Returns `None` for values above 9.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 { Some(Self(value)) } else { None }
    }

    /// Least significant decimal digit of `value`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn ones_of(value: u16) -> Self {
        Self((value % 10) as u8)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Symbol that can be shown on one digit position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    Digit(Digit),
    UpperA,
    LowerB,
}

impl Glyph {
    /// Looks up a glyph by its table index. Indices past the table yield `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0..=9 => Some(Glyph::Digit(Digit(index as u8))),
            10 => Some(Glyph::UpperA),
            11 => Some(Glyph::LowerB),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Glyph::Digit(digit) => digit.0 as usize,
            Glyph::UpperA => 10,
            Glyph::LowerB => 11,
        }
    }

    #[must_use]
    pub fn segments(self) -> Segments {
        Segments(SEGMENT_PATTERNS[self.index()])
    }
}

impl From<Digit> for Glyph {
    fn from(digit: Digit) -> Self {
        Glyph::Digit(digit)
    }
}

/// Individual display segments in conventional lettering.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Segment {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::A,
        Segment::B,
        Segment::C,
        Segment::D,
        Segment::E,
        Segment::F,
        Segment::G,
    ];

    /// Bit within a [`Segments`] pattern.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Segment::A => 1 << 6,
            Segment::B => 1 << 5,
            Segment::C => 1 << 4,
            Segment::D => 1 << 3,
            Segment::E => 1 << 2,
            Segment::F => 1 << 1,
            Segment::G => 1,
        }
    }
}

/// 7-bit segment pattern for one digit position.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segments(u8);

impl Segments {
    pub const BLANK: Self = Self(0);
    pub const ALL: Self = Self(0b111_1111);

    /// Masks off anything above the seven segment bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_lit(self, segment: Segment) -> bool {
        self.0 & segment.mask() != 0
    }

    #[must_use]
    pub const fn is_blank(self) -> bool {
        self.0 == 0
    }
}

/// Digit strobe position. Position 0 shows the ones digit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitPosition {
    Ones,
    Tens,
    Hundreds,
    Thousands,
}

impl DigitPosition {
    pub const ALL: [DigitPosition; DIGIT_COUNT] = [
        DigitPosition::Ones,
        DigitPosition::Tens,
        DigitPosition::Hundreds,
        DigitPosition::Thousands,
    ];

    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            DigitPosition::Ones => 0,
            DigitPosition::Tens => 1,
            DigitPosition::Hundreds => 2,
            DigitPosition::Thousands => 3,
        }
    }
}

/// Digits currently shown, ones first.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayBuffer([Digit; DIGIT_COUNT]);

impl DisplayBuffer {
    #[must_use]
    pub const fn cleared() -> Self {
        Self([Digit::ZERO; DIGIT_COUNT])
    }

    /// Splits `value` into decimal digits, ones first.
    ///
    /// Values above 9999 keep only their four low digits; callers clamp first.
    #[must_use]
    pub const fn from_value(value: u16) -> Self {
        let mut digits = [Digit::ZERO; DIGIT_COUNT];
        let mut remaining = value;
        let mut index = 0;
        while index < DIGIT_COUNT {
            digits[index] = Digit::ones_of(remaining);
            remaining /= 10;
            index += 1;
        }
        Self(digits)
    }

    #[must_use]
    pub const fn digits(&self) -> &[Digit; DIGIT_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn digit(&self, position: DigitPosition) -> Digit {
        self.0[position.as_index()]
    }

    /// Reassembles the number held in the buffer.
    #[must_use]
    pub fn value(&self) -> u16 {
        self.0
            .iter()
            .rev()
            .fold(0, |acc, digit| acc * 10 + u16::from(digit.value()))
    }
}

/// Segment patterns for all four positions, ready to be strobed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame([Segments; DIGIT_COUNT]);

impl DisplayFrame {
    pub const BLANK: Self = Self([Segments::BLANK; DIGIT_COUNT]);

    /// Builds the frame for `buffer`, or a blank frame when `valid` is false.
    #[must_use]
    pub fn compose(buffer: &DisplayBuffer, valid: bool) -> Self {
        if !valid {
            return Self::BLANK;
        }
        let mut segments = [Segments::BLANK; DIGIT_COUNT];
        for (slot, digit) in segments.iter_mut().zip(buffer.digits()) {
            *slot = Glyph::Digit(*digit).segments();
        }
        Self(segments)
    }

    #[must_use]
    pub const fn segments(&self, position: DigitPosition) -> Segments {
        self.0[position.as_index()]
    }
}

/// Abstraction over the segment and strobe outputs.
pub trait DisplayDriver {
    /// Drives the seven segment lines.
    fn set_segments(&mut self, segments: Segments);

    /// Enables the strobe for `position`.
    fn select_digit(&mut self, position: DigitPosition);

    /// Disables every digit strobe.
    fn deselect_all(&mut self);
}

/// Per-digit dwell used by [`render_frame`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DwellTime {
    millis: u32,
}

impl DwellTime {
    #[must_use]
    pub const fn from_millis(millis: u32) -> Self {
        Self { millis }
    }

    #[must_use]
    pub const fn as_millis(self) -> u32 {
        self.millis
    }
}

/// Strobes each position of `frame` in turn, holding each for `dwell`.
///
/// All strobes are released before the segment lines change, so a pattern is
/// never shown on the wrong position, and again once the frame is done.
pub fn render_frame<D, W>(frame: &DisplayFrame, driver: &mut D, delay: &mut W, dwell: DwellTime)
where
    D: DisplayDriver + ?Sized,
    W: DelayNs + ?Sized,
{
    for position in DigitPosition::ALL {
        driver.deselect_all();
        driver.set_segments(frame.segments(position));
        driver.select_digit(position);
        delay.delay_ms(dwell.as_millis());
    }
    driver.deselect_all();
}
