//! Q16.16 fixed-point word arithmetic.
//!
//! Every value the VM touches is a [`Word`]: a 32-bit signed integer read as
//! 16 integer bits and 16 fraction bits. Data, addresses, loop counters and
//! return addresses all share this representation.
//!
//! Results that leave the 32-bit range wrap, and fractional results of the
//! transcendental operations truncate toward zero.

use std::f64::consts::TAU;

/// A Q16.16 fixed-point machine word.
pub type Word = i32;

/// The word representing 1.0.
pub const ONE: Word = 0x1_0000;

/// Angular units per full turn for `s` and `a`.
const TURN: f64 = 65536.0;

/// Swap the integer and fraction halves of a word.
///
/// Addresses, jump targets and stack offsets are written as Q16.16 literals
/// but used as plain integers; `rol16` moves the integer part into the low
/// half. It is its own inverse.
#[inline]
pub fn rol16(w: Word) -> Word {
    (w as u32).rotate_left(16) as Word
}

/// Assemble a literal from its integer and fraction nibbles.
///
/// Only the low 16 bits of `int_part` and `frac_part` are kept.
#[inline]
pub fn from_parts(int_part: u32, frac_part: u32) -> Word {
    (((int_part & 0xFFFF) << 16) | (frac_part & 0xFFFF)) as Word
}

/// Fixed-point multiply: `(a * b) / 65536`, truncated toward zero.
#[inline]
pub fn mul(a: Word, b: Word) -> Word {
    ((a as i64 * b as i64) / ONE as i64) as Word
}

/// Fixed-point divide: `(a * 65536) / b`, truncated toward zero.
///
/// Division by zero yields 0.
#[inline]
pub fn div(a: Word, b: Word) -> Word {
    if b == 0 {
        return 0;
    }
    ((a as i64 * ONE as i64) / b as i64) as Word
}

/// Remainder with the sign of the dividend. Modulo by zero yields 0.
#[inline]
pub fn modulo(a: Word, b: Word) -> Word {
    if b == 0 {
        return 0;
    }
    a.wrapping_rem(b)
}

/// Combined shift: `(amount >> 16) & 63` selects left shift for 0..32 and
/// arithmetic right shift by `n - 32` for 32..64.
#[inline]
pub fn shift(value: Word, amount: Word) -> Word {
    let steps = ((amount >> 16) & 63) as u32;
    if steps < 32 {
        value.wrapping_shl(steps)
    } else {
        value.wrapping_shr(steps - 32)
    }
}

/// Rotate right by `(amount >> 16) & 31` bits.
#[inline]
pub fn rotate(value: Word, amount: Word) -> Word {
    let steps = ((amount >> 16) & 31) as u32;
    (value as u32).rotate_right(steps) as Word
}

/// Sine where 1.0 is one full turn; result in -1.0..=1.0.
pub fn sin(w: Word) -> Word {
    ((w as f64 * (TAU / TURN)).sin() * ONE as f64) as Word
}

/// Square root of a fixed-point value; negative input yields 0.
pub fn sqrt(w: Word) -> Word {
    if w < 0 {
        return 0;
    }
    (ONE as f64 * (w as f64 / ONE as f64).sqrt()) as Word
}

/// Angle of the vector (x, y) in turns, in the same scale as [`sin`].
pub fn atan2(y: Word, x: Word) -> Word {
    ((y as f64).atan2(x as f64) * (TURN / TAU)) as Word
}

/// `min(w, 0)`.
#[inline]
pub fn clamp_neg(w: Word) -> Word {
    w.min(0)
}

/// `max(w, 0)`.
#[inline]
pub fn clamp_pos(w: Word) -> Word {
    w.max(0)
}

/// Raw 1 when `w` is zero, else 0.
#[inline]
pub fn is_zero(w: Word) -> Word {
    (w == 0) as Word
}

/// Render a word as canonical literal text: hexadecimal integer part,
/// followed by `.` and up to four fraction nibbles when the fraction is
/// nonzero (`0x18000` renders as `1.8`).
pub fn format_literal(w: Word) -> String {
    let bits = w as u32;
    let int_part = bits >> 16;
    let frac_part = bits & 0xFFFF;
    if frac_part == 0 {
        format!("{int_part:X}")
    } else {
        let frac = format!("{frac_part:04X}");
        format!("{int_part:X}.{}", frac.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rol16_swaps_halves() {
        assert_eq!(rol16(0x0002_0000), 2);
        assert_eq!(rol16(0x0000_000D), 0x000D_0000);
        assert_eq!(rol16(-1), -1);
    }

    #[test]
    fn from_parts_keeps_low_nibbles() {
        assert_eq!(from_parts(1, 0x8000), 0x1_8000);
        assert_eq!(from_parts(0x12345, 0), 0x2345_0000);
        assert_eq!(from_parts(0xFFFF, 0xFFFF), -1);
    }

    #[test]
    fn mul_is_fixed_point() {
        assert_eq!(mul(2 * ONE, 3 * ONE), 6 * ONE);
        assert_eq!(mul(ONE / 2, ONE / 2), ONE / 4);
        assert_eq!(mul(-ONE, 3 * ONE), -3 * ONE);
    }

    #[test]
    fn mul_truncates_toward_zero() {
        // -1 * 1 raw unit = -1/65536, truncates to 0.
        assert_eq!(mul(-1, 1), 0);
    }

    #[test]
    fn div_is_fixed_point() {
        assert_eq!(div(6 * ONE, 3 * ONE), 2 * ONE);
        assert_eq!(div(ONE, 2 * ONE), ONE / 2);
        assert_eq!(div(-ONE, 4 * ONE), -ONE / 4);
    }

    #[test]
    fn div_by_zero_yields_zero() {
        assert_eq!(div(5 * ONE, 0), 0);
        assert_eq!(div(0, 0), 0);
    }

    #[test]
    fn modulo_follows_dividend_sign() {
        assert_eq!(modulo(7 * ONE, 3 * ONE), ONE);
        assert_eq!(modulo(-7 * ONE, 3 * ONE), -ONE);
        assert_eq!(modulo(7, 0), 0);
        assert_eq!(modulo(i32::MIN, -1), 0);
    }

    #[test]
    fn shift_direction_by_range() {
        assert_eq!(shift(1, 4 * ONE), 16);
        assert_eq!(shift(256, 36 * ONE), 16);
        assert_eq!(shift(-256, 36 * ONE), -16);
        // 64 wraps to 0: no shift.
        assert_eq!(shift(7, 64 * ONE), 7);
    }

    #[test]
    fn rotate_right_wraps_bits() {
        assert_eq!(rotate(1, ONE), i32::MIN);
        assert_eq!(rotate(0x1234_5678, 16 * ONE), 0x5678_1234);
        assert_eq!(rotate(42, 0), 42);
    }

    #[test]
    fn sin_quarter_turn() {
        assert_eq!(sin(0), 0);
        assert_eq!(sin(ONE / 4), ONE);
        assert_eq!(sin(3 * ONE / 4), -ONE);
    }

    #[test]
    fn sqrt_of_squares() {
        assert_eq!(sqrt(4 * ONE), 2 * ONE);
        assert_eq!(sqrt(ONE / 4), ONE / 2);
        assert_eq!(sqrt(-ONE), 0);
    }

    #[test]
    fn atan2_quarter_turns() {
        assert_eq!(atan2(ONE, 0), ONE / 4);
        assert_eq!(atan2(0, ONE), 0);
        assert_eq!(atan2(0, -ONE), ONE / 2);
    }

    #[test]
    fn clamps_and_zero_test() {
        assert_eq!(clamp_neg(-5), -5);
        assert_eq!(clamp_neg(5), 0);
        assert_eq!(clamp_pos(5), 5);
        assert_eq!(clamp_pos(-5), 0);
        assert_eq!(is_zero(0), 1);
        assert_eq!(is_zero(ONE), 0);
    }

    #[test]
    fn format_literal_canonical() {
        assert_eq!(format_literal(0), "0");
        assert_eq!(format_literal(5 * ONE), "5");
        assert_eq!(format_literal(0x1_8000), "1.8");
        assert_eq!(format_literal(0xAB_0010), "AB.001");
        assert_eq!(format_literal(-1), "FFFF.FFFF");
    }
}
