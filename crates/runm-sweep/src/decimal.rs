//! Exact base-10 numbers used by numeric sequences.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use runm_core::errors::{ErrorInfo, RunmError};

/// Decimal value stored as `mantissa * 10^-scale`.
///
/// The written scale is preserved (`"1.50"` keeps two fractional digits)
/// because it feeds the shared output format of a sequence.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

fn overflow(text: impl Into<String>) -> RunmError {
    RunmError::Config(
        ErrorInfo::new("decimal_overflow", "decimal value out of range")
            .with_context("value", text),
    )
}

fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

impl Decimal {
    /// Builds a decimal from its raw parts.
    pub const fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    /// Number of fractional digits as written.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Raw integer mantissa.
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// True for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// True for any representation of zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Count of digits needed before the decimal point (at least one).
    pub fn integer_digits(&self) -> u32 {
        let digits = self.mantissa.unsigned_abs().to_string().len() as i64;
        (digits - self.scale as i64).max(1) as u32
    }

    /// Re-expresses the value with `scale` fractional digits.
    ///
    /// Only widening is supported; narrowing would lose digits.
    pub fn rescale(&self, scale: u32) -> Option<Self> {
        if scale < self.scale {
            return None;
        }
        let factor = pow10(scale - self.scale)?;
        Some(Self {
            mantissa: self.mantissa.checked_mul(factor)?,
            scale,
        })
    }

    /// Exact addition; the result carries the larger of the two scales.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let scale = self.scale.max(other.scale);
        let lhs = self.rescale(scale)?;
        let rhs = other.rescale(scale)?;
        Some(Self {
            mantissa: lhs.mantissa.checked_add(rhs.mantissa)?,
            scale,
        })
    }

    fn aligned(&self, other: &Self) -> Option<(i128, i128)> {
        let scale = self.scale.max(other.scale);
        Some((self.rescale(scale)?.mantissa, other.rescale(scale)?.mantissa))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.aligned(other) {
            Some((lhs, rhs)) => lhs.cmp(&rhs),
            // Alignment only overflows when the scales differ wildly; the sign
            // and then the integer part decide the order in that case.
            None => {
                let lhs = self.mantissa / pow10(self.scale).unwrap_or(i128::MAX);
                let rhs = other.mantissa / pow10(other.scale).unwrap_or(i128::MAX);
                self.mantissa
                    .signum()
                    .cmp(&other.mantissa.signum())
                    .then(lhs.cmp(&rhs))
            }
        }
    }
}

impl FromStr for Decimal {
    type Err = RunmError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            RunmError::Config(
                ErrorInfo::new("decimal_parse", "not a decimal number")
                    .with_context("value", text.to_string()),
            )
        };
        let trimmed = text.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (number, exponent) = match body.find(['e', 'E']) {
            Some(idx) => {
                let exp: i64 = body[idx + 1..].parse().map_err(|_| invalid())?;
                (&body[..idx], exp)
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = match number.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit - b'0')))
                .ok_or_else(|| overflow(text))?;
        }
        let mut scale = frac_part.len() as i64 - exponent;
        if scale < 0 {
            let factor = u32::try_from(-scale)
                .ok()
                .and_then(pow10)
                .ok_or_else(|| overflow(text))?;
            mantissa = mantissa.checked_mul(factor).ok_or_else(|| overflow(text))?;
            scale = 0;
        }
        let scale = u32::try_from(scale).map_err(|_| overflow(text))?;
        if negative {
            mantissa = -mantissa;
        }
        Ok(Self { mantissa, scale })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        NumberFormat {
            width: 0,
            fraction_digits: self.scale,
        }
        .write(self, f)
    }
}

/// Fixed-width, zero-padded rendering shared by every value of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Minimum total width, sign and decimal point included.
    pub width: usize,
    /// Digits after the decimal point.
    pub fraction_digits: u32,
}

impl NumberFormat {
    /// Derives the format covering every value in `values`.
    pub fn covering<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> Self {
        let mut before = 1u32;
        let mut after = 0u32;
        for value in values {
            before = before.max(value.integer_digits());
            after = after.max(value.scale());
        }
        let width = if after == 0 {
            before
        } else {
            before + after + 1
        };
        Self {
            width: width as usize,
            fraction_digits: after,
        }
    }

    /// Renders `value` with this format.
    pub fn render(&self, value: &Decimal) -> String {
        let mut out = String::new();
        // Writing into a String only fails when rescaling overflows, which the
        // sequence rules out by validating its bounds up front.
        let _ = self.write(value, &mut out);
        out
    }

    fn write(&self, value: &Decimal, f: &mut impl fmt::Write) -> fmt::Result {
        let fraction = self.fraction_digits.max(value.scale) as usize;
        let digits = match value.rescale(fraction as u32) {
            Some(scaled) => scaled.mantissa.unsigned_abs().to_string(),
            None => return Err(fmt::Error),
        };
        let digits = format!("{digits:0>width$}", width = fraction + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - fraction);
        let sign = if value.is_negative() { "-" } else { "" };
        let mut body = int_part.to_string();
        if fraction > 0 {
            body.push('.');
            body.push_str(frac_part);
        }
        let pad = self.width.saturating_sub(sign.len() + body.len());
        write!(f, "{sign}{}{body}", "0".repeat(pad))
    }
}
