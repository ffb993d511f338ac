//! Deterministic address tokens
//!
//! Addresses are printable tokens derived from a numeric seed: the seed is
//! written in base 36 (`0-9a-z`) behind the `0x` marker. The mapping is a pure
//! function of the seed, so fixtures and snapshots are reproducible.
//!
//! ```text
//! 0      → 0x0        (reserved zero token, never allocated)
//! 35     → 0xz
//! 36     → 0x10
//! -7     → 0x-7
//! 2.5    → 0x2.5
//! ```
//!
//! The [`AddressGenerator`] owned by the memory model hands out seeds `1, 2,
//! 3, ...`, so every allocation (stack slot or heap entry) receives a distinct
//! token for the lifetime of a run.

use crate::interpreter::constants::{ADDRESS_ALPHABET, ADDRESS_MARKER};
use std::fmt;

/// Opaque printable address token. Equality is by token value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// The reserved token produced by seed `0`.
    pub fn zero() -> Self {
        address_for(0.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a seed to its address token. Total over every `f64`, NaN included.
pub fn address_for(seed: f64) -> Address {
    if seed.is_nan() {
        return Address(format!("{ADDRESS_MARKER}nan"));
    }
    if seed.is_infinite() {
        let sign = if seed < 0.0 { "-" } else { "" };
        return Address(format!("{ADDRESS_MARKER}{sign}inf"));
    }

    let magnitude = seed.abs();
    let whole = magnitude.trunc();
    let fraction = magnitude - whole;

    let mut token = String::from(ADDRESS_MARKER);
    if seed < 0.0 {
        token.push('-');
    }
    token.push_str(&encode_whole(whole));

    if fraction > 0.0 {
        // Shortest round-trip digits
        let digits = fraction.to_string();
        token.push('.');
        token.push_str(digits.trim_start_matches("0."));
    }

    Address(token)
}

/// Base-36 digits of a non-negative integral `f64`.
fn encode_whole(whole: f64) -> String {
    let mut digits = Vec::new();

    // Exact path for everything that fits in a u128
    if whole < u128::MAX as f64 {
        let mut n = whole as u128;
        loop {
            digits.push(ADDRESS_ALPHABET[(n % 36) as usize]);
            n /= 36;
            if n == 0 {
                break;
            }
        }
    } else {
        let mut n = whole;
        loop {
            digits.push(ADDRESS_ALPHABET[(n % 36.0) as usize]);
            n = (n / 36.0).trunc();
            if n < 1.0 {
                break;
            }
        }
    }

    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Monotonic seed counter. Starts at 1 so the zero token is never handed out.
#[derive(Debug, Clone)]
pub struct AddressGenerator {
    next_seed: u64,
}

impl AddressGenerator {
    pub fn new() -> Self {
        AddressGenerator { next_seed: 1 }
    }

    /// Allocate the next address.
    pub fn next(&mut self) -> Address {
        let address = address_for(self.next_seed as f64);
        self.next_seed += 1;
        address
    }

    /// Number of addresses handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next_seed - 1
    }
}

impl Default for AddressGenerator {
    fn default() -> Self {
        Self::new()
    }
}
