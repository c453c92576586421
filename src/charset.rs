// src/charset.rs
//! Character-class edges: a bit set over the alphabet plus a complement flag.

use std::str::FromStr;

use crate::bitset::BitSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedClass {
    Lower,
    Upper,
    Alpha,
    Digit,
    Alnum,
    Space,
    XDigit,
    Punct,
}

impl NamedClass {
    pub fn matches(self, c: char) -> bool {
        use NamedClass::*;
        match self {
            Lower => c.is_lowercase(),
            Upper => c.is_uppercase(),
            Alpha => c.is_alphabetic(),
            Digit => c.is_ascii_digit(),
            Alnum => c.is_alphabetic() || c.is_ascii_digit(),
            Space => c.is_whitespace(),
            XDigit => c.is_ascii_hexdigit(),
            Punct => c.is_ascii_punctuation(),
        }
    }
}

impl FromStr for NamedClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        use NamedClass::*;
        Ok(match s {
            "lower" => Lower,
            "upper" => Upper,
            "alpha" => Alpha,
            "digit" => Digit,
            "alnum" => Alnum,
            "space" => Space,
            "xdigit" => XDigit,
            "punct" => Punct,
            _ => return Err(()),
        })
    }
}

/// Membership is `bits.get(i) != complement`; flipping the flag never
/// touches the bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharSet {
    bits: BitSet,
    complement: bool,
}

// Case mappings that expand to several codepoints are ignored.
fn single(c: char, mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(v), None) if v != c => Some(v),
        _ => None,
    }
}

impl CharSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, c: u32) {
        self.bits.set(c as usize);
    }

    /// Adds `c` together with its lower- and upper-case forms.
    pub fn add_ncase(&mut self, c: u32) {
        self.add(c);
        if let Some(ch) = char::from_u32(c) {
            for v in [single(ch, ch.to_lowercase()), single(ch, ch.to_uppercase())]
                .into_iter()
                .flatten()
            {
                self.add(v as u32);
            }
        }
    }

    /// Adds every codepoint below `alphabet` that belongs to `class`.
    pub fn add_class(&mut self, class: NamedClass, alphabet: u32, ignore_case: bool) {
        for cp in 0..alphabet {
            let Some(ch) = char::from_u32(cp) else {
                continue;
            };
            if class.matches(ch) {
                if ignore_case {
                    self.add_ncase(cp);
                } else {
                    self.add(cp);
                }
            }
        }
    }

    /// Drops listed members at or above `limit`.
    pub fn retain_below(&mut self, limit: u32) {
        let limit = limit as usize;
        if self.bits.iter().any(|i| i >= limit) {
            self.bits = self.bits.iter().filter(|&i| i < limit).collect();
        }
    }

    pub fn complement(&mut self) {
        self.complement = !self.complement;
    }

    pub fn is_complement(&self) -> bool {
        self.complement
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.bits.get(c as usize) != self.complement
    }

    /// The set of listed (not effective) members.
    pub fn members(&self) -> &BitSet {
        &self.bits
    }

    /// Re-expresses the set through `mapping` (codepoint -> column).
    /// Members without an entry in `mapping` are dropped.
    pub fn map(&self, mapping: &[u32]) -> CharSet {
        let bits = self
            .bits
            .iter()
            .filter_map(|i| mapping.get(i).map(|&c| c as usize))
            .collect();
        CharSet {
            bits,
            complement: self.complement,
        }
    }
}
