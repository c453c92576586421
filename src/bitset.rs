// src/bitset.rs
//! Sparse bit set over non-negative integers.
//!
//! Members are grouped into 64-bit blocks; only non-zero blocks are stored,
//! as parallel vectors of block offsets and words. Offsets are strictly
//! increasing and no stored word is zero, so two sets holding the same
//! members always have the same representation. That is what lets the
//! derived `Eq`, `Hash` and `Ord` impls act as structural set equality,
//! which the subset construction relies on when it keys DFA states by
//! their NFA-state sets.

use std::{
    fmt,
    ops::{BitAnd, BitOr, BitXor},
};

const WORD_BITS: usize = 64;

#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitSet {
    offs: Vec<u32>,
    words: Vec<u64>,
}

#[inline]
fn split(i: usize) -> (u32, u64) {
    ((i / WORD_BITS) as u32, 1u64 << (i % WORD_BITS))
}

impl BitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding every integer in `0..n`.
    pub fn full(n: usize) -> Self {
        (0..n).collect()
    }

    pub fn set(&mut self, i: usize) {
        let (block, mask) = split(i);
        match self.offs.binary_search(&block) {
            Ok(at) => self.words[at] |= mask,
            Err(at) => {
                self.offs.insert(at, block);
                self.words.insert(at, mask);
            }
        }
    }

    pub fn clear(&mut self, i: usize) {
        let (block, mask) = split(i);
        if let Ok(at) = self.offs.binary_search(&block) {
            self.words[at] &= !mask;
            if self.words[at] == 0 {
                self.offs.remove(at);
                self.words.remove(at);
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.offs.clear();
        self.words.clear();
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        let (block, mask) = split(i);
        match self.offs.binary_search(&block) {
            Ok(at) => self.words[at] & mask != 0,
            Err(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            at: 0,
            word: self.words.first().copied().unwrap_or(0),
        }
    }

    // Merge two block lists with `op`, dropping blocks that come out zero.
    fn combine(&self, other: &BitSet, op: impl Fn(u64, u64) -> u64) -> BitSet {
        let mut out = BitSet::new();
        let (mut i, mut j) = (0, 0);
        loop {
            let (block, word) = match (self.offs.get(i), other.offs.get(j)) {
                (None, None) => break,
                (Some(&a), None) => {
                    i += 1;
                    (a, op(self.words[i - 1], 0))
                }
                (None, Some(&b)) => {
                    j += 1;
                    (b, op(0, other.words[j - 1]))
                }
                (Some(&a), Some(&b)) if a < b => {
                    i += 1;
                    (a, op(self.words[i - 1], 0))
                }
                (Some(&a), Some(&b)) if b < a => {
                    j += 1;
                    (b, op(0, other.words[j - 1]))
                }
                (Some(&a), Some(_)) => {
                    i += 1;
                    j += 1;
                    (a, op(self.words[i - 1], other.words[j - 1]))
                }
            };
            if word != 0 {
                out.offs.push(block);
                out.words.push(word);
            }
        }
        out
    }

    pub fn union(&self, other: &BitSet) -> BitSet {
        self.combine(other, |a, b| a | b)
    }

    pub fn intersection(&self, other: &BitSet) -> BitSet {
        self.combine(other, |a, b| a & b)
    }

    pub fn xor(&self, other: &BitSet) -> BitSet {
        self.combine(other, |a, b| a ^ b)
    }
}

impl BitOr for &BitSet {
    type Output = BitSet;
    fn bitor(self, rhs: &BitSet) -> BitSet {
        self.union(rhs)
    }
}

impl BitAnd for &BitSet {
    type Output = BitSet;
    fn bitand(self, rhs: &BitSet) -> BitSet {
        self.intersection(rhs)
    }
}

impl BitXor for &BitSet {
    type Output = BitSet;
    fn bitxor(self, rhs: &BitSet) -> BitSet {
        self.xor(rhs)
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::new();
        for i in iter {
            set.set(i);
        }
        set
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub struct Iter<'a> {
    set: &'a BitSet,
    at: usize,
    word: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.word != 0 {
                let bit = self.word.trailing_zeros() as usize;
                self.word &= self.word - 1;
                return Some(self.set.offs[self.at] as usize * WORD_BITS + bit);
            }
            self.at += 1;
            self.word = *self.set.words.get(self.at)?;
        }
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
