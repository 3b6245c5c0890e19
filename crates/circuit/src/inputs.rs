// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::{BTreeMap, HashMap};

/// Register `0` of every pool holds `Enc(1)`.
pub const ONE_REGISTER: usize = 0;
/// Register `1` of every pool holds `Enc(-1)`.
pub const NEG_ONE_REGISTER: usize = 1;

/// Pre-encrypted ciphertexts keyed by the register they are loaded into.
///
/// The pool occupies registers `0..size()`; registers in that range without a ciphertext
/// stay undefined until an instruction writes them.
#[derive(Debug, Clone)]
pub struct InputPool<C> {
    slots: BTreeMap<usize, C>,
}

impl<C> InputPool<C> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, index: usize, ciphertext: C) -> Option<C> {
        self.slots.insert(index, ciphertext)
    }

    pub fn get(&self, index: usize) -> Option<&C> {
        self.slots.get(&index)
    }

    /// Number of registers the pool spans.
    pub fn size(&self) -> usize {
        self.slots.keys().next_back().map_or(0, |last| last + 1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.slots.iter().map(|(i, c)| (*i, c))
    }
}

impl<C> Default for InputPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FromIterator<(usize, C)> for InputPool<C> {
    fn from_iter<I: IntoIterator<Item = (usize, C)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// Ciphertexts for named circuit inputs.
pub type Variables<C> = HashMap<char, C>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_spans_gaps() {
        let mut pool = InputPool::new();
        assert_eq!(pool.size(), 0);
        pool.insert(ONE_REGISTER, "one");
        pool.insert(NEG_ONE_REGISTER, "neg_one");
        pool.insert(5, "five");
        assert_eq!(pool.size(), 6);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(5), Some(&"five"));
        assert!(pool.get(3).is_none());
        assert_eq!(
            pool.iter().map(|(i, _)| i).collect::<Vec<_>>(),
            vec![0, 1, 5]
        );
    }
}
