// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::element::RingElement;
use crate::errors::RingError;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;
use zkhe_polynomial::{ModulusChain, NttTables};

/// The algebraic context every [`RingElement`] is built against.
///
/// Holds the modulus chain and its NTT tables. Contexts are immutable and shared as
/// `Arc<RingContext>`; they are passed explicitly to every constructor.
#[derive(Debug)]
pub struct RingContext {
    chain: Arc<ModulusChain>,
    tables: Arc<NttTables>,
    characteristic: Option<u64>,
}

impl RingContext {
    pub fn new(chain: ModulusChain) -> Result<Arc<Self>, RingError> {
        let tables = NttTables::new_arc(&chain)?;
        let characteristic = chain.product_u64();
        info!(
            degree = chain.degree(),
            moduli = ?chain.values(),
            "created ring context"
        );
        Ok(Arc::new(Self {
            chain: Arc::new(chain),
            tables,
            characteristic,
        }))
    }

    pub fn from_moduli(degree: usize, moduli: &[u64]) -> Result<Arc<Self>, RingError> {
        Self::new(ModulusChain::new(degree, moduli)?)
    }

    pub fn chain(&self) -> &Arc<ModulusChain> {
        &self.chain
    }

    pub fn tables(&self) -> &Arc<NttTables> {
        &self.tables
    }

    pub fn degree(&self) -> usize {
        self.chain.degree()
    }

    /// `Q = q_1 ⋯ q_k` when it fits in a `u64`.
    pub fn characteristic(&self) -> Option<u64> {
        self.characteristic
    }

    pub fn zero(self: &Arc<Self>) -> RingElement {
        RingElement::zero(self)
    }

    pub fn one(self: &Arc<Self>) -> RingElement {
        RingElement::one(self)
    }

    pub fn scalar(self: &Arc<Self>, value: u64) -> RingElement {
        RingElement::scalar(self, value)
    }
}

/// A set-once holder for a context.
///
/// Replaces a process-wide singleton: the owner decides where the slot lives and hands out
/// the context by reference once it is set.
#[derive(Debug)]
pub struct ContextSlot<T = Arc<RingContext>> {
    cell: OnceCell<T>,
}

impl<T> ContextSlot<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// # Errors
    ///
    /// Returns [`RingError::ContextAlreadySet`] on any call after the first.
    pub fn set(&self, context: T) -> Result<(), RingError> {
        self.cell
            .set(context)
            .map_err(|_| RingError::ContextAlreadySet)
    }

    /// # Errors
    ///
    /// Returns [`RingError::ContextNotSet`] before [`set`](Self::set) succeeded.
    pub fn get(&self) -> Result<&T, RingError> {
        self.cell.get().ok_or(RingError::ContextNotSet)
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for ContextSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_slot_is_set_once() {
        let ctx = RingContext::from_moduli(16, &[0x3ffffe81]).unwrap();
        let slot = ContextSlot::new();
        assert!(matches!(slot.get(), Err(RingError::ContextNotSet)));
        slot.set(ctx.clone()).unwrap();
        assert!(slot.is_set());
        assert!(Arc::ptr_eq(slot.get().unwrap(), &ctx));
        assert!(matches!(slot.set(ctx), Err(RingError::ContextAlreadySet)));
    }

    #[test]
    fn test_characteristic() {
        let ctx = RingContext::from_moduli(16, &[0x3ffffe81, 0x3ffff781]).unwrap();
        assert_eq!(ctx.characteristic(), Some(0x3ffffe81 * 0x3ffff781));
        assert_eq!(ctx.degree(), 16);
    }

    #[test]
    fn test_invalid_chain_is_reported() {
        assert!(matches!(
            RingContext::from_moduli(16, &[101]),
            Err(RingError::Polynomial(_))
        ));
    }
}
