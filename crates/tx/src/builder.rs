use alloy_primitives::{B256, B64, U256};

use crate::{Clause, Reserved, Transaction, TxDynamicFee, TxLegacy};

/// Fee fields accumulated by the builder; the last fee setter called wins
/// the variant.
#[derive(Clone, Debug)]
enum Fee {
    Legacy { gas_price_coef: u8 },
    Dynamic { max_priority_fee_per_gas: U256, max_fee_per_gas: U256 },
}

impl Default for Fee {
    fn default() -> Self {
        Self::Legacy { gas_price_coef: 0 }
    }
}

/// Fluent construction of transaction bodies.
///
/// Defaults to a legacy body with coefficient zero; calling any dynamic fee
/// setter switches the variant, and [`Self::gas_price_coef`] switches it
/// back. Building is infallible, validation happens when the body is
/// signed or encoded.
#[derive(Clone, Debug, Default)]
pub struct TransactionBuilder {
    chain_tag: u8,
    block_ref: B64,
    expiration: u32,
    clauses: Vec<Clause>,
    fee: Fee,
    gas: u64,
    depends_on: Option<B256>,
    nonce: u64,
    delegated: bool,
}

impl TransactionBuilder {
    /// Starts from an all-default legacy body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chain tag.
    pub const fn chain_tag(mut self, chain_tag: u8) -> Self {
        self.chain_tag = chain_tag;
        self
    }

    /// Sets the block reference.
    pub const fn block_ref(mut self, block_ref: B64) -> Self {
        self.block_ref = block_ref;
        self
    }

    /// Sets the expiration window, in blocks.
    pub const fn expiration(mut self, expiration: u32) -> Self {
        self.expiration = expiration;
        self
    }

    /// Appends a clause.
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Replaces the clause list.
    pub fn clauses(mut self, clauses: Vec<Clause>) -> Self {
        self.clauses = clauses;
        self
    }

    /// Sets the fee coefficient and selects the legacy fee model.
    pub fn gas_price_coef(mut self, gas_price_coef: u8) -> Self {
        self.fee = Fee::Legacy { gas_price_coef };
        self
    }

    /// Sets the priority fee cap and selects the dynamic fee model.
    pub fn max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: U256) -> Self {
        self.fee = match self.fee {
            Fee::Dynamic { max_fee_per_gas, .. } => {
                Fee::Dynamic { max_priority_fee_per_gas, max_fee_per_gas }
            }
            Fee::Legacy { .. } => {
                Fee::Dynamic { max_priority_fee_per_gas, max_fee_per_gas: U256::ZERO }
            }
        };
        self
    }

    /// Sets the absolute fee cap and selects the dynamic fee model.
    pub fn max_fee_per_gas(mut self, max_fee_per_gas: U256) -> Self {
        self.fee = match self.fee {
            Fee::Dynamic { max_priority_fee_per_gas, .. } => {
                Fee::Dynamic { max_priority_fee_per_gas, max_fee_per_gas }
            }
            Fee::Legacy { .. } => {
                Fee::Dynamic { max_priority_fee_per_gas: U256::ZERO, max_fee_per_gas }
            }
        };
        self
    }

    /// Sets the gas limit.
    pub const fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Makes the body depend on another transaction.
    pub const fn depends_on(mut self, id: B256) -> Self {
        self.depends_on = Some(id);
        self
    }

    /// Sets the nonce.
    pub const fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Marks the body for fee delegation.
    pub const fn delegated(mut self) -> Self {
        self.delegated = true;
        self
    }

    /// Assembles the body.
    pub fn build(self) -> Transaction {
        let reserved =
            if self.delegated { Reserved::delegated() } else { Reserved::default() };
        match self.fee {
            Fee::Legacy { gas_price_coef } => Transaction::Legacy(TxLegacy {
                chain_tag: self.chain_tag,
                block_ref: self.block_ref,
                expiration: self.expiration,
                clauses: self.clauses,
                gas_price_coef,
                gas: self.gas,
                depends_on: self.depends_on,
                nonce: self.nonce,
                reserved,
            }),
            Fee::Dynamic { max_priority_fee_per_gas, max_fee_per_gas } => {
                Transaction::DynamicFee(TxDynamicFee {
                    chain_tag: self.chain_tag,
                    block_ref: self.block_ref,
                    expiration: self.expiration,
                    clauses: self.clauses,
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas: self.gas,
                    depends_on: self.depends_on,
                    nonce: self.nonce,
                    reserved,
                })
            }
        }
    }
}
