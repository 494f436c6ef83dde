use crate::Clause;

/// Intrinsic-gas constant table, matching the reference node's
/// EVM-equivalent schedule.
///
/// The constants live in one versioned table rather than inline literals:
/// they are the single most consequential silently-wrong surface of the
/// codec, and the conformance tests pin the active table field by field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasSchedule {
    /// Flat cost of any transaction.
    pub tx_gas: u64,
    /// Additional cost of a call clause.
    pub clause_gas: u64,
    /// Additional cost of a contract-creation clause.
    pub clause_gas_contract_creation: u64,
    /// Cost per zero byte of clause data.
    pub data_zero_gas: u64,
    /// Cost per non-zero byte of clause data.
    pub data_nonzero_gas: u64,
}

/// The active schedule. A transfer with one empty call clause totals 21_000,
/// a single-clause contract creation 53_000, matching the reference chain.
pub const GAS_SCHEDULE: GasSchedule = GasSchedule {
    tx_gas: 5_000,
    clause_gas: 16_000,
    clause_gas_contract_creation: 48_000,
    data_zero_gas: 4,
    data_nonzero_gas: 68,
};

impl GasSchedule {
    /// Data cost of one clause: a per-byte charge distinguishing zero from
    /// non-zero bytes.
    pub fn data_gas(&self, data: &[u8]) -> u64 {
        data.iter().fold(0u64, |gas, &byte| {
            gas.saturating_add(if byte == 0 { self.data_zero_gas } else { self.data_nonzero_gas })
        })
    }

    /// Minimum gas the given clause list must declare.
    ///
    /// Pure and total: arithmetic saturates at `u64::MAX` instead of
    /// failing. An empty clause list is charged as one empty call clause.
    pub fn intrinsic_gas(&self, clauses: &[Clause]) -> u64 {
        if clauses.is_empty() {
            return self.tx_gas.saturating_add(self.clause_gas);
        }
        clauses.iter().fold(self.tx_gas, |gas, clause| {
            let clause_gas = if clause.is_create() {
                self.clause_gas_contract_creation
            } else {
                self.clause_gas
            };
            gas.saturating_add(clause_gas).saturating_add(self.data_gas(&clause.data))
        })
    }
}

/// Minimum gas a transaction with `clauses` must declare, under the active
/// [`GAS_SCHEDULE`].
pub fn intrinsic_gas(clauses: &[Clause]) -> u64 {
    GAS_SCHEDULE.intrinsic_gas(clauses)
}
