//! Roomledger engine: balance computation, settlement planning and the
//! append-only ledger mutations for shared-expense rooms.
//!
//! The computational core is pure ([`compute_balances`], [`plan_transfers`]);
//! [`Engine`] wraps it with persistence, authorization and the transactional
//! settle-all batch.

pub use balance::{BalanceStatus, MemberBalance, compute_balances};
pub use error::EngineError;
pub use expenses::Expense;
pub use ledger_entries::{EntryKind, LedgerEntry};
pub use members::Member;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, SettleOutcome};
pub use rooms::Room;
pub use settlement::{SettlementTransfer, plan_transfers};

mod balance;
mod error;
pub mod expenses;
pub mod ledger_entries;
pub mod members;
mod money;
mod ops;
pub mod rooms;
mod settlement;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
