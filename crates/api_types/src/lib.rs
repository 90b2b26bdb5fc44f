//! Wire types shared between the HTTP server and its clients.
//!
//! All monetary amounts travel as `*_minor` integers (cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod room {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomGet {
        /// Room id (UUID string). Exactly one of `id`/`name` must be set.
        pub id: Option<String>,
        /// Room name (case-insensitive convenience lookup).
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomView {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoomsResponse {
        pub rooms: Vec<RoomView>,
    }
}

pub mod member {
    use super::*;

    /// Request body for adding a member to a room.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub email: String,
        pub display_name: String,
        /// Optional login to link; the member can then authenticate as itself.
        pub user_id: Option<String>,
        pub is_admin: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub email: String,
        pub display_name: String,
        pub is_admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// Request body for granting/revoking the admin role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberRoleUpdate {
        pub is_admin: bool,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub room_id: String,
        /// Must be > 0.
        pub amount_minor: i64,
        /// Defaults to the caller's own membership; paying on someone
        /// else's behalf requires the admin role.
        pub payer_id: Option<Uuid>,
        pub description: Option<String>,
        /// RFC3339 timestamp.
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub room_id: String,
        pub include_voided: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseVoid {
        pub room_id: String,
        /// RFC3339 timestamp recorded as the void time.
        pub voided_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub payer_id: Uuid,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub occurred_at: DateTime<Utc>,
        pub voided: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod ledger {
    use super::*;

    /// Request body for a contribution or a manual settlement entry.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub room_id: String,
        pub member_id: Uuid,
        /// Must be > 0; the endpoint decides the stored sign.
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp.
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        pub member_id: Uuid,
        /// Signed: credits positive, debits negative.
        pub amount_minor: i64,
        pub kind: String,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntriesResponse {
        pub entries: Vec<EntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryList {
        pub room_id: String,
    }
}

pub mod balance {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BalanceStatus {
        Credit,
        Debit,
        Even,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberBalanceView {
        pub member_id: Uuid,
        pub email: String,
        pub display_name: String,
        pub total_expenses_minor: i64,
        pub total_contributions_minor: i64,
        pub total_settlements_minor: i64,
        pub pending_minor: i64,
        pub equal_share_minor: i64,
        pub final_balance_minor: i64,
        pub status: BalanceStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceGet {
        pub room_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<MemberBalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from: Uuid,
        pub to: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanResponse {
        pub transfers: Vec<TransferView>,
    }

    /// Request body for the batch settlement.
    ///
    /// `expected` carries the pending figures the client displayed when the
    /// admin confirmed; the server re-verifies them before writing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleAll {
        pub room_id: String,
        pub expected: Vec<ExpectedPending>,
        /// RFC3339 timestamp stamped on the appended entries.
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpectedPending {
        pub member_id: Uuid,
        pub pending_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleAllResponse {
        pub entries: Vec<super::ledger::EntryView>,
        pub balances: Vec<MemberBalanceView>,
    }
}
