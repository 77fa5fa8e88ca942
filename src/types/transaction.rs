//! Transaction-related types for the transfer engine
//!
//! This module defines the transfer request submitted by callers, the
//! immutable transaction-history record produced by the engine, and the
//! billing sub-record attached to bill payments.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User identifier
///
/// Supports user IDs from 0 to 2^64 - 1
pub type UserId = u64;

/// Transaction identifier, assigned by the history ledger on append
pub type TransactionId = u64;

/// Billing record identifier
pub type BillingId = u64;

/// Transfer kinds supported by the engine
///
/// Two-sided kinds (`SelfTransfer`, `TransferToOthers`) debit the source
/// account and credit the destination account. One-sided kinds (`Upi`,
/// `BillPayment`) debit only the source account.
///
/// The set is closed: dispatch is an exhaustive match, so adding a kind is a
/// compile-time-checked change rather than a string comparison fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferKind {
    /// Move funds between two accounts owned by the same user
    SelfTransfer,

    /// Move funds to an account owned by another user
    TransferToOthers,

    /// One-sided debit addressed by an external UPI payment identifier
    Upi,

    /// One-sided debit paying an external utility, rent, or water bill
    BillPayment,
}

impl TransferKind {
    /// Whether this kind credits a destination account
    pub fn is_two_sided(&self) -> bool {
        matches!(self, TransferKind::SelfTransfer | TransferKind::TransferToOthers)
    }

    /// Wire name of the kind (e.g. `SELF_TRANSFER`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::SelfTransfer => "SELF_TRANSFER",
            TransferKind::TransferToOthers => "TRANSFER_TO_OTHERS",
            TransferKind::Upi => "UPI",
            TransferKind::BillPayment => "BILL_PAYMENT",
        }
    }
}

/// Billing categories for bill payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Electricity,
    Rent,
    Water,
}

impl BillingType {
    /// Name of the request field this category requires
    pub fn required_field(&self) -> &'static str {
        match self {
            BillingType::Electricity => "customerId",
            BillingType::Rent => "propertyName",
            BillingType::Water => "rrNumber",
        }
    }
}

/// External target of a bill payment
///
/// Each variant carries exactly the one category-specific field its billing
/// type requires, so a billing record can never hold a mismatched or missing
/// reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingTarget {
    /// Electricity bill, addressed by the utility's customer id
    Electricity { customer_id: String },

    /// Rent payment, addressed by property name
    Rent { property_name: String },

    /// Water bill, addressed by RR number
    Water { rr_number: String },
}

impl BillingTarget {
    /// The billing category this target belongs to
    pub fn billing_type(&self) -> BillingType {
        match self {
            BillingTarget::Electricity { .. } => BillingType::Electricity,
            BillingTarget::Rent { .. } => BillingType::Rent,
            BillingTarget::Water { .. } => BillingType::Water,
        }
    }
}

/// A request to move money, submitted by the caller
///
/// `from_account` and `to_account` are account numbers (the externally
/// addressable alias), matching what clients know about accounts. Which of
/// the optional fields must be present depends on `kind`; the validator
/// enforces those rules before any mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// The requesting user
    pub user_id: UserId,

    /// Source account number
    pub from_account: String,

    /// Destination account number (two-sided kinds only)
    pub to_account: Option<String>,

    /// Amount to move; must be greater than zero
    pub amount: Decimal,

    /// The transfer kind
    pub kind: TransferKind,

    /// External payment identifier (UPI kind only)
    pub upi_id: Option<String>,

    /// Billing category (bill payments only)
    pub billing_type: Option<BillingType>,

    /// Customer id for electricity bills
    pub customer_id: Option<String>,

    /// Property name for rent payments
    pub property_name: Option<String>,

    /// RR number for water bills
    pub rr_number: Option<String>,

    /// Optional client-supplied duplicate-submission token
    ///
    /// When present, the key is reserved atomically before the commit and a
    /// second request carrying the same key is rejected. When absent,
    /// resubmitting an identical request produces a second, independent
    /// transaction.
    pub idempotency_key: Option<String>,
}

impl TransferRequest {
    /// Build a two-sided transfer request with only the fields those kinds use
    pub fn two_sided(
        kind: TransferKind,
        user_id: UserId,
        from_account: impl Into<String>,
        to_account: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        TransferRequest {
            user_id,
            from_account: from_account.into(),
            to_account: Some(to_account.into()),
            amount,
            kind,
            upi_id: None,
            billing_type: None,
            customer_id: None,
            property_name: None,
            rr_number: None,
            idempotency_key: None,
        }
    }

    /// Build a UPI debit request
    pub fn upi(
        user_id: UserId,
        from_account: impl Into<String>,
        amount: Decimal,
        upi_id: impl Into<String>,
    ) -> Self {
        TransferRequest {
            user_id,
            from_account: from_account.into(),
            to_account: None,
            amount,
            kind: TransferKind::Upi,
            upi_id: Some(upi_id.into()),
            billing_type: None,
            customer_id: None,
            property_name: None,
            rr_number: None,
            idempotency_key: None,
        }
    }

    /// Build a bill payment request with the category field left to the caller
    pub fn bill_payment(
        user_id: UserId,
        from_account: impl Into<String>,
        amount: Decimal,
        billing_type: BillingType,
    ) -> Self {
        TransferRequest {
            user_id,
            from_account: from_account.into(),
            to_account: None,
            amount,
            kind: TransferKind::BillPayment,
            upi_id: None,
            billing_type: Some(billing_type),
            customer_id: None,
            property_name: None,
            rr_number: None,
            idempotency_key: None,
        }
    }
}

/// Status of a persisted transaction
///
/// Records are appended only for committed transfers, so `Completed` is the
/// only status that is ever persisted; failed requests return an error and
/// leave no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
}

/// An immutable transaction-history record
///
/// Created exactly once per successful engine invocation and never mutated
/// afterward. Account references are by identity, not by embedding; one-sided
/// kinds have no destination reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Ledger-assigned identity, monotonically increasing in creation order
    pub id: TransactionId,

    /// The requesting user
    pub user_id: UserId,

    /// The transfer kind
    pub kind: TransferKind,

    /// Source account identity
    pub from_account: Option<AccountId>,

    /// Destination account identity (two-sided kinds only)
    pub to_account: Option<AccountId>,

    /// Amount moved
    pub amount: Decimal,

    /// External payment identifier (UPI kind only)
    pub upi_id: Option<String>,

    /// Record status
    pub status: TransactionStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A billing sub-record linked 1:1 to a bill-payment transaction
///
/// Created in the same commit step as its owning transaction record and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRecord {
    /// Recorder-assigned identity
    pub id: BillingId,

    /// The owning transaction record
    pub transaction_id: TransactionId,

    /// Amount billed (equal to the owning transaction's amount)
    pub amount: Decimal,

    /// External billing target with its category-specific reference
    pub target: BillingTarget,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransferKind::SelfTransfer, true)]
    #[case(TransferKind::TransferToOthers, true)]
    #[case(TransferKind::Upi, false)]
    #[case(TransferKind::BillPayment, false)]
    fn test_two_sidedness(#[case] kind: TransferKind, #[case] expected: bool) {
        assert_eq!(kind.is_two_sided(), expected);
    }

    #[rstest]
    #[case(TransferKind::SelfTransfer, "SELF_TRANSFER")]
    #[case(TransferKind::TransferToOthers, "TRANSFER_TO_OTHERS")]
    #[case(TransferKind::Upi, "UPI")]
    #[case(TransferKind::BillPayment, "BILL_PAYMENT")]
    fn test_kind_wire_names(#[case] kind: TransferKind, #[case] expected: &str) {
        assert_eq!(kind.as_str(), expected);
    }

    #[rstest]
    #[case(BillingType::Electricity, "customerId")]
    #[case(BillingType::Rent, "propertyName")]
    #[case(BillingType::Water, "rrNumber")]
    fn test_billing_required_fields(#[case] billing_type: BillingType, #[case] field: &str) {
        assert_eq!(billing_type.required_field(), field);
    }

    #[test]
    fn test_billing_target_reports_its_type() {
        let target = BillingTarget::Rent {
            property_name: "Lakeside Apartments".to_string(),
        };
        assert_eq!(target.billing_type(), BillingType::Rent);
    }

    #[test]
    fn test_two_sided_builder_populates_destination() {
        let request = TransferRequest::two_sided(
            TransferKind::SelfTransfer,
            1,
            "ACC-001",
            "ACC-002",
            rust_decimal::Decimal::new(5000, 2),
        );

        assert_eq!(request.kind, TransferKind::SelfTransfer);
        assert_eq!(request.to_account.as_deref(), Some("ACC-002"));
        assert!(request.upi_id.is_none());
        assert!(request.billing_type.is_none());
    }

    #[test]
    fn test_upi_builder_has_no_destination() {
        let request =
            TransferRequest::upi(1, "ACC-001", rust_decimal::Decimal::new(1000, 2), "alice@upi");

        assert_eq!(request.kind, TransferKind::Upi);
        assert!(request.to_account.is_none());
        assert_eq!(request.upi_id.as_deref(), Some("alice@upi"));
    }
}
