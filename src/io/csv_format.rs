//! CSV format handling for account seeds, transfer requests, and output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for deserialization
//! - Conversion from rows to domain types
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, AccountId, BillingType, TransferError, TransferKind, TransferRequest, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Account seed row as read from the accounts CSV
///
/// Columns: id, number, user, balance
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountRow {
    pub id: AccountId,
    pub number: String,
    pub user: UserId,
    pub balance: Option<String>,
}

/// Transfer request row as read from the transfers CSV
///
/// Columns: kind, user, from, to, amount, upi_id, billing_type, customer_id,
/// property_name, rr_number, idempotency_key. Which optional columns must be
/// filled depends on the kind; blank means absent.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferRow {
    pub kind: String,
    pub user: UserId,
    pub from: String,
    pub to: Option<String>,
    pub amount: Option<String>,
    pub upi_id: Option<String>,
    pub billing_type: Option<String>,
    pub customer_id: Option<String>,
    pub property_name: Option<String>,
    pub rr_number: Option<String>,
    pub idempotency_key: Option<String>,
}

/// Treat blank CSV fields as absent
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(|v| v.trim().to_string())
}

/// Parse a required decimal amount field
fn parse_amount(amount: Option<String>, context: &str) -> Result<Decimal, TransferError> {
    let raw = non_empty(amount).ok_or_else(|| TransferError::Parse {
        line: None,
        message: format!("{} requires an amount", context),
    })?;

    Decimal::from_str(&raw).map_err(|_| TransferError::Parse {
        line: None,
        message: format!("invalid amount '{}' for {}", raw, context),
    })
}

/// Parse the wire name of a transfer kind (case-insensitive)
pub fn parse_kind(kind: &str) -> Result<TransferKind, TransferError> {
    match kind.trim().to_uppercase().as_str() {
        "SELF_TRANSFER" => Ok(TransferKind::SelfTransfer),
        "TRANSFER_TO_OTHERS" => Ok(TransferKind::TransferToOthers),
        "UPI" => Ok(TransferKind::Upi),
        "BILL_PAYMENT" => Ok(TransferKind::BillPayment),
        other => Err(TransferError::unsupported_kind(other)),
    }
}

/// Parse the wire name of a billing type (case-insensitive)
pub fn parse_billing_type(billing_type: &str) -> Result<BillingType, TransferError> {
    match billing_type.trim().to_uppercase().as_str() {
        "ELECTRICITY" => Ok(BillingType::Electricity),
        "RENT" => Ok(BillingType::Rent),
        "WATER" => Ok(BillingType::Water),
        other => Err(TransferError::validation(
            "billingType",
            format!("unknown billing type '{}'", other),
        )),
    }
}

/// Convert an AccountRow to an Account
///
/// The balance is required and must be a non-negative decimal; a corrupt
/// seed row is a fatal error rather than a silently dropped account.
pub fn convert_account_row(row: AccountRow) -> Result<Account, TransferError> {
    let context = format!("account {}", row.id);
    let balance = parse_amount(row.balance, &context)?;

    if balance < Decimal::ZERO {
        return Err(TransferError::Parse {
            line: None,
            message: format!("negative balance '{}' for account {}", balance, row.id),
        });
    }

    Ok(Account::with_balance(row.id, row.number.trim(), row.user, balance))
}

/// Convert a TransferRow to a TransferRequest
///
/// Parses the kind and billing type into their closed enums and the amount
/// into a decimal. Per-kind field requirements (destination, UPI id,
/// category references) are left to the validator so the request/validator
/// split matches the engine's pipeline.
pub fn convert_transfer_row(row: TransferRow) -> Result<TransferRequest, TransferError> {
    let kind = parse_kind(&row.kind)?;
    let context = format!("{} transfer", kind.as_str());
    let amount = parse_amount(row.amount, &context)?;

    let billing_type = non_empty(row.billing_type)
        .map(|raw| parse_billing_type(&raw))
        .transpose()?;

    Ok(TransferRequest {
        user_id: row.user,
        from_account: row.from.trim().to_string(),
        to_account: non_empty(row.to),
        amount,
        kind,
        upi_id: non_empty(row.upi_id),
        billing_type,
        customer_id: non_empty(row.customer_id),
        property_name: non_empty(row.property_name),
        rr_number: non_empty(row.rr_number),
        idempotency_key: non_empty(row.idempotency_key),
    })
}

/// Write final account states to CSV
///
/// Columns: id, number, user, balance. Accounts are sorted by id for
/// deterministic output.
pub fn write_accounts_csv(
    accounts: &[Account],
    output: &mut dyn Write,
) -> Result<(), TransferError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["id", "number", "user", "balance"])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.number.clone(),
            account.user.to_string(),
            format!("{:.2}", account.balance),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
