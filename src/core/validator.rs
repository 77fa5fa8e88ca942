//! Per-kind validation of transfer requests
//!
//! The validator turns a raw [`TransferRequest`] into a typed
//! [`TransferPlan`], enforcing the structural and business rules of each
//! transfer kind before any mutation happens. A failed rule aborts with a
//! typed error and zero side effects.
//!
//! Rules per kind:
//!
//! - `SELF_TRANSFER` / `TRANSFER_TO_OTHERS`: destination account number
//!   present and resolvable; self transfers additionally require source and
//!   destination to belong to the requesting user.
//! - `UPI`: `upi_id` present.
//! - `BILL_PAYMENT`: `billing_type` present, plus the category-specific
//!   reference field (customer id, property name, or RR number).

use crate::core::account_store::AccountStore;
use crate::types::{Account, BillingTarget, BillingType, TransferError, TransferKind, TransferRequest};
use rust_decimal::Decimal;

/// The validated shape of a transfer, ready to commit
///
/// Producing this type is the only way request data reaches the commit path,
/// so an unvalidated destination, UPI id, or billing reference cannot leak
/// into a balance write.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferPlan {
    /// Debit the source and credit the resolved destination account
    AccountCredit {
        /// The resolved destination account
        to: Account,
    },

    /// One-sided debit addressed by a UPI identifier
    UpiDebit {
        /// The external payment identifier
        upi_id: String,
    },

    /// One-sided debit paying an external bill
    BillDebit {
        /// The billing target with its category-specific reference
        target: BillingTarget,
    },
}

/// Validator for transfer requests
///
/// Stateless; all context comes from the request, the already-resolved
/// source account, and the account store used to resolve destinations.
pub struct TransactionValidator;

impl TransactionValidator {
    /// Validate a request against its kind's rules
    ///
    /// The source account has already been resolved by the engine (source
    /// resolution and the sufficiency check happen first; see the engine's
    /// commit pipeline). This function checks everything else.
    ///
    /// # Errors
    ///
    /// - `Validation` for a non-positive amount or a missing
    ///   conditionally-required field
    /// - `AccountNotFound` if the destination number does not resolve
    /// - `OwnershipMismatch` if a self transfer touches a foreign account
    pub fn validate<S: AccountStore + ?Sized>(
        request: &TransferRequest,
        from: &Account,
        store: &S,
    ) -> Result<TransferPlan, TransferError> {
        if request.amount <= Decimal::ZERO {
            return Err(TransferError::validation(
                "amount",
                "must be greater than zero",
            ));
        }

        match request.kind {
            TransferKind::SelfTransfer => {
                let to = Self::resolve_destination(request, store)?;
                // Both sides must belong to the requesting user
                if from.user != request.user_id {
                    return Err(TransferError::ownership_mismatch(request.user_id, from.id));
                }
                if to.user != request.user_id {
                    return Err(TransferError::ownership_mismatch(request.user_id, to.id));
                }
                Ok(TransferPlan::AccountCredit { to })
            }
            TransferKind::TransferToOthers => {
                let to = Self::resolve_destination(request, store)?;
                Ok(TransferPlan::AccountCredit { to })
            }
            TransferKind::Upi => {
                let upi_id = request
                    .upi_id
                    .clone()
                    .ok_or_else(|| TransferError::missing_field("upiId", "UPI transfers"))?;
                Ok(TransferPlan::UpiDebit { upi_id })
            }
            TransferKind::BillPayment => {
                let billing_type = request.billing_type.ok_or_else(|| {
                    TransferError::missing_field("billingType", "bill payments")
                })?;
                let target = Self::billing_target(request, billing_type)?;
                Ok(TransferPlan::BillDebit { target })
            }
        }
    }

    /// Resolve the destination account for a two-sided transfer
    fn resolve_destination<S: AccountStore + ?Sized>(
        request: &TransferRequest,
        store: &S,
    ) -> Result<Account, TransferError> {
        let number = request.to_account.as_deref().ok_or_else(|| {
            TransferError::missing_field("toAccount", "transfers between accounts")
        })?;

        store
            .find_by_number(number)
            .ok_or_else(|| TransferError::account_not_found(number))
    }

    /// Build the billing target from the category-specific request field
    fn billing_target(
        request: &TransferRequest,
        billing_type: BillingType,
    ) -> Result<BillingTarget, TransferError> {
        match billing_type {
            BillingType::Electricity => {
                let customer_id = request.customer_id.clone().ok_or_else(|| {
                    TransferError::missing_field(
                        billing_type.required_field(),
                        "electricity bill payments",
                    )
                })?;
                Ok(BillingTarget::Electricity { customer_id })
            }
            BillingType::Rent => {
                let property_name = request.property_name.clone().ok_or_else(|| {
                    TransferError::missing_field(billing_type.required_field(), "rent payments")
                })?;
                Ok(BillingTarget::Rent { property_name })
            }
            BillingType::Water => {
                let rr_number = request.rr_number.clone().ok_or_else(|| {
                    TransferError::missing_field(
                        billing_type.required_field(),
                        "water bill payments",
                    )
                })?;
                Ok(BillingTarget::Water { rr_number })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_store::InMemoryAccountStore;
    use rstest::rstest;

    fn store_with_accounts() -> InMemoryAccountStore {
        let store = InMemoryAccountStore::new();
        store.insert(Account::with_balance(1, "ACC-A", 1, Decimal::new(10000, 2)));
        store.insert(Account::with_balance(2, "ACC-B", 1, Decimal::ZERO));
        store.insert(Account::with_balance(3, "ACC-C", 2, Decimal::ZERO));
        store
    }

    fn from_account(store: &InMemoryAccountStore) -> Account {
        store.find_by_number("ACC-A").unwrap()
    }

    #[test]
    fn test_self_transfer_between_own_accounts_is_valid() {
        let store = store_with_accounts();
        let request = TransferRequest::two_sided(
            TransferKind::SelfTransfer,
            1,
            "ACC-A",
            "ACC-B",
            Decimal::new(5000, 2),
        );

        let plan = TransactionValidator::validate(&request, &from_account(&store), &store).unwrap();

        match plan {
            TransferPlan::AccountCredit { to } => assert_eq!(to.id, 2),
            other => panic!("expected AccountCredit plan, got {:?}", other),
        }
    }

    #[test]
    fn test_self_transfer_to_foreign_account_is_ownership_mismatch() {
        let store = store_with_accounts();
        let request = TransferRequest::two_sided(
            TransferKind::SelfTransfer,
            1,
            "ACC-A",
            "ACC-C",
            Decimal::new(1000, 2),
        );

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert_eq!(result, Err(TransferError::ownership_mismatch(1, 3)));
    }

    #[test]
    fn test_self_transfer_from_foreign_account_is_ownership_mismatch() {
        let store = store_with_accounts();
        // User 2 tries to self-transfer out of user 1's account
        let request = TransferRequest::two_sided(
            TransferKind::SelfTransfer,
            2,
            "ACC-A",
            "ACC-C",
            Decimal::new(1000, 2),
        );

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert_eq!(result, Err(TransferError::ownership_mismatch(2, 1)));
    }

    #[test]
    fn test_transfer_to_others_does_not_check_ownership() {
        let store = store_with_accounts();
        let request = TransferRequest::two_sided(
            TransferKind::TransferToOthers,
            1,
            "ACC-A",
            "ACC-C",
            Decimal::new(3000, 2),
        );

        let plan = TransactionValidator::validate(&request, &from_account(&store), &store).unwrap();

        match plan {
            TransferPlan::AccountCredit { to } => assert_eq!(to.id, 3),
            other => panic!("expected AccountCredit plan, got {:?}", other),
        }
    }

    #[rstest]
    #[case(TransferKind::SelfTransfer)]
    #[case(TransferKind::TransferToOthers)]
    fn test_two_sided_without_destination_is_validation_error(#[case] kind: TransferKind) {
        let store = store_with_accounts();
        let mut request =
            TransferRequest::two_sided(kind, 1, "ACC-A", "ACC-B", Decimal::new(1000, 2));
        request.to_account = None;

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert!(matches!(
            result,
            Err(TransferError::Validation { field, .. }) if field == "toAccount"
        ));
    }

    #[rstest]
    #[case(TransferKind::SelfTransfer)]
    #[case(TransferKind::TransferToOthers)]
    fn test_two_sided_with_unknown_destination_is_account_not_found(#[case] kind: TransferKind) {
        let store = store_with_accounts();
        let request =
            TransferRequest::two_sided(kind, 1, "ACC-A", "ACC-404", Decimal::new(1000, 2));

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert_eq!(result, Err(TransferError::account_not_found("ACC-404")));
    }

    #[test]
    fn test_upi_with_id_is_valid() {
        let store = store_with_accounts();
        let request = TransferRequest::upi(1, "ACC-A", Decimal::new(1000, 2), "alice@upi");

        let plan = TransactionValidator::validate(&request, &from_account(&store), &store).unwrap();

        assert_eq!(
            plan,
            TransferPlan::UpiDebit {
                upi_id: "alice@upi".to_string()
            }
        );
    }

    #[test]
    fn test_upi_without_id_is_validation_error() {
        let store = store_with_accounts();
        let mut request = TransferRequest::upi(1, "ACC-A", Decimal::new(1000, 2), "alice@upi");
        request.upi_id = None;

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert!(matches!(
            result,
            Err(TransferError::Validation { field, .. }) if field == "upiId"
        ));
    }

    #[test]
    fn test_bill_payment_without_billing_type_is_validation_error() {
        let store = store_with_accounts();
        let mut request = TransferRequest::bill_payment(
            1,
            "ACC-A",
            Decimal::new(1000, 2),
            BillingType::Electricity,
        );
        request.billing_type = None;

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert!(matches!(
            result,
            Err(TransferError::Validation { field, .. }) if field == "billingType"
        ));
    }

    #[rstest]
    #[case::electricity(BillingType::Electricity, "customerId")]
    #[case::rent(BillingType::Rent, "propertyName")]
    #[case::water(BillingType::Water, "rrNumber")]
    fn test_bill_payment_missing_category_field(
        #[case] billing_type: BillingType,
        #[case] expected_field: &str,
    ) {
        let store = store_with_accounts();
        let request =
            TransferRequest::bill_payment(1, "ACC-A", Decimal::new(1000, 2), billing_type);

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert!(matches!(
            result,
            Err(TransferError::Validation { field, .. }) if field == expected_field
        ));
    }

    #[test]
    fn test_bill_payment_with_category_field_builds_target() {
        let store = store_with_accounts();
        let mut request = TransferRequest::bill_payment(
            1,
            "ACC-A",
            Decimal::new(1000, 2),
            BillingType::Water,
        );
        request.rr_number = Some("RR-778".to_string());

        let plan = TransactionValidator::validate(&request, &from_account(&store), &store).unwrap();

        assert_eq!(
            plan,
            TransferPlan::BillDebit {
                target: BillingTarget::Water {
                    rr_number: "RR-778".to_string()
                }
            }
        );
    }

    #[rstest]
    #[case(Decimal::ZERO)]
    #[case(Decimal::new(-100, 2))]
    fn test_non_positive_amount_is_validation_error(#[case] amount: Decimal) {
        let store = store_with_accounts();
        let request =
            TransferRequest::two_sided(TransferKind::SelfTransfer, 1, "ACC-A", "ACC-B", amount);

        let result = TransactionValidator::validate(&request, &from_account(&store), &store);

        assert!(matches!(
            result,
            Err(TransferError::Validation { field, .. }) if field == "amount"
        ));
    }
}
