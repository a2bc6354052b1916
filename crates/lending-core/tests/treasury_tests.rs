use chrono::NaiveDate;
use lending_core::client::Client;
use lending_core::ledger::engine::append_transaction;
use lending_core::ledger::event::{DisbursementEvent, LedgerEvent, PaymentEvent, TransactionDraft};
use lending_core::treasury::account::BankAccount;
use lending_core::treasury::reconciliation::{
    apply_movement, reconcile_transaction, transfer_between, treasury_position, TreasuryMovement,
};
use lending_core::{InterestMethod, LendingError, PaymentFrequency};
use rust_decimal_macros::dec;

fn client() -> Client {
    Client::new(
        "c-42",
        "Sofia Rincon",
        dec!(8),
        InterestMethod::Diminishing,
        PaymentFrequency::Biweekly,
        2,
    )
}

fn on(day: u32, event: LedgerEvent, id: &str) -> TransactionDraft {
    TransactionDraft {
        id: id.into(),
        client_id: "c-42".into(),
        date: NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
        event,
        receipt: None,
        notes: String::new(),
    }
}

// ===========================================================================
// Movement tests
// ===========================================================================

#[test]
fn test_withdrawal_never_goes_negative() {
    let account = BankAccount::new("bank-1", "Main", dec!(500_000));
    let err = apply_movement(&account, TreasuryMovement::Withdrawal(dec!(600_000))).unwrap_err();
    assert!(matches!(err, LendingError::InsufficientTreasuryFunds { .. }));

    let drained = apply_movement(&account, TreasuryMovement::Withdrawal(dec!(500_000))).unwrap();
    assert_eq!(drained.balance, dec!(0));
    // Input left untouched
    assert_eq!(account.balance, dec!(500_000));
}

#[test]
fn test_transfer_to_cash_box() {
    let bank = BankAccount::new("bank-1", "Main", dec!(1_000_000));
    let cash = BankAccount::cash_box("cash", "Office cash", dec!(20_000));
    let (bank, cash) = transfer_between(&bank, &cash, dec!(300_000)).unwrap();
    assert_eq!(bank.balance, dec!(700_000));
    assert_eq!(cash.balance, dec!(320_000));

    let position = treasury_position(&[bank.clone(), cash.clone()]);
    assert_eq!(position.total, dec!(1_020_000));
    assert_eq!(position.cash_total, dec!(320_000));
    assert_eq!(position.bank_total, dec!(700_000));
    assert_eq!(position.account_count, 2);

    assert!(transfer_between(&cash, &bank, dec!(400_000)).is_err());
}

// ===========================================================================
// Reconciliation tests
// ===========================================================================

#[test]
fn test_disbursement_then_payment_round_trip_through_treasury() {
    let client = client();
    let account = BankAccount::new("bank-1", "Main", dec!(2_000_000));

    let lent = append_transaction(
        &client,
        None,
        on(
            1,
            LedgerEvent::Disbursement(DisbursementEvent {
                amount: dec!(800_000),
                bank_account_id: Some("bank-1".into()),
            }),
            "t1",
        ),
        Some(&account),
    )
    .unwrap();
    let account = reconcile_transaction(&account, &lent).unwrap();
    assert_eq!(account.balance, dec!(1_200_000));

    let paid = append_transaction(
        &client,
        Some(&lent),
        on(
            16,
            LedgerEvent::Payment(PaymentEvent {
                capital: dec!(200_000),
                interest: dec!(32_000),
                bank_account_id: Some("bank-1".into()),
            }),
            "t2",
        ),
        Some(&account),
    )
    .unwrap();
    let account = reconcile_transaction(&account, &paid).unwrap();

    // Capital and interest both land in treasury
    assert_eq!(account.balance, dec!(1_432_000));
    assert_eq!(paid.balance_after, dec!(600_000));
}

#[test]
fn test_reconcile_against_wrong_account() {
    let client = client();
    let main = BankAccount::new("bank-1", "Main", dec!(2_000_000));
    let other = BankAccount::new("bank-2", "Secondary", dec!(2_000_000));
    let lent = append_transaction(
        &client,
        None,
        on(
            1,
            LedgerEvent::Disbursement(DisbursementEvent {
                amount: dec!(100_000),
                bank_account_id: Some("bank-1".into()),
            }),
            "t1",
        ),
        Some(&main),
    )
    .unwrap();
    let err = reconcile_transaction(&other, &lent).unwrap_err();
    assert!(matches!(err, LendingError::InvalidInput { .. }));
}
