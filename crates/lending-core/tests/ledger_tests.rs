use chrono::NaiveDate;
use lending_core::client::Client;
use lending_core::ledger::engine::{
    append_transaction, chain_tail, delete_transaction, edit_transaction, outstanding_balance,
    recompute_chain, verify_chain, TransactionEdit,
};
use lending_core::ledger::event::{
    DisbursementEvent, LedgerEvent, PaymentEvent, SettlementEvent, TransactionDraft,
};
use lending_core::ledger::summary::{portfolio_summary, summarize_client};
use lending_core::ledger::transaction::{Transaction, TransactionType};
use lending_core::treasury::account::BankAccount;
use lending_core::{InterestMethod, LendingError, PaymentFrequency};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn borrower(id: &str) -> Client {
    Client::new(
        id,
        "Luis Pardo",
        dec!(10),
        InterestMethod::Fixed,
        PaymentFrequency::Monthly,
        3,
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn draft(client: &Client, id: &str, d: u32, event: LedgerEvent) -> TransactionDraft {
    TransactionDraft {
        id: id.into(),
        client_id: client.id.clone(),
        date: day(d),
        event,
        receipt: None,
        notes: String::new(),
    }
}

fn lend(amount: Decimal) -> LedgerEvent {
    LedgerEvent::Disbursement(DisbursementEvent {
        amount,
        bank_account_id: None,
    })
}

fn pay(capital: Decimal, interest: Decimal) -> LedgerEvent {
    LedgerEvent::Payment(PaymentEvent {
        capital,
        interest,
        bank_account_id: None,
    })
}

/// Disburse 1M, pay 300k + 100k interest, pay 50k interest only, refinance 200k.
fn sample_chain(client: &Client) -> Vec<Transaction> {
    let events = [
        ("t1", 1, lend(dec!(1_000_000))),
        ("t2", 10, pay(dec!(300_000), dec!(100_000))),
        ("t3", 15, pay(Decimal::ZERO, dec!(50_000))),
        ("t4", 20, lend(dec!(200_000))),
    ];
    let mut chain: Vec<Transaction> = Vec::new();
    for (id, d, event) in events {
        let tx = append_transaction(client, chain.last(), draft(client, id, d, event), None).unwrap();
        chain.push(tx);
    }
    chain
}

// ===========================================================================
// Append tests
// ===========================================================================

#[test]
fn test_append_derives_types_and_balances() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);

    let types: Vec<_> = chain.iter().map(|t| t.transaction_type).collect();
    assert_eq!(
        types,
        vec![
            TransactionType::Disbursement,
            TransactionType::PaymentCapital,
            TransactionType::PaymentInterest,
            TransactionType::Refinance,
        ]
    );
    let balances: Vec<_> = chain.iter().map(|t| t.balance_after).collect();
    assert_eq!(
        balances,
        vec![dec!(1_000_000), dec!(700_000), dec!(700_000), dec!(900_000)]
    );
    assert_eq!(outstanding_balance(&chain), dec!(900_000));
}

#[test]
fn test_overpayment_produces_no_transaction() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let tail = chain_tail(&chain);

    let err = append_transaction(
        &client,
        tail,
        draft(&client, "t5", 25, pay(dec!(900_001), Decimal::ZERO)),
        None,
    )
    .unwrap_err();

    match err {
        LendingError::OverpaymentRejected {
            requested,
            outstanding,
        } => {
            assert_eq!(requested, dec!(900_001));
            assert_eq!(outstanding, dec!(900_000));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_exact_payoff_is_allowed() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let tx = append_transaction(
        &client,
        chain_tail(&chain),
        draft(&client, "t5", 25, pay(dec!(900_000), dec!(90_000))),
        None,
    )
    .unwrap();
    assert_eq!(tx.balance_after, Decimal::ZERO);
}

#[test]
fn test_payment_without_chain_rejected() {
    let client = borrower("c-1");
    let err = append_transaction(
        &client,
        None,
        draft(&client, "t1", 1, pay(dec!(10), Decimal::ZERO)),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LendingError::ChainIntegrityViolation(_)));
}

#[test]
fn test_backdated_append_rejected() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let err = append_transaction(
        &client,
        chain_tail(&chain),
        draft(&client, "t5", 2, pay(dec!(1), Decimal::ZERO)),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LendingError::ChainIntegrityViolation(_)));
}

#[test]
fn test_settlement_closes_outstanding() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let tx = append_transaction(
        &client,
        chain_tail(&chain),
        draft(
            &client,
            "t5",
            30,
            LedgerEvent::Settlement(SettlementEvent {
                interest: dec!(45_000),
                bank_account_id: None,
            }),
        ),
        None,
    )
    .unwrap();
    assert_eq!(tx.transaction_type, TransactionType::Settlement);
    assert_eq!(tx.amount, dec!(900_000));
    assert_eq!(tx.capital_paid, dec!(900_000));
    assert_eq!(tx.balance_after, Decimal::ZERO);
}

// ===========================================================================
// Treasury-linked append tests
// ===========================================================================

#[test]
fn test_disbursement_beyond_treasury_refused() {
    let client = borrower("c-1");
    let account = BankAccount::new("bank-9", "Davivienda", dec!(500_000));
    let err = append_transaction(
        &client,
        None,
        draft(
            &client,
            "t1",
            1,
            LedgerEvent::Disbursement(DisbursementEvent {
                amount: dec!(600_000),
                bank_account_id: Some("bank-9".into()),
            }),
        ),
        Some(&account),
    )
    .unwrap_err();

    match err {
        LendingError::InsufficientTreasuryFunds {
            account_id,
            requested,
            available,
        } => {
            assert_eq!(account_id, "bank-9");
            assert_eq!(requested, dec!(600_000));
            assert_eq!(available, dec!(500_000));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_named_account_must_be_supplied() {
    let client = borrower("c-1");
    let err = append_transaction(
        &client,
        None,
        draft(
            &client,
            "t1",
            1,
            LedgerEvent::Disbursement(DisbursementEvent {
                amount: dec!(100_000),
                bank_account_id: Some("bank-9".into()),
            }),
        ),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LendingError::InvalidInput { .. }));
}

// ===========================================================================
// Recompute, edit and delete tests
// ===========================================================================

#[test]
fn test_recompute_is_idempotent() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let once = recompute_chain("c-1", &chain).unwrap();
    let twice = recompute_chain("c-1", &once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, chain);
}

#[test]
fn test_recompute_repairs_stale_balances() {
    let client = borrower("c-1");
    let mut chain = sample_chain(&client);
    chain[1].balance_after = dec!(123);
    chain.reverse();

    assert!(verify_chain("c-1", &chain).is_err());
    let fixed = recompute_chain("c-1", &chain).unwrap();
    assert_eq!(fixed[1].balance_after, dec!(700_000));
    assert_eq!(fixed[3].balance_after, dec!(900_000));
    assert!(verify_chain("c-1", &fixed).is_ok());
}

#[test]
fn test_edit_rewrites_following_balances() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let edit = TransactionEdit {
        amount: Some(dec!(400_000)),
        ..TransactionEdit::default()
    };
    let edited = edit_transaction("c-1", &chain, "t2", &edit).unwrap();
    let balances: Vec<_> = edited.iter().map(|t| t.balance_after).collect();
    assert_eq!(
        balances,
        vec![dec!(1_000_000), dec!(600_000), dec!(600_000), dec!(800_000)]
    );
}

#[test]
fn test_edit_that_overpays_is_refused() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let edit = TransactionEdit {
        amount: Some(dec!(1_500_000)),
        ..TransactionEdit::default()
    };
    let err = edit_transaction("c-1", &chain, "t2", &edit).unwrap_err();
    assert!(matches!(err, LendingError::OverpaymentRejected { .. }));
}

#[test]
fn test_delete_disbursement_breaks_chain() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    // Removing the opening loan leaves the 300k payment with nothing to pay
    let err = delete_transaction("c-1", &chain, "t1").unwrap_err();
    assert!(matches!(err, LendingError::OverpaymentRejected { .. }));

    let without_interest = delete_transaction("c-1", &chain, "t3").unwrap();
    assert_eq!(without_interest.len(), 3);
    assert_eq!(outstanding_balance(&without_interest), dec!(900_000));
}

#[test]
fn test_foreign_transaction_rejected() {
    let client = borrower("c-1");
    let mut chain = sample_chain(&client);
    chain[2].client_id = "c-2".into();
    let err = recompute_chain("c-1", &chain).unwrap_err();
    assert!(matches!(err, LendingError::ChainIntegrityViolation(_)));
}

#[test]
fn test_edit_before_settlement_resizes_it() {
    let client = borrower("c-1");
    let mut chain: Vec<Transaction> = Vec::new();
    let events = [
        ("t1", 1, lend(dec!(1_000))),
        ("t2", 5, pay(dec!(200), Decimal::ZERO)),
        (
            "t3",
            9,
            LedgerEvent::Settlement(SettlementEvent {
                interest: dec!(50),
                bank_account_id: None,
            }),
        ),
    ];
    for (id, d, event) in events {
        let tx = append_transaction(&client, chain.last(), draft(&client, id, d, event), None).unwrap();
        chain.push(tx);
    }
    assert_eq!(chain[2].amount, dec!(800));

    let edit = TransactionEdit {
        amount: Some(dec!(300)),
        ..TransactionEdit::default()
    };
    let edited = edit_transaction("c-1", &chain, "t2", &edit).unwrap();
    assert_eq!(edited[2].amount, dec!(700));
    assert_eq!(edited[2].capital_paid, dec!(700));
    assert_eq!(edited[2].balance_after, Decimal::ZERO);

    let summary = summarize_client("c-1", &edited).unwrap();
    assert_eq!(summary.total_lent, dec!(1_000));
    assert_eq!(summary.capital_returned, summary.total_lent);
    assert_eq!(summary.outstanding_balance, Decimal::ZERO);
}

#[test]
fn test_lending_entries_relabelled_after_delete() {
    let client = borrower("c-1");
    let mut chain: Vec<Transaction> = Vec::new();
    for (id, d, amount) in [("t1", 1, dec!(500)), ("t2", 8, dec!(250))] {
        let tx = append_transaction(&client, chain.last(), draft(&client, id, d, lend(amount)), None)
            .unwrap();
        chain.push(tx);
    }
    assert_eq!(chain[1].transaction_type, TransactionType::Refinance);

    let remaining = delete_transaction("c-1", &chain, "t1").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].transaction_type, TransactionType::Disbursement);
    assert_eq!(remaining[0].balance_after, dec!(250));
}

#[test]
fn test_lending_entries_relabelled_after_reorder() {
    let client = borrower("c-1");
    let mut chain: Vec<Transaction> = Vec::new();
    for (id, d, amount) in [("t1", 1, dec!(500)), ("t2", 8, dec!(250))] {
        let tx = append_transaction(&client, chain.last(), draft(&client, id, d, lend(amount)), None)
            .unwrap();
        chain.push(tx);
    }

    // Moving the opening loan after the top-up swaps their roles
    let edit = TransactionEdit {
        date: Some(day(12)),
        ..TransactionEdit::default()
    };
    let swapped = edit_transaction("c-1", &chain, "t1", &edit).unwrap();
    let labels: Vec<_> = swapped
        .iter()
        .map(|t| (t.id.as_str(), t.transaction_type))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("t2", TransactionType::Disbursement),
            ("t1", TransactionType::Refinance),
        ]
    );
    assert_eq!(outstanding_balance(&swapped), dec!(750));
}

// ===========================================================================
// Summary tests
// ===========================================================================

#[test]
fn test_client_summary_totals() {
    let client = borrower("c-1");
    let chain = sample_chain(&client);
    let s = summarize_client("c-1", &chain).unwrap();

    assert_eq!(s.outstanding_balance, dec!(900_000));
    assert_eq!(s.total_lent, dec!(1_200_000));
    assert_eq!(s.capital_returned, dec!(300_000));
    assert_eq!(s.interest_earned, dec!(150_000));
    assert_eq!(s.transaction_count, 4);
    assert_eq!(s.last_payment_date, Some(day(15)));
}

#[test]
fn test_portfolio_counts_active_borrowers() {
    let a = borrower("c-1");
    let b = borrower("c-2");
    let chain_a = sample_chain(&a);
    let opening = append_transaction(&b, None, draft(&b, "b1", 1, lend(dec!(50_000))), None).unwrap();
    let closing = append_transaction(
        &b,
        Some(&opening),
        draft(&b, "b2", 2, pay(dec!(50_000), dec!(5_000))),
        None,
    )
    .unwrap();

    let portfolio = portfolio_summary(&[
        ("c-1".to_string(), chain_a),
        ("c-2".to_string(), vec![opening, closing]),
    ])
    .unwrap();

    assert_eq!(portfolio.active_borrowers, 1);
    assert_eq!(portfolio.total_outstanding, dec!(900_000));
    assert_eq!(portfolio.total_lent, dec!(1_250_000));
    assert_eq!(portfolio.interest_earned, dec!(155_000));
    assert_eq!(portfolio.clients.len(), 2);
}
