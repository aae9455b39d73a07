//! Manual transfer tests: validation and persistence.

use dopamine_core::{
    config::LedgerConfig,
    error::LedgerError,
    ledger::StationLedger,
    store::LedgerStore,
};

fn build() -> (StationLedger, String, String, String) {
    let store = LedgerStore::in_memory().expect("in-memory store");
    let ledger = StationLedger::new(store, LedgerConfig::default_test()).expect("ledger");
    let alice = ledger.register_user("Alice", None).expect("register");
    let bob = ledger.register_user("Bob", None).expect("register");
    let station = ledger.create_station(&alice, "Crew", None).expect("create");
    let code = ledger.invite_code(&station).expect("code");
    ledger.join_by_invite_code(&bob, &code).expect("join");
    (ledger, station, alice, bob)
}

#[test]
fn transfer_is_persisted_with_trimmed_description() {
    let (ledger, station, alice, bob) = build();
    let id = ledger
        .record_transfer(&station, &alice, &bob, 500, Some("  lunch  "))
        .expect("transfer");
    assert_eq!(
        ledger.store().transfer_description(&id).expect("description").as_deref(),
        Some("lunch")
    );

    let blank = ledger
        .record_transfer(&station, &bob, &alice, 20, Some("   "))
        .expect("transfer");
    assert_eq!(ledger.store().transfer_description(&blank).expect("description"), None);

    let rows = ledger.store().transfers(&station).expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].from_user, alice);
    assert_eq!(rows[0].amount, 500);
}

#[test]
fn invalid_transfers_are_rejected() {
    let (ledger, station, alice, bob) = build();
    assert!(matches!(
        ledger.record_transfer(&station, &alice, &bob, 0, None),
        Err(LedgerError::InvalidAmount { amount: 0 })
    ));
    assert!(matches!(
        ledger.record_transfer(&station, &alice, &alice, 10, None),
        Err(LedgerError::SelfTransfer)
    ));
    let eve = ledger.register_user("Eve", None).expect("register");
    assert!(matches!(
        ledger.record_transfer(&station, &alice, &eve, 10, None),
        Err(LedgerError::NotAMember { .. })
    ));
    assert!(ledger.store().transfers(&station).expect("rows").is_empty());
}
