mod helpers;

use tally_ledger::error::LedgerError;
use tally_ledger::journal::error::JournalError;

#[tokio::test]
async fn chaos_rolls_back_everything_and_a_retry_succeeds() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;

    // probability 1: the transaction always trips after the journal is
    // marked posted, so the rollback must erase every write
    let chaotic = helpers::init_ledger_with_chaos(&pool, 1.0).await?;

    let c = helpers::unique_id("C");
    let d = helpers::unique_id("D");
    helpers::seed_account(&pool, &c, "USD", 2_000).await?;
    helpers::seed_account(&pool, &d, "USD", 2_000).await?;

    let journal_id = helpers::unique_id("J-CHAOS");
    let request = helpers::reserve_lock_journal(
        &journal_id,
        &helpers::unique_id("idem-chaos"),
        &c,
        &d,
        "5.00",
    );


    let err = chaotic.post_journal(request.clone()).await.unwrap_err();
    assert!(matches!(err, LedgerError::Journal(JournalError::Chaos)));

    assert_eq!(helpers::bucket_values(&pool, &c).await?, (2_000, 0, 0, 0));
    assert_eq!(helpers::bucket_values(&pool, &d).await?, (2_000, 0, 0, 0));
    assert_eq!(helpers::audit_count(&pool, &journal_id).await?, 0);
    assert_eq!(helpers::journal_status(&pool, &journal_id).await?, None);
    assert!(helpers::outbox_item(&pool, &journal_id).await?.is_none());

    // probability 0: the identical body posts cleanly
    let calm = helpers::init_ledger_with_chaos(&pool, 0.0).await?;
    let receipt = calm.post_journal(request).await?;
    assert!(!receipt.idempotent);

    assert_eq!(helpers::bucket_values(&pool, &c).await?, (1_500, 500, 0, 0));
    assert_eq!(helpers::bucket_values(&pool, &d).await?, (1_500, 0, 500, 0));
    assert_eq!(helpers::audit_count(&pool, &journal_id).await?, 2);
    assert_eq!(
        helpers::journal_status(&pool, &journal_id).await?.as_deref(),
        Some("posted")
    );

    Ok(())
}
