mod helpers;

use sqlx::Row;

use tally_ledger::ack::{error::AckError, AckOutcome};
use tally_ledger::outbox::{LedgerEvent, POSTED_TOPIC};

#[tokio::test]
async fn acks_are_recorded_once_and_duplicates_are_tolerated() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let ledger = helpers::init_ledger(&pool).await?;

    let journal_id = helpers::unique_id("J-ACK");
    let event = LedgerEvent {
        journal_id: journal_id.clone().into(),
        topic: POSTED_TOPIC.to_string(),
        payload: serde_json::json!({ "journalId": journal_id }),
    };

    assert_eq!(ledger.acks().record(&event).await?, AckOutcome::Recorded);
    assert_eq!(ledger.acks().record(&event).await?, AckOutcome::Duplicate);

    let row = sqlx::query("SELECT COUNT(*) AS n FROM events_acks WHERE journal_id = $1")
        .bind(&journal_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(row.get::<i64, _>("n"), 1);

    Ok(())
}

#[tokio::test]
async fn an_ack_without_a_journal_id_is_rejected() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let ledger = helpers::init_ledger(&pool).await?;

    let event = LedgerEvent {
        journal_id: "".into(),
        topic: POSTED_TOPIC.to_string(),
        payload: serde_json::json!({}),
    };
    let err = ledger.acks().record(&event).await.unwrap_err();
    assert!(matches!(err, AckError::MissingJournalId));

    Ok(())
}
