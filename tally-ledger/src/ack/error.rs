use thiserror::Error;

#[derive(Error, Debug)]
pub enum AckError {
    #[error("AckError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("AckError - MissingJournalId: an ack must name the journal it acknowledges")]
    MissingJournalId,
}
