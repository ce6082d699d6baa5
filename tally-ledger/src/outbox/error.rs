use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OutboxError {
    #[error("OutboxError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error(
        "OutboxError - ItemNotProcessing: item {0} left 'processing' outside the dispatcher"
    )]
    ItemNotProcessing(Uuid),
}
