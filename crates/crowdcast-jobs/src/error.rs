use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Db(#[from] crowdcast_db::DbError),
}
