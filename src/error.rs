use thiserror::Error;

/// Errors a user can see at the point of a failed action
#[derive(Error, Debug)]
pub enum MeterError {
    /// Month input is not "YYYY-MM"
    #[error("YYYY-MM 형식을 확인해주세요. ({0})")]
    Format(String),

    /// Month id already exists in the collection
    #[error("이미 존재하는 월입니다. ({0})")]
    Duplicate(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl MeterError {
    /// Validation failures block the action but leave state untouched
    pub fn is_validation(&self) -> bool {
        matches!(self, MeterError::Format(_) | MeterError::Duplicate(_))
    }
}
