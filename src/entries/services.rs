use tracing::{error, info, warn};

use crate::{error::AppError, state::AppState};

/// Adds one to the user's usage counter and returns the new count.
pub async fn increment_entries(st: &AppState, user_id: Option<i64>) -> Result<i64, AppError> {
    let user_id = user_id.ok_or_else(|| AppError::validation("User id is required."))?;
    match st.store.increment_entries(user_id).await {
        Ok(Some(entries)) => {
            info!(user_id, entries, "entries incremented");
            Ok(entries)
        }
        Ok(None) => {
            warn!(user_id, "increment for unknown user");
            Err(AppError::NotFound)
        }
        Err(e) => {
            error!(error = %e, user_id, "increment entries failed");
            Err(AppError::NotFound)
        }
    }
}
