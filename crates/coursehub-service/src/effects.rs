//! Best-effort side effects that run after the primary write succeeded.

use tracing::warn;
use uuid::Uuid;

use coursehub_core::result::AppResult;

/// Log a failed side effect and carry on.
pub(crate) fn swallow<T>(
    result: AppResult<T>,
    effect: &'static str,
    user_id: Uuid,
    course_id: Uuid,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                user_id = %user_id,
                course_id = %course_id,
                effect,
                error = %e,
                "Side effect failed, continuing"
            );
            None
        }
    }
}
