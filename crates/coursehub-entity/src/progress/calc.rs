//! Completion arithmetic shared by the stores and the read views.

/// Percentage of `completed` over `total`, rounded half away from zero.
///
/// Returns 0 when `total` is 0 and never exceeds 100.
pub fn completion_percentage(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    ((completed as f64 / total as f64) * 100.0).round() as i32
}
