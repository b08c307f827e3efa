use crate::prompt::ConfirmationPrompt;
use crate::store::{KeyValueStore, StoreError};

/// Clear a drill's persisted history, and its cumulative stats when a key is
/// given, after an explicit confirmation.
///
/// Declining removes nothing and skips the callback; the result is
/// `Ok(false)`. On confirmation both removals run, the callback fires
/// exactly once, and the result is `Ok(true)`. In-memory session state is
/// the caller's to reset.
pub fn reset_history(
    store: &mut dyn KeyValueStore,
    prompt: &mut dyn ConfirmationPrompt,
    history_key: &str,
    cumulative_key: Option<&str>,
    on_cleared: impl FnOnce(),
) -> Result<bool, StoreError> {
    if !prompt.confirm("This will permanently clear your practice history. Continue?") {
        return Ok(false);
    }

    store.remove(history_key)?;
    if let Some(key) = cumulative_key {
        store.remove(key)?;
    }
    on_cleared();
    Ok(true)
}
