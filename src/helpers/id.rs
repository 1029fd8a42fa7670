use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Short id that is unique within this process, built from the wall clock,
/// the current thread and a monotonic counter.
pub fn time_thread_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let thread = format!("{:?}", std::thread::current().id());
    let thread = thread
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();

    let n = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{nanos:x}-{thread}-{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_do_not_repeat() {
        let a = time_thread_id();
        let b = time_thread_id();

        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }
}
