use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Generate an opaque id like `cam-42-9f3b01ce`. A process-local monotonic
/// sequence keeps ids ordered under bursts; the random suffix disambiguates
/// across restarts.
pub fn next_id(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, seq, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_carry_prefix() {
        let id = next_id("cam");
        assert!(id.starts_with("cam-"));
    }

    #[test]
    fn ids_are_unique_under_bursts() {
        let ids: HashSet<String> = (0..1000).map(|_| next_id("task")).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn sequence_is_monotonic() {
        let first = next_id("seq");
        let second = next_id("seq");
        let parse = |id: &str| {
            id.split('-')
                .nth(1)
                .and_then(|s| s.parse::<u64>().ok())
                .expect("sequence segment")
        };
        assert!(parse(&second) > parse(&first));
    }
}
