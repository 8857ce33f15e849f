/// Network session tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Host ticks between state snapshots
    pub snapshot_interval: u32,
    /// Intents buffered between transport delivery and the next tick
    pub inbox_capacity: usize,
    /// Mirror snaps its own paddle to the host's position on every snapshot
    pub reconcile_local_paddle: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 1,
            inbox_capacity: 256,
            reconcile_local_paddle: true,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `PONG_SNAPSHOT_INTERVAL` and `PONG_INBOX_CAPACITY`
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(interval) = nonzero_env::<u32>("PONG_SNAPSHOT_INTERVAL") {
            config.snapshot_interval = interval;
        }
        if let Some(capacity) = nonzero_env::<usize>("PONG_INBOX_CAPACITY") {
            config.inbox_capacity = capacity;
        }

        config
    }
}

fn nonzero_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(parsed) if parsed != T::default() => Some(parsed),
        _ => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}
