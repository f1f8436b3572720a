pub const DEFAULT_STORAGE_KEY: &str = "stopwatchSessions";
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 10;
pub const DEFAULT_MODAL_SHOW_DELAY_MS: u32 = 10;
pub const DEFAULT_MODAL_HIDE_DELAY_MS: u32 = 300;

#[derive(Clone, Debug, PartialEq)]
pub struct StopwatchConfig {
    /// Storage key the session history is kept under.
    pub storage_key: String,
    /// Period of the live display refresh.
    pub tick_interval_ms: u32,
    /// Delay between un-hiding the confirm modal and starting its fade-in.
    pub modal_show_delay_ms: u32,
    /// Delay between starting the fade-out and hiding the modal.
    pub modal_hide_delay_ms: u32,
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            modal_show_delay_ms: DEFAULT_MODAL_SHOW_DELAY_MS,
            modal_hide_delay_ms: DEFAULT_MODAL_HIDE_DELAY_MS,
        }
    }
}

impl StopwatchConfig {
    /// Applies a storage key override. Blank keys are rejected.
    pub fn with_storage_key(mut self, key: Option<&str>) -> Self {
        match key.map(str::trim) {
            Some("") => log::warn!("ignoring blank storage key override"),
            Some(key) => self.storage_key = key.to_string(),
            None => {}
        }
        self
    }

    /// Applies a tick interval override given as text. Zero and unparsable
    /// values are rejected.
    pub fn with_tick_interval(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            match raw.trim().parse::<u32>() {
                Ok(ms) if ms > 0 => self.tick_interval_ms = ms,
                _ => log::warn!("ignoring invalid tick interval override {:?}", raw),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StopwatchConfig::default();
        assert_eq!(config.storage_key, "stopwatchSessions");
        assert_eq!(config.tick_interval_ms, 10);
    }

    #[test]
    fn overrides() {
        let config = StopwatchConfig::default()
            .with_storage_key(Some("laps-v2"))
            .with_tick_interval(Some(" 25 "));
        assert_eq!(config.storage_key, "laps-v2");
        assert_eq!(config.tick_interval_ms, 25);
    }

    #[test]
    fn invalid_overrides_ignored() {
        let config = StopwatchConfig::default()
            .with_storage_key(Some("  "))
            .with_tick_interval(Some("0"))
            .with_tick_interval(Some("fast"));
        assert_eq!(config, StopwatchConfig::default());
    }
}
