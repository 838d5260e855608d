/// Timing and connection parameters of the [Adapter](crate::adapter::Adapter). All durations are in milliseconds.
///
/// The defaults match the timing the ESP-AT firmware needs after the respective commands.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Config {
    pub(crate) response_timeout: u32,
    pub(crate) poll_interval: u32,
    pub(crate) response_pause: u32,
    pub(crate) restore_delay: u32,
    pub(crate) mode_delay: u32,
    pub(crate) restart_delay: u32,
    pub(crate) send_prefix_delay: u32,
    pub(crate) remote_port: u16,
    pub(crate) discard_stale_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            response_timeout: 30_000,
            poll_interval: 10,
            response_pause: 100,
            restore_delay: 1_000,
            mode_delay: 100,
            restart_delay: 1_000,
            send_prefix_delay: 100,
            remote_port: 80,
            discard_stale_input: true,
        }
    }
}

impl Config {
    /// Upper bound for waiting on a response marker. Limited to a quarter of the timer range.
    #[must_use]
    pub const fn response_timeout(mut self, ms: u32) -> Self {
        self.response_timeout = ms;
        self
    }

    /// Pause between two reads while no data is pending
    #[must_use]
    pub const fn poll_interval(mut self, ms: u32) -> Self {
        self.poll_interval = ms;
        self
    }

    /// Pause after the join, connect and payload transactions
    #[must_use]
    pub const fn response_pause(mut self, ms: u32) -> Self {
        self.response_pause = ms;
        self
    }

    /// Settle delay after `AT+RESTORE`
    #[must_use]
    pub const fn restore_delay(mut self, ms: u32) -> Self {
        self.restore_delay = ms;
        self
    }

    /// Settle delay after `AT+CWMODE`
    #[must_use]
    pub const fn mode_delay(mut self, ms: u32) -> Self {
        self.mode_delay = ms;
        self
    }

    /// Settle delay after `AT+RST`
    #[must_use]
    pub const fn restart_delay(mut self, ms: u32) -> Self {
        self.restart_delay = ms;
        self
    }

    /// Settle delay after `AT+CIPSEND`
    #[must_use]
    pub const fn send_prefix_delay(mut self, ms: u32) -> Self {
        self.send_prefix_delay = ms;
        self
    }

    /// TCP port of the upload endpoint
    #[must_use]
    pub const fn remote_port(mut self, port: u16) -> Self {
        self.remote_port = port;
        self
    }

    /// If enabled, pending input is dropped before sending a command, so late bytes of a previous transaction
    /// can not classify the next one.
    #[must_use]
    pub const fn discard_stale_input(mut self, enabled: bool) -> Self {
        self.discard_stale_input = enabled;
        self
    }
}
