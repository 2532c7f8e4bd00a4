/// Timing configuration of the protocol engine
///
/// ````
/// use esp8266_at::Config;
///
/// let config = Config::new().command_timeout_ms(2_000).data_timeout_ms(30_000);
/// assert_eq!(2_000, config.command_timeout_ms);
/// assert_eq!(500, config.settle_ms);
/// ````
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Max. time waiting for a command response, if the command carries no own timeout
    pub command_timeout_ms: u32,

    /// Max. time waiting for the remote side to close the connection after a payload transfer
    pub data_timeout_ms: u32,

    /// Max. time waiting for the ready banner after a restart
    pub restart_timeout_ms: u32,

    /// Pause after the first liveness check, as the module prints its boot log when powered on
    pub settle_ms: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            command_timeout_ms: 1_000,
            data_timeout_ms: 10_000,
            restart_timeout_ms: 5_000,
            settle_ms: 500,
        }
    }

    #[must_use]
    pub const fn command_timeout_ms(mut self, timeout: u32) -> Self {
        self.command_timeout_ms = timeout;
        self
    }

    #[must_use]
    pub const fn data_timeout_ms(mut self, timeout: u32) -> Self {
        self.data_timeout_ms = timeout;
        self
    }

    #[must_use]
    pub const fn restart_timeout_ms(mut self, timeout: u32) -> Self {
        self.restart_timeout_ms = timeout;
        self
    }

    #[must_use]
    pub const fn settle_ms(mut self, duration: u32) -> Self {
        self.settle_ms = duration;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
