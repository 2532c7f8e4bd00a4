use atat::atat_derive::AtatResp;

/// Commands which are just responded by OK. The engine evaluates the raw response itself.
#[derive(Clone, AtatResp)]
pub struct NoResponse;

/// Success terminator of a command response
pub(crate) const OK_TERMINATOR: &[u8] = b"OK\r\n";
/// Generic negative acknowledgement
pub(crate) const ERROR: &[u8] = b"ERROR";
/// The requested operation did not complete
pub(crate) const FAIL: &[u8] = b"FAIL";
/// Part of the boot log the module prints after an unexpected reset
pub(crate) const RESET: &[u8] = b"rst cause";
/// Printed once the module finished booting
pub(crate) const READY: &[u8] = b"ready\r\n";
/// Remote side closed the socket
pub(crate) const CLOSED: &[u8] = b"CLOSED";
/// Station is not joined to any access point
pub(crate) const NO_AP: &[u8] = b"No AP\r\n";

pub(crate) const CWMODE_STATION: &[u8] = b"CWMODE_CUR:1";
pub(crate) const CWMODE_SOFT_AP: &[u8] = b"CWMODE_CUR:2";
pub(crate) const CWMODE_SOFT_AP_STATION: &[u8] = b"CWMODE_CUR:3";

pub(crate) const CIPMUX_SINGLE: &[u8] = b"CIPMUX:0";
pub(crate) const CIPMUX_MULTIPLE: &[u8] = b"CIPMUX:1";

/// Join error codes of AT+CWJAP
pub(crate) const CWJAP_TIMEOUT: &[u8] = b"CWJAP:1";
pub(crate) const CWJAP_WRONG_PASSWORD: &[u8] = b"CWJAP:2";
pub(crate) const CWJAP_NO_TARGET: &[u8] = b"CWJAP:3";
pub(crate) const CWJAP_CONNECTION_FAILED: &[u8] = b"CWJAP:4";
