use crate::classifier::{MultiplexMode, Outcome, WifiMode};
use crate::config::Config;
use crate::dispatcher::{Dispatcher, Error};
use crate::session::SharedSession;
use crate::tests::mock::{MockSerial, MockTimer, MockedExchange};
use crate::wifi::{InitError, JoinError, WifiAdapter};
use embedded_io::ErrorKind;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

type DispatcherType<'a> = Dispatcher<'a, MockSerial<'a>, MockTimer, 1_000_000>;

const RESTART_RESPONSE: &[u8] =
    b"\r\nOK\r\n\r\n ets Jan  8 2013,rst cause:2, boot mode:(3,6)\r\n\r\nload 0x40100000\r\n\r\nready\r\n";

fn dispatcher<'a>(session: &'a SharedSession, serial: MockSerial<'a>) -> DispatcherType<'a> {
    Dispatcher::new(session, serial, MockTimer::elapsing(), Config::default())
}

/// Adds the exchanges of a successful init sequence
pub(super) fn add_init_exchanges(serial: &mut MockSerial) {
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+RST\r\n"), RESTART_RESPONSE));
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CWMODE=1\r\n")));
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+CWMODE_CUR?\r\n"),
        b"+CWMODE_CUR:1\r\n\r\nOK\r\n",
    ));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CIPMUX=0\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+CIPMUX?\r\n"), b"+CIPMUX:0\r\n\r\nOK\r\n"));
}

#[test]
fn test_init_correct_commands() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    add_init_exchanges(&mut serial);

    let mut dispatcher = dispatcher(&session, serial);
    dispatcher.init().unwrap();

    let transmissions = dispatcher.serial.get_transmissions_as_strings();
    assert_eq!(
        [
            "AT\r\n",
            "AT+RST\r\n",
            "AT\r\n",
            "AT+CWMODE=1\r\n",
            "AT+CWMODE_CUR?\r\n",
            "AT+CIPMUX=0\r\n",
            "AT+CIPMUX?\r\n"
        ]
        .as_slice(),
        transmissions.as_slice()
    );
    dispatcher.serial.assert_all_exchanged();
}

#[test]
fn test_init_settle_duration() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    add_init_exchanges(&mut serial);

    let periods = Arc::new(Mutex::new(Vec::new()));
    let timer = MockTimer::recording(periods.clone());

    let config = Config::new().settle_ms(1_500);
    let mut dispatcher: DispatcherType = Dispatcher::new(&session, serial, timer, config);
    dispatcher.init().unwrap();

    // Settle pause follows the first liveness check
    assert_eq!(1_500_000, periods.lock().unwrap()[1]);
}

#[test]
fn test_init_long_settle_duration() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    add_init_exchanges(&mut serial);

    let periods = Arc::new(Mutex::new(Vec::new()));
    let timer = MockTimer::recording(periods.clone());

    let config = Config::new().settle_ms(6_000);
    let mut dispatcher: DispatcherType = Dispatcher::new(&session, serial, timer, config);
    dispatcher.init().unwrap();

    assert_eq!(&[u32::MAX, 1_705_032_705], &periods.lock().unwrap()[1..3]);
}

#[test]
fn test_init_startup_failed() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::silent(Some(b"AT\r\n")));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(InitError::StartupFailed(Outcome::Timeout), dispatcher.init().unwrap_err());
    assert_eq!(1, dispatcher.serial.transmission_count());
}

#[test]
fn test_init_restart_failed() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::error(Some(b"AT+RST\r\n")));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(InitError::RestartFailed(Outcome::Error), dispatcher.init().unwrap_err());
}

#[test]
fn test_init_module_not_ready() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+RST\r\n")));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(InitError::RestartFailed(Outcome::Timeout), dispatcher.init().unwrap_err());
    assert_eq!(2, dispatcher.serial.transmission_count());
}

#[test]
fn test_init_mode_error() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+RST\r\n"), RESTART_RESPONSE));
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::error(Some(b"AT+CWMODE=1\r\n")));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(InitError::ModeError(Outcome::Error), dispatcher.init().unwrap_err());
}

#[test]
fn test_init_mode_verification_failed() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+RST\r\n"), RESTART_RESPONSE));
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CWMODE=1\r\n")));
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+CWMODE_CUR?\r\n"),
        b"+CWMODE_CUR:3\r\n\r\nOK\r\n",
    ));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(
        InitError::ModeVerificationFailed(Outcome::Mode(WifiMode::SoftApStation)),
        dispatcher.init().unwrap_err()
    );
}

#[test]
fn test_init_multiplex_error() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+RST\r\n"), RESTART_RESPONSE));
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CWMODE=1\r\n")));
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+CWMODE_CUR?\r\n"),
        b"+CWMODE_CUR:1\r\n\r\nOK\r\n",
    ));
    serial.add_exchange(MockedExchange::new(Some(b"AT+CIPMUX=0\r\n"), b"link is builded\r\n\r\nERROR\r\n"));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(InitError::MultiplexError(Outcome::Error), dispatcher.init().unwrap_err());
}

#[test]
fn test_init_multiplex_verification_failed() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+RST\r\n"), RESTART_RESPONSE));
    serial.add_exchange(MockedExchange::ok(Some(b"AT\r\n")));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CWMODE=1\r\n")));
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+CWMODE_CUR?\r\n"),
        b"+CWMODE_CUR:1\r\n\r\nOK\r\n",
    ));
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CIPMUX=0\r\n")));
    serial.add_exchange(MockedExchange::new(Some(b"AT+CIPMUX?\r\n"), b"+CIPMUX:1\r\n\r\nOK\r\n"));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(
        InitError::MultiplexVerificationFailed(Outcome::Multiplex(MultiplexMode::Multiple)),
        dispatcher.init().unwrap_err()
    );
}

#[test]
fn test_init_transmit_error() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.fail_writes(ErrorKind::Other);

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(
        InitError::Engine(Error::Transmit(ErrorKind::Other)),
        dispatcher.init().unwrap_err()
    );
}

#[test]
fn test_restart_ready() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::new(Some(b"AT+RST\r\n"), RESTART_RESPONSE));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(Outcome::Ok, dispatcher.restart().unwrap());
}

#[test]
fn test_restart_waits_for_ready() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT+RST\r\n")));

    let periods = Arc::new(Mutex::new(Vec::new()));
    let timer = MockTimer::recording(periods.clone());

    let config = Config::new().restart_timeout_ms(7_000);
    let mut dispatcher: DispatcherType = Dispatcher::new(&session, serial, timer, config);
    assert_eq!(Outcome::Timeout, dispatcher.restart().unwrap());

    // Restart command is acknowledged within the first period, ready wait takes the full 7 s
    let periods = periods.lock().unwrap();
    assert_eq!(3, periods.len());
    assert_eq!(7_000_000_000u64, periods[1..].iter().map(|ticks| u64::from(*ticks)).sum::<u64>());
}

#[test]
fn test_join_connected() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+CWJAP=\"test_wifi\",\"secret\"\r\n"),
        b"WIFI DISCONNECT\r\nWIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n",
    ));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(Outcome::WifiConnected, dispatcher.join("test_wifi", "secret").unwrap());
}

#[test]
fn test_join_failures() {
    let cases: [(&[u8], Outcome); 5] = [
        (b"+CWJAP:1\r\n\r\nFAIL\r\n", Outcome::ConnectionTimeout),
        (b"+CWJAP:2\r\n\r\nFAIL\r\n", Outcome::WrongPassword),
        (b"+CWJAP:3\r\n\r\nFAIL\r\n", Outcome::NoTarget),
        (b"+CWJAP:4\r\n\r\nFAIL\r\n", Outcome::ConnectionFailed),
        (b"\r\nERROR\r\n", Outcome::Error),
    ];

    for (response, expected) in cases {
        let session = SharedSession::new();
        let mut serial = MockSerial::new(&session);
        serial.add_exchange(MockedExchange::new(None, response));

        let mut dispatcher = dispatcher(&session, serial);
        assert_eq!(expected, dispatcher.join("test_wifi", "secret").unwrap());
    }
}

#[test]
fn test_join_timeout() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::new(None, b"WIFI DISCONNECT\r\n"));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(Outcome::Timeout, dispatcher.join("test_wifi", "secret").unwrap());
}

#[test]
fn test_join_waits_full_timeout() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::new(None, b"WIFI DISCONNECT\r\n"));

    let periods = Arc::new(Mutex::new(Vec::new()));
    let timer = MockTimer::recording(periods.clone());

    let mut dispatcher: DispatcherType = Dispatcher::new(&session, serial, timer, Config::default());
    assert_eq!(Outcome::Timeout, dispatcher.join("test_wifi", "secret").unwrap());

    let ticks: u64 = periods.lock().unwrap().iter().map(|ticks| u64::from(*ticks)).sum();
    assert_eq!(20_000_000_000u64, ticks);
}

#[test]
fn test_join_invalid_ssid_length() {
    let session = SharedSession::new();
    let mut dispatcher = dispatcher(&session, MockSerial::new(&session));

    let result = dispatcher.join("123456789012345678901234567890123", "secret");
    assert_eq!(JoinError::InvalidSsidLength, result.unwrap_err());
    assert_eq!(0, dispatcher.serial.transmission_count());
}

#[test]
fn test_join_invalid_password_length() {
    let session = SharedSession::new();
    let mut dispatcher = dispatcher(&session, MockSerial::new(&session));

    let password = "1234567890123456789012345678901234567890123456789012345678901234";
    let result = dispatcher.join("test_wifi", password);
    assert_eq!(JoinError::InvalidPasswordLength, result.unwrap_err());
    assert_eq!(0, dispatcher.serial.transmission_count());
}

#[test]
fn test_join_max_lengths() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(None));

    let mut dispatcher = dispatcher(&session, serial);
    let ssid = "12345678901234567890123456789012";
    let password = "123456789012345678901234567890123456789012345678901234567890123";

    assert_eq!(Outcome::WifiConnected, dispatcher.join(ssid, password).unwrap());
}

#[test]
fn test_join_state() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+CWJAP?\r\n"),
        b"+CWJAP:\"test_wifi\",\"00:11:22:33:44:55\",11,-55\r\n\r\nOK\r\n",
    ));
    serial.add_exchange(MockedExchange::new(Some(b"AT+CWJAP?\r\n"), b"No AP\r\n\r\nOK\r\n"));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(Outcome::WifiConnected, dispatcher.join_state().unwrap());
    assert_eq!(Outcome::WifiDisconnected, dispatcher.join_state().unwrap());
}

#[test]
fn test_disconnect() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::ok(Some(b"AT+CWQAP\r\n")));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(Outcome::Ok, dispatcher.disconnect().unwrap());
}

#[test]
fn test_version() {
    let session = SharedSession::new();
    let mut serial = MockSerial::new(&session);
    serial.add_exchange(MockedExchange::new(
        Some(b"AT+GMR\r\n"),
        b"AT version:1.2.0.0(Jul  1 2016 20:04:45)\r\nSDK version:1.5.4.1\r\n\r\nOK\r\n",
    ));

    let mut dispatcher = dispatcher(&session, serial);
    assert_eq!(Outcome::Ok, dispatcher.version().unwrap());
    assert!(dispatcher.with_response(|data| data.windows(11).any(|w| w == b"SDK version")));
}
