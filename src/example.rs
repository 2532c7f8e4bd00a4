//! Mocks for doc examples
use crate::ingress::{AlwaysArmed, Ingress};
use crate::session::SharedSession;
use core::convert::Infallible;
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;
use heapless::Vec;

/// Serial link mock, which answers like an ESP8266 joined to `test_wifi`
pub struct ExampleSerial<'a> {
    /// Simulated receive interrupt
    ingress: Ingress<'a, AlwaysArmed>,

    /// Data written since the last flush
    pending: Vec<u8, 256>,
}

impl<'a> ExampleSerial<'a> {
    pub fn new(session: &'a SharedSession) -> Self {
        Self {
            ingress: Ingress::new(session, AlwaysArmed),
            pending: Vec::new(),
        }
    }

    fn respond(&mut self) {
        let response: &[u8] = match self.pending.as_slice() {
            b"AT\r\n" | b"AT+CWMODE=1\r\n" | b"AT+CIPMUX=0\r\n" | b"AT+CWQAP\r\n" => b"\r\nOK\r\n",
            b"AT+RST\r\n" => b"\r\nOK\r\n ets Jan  8 2013,rst cause:2, boot mode:(3,6)\r\n\r\nready\r\n",
            b"AT+GMR\r\n" => b"AT version:1.2.0.0(Jul  1 2016 20:04:45)\r\n\r\nOK\r\n",
            b"AT+CWMODE_CUR?\r\n" => b"+CWMODE_CUR:1\r\n\r\nOK\r\n",
            b"AT+CIPMUX?\r\n" => b"+CIPMUX:0\r\n\r\nOK\r\n",
            b"AT+CWJAP?\r\n" => b"+CWJAP:\"test_wifi\",\"10:fe:ed:05:ba:50\",6,-60\r\n\r\nOK\r\n",
            b"AT+CWJAP=\"test_wifi\",\"secret\"\r\n" => b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n",
            b"AT+CWJAP=\"test_wifi\",\"wrong\"\r\n" => b"+CWJAP:2\r\n\r\nFAIL\r\n",
            b"AT+CIPSTART=\"TCP\",\"10.0.0.1\",80\r\n" => b"CONNECT\r\n\r\nOK\r\n",
            data if data.starts_with(b"AT+CIPSEND=") => b"\r\nOK\r\n> ",
            data if data.starts_with(b"GET ") || data.starts_with(b"POST ") => {
                b"\r\nSEND OK\r\n\r\n+IPD,17:HTTP/1.1 200 OK\r\nCLOSED\r\n"
            }
            _ => b"\r\nERROR\r\n",
        };

        self.pending.clear();
        self.ingress.write(response);
    }
}

impl embedded_io::ErrorType for ExampleSerial<'_> {
    type Error = Infallible;
}

impl embedded_io::Write for ExampleSerial<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for byte in buf {
            // Only the start of long payloads is relevant for matching
            let _ = self.pending.push(*byte);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.respond();
        Ok(())
    }
}

impl embedded_io_async::Write for ExampleSerial<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        embedded_io::Write::write(self, buf)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(self)
    }
}

/// Timer mock, which elapses immediately
#[derive(Default)]
pub struct ExampleTimer {}

impl Timer<1_000> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<1000> {
        TimerInstantU32::from_ticks(0)
    }

    fn start(&mut self, _duration: TimerDurationU32<1000>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
