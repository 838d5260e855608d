//! Mocks for doc examples
use alloc::collections::VecDeque;
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Serial mock which confirms every command line with OK
#[derive(Default)]
pub struct ExampleSerial {
    /// Pending response bytes
    rx: VecDeque<u8>,
}

impl ErrorType for ExampleSerial {
    type Error = ErrorKind;
}

impl Write for ExampleSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for byte in buf {
            if *byte == b'\n' {
                self.rx.extend(b"\r\nOK\r\n");
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Read for ExampleSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let length = buf.len().min(self.rx.len());

        for (target, byte) in buf.iter_mut().zip(self.rx.drain(..length)) {
            *target = byte;
        }

        Ok(length)
    }
}

impl ReadReady for ExampleSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

/// Timer mock, delays expire instantly and the clock advances by one millisecond per query
#[derive(Default)]
pub struct ExampleTimer {
    ticks: u32,
}

impl Timer<1_000_000> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<1000000> {
        self.ticks = self.ticks.wrapping_add(1_000);
        TimerInstantU32::from_ticks(self.ticks)
    }

    fn start(&mut self, _duration: TimerDurationU32<1000000>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
