//! Example that runs on Linux using a serial-USB-adapter.
//!
//! Joins the given WIFI network and uploads a reading of the system load to the given host in a loop.
use std::{env, fs, time::Duration};

use esp_at_logger::{adapter::Adapter, config::Config, upload::Reading, wifi::WifiAdapter};
use serialport::{DataBits, FlowControl, Parity, StopBits};

// Chunk size in bytes when receiving data
const RX_SIZE: usize = 256;

// Timer frequency in Hz
const TIMER_HZ: u32 = 1000;

// Pause between two uploads, if not passed as argument
const DEFAULT_INTERVAL_MS: i32 = 20_000;

fn main() {
    env_logger::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    if args.len() != 6 && args.len() != 7 {
        println!(
            "Usage: {} <path-to-serial> <baudrate> <ssid> <psk> <host> [interval-ms]",
            args[0]
        );
        println!(
            "Example: {} /dev/ttyUSB0 115200 mywifi hellopasswd123 api.thingspeak.com 20000",
            args[0]
        );
        println!("\nNote: To run the example with debug logging, run it like this:");
        println!("\n  RUST_LOG=trace cargo run --example linux --features \"log\" -- /dev/ttyUSB0 115200 mywifi hellopasswd123 api.thingspeak.com");
        std::process::exit(1);
    }
    let dev = &args[1];
    let baud_rate: u32 = args[2].parse().expect("Invalid baud rate");
    let ssid = &args[3];
    let psk = &args[4];
    let host = &args[5];
    let interval_ms: i32 = args
        .get(6)
        .map(|arg| arg.parse().expect("Invalid interval"))
        .unwrap_or(DEFAULT_INTERVAL_MS);

    println!("Starting (dev={}, baud={:?})...", dev, baud_rate);

    // Open serial port
    let port = serialport::new(dev, baud_rate)
        .data_bits(DataBits::Eight)
        .flow_control(FlowControl::None)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(Duration::from_millis(500))
        .open()
        .expect("Could not open serial port");

    let mut adapter: Adapter<_, _, TIMER_HZ, RX_SIZE> =
        Adapter::with_config(serial::Serial::new(port), timer::SysTimer::new(), Config::default());

    loop {
        if !adapter.is_link_up() {
            println!("Join WiFi \"{}\"...", ssid);
            adapter.join(ssid, psk);
        }

        let reading = load_reading();
        println!("Uploading {:?} to {}...", reading.fields(), host);
        adapter.upload(host, &reading);

        println!(
            "link_up={}, socket_up={}, last_transfer_ok={}, last_failure={:?}",
            adapter.is_link_up(),
            adapter.is_socket_up(),
            adapter.is_last_transfer_ok(),
            adapter.last_failure()
        );

        adapter.wait(interval_ms);
    }
}

/// Builds a reading of the system load averages and the uptime
fn load_reading() -> Reading {
    let mut fields = [0.0; 8];

    let loadavg = fs::read_to_string("/proc/loadavg").unwrap_or_default();
    let uptime = fs::read_to_string("/proc/uptime").unwrap_or_default();

    let values = loadavg
        .split_whitespace()
        .take(3)
        .chain(uptime.split_whitespace().take(1))
        .map(|value| value.parse().unwrap_or(0.0));

    for (field, value) in fields.iter_mut().zip(values) {
        *field = value;
    }

    Reading::new(fields)
}

mod serial {
    use std::io::{self, Read as _, Write as _};

    use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
    use serialport::SerialPort;

    /// Blocking serial port exposing the embedded-io traits
    pub struct Serial {
        port: Box<dyn SerialPort>,
    }

    impl Serial {
        pub fn new(port: Box<dyn SerialPort>) -> Self {
            Self { port }
        }
    }

    impl ErrorType for Serial {
        type Error = ErrorKind;
    }

    impl Read for Serial {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.port.read(buf) {
                Ok(length) => Ok(length),
                Err(e) if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock => Ok(0),
                Err(e) => {
                    log::error!("Error while reading: {}", e);
                    Err(ErrorKind::Other)
                }
            }
        }
    }

    impl ReadReady for Serial {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            self.port
                .bytes_to_read()
                .map(|pending| pending > 0)
                .map_err(|_| ErrorKind::Other)
        }
    }

    impl Write for Serial {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.port.write(buf).map_err(|e| {
                log::error!("Error while writing: {}", e);
                ErrorKind::Other
            })
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.port.flush().map_err(|_| ErrorKind::Other)
        }
    }
}

mod timer {
    use std::{convert::TryInto, time::Instant as StdInstant};

    use fugit::Instant;
    use fugit_timer::Timer;

    /// A timer with millisecond precision.
    ///
    /// The clock keeps running independently of started delays, as the adapter measures response timeouts
    /// while delays are running.
    pub struct SysTimer {
        origin: StdInstant,
        start: StdInstant,
        duration_ms: u32,
        started: bool,
    }

    impl SysTimer {
        pub fn new() -> SysTimer {
            SysTimer {
                origin: StdInstant::now(),
                start: StdInstant::now(),
                duration_ms: 0,
                started: false,
            }
        }
    }

    impl Timer<1000> for SysTimer {
        type Error = &'static str;

        /// Return current time `Instant`
        fn now(&mut self) -> fugit::TimerInstantU32<1000> {
            let milliseconds = (StdInstant::now() - self.origin).as_millis();
            let ticks: u32 = milliseconds.try_into().expect("u32 timer overflow");
            Instant::<u32, 1, 1000>::from_ticks(ticks)
        }

        /// Start timer with a `duration`
        fn start(&mut self, duration: fugit::TimerDurationU32<1000>) -> Result<(), Self::Error> {
            self.start = StdInstant::now();
            self.duration_ms = duration.ticks();
            self.started = true;

            Ok(())
        }

        /// Tries to stop this timer.
        fn cancel(&mut self) -> Result<(), Self::Error> {
            if !self.started {
                Err("cannot cancel stopped timer")
            } else {
                self.started = false;
                Ok(())
            }
        }

        /// Wait until timer `duration` has expired.
        fn wait(&mut self) -> nb::Result<(), Self::Error> {
            if !self.started {
                return Err(nb::Error::Other("timer not started"));
            }

            if (StdInstant::now() - self.start).as_millis() >= self.duration_ms.into() {
                self.started = false;
                Ok(())
            } else {
                Err(nb::Error::WouldBlock)
            }
        }
    }

}
