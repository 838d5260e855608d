use crate::adapter::Adapter;
use crate::config::Config;
use crate::tests::mock::{MockSerial, MockTimer, TimerProbe};
use crate::upload::{Reading, MAX_PAYLOAD_LEN};
use crate::watcher::Failure;
use crate::wifi::WifiAdapter;
use alloc::format;
use alloc::string::ToString;
use alloc::vec;

type AdapterType = Adapter<MockSerial, MockTimer, 1_000_000, 16>;

const HOST: &str = "api.thingspeak.com";

/// Mocks a successful join
fn add_join_responses(serial: &mut MockSerial) {
    for _ in 0..4 {
        serial.add_ok_response();
    }
}

/// Mocks a successful connect, transmission prepare and transmission
fn add_upload_responses(serial: &mut MockSerial) {
    serial.add_response(b"CONNECT\r\n\r\nOK\r\n");
    serial.add_response(b"\r\nOK\r\n> ");
    serial.add_response(b"\r\nRecv 77 bytes\r\n\r\nSEND OK\r\n");
}

/// Returns an adapter which already joined the network
fn joined_adapter(serial: MockSerial, config: Config) -> (AdapterType, TimerProbe) {
    let (timer, probe) = MockTimer::ticking(1);

    let mut adapter: AdapterType = Adapter::with_config(serial, timer, config);
    adapter.join("test_wifi", "secret");
    assert!(adapter.is_link_up());

    (adapter, probe)
}

fn sample_reading() -> Reading {
    Reading::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
}

#[test]
fn test_payload_integers() {
    assert_eq!(
        "GET&field1=1&field2=2&field3=3&field4=4&field5=5&field6=6&field7=7&field8=8",
        sample_reading().payload().as_str()
    );
}

#[test]
fn test_payload_fractions() {
    let reading = Reading::new([21.5, -3.25, 0.0, 1013.75, 0.5, 100.0, -0.125, 42.0]);

    assert_eq!(
        "GET&field1=21.5&field2=-3.25&field3=0&field4=1013.75&field5=0.5&field6=100&field7=-0.125&field8=42",
        reading.payload().as_str()
    );
}

#[test]
fn test_payload_keeps_integer_precision() {
    let reading = Reading::new([123456789.0, 16777217.0, 4294967296.0, -9007199254740991.0, 0.0, 0.0, 0.0, 0.0]);

    assert_eq!(
        "GET&field1=123456789&field2=16777217&field3=4294967296&field4=-9007199254740991&field5=0&field6=0&field7=0&field8=0",
        reading.payload().as_str()
    );
}

#[test]
fn test_payload_keeps_fraction_precision() {
    let reading = Reading::new([0.1, 3.141592653589793, 1.0e-7, 0.0, 0.0, 0.0, 0.0, 0.0]);

    assert!(reading
        .payload()
        .starts_with("GET&field1=0.1&field2=3.141592653589793&field3=0.0000001&field4=0"));
}

#[test]
fn test_payload_longest_values() {
    // Smallest subnormal value renders with 324 decimals
    let value = -f64::from_bits(1);
    let reading = Reading::new([value; 8]);
    let payload = reading.payload();

    assert_eq!(MAX_PAYLOAD_LEN, payload.len());
    assert!(payload.ends_with(format!("&field8={}", value).as_str()));
}

#[test]
fn test_payload_extreme_values() {
    let reading = Reading::new([f64::MAX, f64::MIN, -f64::MIN_POSITIVE, f64::INFINITY, f64::NAN, 0.0, 0.0, 0.0]);
    let payload = reading.payload();

    let expected = format!(
        "GET&field1={}&field2={}&field3={}&field4=inf&field5=NaN&field6=0&field7=0&field8=0",
        f64::MAX,
        f64::MIN,
        -f64::MIN_POSITIVE
    );
    assert_eq!(expected.as_str(), payload.as_str());
}

#[test]
fn test_upload_large_integer() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);

    let reading = Reading::new([123456789.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &reading);

    let commands = adapter.serial.get_commands_as_strings();
    assert_eq!("AT+CIPSEND=85\r\n".to_string(), commands[5]);
    assert_eq!(
        "GET&field1=123456789&field2=2&field3=3&field4=4&field5=5&field6=6&field7=7&field8=8\r\n".to_string(),
        commands[6]
    );
}

#[test]
fn test_reading_from_array() {
    let reading: Reading = [1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0].into();

    assert_eq!(sample_reading(), reading);
    assert_eq!(&[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], reading.fields());
}

#[test]
fn test_upload_skipped_while_link_down() {
    // Timer mock panics on any call
    let mut adapter: AdapterType = Adapter::new(MockSerial::new(), MockTimer::new());
    adapter.session.socket_up = true;
    adapter.session.last_transfer_ok = true;

    adapter.upload(HOST, &sample_reading());

    assert!(adapter.serial.get_commands_as_strings().is_empty());
    assert!(adapter.is_socket_up());
    assert!(adapter.is_last_transfer_ok());
}

#[test]
fn test_upload_correct_commands() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);

    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &sample_reading());

    let commands = adapter.serial.get_commands_as_strings();
    assert_eq!(7, commands.len());
    assert_eq!(
        "AT+CIPSTART=\"TCP\",\"api.thingspeak.com\",80\r\n".to_string(),
        commands[4]
    );
    assert_eq!("AT+CIPSEND=77\r\n".to_string(), commands[5]);
    assert_eq!(
        "GET&field1=1&field2=2&field3=3&field4=4&field5=5&field6=6&field7=7&field8=8\r\n".to_string(),
        commands[6]
    );
}

#[test]
fn test_upload_successful() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);

    let (mut adapter, probe) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &sample_reading());

    assert!(adapter.is_link_up());
    assert!(adapter.is_socket_up());
    assert!(adapter.is_last_transfer_ok());
    assert_eq!(None, adapter.last_failure());

    // Join delays, followed by connect pause, prefix settle delay and transmission pause
    assert_eq!(vec![1_000, 100, 1_000, 100, 100, 100, 100], probe.delays());
}

#[test]
fn test_upload_custom_port() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);

    let (mut adapter, _) = joined_adapter(serial, Config::default().remote_port(8080));
    adapter.upload("10.0.0.1", &sample_reading());

    let commands = adapter.serial.get_commands_as_strings();
    assert_eq!("AT+CIPSTART=\"TCP\",\"10.0.0.1\",8080\r\n".to_string(), commands[4]);
}

#[test]
fn test_upload_connect_error() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);
    serial.add_response(b"\r\nERROR\r\nCLOSED\r\n");

    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &sample_reading());
    assert!(adapter.is_last_transfer_ok());

    adapter.upload(HOST, &sample_reading());

    assert!(!adapter.is_socket_up());
    assert_eq!(Some(Failure::ErrorResponse), adapter.last_failure());

    // Transfer state of the previous upload is kept
    assert!(adapter.is_last_transfer_ok());

    // Nothing is sent after the failed connect
    let commands = adapter.serial.get_commands_as_strings();
    assert_eq!(8, commands.len());
    assert_eq!(
        "AT+CIPSTART=\"TCP\",\"api.thingspeak.com\",80\r\n".to_string(),
        commands[7]
    );
}

#[test]
fn test_upload_send_fail() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    serial.add_ok_response();
    serial.add_response(b"\r\nOK\r\n> ");
    serial.add_response(b"\r\nRecv 77 bytes\r\n\r\nSEND FAIL\r\n");

    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &sample_reading());

    assert!(adapter.is_socket_up());
    assert!(!adapter.is_last_transfer_ok());
    assert_eq!(Some(Failure::SendFail), adapter.last_failure());
}

#[test]
fn test_upload_transmission_timeout_resets_transfer_state() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);
    serial.add_ok_response();
    serial.add_response(b"\r\nOK\r\n> ");
    serial.add_silence();

    let (mut adapter, _) = joined_adapter(serial, Config::default().response_timeout(50));
    adapter.upload(HOST, &sample_reading());
    assert!(adapter.is_last_transfer_ok());

    adapter.upload(HOST, &sample_reading());

    assert!(adapter.is_socket_up());
    assert!(!adapter.is_last_transfer_ok());
    assert_eq!(Some(Failure::Timeout), adapter.last_failure());
}

#[test]
fn test_upload_prefix_error_ignored() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    serial.add_ok_response();
    serial.add_error_response();
    serial.add_response(b"\r\nSEND OK\r\n");

    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &sample_reading());

    assert!(adapter.is_last_transfer_ok());
    assert_eq!(7, adapter.serial.get_commands_as_strings().len());
}

#[test]
fn test_upload_host_too_long() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);

    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.session.socket_up = true;
    adapter.upload(&"h".repeat(129), &sample_reading());

    assert!(!adapter.is_socket_up());
    assert!(!adapter.is_last_transfer_ok());
    assert_eq!(Some(Failure::CommandTooLong), adapter.last_failure());
    assert_eq!(4, adapter.serial.get_commands_as_strings().len());
}

#[test]
fn test_upload_prefix_length_matches_payload() {
    let mut serial = MockSerial::new();
    add_join_responses(&mut serial);
    add_upload_responses(&mut serial);

    let reading = Reading::new([21.5, -3.25, 0.0, 1013.75, 0.5, 100.0, -0.125, 42.0]);
    let (mut adapter, _) = joined_adapter(serial, Config::default());
    adapter.upload(HOST, &reading);

    let commands = adapter.serial.get_commands_as_strings();
    let expected = format!("AT+CIPSEND={}\r\n", commands[6].len());
    assert_eq!(expected, commands[5]);
}
