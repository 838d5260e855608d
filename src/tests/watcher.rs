use crate::watcher::{Failure, Outcome, ResponseWatcher};

#[test]
fn test_ok_response() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(Some(Outcome::Success), watcher.feed(b"AT+CWMODE=1\r\n\r\nOK\r\n"));
}

#[test]
fn test_error_response() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(
        Some(Outcome::Failure(Failure::ErrorResponse)),
        watcher.feed(b"\r\nERROR\r\n")
    );
}

#[test]
fn test_send_fail_response() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(
        Some(Outcome::Failure(Failure::SendFail)),
        watcher.feed(b"\r\nRecv 77 bytes\r\n\r\nSEND FAIL\r\n")
    );
}

#[test]
fn test_send_ok_is_success() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(Some(Outcome::Success), watcher.feed(b"\r\nRecv 77 bytes\r\n\r\nSEND OK\r\n"));
}

#[test]
fn test_no_marker() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(None, watcher.feed(b""));
    assert_eq!(None, watcher.feed(b"\r\nbusy p...\r\n"));
    assert_eq!(None, watcher.feed(b"WIFI CONNECTED\r\n"));
    assert_eq!(29, watcher.received());
}

#[test]
fn test_marker_split_across_reads() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(None, watcher.feed(b"\r\nO"));
    assert_eq!(Some(Outcome::Success), watcher.feed(b"K\r\n"));
}

#[test]
fn test_failure_marker_split_across_reads() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(None, watcher.feed(b"SEND"));
    assert_eq!(None, watcher.feed(b" F"));
    assert_eq!(Some(Outcome::Failure(Failure::SendFail)), watcher.feed(b"AIL\r\n"));
}

#[test]
fn test_success_wins_within_same_read() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(Some(Outcome::Success), watcher.feed(b"\r\nERROR\r\n\r\nOK\r\n"));
}

#[test]
fn test_first_failure_marker_wins() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(
        Some(Outcome::Failure(Failure::SendFail)),
        watcher.feed(b"SEND FAIL\r\nERROR\r\n")
    );
}

#[test]
fn test_marker_after_large_amount_of_data() {
    let mut watcher = ResponseWatcher::new();
    let noise = [b'x'; 4096];

    for _ in 0..16 {
        assert_eq!(None, watcher.feed(&noise));
    }

    assert_eq!(Some(Outcome::Success), watcher.feed(b"\r\nOK\r\n"));
    assert_eq!(16 * 4096 + 6, watcher.received());
}

#[test]
fn test_marker_characters_not_adjacent() {
    let mut watcher = ResponseWatcher::new();

    assert_eq!(None, watcher.feed(b"O\r\nK ERR OR"));
}
