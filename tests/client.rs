mod common;

use common::scripted;
use exolink::network::application::http::client::{ApiResponse, Client};
use heapless::String;

const CONNECTOR: &str = "x1-test.example.io";
const TOKEN: &str = "0123456789abcdef0123456789abcdef01234567";

fn request_text(written: &std::rc::Rc<std::cell::RefCell<Vec<u8>>>) -> std::string::String {
    std::str::from_utf8(&written.borrow()).unwrap().to_string()
}

#[test]
fn read_decodes_alias_value() {
    let (transport, clock, written) =
        scripted(b"HTTP/1.1 200 OK\r\nHost: x\r\n\r\ndata_out=hello%20world");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.read("data_out", &mut value);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 200,
            success: true
        }
    );
    assert_eq!(value.as_str(), "hello world");

    let request = request_text(&written);
    assert!(request.starts_with("GET /onep:v1/stack/alias?data_out HTTP/1.1\r\n"));
    assert!(request.contains("Host: x1-test.example.io\r\n"));
    assert!(request.contains("Accept: application/x-www-form-urlencoded; charset=utf-8\r\n"));
    assert!(request.contains(&format!("Authorization: token {TOKEN}\r\n")));
    assert!(request.ends_with("\r\n\r\n"));
}

#[test]
fn read_accepts_no_content() {
    let (transport, clock, _written) = scripted(b"HTTP/1.1 204 No Content\r\n\r\n");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.read("data_out", &mut value);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 204,
            success: true
        }
    );
    assert!(value.is_empty());
}

#[test]
fn write_encodes_value_and_accepts_204() {
    let (transport, clock, written) = scripted(b"HTTP/1.1 204 No Content\r\n\r\n");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let outcome = client.write("data_in", "{\"temp\":23.5}");

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 204,
            success: true
        }
    );

    let request = request_text(&written);
    assert!(request.starts_with("POST /onep:v1/stack/alias HTTP/1.1\r\n"));
    assert!(request.contains("Content-Type: application/x-www-form-urlencoded; charset=utf-8\r\n"));
    assert!(request.contains("Content-Length: 31\r\n"));
    assert!(request.ends_with("\r\n\r\ndata_in=%7B%22temp%22%3A23.5%7D"));
}

#[test]
fn long_poll_no_change_is_success() {
    let (transport, clock, written) = scripted(b"HTTP/1.1 304 Not Modified\r\n\r\n");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.long_poll("data_out", &mut value, 1_700_000_000, 5_000);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 304,
            success: true
        }
    );
    assert!(value.is_empty());

    let request = request_text(&written);
    assert!(request.contains("If-Modified-Since: 1700000000\r\nRequest-Timeout: 5000\r\n"));
}

#[test]
fn long_poll_delivers_changed_value() {
    let (transport, clock, _written) =
        scripted(b"HTTP/1.1 200 OK\r\n\r\ndata_out=42%25");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.long_poll("data_out", &mut value, 0, 5_000);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 200,
            success: true
        }
    );
    assert_eq!(value.as_str(), "42%");
}

#[test]
fn provision_returns_token() {
    let response = format!("HTTP/1.1 200 OK\r\nContent-Length: 40\r\n\r\n{TOKEN}");
    let (transport, clock, written) = scripted(response.as_bytes());
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();

    let mut token: String<64> = String::new();
    let outcome = client.provision("unit-test-device-01", &mut token);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 200,
            success: true
        }
    );
    assert_eq!(token.as_str(), TOKEN);

    let request = request_text(&written);
    assert!(request.starts_with("POST /provision/activate HTTP/1.1\r\n"));
    assert!(request.contains("Content-Length: 22\r\n"));
    assert!(!request.contains("Authorization"));
    assert!(request.ends_with("\r\n\r\nid=unit-test-device-01"));
}

#[test]
fn provision_conflict_reports_status() {
    let (transport, clock, _written) = scripted(b"HTTP/1.1 409 Conflict\r\n\r\n");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();

    let mut token: String<64> = String::new();
    let outcome = client.provision("unit-test-device-01", &mut token);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 409,
            success: false
        }
    );
    assert!(token.is_empty());
}

#[test]
fn provision_rejects_empty_identity_before_io() {
    let (transport, clock, written) = scripted(b"HTTP/1.1 200 OK\r\n\r\nwhatever");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();

    let mut token: String<64> = String::new();
    let outcome = client.provision("", &mut token);

    assert_eq!(outcome, ApiResponse::default());
    assert!(written.borrow().is_empty());
}

#[test]
fn timestamp_parses_epoch_seconds() {
    let (transport, clock, written) = scripted(b"HTTP/1.1 200 OK\r\n\r\n1756100000");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();

    assert_eq!(client.timestamp(), Some(1_756_100_000));

    let request = request_text(&written);
    assert!(request.starts_with("GET /timestamp HTTP/1.1\r\n"));
    assert!(!request.contains("Authorization"));
}

#[test]
fn timestamp_fails_quietly_on_unexpected_status() {
    let (transport, clock, _written) = scripted(b"HTTP/1.1 500 Oops\r\n\r\n");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();

    assert_eq!(client.timestamp(), None);
}

#[test]
fn garbage_response_reports_status_zero() {
    let (transport, clock, _written) = scripted(b"not http at all");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.read("data_out", &mut value);

    assert_eq!(outcome, ApiResponse::default());
}

#[test]
fn missing_body_separator_fails_with_status() {
    let (transport, clock, _written) = scripted(b"HTTP/1.1 200 OK\r\ndata_out=x");
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.read("data_out", &mut value);

    assert_eq!(
        outcome,
        ApiResponse {
            status_code: 200,
            success: false
        }
    );
    assert!(value.is_empty());
}

#[test]
fn oversized_response_is_rejected() {
    let mut response = b"HTTP/1.1 200 OK\r\n\r\ndata_out=".to_vec();
    response.extend(std::iter::repeat(b'a').take(2048));
    let (transport, clock, _written) = scripted(&response);
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.read("data_out", &mut value);

    assert_eq!(outcome, ApiResponse::default());
    assert!(value.is_empty());
}

#[test]
fn unreachable_connector_fails_without_status() {
    let (mut transport, clock, written) = scripted(b"");
    transport.refuse_connect = true;
    let mut client = Client::new(transport, clock, CONNECTOR).unwrap();
    client.set_token(TOKEN).unwrap();

    let mut value: String<64> = String::new();
    let outcome = client.read("data_out", &mut value);

    assert_eq!(outcome, ApiResponse::default());
    assert!(written.borrow().is_empty());
}
