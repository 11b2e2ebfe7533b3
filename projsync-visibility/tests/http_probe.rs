//! `HttpProbe` against a loopback responder.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use rstest::rstest;

use projsync_visibility::{HttpProbe, StatusProbe, VisibilityError};

/// Answer one request with `status`; the request line comes back on the receiver.
fn answer_once(status: u16) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
                break;
            }
        }
        let _ = tx.send(request_line.trim_end().to_string());
        let _ = write!(
            stream,
            "HTTP/1.1 {status} Stub\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    });
    (base, rx)
}

#[rstest]
#[case(200)]
#[case(401)]
#[case(404)]
#[case(500)]
fn status_codes_are_returned_not_raised(#[case] status: u16) {
    let (base, requests) = answer_once(status);
    let probe = HttpProbe::new(Duration::from_secs(5));
    let url = format!("{base}/org/repo.git/info/refs?service=git-upload-pack");

    assert_eq!(probe.status(&url).expect("status"), status);
    assert_eq!(
        requests.recv().expect("request"),
        "GET /org/repo.git/info/refs?service=git-upload-pack HTTP/1.1"
    );
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port();
    let probe = HttpProbe::new(Duration::from_secs(5));
    let err = probe.status(&format!("http://127.0.0.1:{port}/x")).unwrap_err();
    assert!(matches!(err, VisibilityError::Transport { .. }), "got {err}");
}
