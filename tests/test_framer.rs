use spindle::http::framer::{Frame, FrameError, evaluate};

#[test]
fn test_get_without_body_is_complete_immediately() {
    let req = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";

    match evaluate(req) {
        Frame::Complete { header_end, end } => {
            assert_eq!(header_end, req.len());
            assert_eq!(end - header_end, 0);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn test_missing_terminator_is_incomplete() {
    assert_eq!(evaluate(b""), Frame::Incomplete);
    assert_eq!(evaluate(b"GET / HTTP/1.1\r\n"), Frame::Incomplete);
    assert_eq!(evaluate(b"GET / HTTP/1.1\r\nHost: x\r\n\r"), Frame::Incomplete);
}

#[test]
fn test_partial_body_then_complete() {
    let partial = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel";
    assert_eq!(evaluate(partial), Frame::Incomplete);

    let full = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    assert_eq!(
        evaluate(full),
        Frame::Complete {
            header_end: full.len() - 5,
            end: full.len()
        }
    );
}

#[test]
fn test_declared_body_not_started_is_incomplete() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\n";
    assert_eq!(evaluate(req), Frame::Incomplete);
}

#[test]
fn test_zero_content_length_is_complete() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
    assert!(evaluate(req).is_complete());
}

#[test]
fn test_body_without_content_length_is_malformed() {
    let req = b"POST / HTTP/1.1\r\n\r\nhello";
    assert_eq!(
        evaluate(req),
        Frame::Malformed(FrameError::BodyWithoutLength)
    );
}

#[test]
fn test_non_numeric_content_length_is_malformed() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: 12a\r\n\r\nhello";
    assert_eq!(
        evaluate(req),
        Frame::Malformed(FrameError::InvalidContentLength)
    );
}

#[test]
fn test_invalid_content_length_is_malformed_before_body_arrives() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n";
    assert_eq!(
        evaluate(req),
        Frame::Malformed(FrameError::InvalidContentLength)
    );
}

#[test]
fn test_signed_padded_and_overflowing_lengths_are_malformed() {
    let values = [
        "+5",
        "-1",
        " 5",
        "5 ",
        "",
        "340282366920938463463374607431768211456",
    ];

    for value in values {
        let req = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\nhello");
        assert_eq!(
            evaluate(req.as_bytes()),
            Frame::Malformed(FrameError::InvalidContentLength),
            "value {value:?}"
        );
    }
}

#[test]
fn test_content_length_accepts_optional_whitespace() {
    for header in ["Content-Length:5", "Content-Length: 5", "Content-Length:\t5"] {
        let req = format!("POST / HTTP/1.1\r\n{header}\r\n\r\nhello");
        assert_eq!(
            evaluate(req.as_bytes()),
            Frame::Complete {
                header_end: req.len() - 5,
                end: req.len()
            },
            "header {header:?}"
        );
    }

    let req = b"POST / HTTP/1.1\r\nContent-Length: \t5\r\n\r\nhello";
    assert_eq!(
        evaluate(req),
        Frame::Malformed(FrameError::InvalidContentLength)
    );
}

#[test]
fn test_content_length_name_is_case_insensitive() {
    let req = b"POST / HTTP/1.1\r\ncontent-length: 2\r\n\r\nok";
    assert!(evaluate(req).is_complete());
}

#[test]
fn test_conflicting_content_lengths_are_malformed() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 3\r\n\r\nok!";
    assert_eq!(
        evaluate(req),
        Frame::Malformed(FrameError::ConflictingContentLength)
    );

    let same = b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 2\r\n\r\nok";
    assert!(evaluate(same).is_complete());
}

#[test]
fn test_transfer_encoding_is_rejected() {
    let req = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
    assert_eq!(
        evaluate(req),
        Frame::Malformed(FrameError::TransferEncoding)
    );
}

#[test]
fn test_pipelined_bytes_are_left_after_end() {
    let first = b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc".as_slice();
    let second = b"GET /b HTTP/1.1\r\n\r\n".as_slice();
    let buf = [first, second].concat();

    match evaluate(&buf) {
        Frame::Complete { end, .. } => {
            assert_eq!(end, first.len());
            assert_eq!(&buf[end..], second);
            assert!(evaluate(&buf[end..]).is_complete());
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn test_get_followed_by_extra_bytes_is_malformed() {
    let buf = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
    assert_eq!(
        evaluate(buf),
        Frame::Malformed(FrameError::BodyWithoutLength)
    );
}

#[test]
fn test_evaluate_is_deterministic() {
    let inputs: [&[u8]; 4] = [
        b"GET / HTTP/1.1\r\n\r\n",
        b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhe",
        b"POST / HTTP/1.1\r\n\r\nhello",
        b"garbage",
    ];

    for input in inputs {
        let copy = input.to_vec();
        assert_eq!(evaluate(input), evaluate(input));
        assert_eq!(input, copy.as_slice());
    }
}

#[test]
fn test_every_prefix_of_a_request_is_incomplete() {
    let req = b"POST /api HTTP/1.1\r\nHost: x\r\nContent-Length: 11\r\n\r\nhello world";

    for cut in 0..req.len() {
        assert_eq!(evaluate(&req[..cut]), Frame::Incomplete, "prefix {cut}");
    }
    assert!(evaluate(req).is_complete());
}
