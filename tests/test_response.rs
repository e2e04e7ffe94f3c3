use bytes::{Bytes, BytesMut};
use spindle::http::response::{Response, ResponseBuilder, StatusCode};
use spindle::http::writer::{ResponseWriter, WriteError, serialize_response};

#[test]
fn test_status_code_ok() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    let content_length = response.headers.get("Content-Length").unwrap();
    assert_eq!(content_length, &body.len().to_string());
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    // Should keep the custom value
    assert_eq!(response.headers.get("Content-Length").unwrap(), "999");
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert_eq!(response.body.len(), 0);
    assert_eq!(response.headers.get("Content-Length").unwrap(), "0");
}

#[test]
fn test_response_ok_helper() {
    let response = Response::ok(b"test content".to_vec());

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"test content".to_vec());
}

#[test]
fn test_response_set_header_replaces_any_case() {
    let mut response = ResponseBuilder::new(StatusCode::Ok)
        .header("connection", "keep-alive")
        .build();

    response.set_header("Connection", "close");

    assert_eq!(response.headers.get("Connection").unwrap(), "close");
    assert!(!response.headers.contains_key("connection"));
}

#[test]
fn test_serialize_response_wire_format() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"hi".to_vec())
        .build();

    let mut buf = BytesMut::new();
    serialize_response(&response, &mut buf).unwrap();

    assert_eq!(
        &buf[..],
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nContent-Type: text/plain\r\n\r\nhi"
    );
}

#[test]
fn test_serialize_appends_to_existing_output() {
    let mut buf = BytesMut::from(&b"previous"[..]);
    serialize_response(&Response::ok("done"), &mut buf).unwrap();

    assert!(buf.starts_with(b"previousHTTP/1.1 200 OK\r\n"));
    assert!(buf.ends_with(b"\r\n\r\ndone"));
}

#[test]
fn test_serialize_rejects_header_injection() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("X-Evil", "a\r\nSet-Cookie: x=1")
        .build();

    let mut buf = BytesMut::new();
    let result = serialize_response(&response, &mut buf);

    assert!(matches!(result, Err(WriteError::InvalidHeader { name }) if name == "X-Evil"));
    assert!(buf.is_empty());
}

#[test]
fn test_serialize_rejects_invalid_header_name() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Bad Name", "v")
        .build();

    let mut buf = BytesMut::new();
    assert!(serialize_response(&response, &mut buf).is_err());
}

#[tokio::test]
async fn test_response_writer_flushes_everything() {
    let payload = Bytes::from_static(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n");
    let mut writer = ResponseWriter::new(payload.clone());
    let mut sink: Vec<u8> = Vec::new();

    writer.write_to_stream(&mut sink).await.unwrap();

    assert_eq!(sink, payload.to_vec());
}
