//! Wire-format behavior under streaming arrival.
//!
//! A connector reading from a byte stream sees frames in arbitrary
//! fragments. These tests replay that situation against the codec and run
//! one full request/reply exchange through encoded bytes, the way a real
//! I/O driver would.

use patchcord::{CodecError, Connector, Message, MessageCodec, RequestId, Router};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn frames_reassemble_from_fragments() {
    let codec = MessageCodec::new();
    let mut message = Message::request(b"fragmented payload".to_vec());
    message.request_id = RequestId::new(11);
    let wire = codec.encode(&message);

    let mut buffer = Vec::new();
    let mut decoded = None;

    // Feed the frame three bytes at a time, polling after every chunk.
    for chunk in wire.chunks(3) {
        buffer.extend_from_slice(chunk);
        match codec.try_decode_from_buffer(&mut buffer) {
            Ok(Some(message)) => {
                decoded = Some(message);
                break;
            }
            Ok(None) => {}
            Err(CodecError::InsufficientData { .. }) => {}
            Err(other) => panic!("unexpected codec error: {other}"),
        }
    }

    assert_eq!(decoded.expect("frame eventually complete"), message);
    assert!(buffer.is_empty());
}

#[test]
fn back_to_back_frames_decode_separately() {
    let codec = MessageCodec::new();
    let first = Message::notification(b"one".to_vec());
    let second = Message::notification(b"two".to_vec());

    let mut buffer = codec.encode(&first);
    buffer.extend_from_slice(&codec.encode(&second));

    let mut decoded = Vec::new();
    while let Ok(Some(message)) = codec.try_decode_from_buffer(&mut buffer) {
        decoded.push(message);
    }

    assert_eq!(decoded, vec![first, second]);
}

/// Connector that frames outbound messages into a shared byte stream.
#[derive(Clone, Default)]
struct FramingConnector {
    outbound: Rc<RefCell<Vec<u8>>>,
}

impl Connector for FramingConnector {
    fn send(&self, message: Message) -> bool {
        let codec = MessageCodec::new();
        self.outbound
            .borrow_mut()
            .extend_from_slice(&codec.encode(&message));
        true
    }

    fn close(&self) {}
}

#[test]
fn round_trip_through_encoded_bytes() {
    let codec = MessageCodec::new();
    let connector = FramingConnector::default();
    let outbound = connector.outbound.clone();
    let router = Router::new(connector);

    let rx = router.send_request(Message::request(b"ping".to_vec()));

    // Decode what actually went over the wire.
    let mut wire = outbound.borrow_mut().split_off(0);
    let sent = codec
        .try_decode_from_buffer(&mut wire)
        .expect("well-formed frame")
        .expect("one frame present");
    assert_eq!(sent.request_id, RequestId::new(1));
    assert!(sent.expects_response());
    assert_eq!(sent.payload, b"ping");

    // Craft the peer's reply on the wire and deliver it as a driver would.
    let reply_frame = codec.encode(&Message::reply_to(&sent, b"pong".to_vec()));
    let mut inbound = reply_frame;
    let reply = codec
        .try_decode_from_buffer(&mut inbound)
        .expect("well-formed frame")
        .expect("one frame present");
    router.on_message(reply);

    let resolved = rx.blocking_recv().expect("completed").expect("resolved");
    assert_eq!(resolved.payload, b"pong");
}
