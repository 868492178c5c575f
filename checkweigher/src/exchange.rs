//! Request/response exchange over a transport

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use checkweigher_core::constants::frames;
use checkweigher_transport::Transport;

use crate::error::Result;

/// Send `request` and read a response of exactly `response_len` bytes
///
/// Partial reads are accumulated until the declared length has arrived.
/// When `expected` is given, the response must equal it; otherwise the reply
/// is reported as DLE EOT, NAK or a generic unexpected response. A sentinel
/// that arrives before the declared length ends the read early, since NAK is
/// shorter than the replies it stands in for.
///
/// Any transport failure closes the connection before the error is returned.
/// Nothing is retried here.
pub async fn exchange(
    transport: &mut dyn Transport,
    request: &[u8],
    response_len: usize,
    expected: Option<&[u8]>,
) -> Result<Bytes> {
    trace!("Sending {}", hex::encode(request));

    let received = match transfer(transport, request, response_len, expected.is_some()).await {
        Ok(received) => received,
        Err(e) => {
            warn!("Failed to exchange data: {}", e);
            if let Err(close) = transport.disconnect().await {
                warn!("Failed to close connection: {}", close);
            }
            return Err(e.into());
        }
    };

    trace!("Received {}", hex::encode(&received));

    match expected {
        Some(prefix) if received.as_ref() != prefix => {
            let err = checkweigher_core::Error::from_reply(prefix, &received);
            debug!("Expected {}: {}", hex::encode(prefix), err);
            Err(err.into())
        }
        _ => Ok(received),
    }
}

async fn transfer(
    transport: &mut dyn Transport,
    request: &[u8],
    response_len: usize,
    stop_on_sentinel: bool,
) -> checkweigher_transport::Result<Bytes> {
    transport.send(request).await?;

    let mut buf = BytesMut::with_capacity(response_len);

    while buf.len() < response_len {
        let chunk = transport.receive(response_len - buf.len()).await?;
        buf.extend_from_slice(&chunk);

        if stop_on_sentinel && is_sentinel(&buf) {
            break;
        }
    }

    Ok(buf.freeze())
}

fn is_sentinel(buf: &[u8]) -> bool {
    buf == frames::NAK || buf == frames::DLE_EOT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use checkweigher_transport::MockTransport;
    use mockall::Sequence;

    fn replies(transport: &mut MockTransport, seq: &mut Sequence, chunks: Vec<Vec<u8>>) {
        for chunk in chunks {
            transport
                .expect_receive()
                .times(1)
                .in_sequence(seq)
                .returning(move |max| {
                    assert!(chunk.len() <= max);
                    Ok(BytesMut::from(&chunk[..]))
                });
        }
    }

    #[tokio::test]
    async fn test_exchange_accumulates_short_reads() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();

        transport
            .expect_send()
            .withf(|data| data == &frames::ENQUIRE[..])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        replies(&mut transport, &mut seq, vec![vec![0x43], vec![0x57, 0x10], vec![0x30]]);

        let received = exchange(&mut transport, &frames::ENQUIRE, 4, Some(&frames::READY))
            .await
            .unwrap();

        assert_eq!(received.as_ref(), &frames::READY);
    }

    #[tokio::test]
    async fn test_exchange_without_expectation() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();

        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        replies(&mut transport, &mut seq, vec![b"abc".to_vec(), b"de".to_vec()]);

        let received = exchange(&mut transport, &frames::REQUEST_EVEN, 5, None)
            .await
            .unwrap();

        assert_eq!(received.as_ref(), b"abcde");
    }

    #[tokio::test]
    async fn test_exchange_reports_nak_early() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();

        transport.expect_send().returning(|_| Ok(()));
        replies(&mut transport, &mut seq, vec![frames::NAK.to_vec()]);

        let result = exchange(&mut transport, &frames::ENQUIRE, 4, Some(&frames::READY)).await;

        assert!(matches!(
            result,
            Err(Error::Core(checkweigher_core::Error::NegativeAcknowledge))
        ));
    }

    #[tokio::test]
    async fn test_exchange_reports_dle_eot() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();

        transport.expect_send().returning(|_| Ok(()));
        replies(&mut transport, &mut seq, vec![frames::DLE_EOT.to_vec()]);

        let result = exchange(&mut transport, &frames::ENQUIRE, 4, Some(&frames::READY)).await;

        assert!(matches!(
            result,
            Err(Error::Core(checkweigher_core::Error::EndOfTransmission))
        ));
    }

    #[tokio::test]
    async fn test_exchange_reports_unexpected() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();

        transport.expect_send().returning(|_| Ok(()));
        replies(&mut transport, &mut seq, vec![frames::ACCEPTED.to_vec()]);

        let result = exchange(&mut transport, &frames::ENQUIRE, 4, Some(&frames::READY)).await;

        assert!(matches!(
            result,
            Err(Error::Core(checkweigher_core::Error::UnexpectedResponse { .. }))
        ));
    }

    #[tokio::test]
    async fn test_exchange_closes_on_transport_error() {
        let mut transport = MockTransport::new();

        transport.expect_send().returning(|_| Ok(()));
        transport
            .expect_receive()
            .returning(|_| Err(checkweigher_transport::Error::ConnectionClosed));
        transport.expect_disconnect().times(1).returning(|| Ok(()));

        let result = exchange(&mut transport, &frames::REQUEST_EVEN, 164, None).await;

        assert!(matches!(
            result,
            Err(Error::Transport(checkweigher_transport::Error::ConnectionClosed))
        ));
    }
}
