use tokio_util::bytes::Buf;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// TCP port the controller listens on.
pub const PORT: u16 = 8889;

const WRITE_PARAMETER: i32 = 3002;
const READ_CALCULATIONS: i32 = 3004;

// A controller never sends anywhere near this many registers; anything
// larger means we lost framing.
const MAX_REGISTERS: i32 = 4096;

#[derive(Debug, Clone, Copy)]
pub enum Request {
    /// Fetch the full telemetry snapshot.
    GetCalculations,
    /// Write a single parameter register.
    SetParameter { index: i32, value: i32 },
}

#[derive(Debug, PartialEq)]
pub enum Response {
    Calculations { status: i32, values: Vec<i32> },
    ParameterSet { value: i32 },
}

/// Codec for the controller's exchange: big-endian i32 words, a command
/// word first, responses echoing the command word back.
pub struct LuxtronikCodec {}

impl Encoder<&Request> for LuxtronikCodec {
    type Error = std::io::Error;
    fn encode(
        &mut self,
        req: &Request,
        dst: &mut tokio_util::bytes::BytesMut,
    ) -> Result<(), Self::Error> {
        match *req {
            Request::GetCalculations => {
                dst.extend(READ_CALCULATIONS.to_be_bytes());
                dst.extend(0i32.to_be_bytes());
            }
            Request::SetParameter { index, value } => {
                dst.extend(WRITE_PARAMETER.to_be_bytes());
                dst.extend(index.to_be_bytes());
                dst.extend(value.to_be_bytes());
            }
        }
        trace!(message="sending encoded", buffer=?dst);
        Ok(())
    }
}

impl Decoder for LuxtronikCodec {
    type Item = Response;
    type Error = std::io::Error;
    fn decode(
        &mut self,
        src: &mut tokio_util::bytes::BytesMut,
    ) -> Result<Option<Self::Item>, Self::Error> {
        trace!(message="attempt at decoding", available=src.len());
        let Some((command_buffer, remainder)) = src.split_first_chunk::<4>() else {
            return Ok(None);
        };
        match i32::from_be_bytes(*command_buffer) {
            READ_CALCULATIONS => {
                let Some((status_buffer, remainder)) = remainder.split_first_chunk::<4>() else {
                    return Ok(None);
                };
                let Some((count_buffer, remainder)) = remainder.split_first_chunk::<4>() else {
                    return Ok(None);
                };
                let status = i32::from_be_bytes(*status_buffer);
                let count = i32::from_be_bytes(*count_buffer);
                if !(0..=MAX_REGISTERS).contains(&count) {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("implausible register count {count}"),
                    ));
                }
                let count = count as usize;
                let Some((data, _)) = remainder.split_at_checked(count * 4) else {
                    return Ok(None);
                };
                let mut values = Vec::with_capacity(count);
                let mut data = data;
                while let Some((word, rest)) = data.split_first_chunk::<4>() {
                    values.push(i32::from_be_bytes(*word));
                    data = rest;
                }
                src.advance(12 + count * 4);
                Ok(Some(Response::Calculations { status, values }))
            }
            WRITE_PARAMETER => {
                let Some((value_buffer, _)) = remainder.split_first_chunk::<4>() else {
                    return Ok(None);
                };
                let value = i32::from_be_bytes(*value_buffer);
                src.advance(8);
                Ok(Some(Response::ParameterSet { value }))
            }
            other => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unexpected command word {other}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::bytes::BytesMut;
    use tokio_util::codec::{Decoder as _, Encoder as _};

    use super::*;

    fn words(words: &[i32]) -> BytesMut {
        let mut buffer = BytesMut::new();
        for word in words {
            buffer.extend(word.to_be_bytes());
        }
        buffer
    }

    #[test]
    fn encodes_a_calculation_read() {
        let mut buffer = BytesMut::new();
        LuxtronikCodec {}.encode(&Request::GetCalculations, &mut buffer).unwrap();
        assert_eq!(&buffer[..], &words(&[3004, 0])[..]);
    }

    #[test]
    fn encodes_a_parameter_write() {
        let mut buffer = BytesMut::new();
        let request = Request::SetParameter { index: 1012, value: 85 };
        LuxtronikCodec {}.encode(&request, &mut buffer).unwrap();
        assert_eq!(&buffer[..], &words(&[3002, 1012, 85])[..]);
    }

    #[test]
    fn decodes_a_calculation_response() {
        let mut buffer = words(&[3004, 0, 3, 237, -45, 1]);
        let response = LuxtronikCodec {}.decode(&mut buffer).unwrap();
        assert_eq!(
            response,
            Some(Response::Calculations { status: 0, values: vec![237, -45, 1] }),
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn short_buffers_wait_for_more_data() {
        let full = words(&[3004, 0, 2, 237, -45]);
        for cut in [0, 3, 11, 12, 19] {
            let mut buffer = BytesMut::from(&full[..cut]);
            assert_eq!(LuxtronikCodec {}.decode(&mut buffer).unwrap(), None, "cut at {cut}");
            assert_eq!(buffer.len(), cut, "nothing may be consumed at {cut}");
        }
    }

    #[test]
    fn decodes_a_write_acknowledgement() {
        let mut buffer = words(&[3002, 85]);
        let response = LuxtronikCodec {}.decode(&mut buffer).unwrap();
        assert_eq!(response, Some(Response::ParameterSet { value: 85 }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn unknown_command_words_poison_the_stream() {
        let mut buffer = words(&[9999, 0, 0]);
        let error = LuxtronikCodec {}.decode(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn implausible_register_counts_are_rejected() {
        let mut buffer = words(&[3004, 0, -1]);
        let error = LuxtronikCodec {}.decode(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
    }
}
