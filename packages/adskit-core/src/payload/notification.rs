use super::{PayloadError, expect_at_least, read_u32};
use crate::ads::{Filetime, NotificationHandle};

/// One value sample inside a notification stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSample {
    pub handle: NotificationHandle,
    pub data: Vec<u8>,
}

/// A timestamped group of samples inside a notification packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationStamp {
    pub timestamp: Filetime,
    pub samples: Vec<NotificationSample>,
}

/// A pushed `Notification` packet (command `0x0008`): one or more stamps,
/// each carrying one or more handle-tagged samples.
///
/// Layout: `u32 totalLen, u32 stampCount`, then per stamp
/// `u64 filetime, u32 sampleCount`, then per sample `u32 handle, u32 len,
/// len bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub stamps: Vec<NotificationStamp>,
}

impl Notification {
    /// Minimum body length: total length (4) + stamp count (4).
    pub const MIN_BODY_LEN: usize = 8;

    /// Parses the command body.
    pub fn parse_body(body: &[u8]) -> Result<Self, PayloadError> {
        expect_at_least(body, Self::MIN_BODY_LEN)?;

        let total_len = read_u32(body, 0) as usize;
        if total_len > body.len() {
            return Err(PayloadError::Truncated {
                needed: total_len,
                got: body.len(),
            });
        }

        let stamp_count = read_u32(body, 4) as usize;
        let mut cursor = Self::MIN_BODY_LEN;
        let mut stamps = Vec::with_capacity(stamp_count.min(64));

        for _ in 0..stamp_count {
            expect_at_least(body, cursor + 12)?;
            let timestamp =
                Filetime::from_bytes(body[cursor..cursor + 8].try_into().unwrap());
            let sample_count = read_u32(body, cursor + 8) as usize;
            cursor += 12;

            let mut samples = Vec::with_capacity(sample_count.min(64));
            for _ in 0..sample_count {
                expect_at_least(body, cursor + 8)?;
                let handle = NotificationHandle::new(read_u32(body, cursor));
                let len = read_u32(body, cursor + 4) as usize;
                cursor += 8;

                expect_at_least(body, cursor + len)?;
                samples.push(NotificationSample {
                    handle,
                    data: body[cursor..cursor + len].to_vec(),
                });
                cursor += len;
            }

            stamps.push(NotificationStamp { timestamp, samples });
        }

        Ok(Self { stamps })
    }

    /// Encodes the command body (server side / tests).
    pub fn encode_body(&self) -> Vec<u8> {
        let mut inner = Vec::new();
        inner.extend_from_slice(&(self.stamps.len() as u32).to_le_bytes());
        for stamp in &self.stamps {
            inner.extend_from_slice(&stamp.timestamp.to_bytes());
            inner.extend_from_slice(&(stamp.samples.len() as u32).to_le_bytes());
            for sample in &stamp.samples {
                inner.extend_from_slice(&sample.handle.to_bytes());
                inner.extend_from_slice(&(sample.data.len() as u32).to_le_bytes());
                inner.extend_from_slice(&sample.data);
            }
        }

        let mut body = Vec::with_capacity(4 + inner.len());
        body.extend_from_slice(&((4 + inner.len()) as u32).to_le_bytes());
        body.extend_from_slice(&inner);
        body
    }

    /// Total number of samples across all stamps.
    pub fn sample_count(&self) -> usize {
        self.stamps.iter().map(|s| s.samples.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet() -> Notification {
        Notification {
            stamps: vec![
                NotificationStamp {
                    timestamp: Filetime::from_raw(133_000_000_000_000_000),
                    samples: vec![NotificationSample {
                        handle: NotificationHandle::new(1),
                        data: vec![0x2A, 0, 0, 0],
                    }],
                },
                NotificationStamp {
                    timestamp: Filetime::from_raw(133_000_000_010_000_000),
                    samples: vec![
                        NotificationSample {
                            handle: NotificationHandle::new(1),
                            data: vec![0x2B, 0, 0, 0],
                        },
                        NotificationSample {
                            handle: NotificationHandle::new(9),
                            data: vec![1],
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn roundtrip() {
        let packet = sample_packet();
        let parsed = Notification::parse_body(&packet.encode_body()).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(parsed.sample_count(), 3);
    }

    #[test]
    fn truncated_sample_rejected() {
        let mut body = sample_packet().encode_body();
        body.truncate(body.len() - 2);
        assert!(matches!(
            Notification::parse_body(&body),
            Err(PayloadError::Truncated { .. })
        ));
    }

    #[test]
    fn empty_body_rejected() {
        assert!(Notification::parse_body(&[]).is_err());
    }
}
