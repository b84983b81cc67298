// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Sensor datagram decoding.
//!
//! Two wire formats are understood:
//!
//! - a fixed little-endian binary record: `x: f32, y: f32, z: f32, ts: f64`
//!   (20 bytes, trailing bytes ignored), and
//! - a UTF-8 JSON object with named numeric fields: `{x, y, z, ts}` for
//!   positional trackers, `{offset_x, offset_y, offset_z}` for screen-space
//!   parallax trackers, and optionally `{pitch, yaw, roll}`.
//!
//! Decoding is stateless: one datagram in, one [`RawSample`] or
//! [`DecodeError`] out.

use crate::{error::DecodeError, math::Vec3};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size of the binary record: three `f32` and one `f64`.
pub const BINARY_RECORD_LEN: usize = 3 * std::mem::size_of::<f32>() + std::mem::size_of::<f64>();

/// Which wire format(s) the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    Binary,
    Json,
    /// JSON if the payload looks like an object, an error for other text,
    /// otherwise binary.
    Auto,
}

impl Default for WireFormat {
    fn default() -> Self {
        WireFormat::Auto
    }
}

/// Head orientation in degrees, as reported by rotation-capable trackers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// One decoded sensor report, in the sensor's own frame and units (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Sensor-frame position: x right, y down, z forward (away from the sensor).
    pub position: Vec3,
    /// Passed through untouched for hosts that want it; the projection only
    /// uses the position.
    pub orientation: Option<Orientation>,
    /// Sender clock, seconds since the Unix epoch.
    pub timestamp: Option<f64>,
}

impl RawSample {
    pub fn new(position: Vec3) -> RawSample {
        RawSample {
            position,
            orientation: None,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> RawSample {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sensor-frame depth (the z component).
    pub fn depth(&self) -> f64 {
        self.position.z
    }

    /// The sender timestamp as a calendar time, if present and representable.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp?;
        if !ts.is_finite() || ts < 0.0 {
            return None;
        }
        let secs = ts.trunc() as i64;
        let nanos = (ts.fract() * 1e9) as u32;
        Utc.timestamp_opt(secs, nanos).single()
    }

    /// Time between the sender stamping this sample and `now`.
    ///
    /// `None` without a timestamp or if the clocks disagree so much that the
    /// sample appears to come from the future.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        let sent = self.sent_at()?;
        now.signed_duration_since(sent).to_std().ok()
    }
}

/// The JSON payload: every field optional, the variant is inferred from
/// which ones are present.
#[derive(Debug, Default, Deserialize, Serialize)]
struct TextPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    yaw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    roll: Option<f64>,
}

fn check_finite(v: f64, field: &'static str) -> Result<f64, DecodeError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DecodeError::NonFinite(field))
    }
}

impl TextPayload {
    fn into_sample(self) -> Result<RawSample, DecodeError> {
        let position = match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Vec3::new(
                check_finite(x, "x")?,
                check_finite(y, "y")?,
                check_finite(z, "z")?,
            ),
            (None, None, None) => match (self.offset_x, self.offset_y) {
                (Some(ox), Some(oy)) => Vec3::new(
                    check_finite(ox, "offset_x")?,
                    check_finite(oy, "offset_y")?,
                    check_finite(self.offset_z.unwrap_or(0.0), "offset_z")?,
                ),
                _ => {
                    return Err(DecodeError::Malformed(
                        "no position fields in text payload".to_string(),
                    ))
                }
            },
            _ => {
                return Err(DecodeError::Malformed(
                    "incomplete x/y/z position in text payload".to_string(),
                ))
            }
        };
        let orientation = if self.pitch.is_some() || self.yaw.is_some() || self.roll.is_some() {
            Some(Orientation {
                pitch: check_finite(self.pitch.unwrap_or(0.0), "pitch")?,
                yaw: check_finite(self.yaw.unwrap_or(0.0), "yaw")?,
                roll: check_finite(self.roll.unwrap_or(0.0), "roll")?,
            })
        } else {
            None
        };
        Ok(RawSample {
            position,
            orientation,
            timestamp: self.ts,
        })
    }
}

/// Decode the binary record.
///
/// Only the first [`BINARY_RECORD_LEN`] bytes are read.
pub fn decode_binary(datagram: &[u8]) -> Result<RawSample, DecodeError> {
    if datagram.len() < BINARY_RECORD_LEN {
        return Err(DecodeError::NeedMoreData {
            needed: BINARY_RECORD_LEN,
            actual: datagram.len(),
        });
    }
    let mut buf = datagram;
    let x = buf.get_f32_le();
    let y = buf.get_f32_le();
    let z = buf.get_f32_le();
    let ts = buf.get_f64_le();
    let position = Vec3::new(
        check_finite(f64::from(x), "x")?,
        check_finite(f64::from(y), "y")?,
        check_finite(f64::from(z), "z")?,
    );
    Ok(RawSample {
        position,
        orientation: None,
        // A non-finite timestamp just means the sender did not stamp it.
        timestamp: Some(ts).filter(|t| t.is_finite()),
    })
}

/// Decode a UTF-8 JSON payload.
pub fn decode_json(datagram: &[u8]) -> Result<RawSample, DecodeError> {
    let text = std::str::from_utf8(datagram)?;
    let payload: TextPayload = serde_json::from_str(text.trim_end_matches('\0'))?;
    payload.into_sample()
}

fn looks_like_json(datagram: &[u8]) -> bool {
    datagram
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(false, |b| *b == b'{')
}

/// Valid UTF-8 with no control characters besides whitespace.
///
/// Any float in the binary record other than a handful of exotic values has
/// a zero, a high-bit or a control byte in it, so such a payload is text.
fn looks_like_text(datagram: &[u8]) -> bool {
    match std::str::from_utf8(datagram) {
        Ok(text) => text.chars().all(|c| !c.is_control() || c.is_whitespace()),
        Err(_) => false,
    }
}

/// Decode one datagram in the given wire format.
///
/// In [`WireFormat::Auto`], anything that starts like a JSON object is
/// decoded as JSON only, other text is rejected as malformed, and the rest is
/// read as the binary record.
pub fn decode(datagram: &[u8], format: WireFormat) -> Result<RawSample, DecodeError> {
    match format {
        WireFormat::Binary => decode_binary(datagram),
        WireFormat::Json => decode_json(datagram),
        WireFormat::Auto => {
            if looks_like_json(datagram) {
                decode_json(datagram)
            } else if !datagram.is_empty() && looks_like_text(datagram) {
                Err(DecodeError::Malformed(
                    "text payload is not a JSON object".to_string(),
                ))
            } else {
                decode_binary(datagram)
            }
        }
    }
}

/// Encode a sample as the binary record. A missing timestamp is sent as 0.
///
/// Positions are narrowed to `f32`, as the wire format demands.
pub fn encode_binary(sample: &RawSample) -> Bytes {
    let mut buf = BytesMut::with_capacity(BINARY_RECORD_LEN);
    buf.put_f32_le(sample.position.x as f32);
    buf.put_f32_le(sample.position.y as f32);
    buf.put_f32_le(sample.position.z as f32);
    buf.put_f64_le(sample.timestamp.unwrap_or(0.0));
    buf.freeze()
}

/// Encode a sample as a positional JSON payload.
pub fn encode_json(sample: &RawSample) -> Result<Bytes, DecodeError> {
    let payload = TextPayload {
        x: Some(sample.position.x),
        y: Some(sample.position.y),
        z: Some(sample.position.z),
        ts: sample.timestamp,
        pitch: sample.orientation.map(|o| o.pitch),
        yaw: sample.orientation.map(|o| o.yaw),
        roll: sample.orientation.map(|o| o.roll),
        ..Default::default()
    };
    let text = serde_json::to_vec(&payload)?;
    Ok(Bytes::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn binary_fixture() {
        // x = 1.0, y = -0.5, z = 2.0, ts = 1.0
        let data = hex!("0000803f 000000bf 00000040 000000000000f03f");
        let sample = decode_binary(&data[..]).unwrap();
        assert_eq!(sample.position, Vec3::new(1.0, -0.5, 2.0));
        assert_eq!(sample.timestamp, Some(1.0));
        assert_eq!(sample.orientation, None);
    }

    #[test]
    fn binary_trailing_bytes_ignored() {
        let data = hex!("0000803f 000000bf 00000040 000000000000f03f deadbeef");
        let sample = decode(&data[..], WireFormat::Binary).unwrap();
        assert_eq!(sample.position, Vec3::new(1.0, -0.5, 2.0));
    }

    #[test]
    fn binary_too_short() {
        let data = hex!("0000803f 000000bf 00000040");
        assert_eq!(
            decode_binary(&data[..]),
            Err(DecodeError::NeedMoreData {
                needed: 20,
                actual: 12
            })
        );
        assert!(decode(&[], WireFormat::Binary).is_err());
    }

    #[test]
    fn binary_nan_rejected() {
        let data = hex!("0000c07f 00000000 00000000 0000000000000000");
        assert_eq!(decode_binary(&data[..]), Err(DecodeError::NonFinite("x")));
    }

    #[test]
    fn json_positional() {
        let sample = decode_json(br#"{"x": 0.1, "y": -0.2, "z": 0.9, "ts": 1700000000.5}"#).unwrap();
        assert_eq!(sample.position, Vec3::new(0.1, -0.2, 0.9));
        assert_eq!(sample.timestamp, Some(1700000000.5));
    }

    #[test]
    fn json_parallax_offsets() {
        let sample = decode_json(br#"{"offset_x": 0.01, "offset_y": -0.02}"#).unwrap();
        assert_eq!(sample.position, Vec3::new(0.01, -0.02, 0.0));
        assert_eq!(sample.timestamp, None);
    }

    #[test]
    fn json_orientation_rides_along() {
        let sample =
            decode_json(br#"{"x": 0, "y": 0, "z": 1, "yaw": 12.5, "pitch": -3}"#).unwrap();
        assert_eq!(
            sample.orientation,
            Some(Orientation {
                pitch: -3.0,
                yaw: 12.5,
                roll: 0.0
            })
        );
    }

    #[test]
    fn json_rotation_only_is_malformed() {
        let err = decode_json(br#"{"pitch": 1, "yaw": 2, "roll": 3}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn json_garbage_is_malformed() {
        assert!(matches!(
            decode_json(b"{not json"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            decode_json(&[0xff, 0xfe, 0x7b]),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            decode_json(br#"{"x": 1, "y": 2}"#),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn auto_detects_both() {
        let json = br#"  {"x": 1, "y": 2, "z": 3}"#;
        assert_eq!(
            decode(json, WireFormat::Auto).unwrap().position,
            Vec3::new(1.0, 2.0, 3.0)
        );
        let bin = hex!("0000803f 000000bf 00000040 000000000000f03f");
        assert_eq!(
            decode(&bin[..], WireFormat::Auto).unwrap().position,
            Vec3::new(1.0, -0.5, 2.0)
        );
        assert!(decode(b"hello", WireFormat::Auto).is_err());
    }

    #[test]
    fn auto_never_reads_text_as_binary() {
        assert!(matches!(
            decode(b"hello world this is not a pose", WireFormat::Auto),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            decode(br#"{"x": "left", "y": "up", "z": "far"}"#, WireFormat::Auto),
            Err(DecodeError::Malformed(_))
        ));
        // A binary record whose first byte happens to be '{' is lost in auto
        // mode; it still decodes when the format is pinned.
        let brace = hex!("7b00803f 000000bf 00000040 000000000000f03f");
        assert!(decode(&brace[..], WireFormat::Auto).is_err());
        assert!(decode(&brace[..], WireFormat::Binary).is_ok());
    }

    #[test]
    fn json_encoder_matches_decoder() {
        let sample = RawSample::new(Vec3::new(0.25, -0.5, 1.5)).with_timestamp(42.0);
        let text = encode_json(&sample).unwrap();
        assert_eq!(decode_json(&text).unwrap(), sample);
    }

    #[test]
    fn sample_age() {
        let sample = RawSample::new(Vec3::new(0.0, 0.0, 1.0)).with_timestamp(1_000.0);
        let now = Utc.timestamp_opt(1_000, 250_000_000).single().unwrap();
        assert_eq!(sample.age(now), Some(Duration::from_millis(250)));
        let before = Utc.timestamp_opt(999, 0).single().unwrap();
        assert_eq!(sample.age(before), None);
        assert_eq!(RawSample::new(Vec3::new(0.0, 0.0, 1.0)).age(now), None);
    }

    proptest! {
        #[test]
        fn binary_floats_survive(
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            z in -100.0f32..100.0,
            ts in 0.0f64..2.0e9,
            extra in proptest::collection::vec(any::<u8>(), 0..16)
        ) {
            let mut datagram = BytesMut::new();
            datagram.put_f32_le(x);
            datagram.put_f32_le(y);
            datagram.put_f32_le(z);
            datagram.put_f64_le(ts);
            datagram.extend_from_slice(&extra);

            let sample = decode(&datagram, WireFormat::Binary).unwrap();
            let reencoded = encode_binary(&sample);
            prop_assert_eq!(&reencoded[..12], &datagram[..12]);
            prop_assert_eq!(sample.timestamp, Some(ts));
        }

        #[test]
        fn short_binary_always_rejected(data in proptest::collection::vec(any::<u8>(), 0..BINARY_RECORD_LEN)) {
            prop_assert!(decode(&data, WireFormat::Binary).is_err());
        }

        #[test]
        fn plain_text_rejected_in_auto(ref s in "[a-zA-Z0-9 ,.:\\-]{20,64}") {
            prop_assert!(decode(s.as_bytes(), WireFormat::Auto).is_err());
        }

        #[test]
        fn arbitrary_text_never_panics(ref s in "\\PC*") {
            let _ = decode(s.as_bytes(), WireFormat::Auto);
            let _ = decode(s.as_bytes(), WireFormat::Json);
        }
    }
}
