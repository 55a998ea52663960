//! Advertising payload construction.
//!
//! The payload is a run of length-prefixed AD structures
//! (`[len][type][data...]`, `len` counting type + data):
//!
//! ```text
//! [02][01][06]                 flags: LE general discoverable, no BR/EDR
//! [n+1][09][name bytes]        complete local name
//! [03][03][uuid16 LE]          complete list of 16-bit service UUIDs
//! ```
//!
//! It is built once at startup and re-used unchanged every time
//! advertising resumes.

use heapless::Vec;

use crate::error::Error;

/// Legacy advertising PDUs carry at most 31 bytes of AD data.
pub const ADV_MAX_LEN: usize = 31;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_COMPLETE_UUID16: u8 = 0x03;
const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// LE General Discoverable Mode | BR/EDR Not Supported.
const ADV_FLAGS: u8 = 0x06;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvPayload {
    bytes: Vec<u8, ADV_MAX_LEN>,
}

impl AdvPayload {
    /// Build the payload for `name` and a 16-bit service UUID given as
    /// four hex digits in canonical (big-endian) order, e.g. `"180F"`.
    pub fn build(name: &str, service_uuid: &str) -> Result<Self, Error> {
        let uuid = uuid16_le(service_uuid).ok_or(Error::AdvertisingPayload)?;

        let mut payload = Self { bytes: Vec::new() };
        payload.push_record(AD_TYPE_FLAGS, &[ADV_FLAGS])?;
        payload.push_record(AD_TYPE_COMPLETE_LOCAL_NAME, name.as_bytes())?;
        payload.push_record(AD_TYPE_COMPLETE_UUID16, &uuid)?;
        Ok(payload)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn push_record(&mut self, ad_type: u8, data: &[u8]) -> Result<(), Error> {
        let len = u8::try_from(data.len() + 1).map_err(|_| Error::AdvertisingPayload)?;
        self.bytes
            .push(len)
            .and_then(|()| self.bytes.push(ad_type))
            .map_err(|_| Error::AdvertisingPayload)?;
        self.bytes
            .extend_from_slice(data)
            .map_err(|()| Error::AdvertisingPayload)
    }
}

/// Parse `"AAAA"`-style hex and return the bytes little-endian.
fn uuid16_le(hex: &str) -> Option<[u8; 2]> {
    if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u16::from_str_radix(hex, 16).ok()?;
    Some(value.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk the AD structures, yielding `(type, data)`.
    fn records(data: &[u8]) -> std::vec::Vec<(u8, &[u8])> {
        let mut out = std::vec::Vec::new();
        let mut i = 0;
        while i < data.len() {
            let len = data[i] as usize;
            if len == 0 || i + len >= data.len() {
                break;
            }
            out.push((data[i + 1], &data[i + 2..i + 1 + len]));
            i += len + 1;
        }
        out
    }

    #[test]
    fn exact_layout_for_device_name() {
        let payload = AdvPayload::build("Dial Timer", "AAAA").unwrap();
        let mut expected = std::vec![0x02, 0x01, 0x06, 11, 0x09];
        expected.extend_from_slice(b"Dial Timer");
        expected.extend_from_slice(&[0x03, 0x03, 0xAA, 0xAA]);
        assert_eq!(payload.as_bytes(), expected.as_slice());
    }

    #[test]
    fn uuid_is_emitted_little_endian() {
        let payload = AdvPayload::build("T", "180F").unwrap();
        let recs = records(payload.as_bytes());
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[2], (AD_TYPE_COMPLETE_UUID16, &[0x0F, 0x18][..]));
    }

    #[test]
    fn lowercase_uuid_is_accepted() {
        let upper = AdvPayload::build("T", "ABCD").unwrap();
        let lower = AdvPayload::build("T", "abcd").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn malformed_uuid_is_rejected() {
        for uuid in ["", "AAA", "AAAAA", "GGGG", "+AAA"] {
            assert_eq!(
                AdvPayload::build("T", uuid),
                Err(Error::AdvertisingPayload),
                "{uuid}"
            );
        }
    }

    #[test]
    fn name_that_overflows_pdu_is_rejected() {
        // 3 (flags) + 2 + 22 (name) + 4 (uuid) = 31 bytes fits exactly.
        let fits = "N".repeat(22);
        assert_eq!(
            AdvPayload::build(&fits, "AAAA").unwrap().as_bytes().len(),
            ADV_MAX_LEN
        );

        let too_long = "N".repeat(23);
        assert_eq!(
            AdvPayload::build(&too_long, "AAAA"),
            Err(Error::AdvertisingPayload)
        );
    }
}
