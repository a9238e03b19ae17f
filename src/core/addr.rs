// Hex address codec: the dump carries addresses as `0x` + 12 lowercase hex digits.
use crate::core::error::{Error, ErrorKind};

pub const ADDRESS_LEN: usize = 14;

/// Decode a textual heap address.
///
/// Any text whose length is not exactly 14 decodes to zero with no error;
/// the dump omits addresses rather than writing a null marker, so absence
/// and truncation are both modeled as the zero address. Only a 14-character
/// token with a non-hex digit is an error.
pub fn decode_address(text: &str) -> Result<u64, Error> {
    if text.len() != ADDRESS_LEN {
        return Ok(0);
    }
    let digits = text.get(2..).ok_or_else(|| {
        Error::new(ErrorKind::Convert)
            .with_message("invalid hex address")
            .with_value(text)
    })?;
    u64::from_str_radix(digits, 16).map_err(|err| {
        Error::new(ErrorKind::Convert)
            .with_message("invalid hex address")
            .with_value(text)
            .with_source(err)
    })
}

/// Encode an address in the 14-character dump form, left-zero-padded.
///
/// Inverse of [`decode_address`] for every value that fits in 12 hex
/// digits; larger values widen past 14 characters and will decode to
/// zero, matching the dump's 48-bit address space.
pub fn encode_address(addr: u64) -> String {
    format!("0x{addr:012x}")
}

/// Decode a reference list element-wise. A failing element is handed to
/// `on_err` with its index and raw text, then skipped; the remaining
/// elements still decode.
pub fn decode_address_list<F>(texts: &[String], mut on_err: F) -> Vec<u64>
where
    F: FnMut(usize, &str, Error),
{
    let mut out = Vec::with_capacity(texts.len());
    for (index, text) in texts.iter().enumerate() {
        match decode_address(text) {
            Ok(addr) => out.push(addr),
            Err(err) => on_err(index, text, err),
        }
    }
    out
}

pub fn encode_address_list(addrs: &[u64]) -> Vec<String> {
    addrs.iter().map(|addr| encode_address(*addr)).collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_address, decode_address_list, encode_address, encode_address_list};

    #[test]
    fn round_trips_representable_addresses() {
        let cases = [0u64, 1, 0xabc1, 0xdead_beef, 0xffff_ffff_ffff];
        for addr in cases {
            let text = encode_address(addr);
            assert_eq!(text.len(), 14, "unexpected width for {addr:#x}");
            assert_eq!(decode_address(&text).unwrap(), addr);
        }
    }

    #[test]
    fn non_14_length_decodes_to_zero() {
        for text in ["", "0x1", "0x00000000abc", "0x00000000abc12", "junk"] {
            assert_eq!(decode_address(text).unwrap(), 0, "input: {text:?}");
        }
    }

    #[test]
    fn bad_hex_digit_is_an_error_naming_the_text() {
        let err = decode_address("0x00000000zzz1").unwrap_err();
        assert!(err.to_string().contains("0x00000000zzz1"));
    }

    #[test]
    fn list_decode_skips_bad_elements_and_continues() {
        let texts = vec![
            "0x00000000abc1".to_string(),
            "0x00000000zzz2".to_string(),
            "0x00000000abc3".to_string(),
        ];
        let mut failures = Vec::new();
        let addrs = decode_address_list(&texts, |index, text, _err| {
            failures.push((index, text.to_string()));
        });
        assert_eq!(addrs, vec![0xabc1, 0xabc3]);
        assert_eq!(failures, vec![(1, "0x00000000zzz2".to_string())]);
    }

    #[test]
    fn list_encode_is_total() {
        let texts = encode_address_list(&[0, 0xabc1]);
        assert_eq!(texts, vec!["0x000000000000", "0x00000000abc1"]);
    }
}
