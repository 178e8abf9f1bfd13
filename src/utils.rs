use subtle::ConstantTimeEq;

/// Writes `value` big-endian into the whole of `out` (RFC 8391 `toByte`).
/// Bytes above the 64-bit range are zero.
pub(crate) fn set_be(out: &mut [u8], value: u64) {
    let len = out.len();
    for (i, byte) in out.iter_mut().enumerate() {
        let shift = 8 * (len - 1 - i);
        *byte = if shift >= 64 {
            0
        } else {
            (value >> shift) as u8
        };
    }
}

/// Reads a big-endian unsigned integer of at most 8 bytes.
pub(crate) fn get_be(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Constant-time equality over byte slices.
/// Unequal lengths compare unequal without inspecting the contents.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_be_widths() {
        let mut buf = [0u8; 4];
        set_be(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);

        let mut wide = [0xffu8; 12];
        set_be(&mut wide, 0x0102_0304);
        assert_eq!(&wide[..8], &[0u8; 8]);
        assert_eq!(&wide[8..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_get_be_round_trip() {
        let mut buf = [0u8; 5];
        set_be(&mut buf, 0x1f_2233_4455);
        assert_eq!(get_be(&buf), 0x1f_2233_4455);
    }

    #[test]
    fn test_ct_eq() {
        assert!(ct_eq(b"abcd", b"abcd"));
        assert!(!ct_eq(b"abcd", b"abce"));
        assert!(!ct_eq(b"abcd", b"abc"));
        assert!(ct_eq(&[], &[]));
    }
}
