//! Parameter sets for XMSS and XMSS^MT.
//!
//! An [`XmssParams`] value carries everything the engines need: the hash
//! function, the security parameter `n`, the Winternitz digit counts, the
//! tree geometry, and the derived key/signature byte widths. Instances are
//! immutable and `Copy`; they are created once, either from the RFC 8391
//! OID/name tables or from [`XmssParams::new`] for non-standard trees, and
//! shared read-only by every operation.

use crate::error::{Error, Result};

/// Winternitz parameter. RFC 8391 defines all parameter sets with w = 16.
pub const XMSS_W: usize = 16;

/// log2 of the Winternitz parameter: bits consumed per base-w digit.
pub const XMSS_LOG_W: usize = 4;

/// The one-way hash function backing a parameter set.
///
/// Any deterministic, collision- and second-preimage-resistant function
/// with at least `n` output bytes would do; these four are the ones the
/// RFC 8391 tables name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HashAlg {
    Sha256,
    Sha512,
    Shake128,
    Shake256,
}

/// Immutable configuration shared by every operation of one key's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct XmssParams {
    hash: HashAlg,
    n: usize,
    len1: usize,
    len2: usize,
    full_height: u32,
    layers: u32,
    idx_bytes: usize,
    pad_len: usize,
}

impl XmssParams {
    /// Builds a parameter set from first principles.
    ///
    /// `n` is the hash output length in bytes, `full_height` the total
    /// tree height `h`, and `layers` the layer count `d`. The Winternitz
    /// digit counts are derived as
    /// `len1 = ceil(8n / lg(w))` and
    /// `len2 = floor(lg(len1 * (w - 1)) / lg(w)) + 1`,
    /// which gives the checksum enough range to detect any forged digit
    /// decrease.
    pub fn new(hash: HashAlg, n: usize, full_height: u32, layers: u32) -> Result<Self> {
        if n != 32 && n != 64 {
            return Err(Error::InvalidParameters("n must be 32 or 64 bytes"));
        }
        match hash {
            HashAlg::Sha256 if n != 32 => {
                return Err(Error::InvalidParameters("SHA-256 output is 32 bytes"));
            }
            HashAlg::Sha512 if n != 64 => {
                return Err(Error::InvalidParameters("SHA-512 output is 64 bytes"));
            }
            _ => {}
        }
        if full_height == 0 || full_height > 64 {
            return Err(Error::InvalidParameters("tree height must be in 1..=64"));
        }
        if layers == 0 || full_height % layers != 0 {
            return Err(Error::InvalidParameters(
                "tree height must be divisible by the layer count",
            ));
        }
        if full_height / layers > 32 {
            return Err(Error::InvalidParameters(
                "per-layer tree height must not exceed 32",
            ));
        }

        let len1 = (8 * n + XMSS_LOG_W - 1) / XMSS_LOG_W;
        // Number of base-w digits of the maximal checksum len1 * (w - 1).
        let mut len2 = 0;
        let mut csum = len1 * (XMSS_W - 1);
        while csum > 0 {
            csum >>= XMSS_LOG_W;
            len2 += 1;
        }

        // Single-tree signatures carry a fixed 32-bit index; multi-tree
        // signatures pack the h-bit global index into ceil(h / 8) bytes.
        let idx_bytes = if layers == 1 {
            4
        } else {
            (full_height as usize + 7) / 8
        };

        Ok(Self {
            hash,
            n,
            len1,
            len2,
            full_height,
            layers,
            idx_bytes,
            pad_len: n,
        })
    }

    /// Looks up a single-tree (XMSS) parameter set by its RFC 8391 OID.
    pub fn from_oid(oid: u32) -> Result<Self> {
        lookup(XMSS_SETS, |e| e.oid == oid)
            .ok_or_else(|| Error::UnknownParameterSet(format!("XMSS OID {oid:#010x}")))
    }

    /// Looks up a multi-tree (XMSS^MT) parameter set by its RFC 8391 OID.
    pub fn from_mt_oid(oid: u32) -> Result<Self> {
        lookup(XMSSMT_SETS, |e| e.oid == oid)
            .ok_or_else(|| Error::UnknownParameterSet(format!("XMSSMT OID {oid:#010x}")))
    }

    /// Looks up a parameter set of either scheme by its RFC 8391 name,
    /// e.g. `"XMSS-SHA2_10_256"` or `"XMSSMT-SHA2_40/4_256"`.
    pub fn from_name(name: &str) -> Result<Self> {
        lookup(XMSS_SETS, |e| e.name == name)
            .or_else(|| lookup(XMSSMT_SETS, |e| e.name == name))
            .ok_or_else(|| Error::UnknownParameterSet(name.to_owned()))
    }

    /// Hash function backing this parameter set.
    pub fn hash(&self) -> HashAlg {
        self.hash
    }

    /// Security parameter: hash output length in bytes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of base-w message digits.
    pub fn len1(&self) -> usize {
        self.len1
    }

    /// Number of base-w checksum digits.
    pub fn len2(&self) -> usize {
        self.len2
    }

    /// Total WOTS+ chain count `len1 + len2`.
    pub fn wots_len(&self) -> usize {
        self.len1 + self.len2
    }

    /// WOTS+ key and signature size: `wots_len * n`.
    pub fn wots_sig_bytes(&self) -> usize {
        self.wots_len() * self.n
    }

    /// Total tree height `h`; the key is good for `2^h` signatures.
    pub fn full_height(&self) -> u32 {
        self.full_height
    }

    /// Layer count `d` (1 for single-tree XMSS).
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Height `h / d` of each per-layer tree.
    pub fn tree_height(&self) -> u32 {
        self.full_height / self.layers
    }

    /// Width of the serialized leaf index.
    pub fn idx_bytes(&self) -> usize {
        self.idx_bytes
    }

    /// Length of the domain-separation prefix fed to the keyed hash.
    pub fn pad_len(&self) -> usize {
        self.pad_len
    }

    /// Detached signature size:
    /// `index ‖ randomizer ‖ d * (WOTS+ signature ‖ authentication path)`.
    pub fn sig_bytes(&self) -> usize {
        self.idx_bytes
            + self.n
            + self.layers as usize * (self.wots_sig_bytes() + self.tree_height() as usize * self.n)
    }

    /// Public key size: `root ‖ pub_seed`.
    pub fn pk_bytes(&self) -> usize {
        2 * self.n
    }

    /// Private key size: `index ‖ sk_seed ‖ sk_prf ‖ pub_seed ‖ root`.
    pub fn sk_bytes(&self) -> usize {
        self.idx_bytes + 4 * self.n
    }
}

struct ParamEntry {
    oid: u32,
    name: &'static str,
    hash: HashAlg,
    n: usize,
    full_height: u32,
    layers: u32,
}

fn lookup(table: &[ParamEntry], pred: impl Fn(&&ParamEntry) -> bool) -> Option<XmssParams> {
    table
        .iter()
        .find(pred)
        .and_then(|e| XmssParams::new(e.hash, e.n, e.full_height, e.layers).ok())
}

macro_rules! entry {
    ($oid:expr, $name:expr, $hash:ident, $n:expr, $h:expr, $d:expr) => {
        ParamEntry {
            oid: $oid,
            name: $name,
            hash: HashAlg::$hash,
            n: $n,
            full_height: $h,
            layers: $d,
        }
    };
}

/// RFC 8391 section 5.3: single-tree parameter sets.
const XMSS_SETS: &[ParamEntry] = &[
    entry!(0x0000_0001, "XMSS-SHA2_10_256", Sha256, 32, 10, 1),
    entry!(0x0000_0002, "XMSS-SHA2_16_256", Sha256, 32, 16, 1),
    entry!(0x0000_0003, "XMSS-SHA2_20_256", Sha256, 32, 20, 1),
    entry!(0x0000_0004, "XMSS-SHA2_10_512", Sha512, 64, 10, 1),
    entry!(0x0000_0005, "XMSS-SHA2_16_512", Sha512, 64, 16, 1),
    entry!(0x0000_0006, "XMSS-SHA2_20_512", Sha512, 64, 20, 1),
    entry!(0x0000_0007, "XMSS-SHAKE_10_256", Shake128, 32, 10, 1),
    entry!(0x0000_0008, "XMSS-SHAKE_16_256", Shake128, 32, 16, 1),
    entry!(0x0000_0009, "XMSS-SHAKE_20_256", Shake128, 32, 20, 1),
    entry!(0x0000_000a, "XMSS-SHAKE_10_512", Shake256, 64, 10, 1),
    entry!(0x0000_000b, "XMSS-SHAKE_16_512", Shake256, 64, 16, 1),
    entry!(0x0000_000c, "XMSS-SHAKE_20_512", Shake256, 64, 20, 1),
];

/// RFC 8391 section 5.4: multi-tree parameter sets.
const XMSSMT_SETS: &[ParamEntry] = &[
    entry!(0x0000_0001, "XMSSMT-SHA2_20/2_256", Sha256, 32, 20, 2),
    entry!(0x0000_0002, "XMSSMT-SHA2_20/4_256", Sha256, 32, 20, 4),
    entry!(0x0000_0003, "XMSSMT-SHA2_40/2_256", Sha256, 32, 40, 2),
    entry!(0x0000_0004, "XMSSMT-SHA2_40/4_256", Sha256, 32, 40, 4),
    entry!(0x0000_0005, "XMSSMT-SHA2_40/8_256", Sha256, 32, 40, 8),
    entry!(0x0000_0006, "XMSSMT-SHA2_60/3_256", Sha256, 32, 60, 3),
    entry!(0x0000_0007, "XMSSMT-SHA2_60/6_256", Sha256, 32, 60, 6),
    entry!(0x0000_0008, "XMSSMT-SHA2_60/12_256", Sha256, 32, 60, 12),
    entry!(0x0000_0009, "XMSSMT-SHA2_20/2_512", Sha512, 64, 20, 2),
    entry!(0x0000_000a, "XMSSMT-SHA2_20/4_512", Sha512, 64, 20, 4),
    entry!(0x0000_000b, "XMSSMT-SHA2_40/2_512", Sha512, 64, 40, 2),
    entry!(0x0000_000c, "XMSSMT-SHA2_40/4_512", Sha512, 64, 40, 4),
    entry!(0x0000_000d, "XMSSMT-SHA2_40/8_512", Sha512, 64, 40, 8),
    entry!(0x0000_000e, "XMSSMT-SHA2_60/3_512", Sha512, 64, 60, 3),
    entry!(0x0000_000f, "XMSSMT-SHA2_60/6_512", Sha512, 64, 60, 6),
    entry!(0x0000_0010, "XMSSMT-SHA2_60/12_512", Sha512, 64, 60, 12),
    entry!(0x0000_0011, "XMSSMT-SHAKE_20/2_256", Shake128, 32, 20, 2),
    entry!(0x0000_0012, "XMSSMT-SHAKE_20/4_256", Shake128, 32, 20, 4),
    entry!(0x0000_0013, "XMSSMT-SHAKE_40/2_256", Shake128, 32, 40, 2),
    entry!(0x0000_0014, "XMSSMT-SHAKE_40/4_256", Shake128, 32, 40, 4),
    entry!(0x0000_0015, "XMSSMT-SHAKE_40/8_256", Shake128, 32, 40, 8),
    entry!(0x0000_0016, "XMSSMT-SHAKE_60/3_256", Shake128, 32, 60, 3),
    entry!(0x0000_0017, "XMSSMT-SHAKE_60/6_256", Shake128, 32, 60, 6),
    entry!(0x0000_0018, "XMSSMT-SHAKE_60/12_256", Shake128, 32, 60, 12),
    entry!(0x0000_0019, "XMSSMT-SHAKE_20/2_512", Shake256, 64, 20, 2),
    entry!(0x0000_001a, "XMSSMT-SHAKE_20/4_512", Shake256, 64, 20, 4),
    entry!(0x0000_001b, "XMSSMT-SHAKE_40/2_512", Shake256, 64, 40, 2),
    entry!(0x0000_001c, "XMSSMT-SHAKE_40/4_512", Shake256, 64, 40, 4),
    entry!(0x0000_001d, "XMSSMT-SHAKE_40/8_512", Shake256, 64, 40, 8),
    entry!(0x0000_001e, "XMSSMT-SHAKE_60/3_512", Shake256, 64, 60, 3),
    entry!(0x0000_001f, "XMSSMT-SHAKE_60/6_512", Shake256, 64, 60, 6),
    entry!(0x0000_0020, "XMSSMT-SHAKE_60/12_512", Shake256, 64, 60, 12),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_lengths_sha2_10_256() {
        let p = XmssParams::from_name("XMSS-SHA2_10_256").unwrap();
        assert_eq!(p.n(), 32);
        assert_eq!(p.len1(), 64);
        assert_eq!(p.len2(), 3);
        assert_eq!(p.wots_len(), 67);
        assert_eq!(p.wots_sig_bytes(), 2144);
        assert_eq!(p.idx_bytes(), 4);
        // 4 + 32 + 67 * 32 + 10 * 32, the RFC 8391 signature size.
        assert_eq!(p.sig_bytes(), 2500);
        assert_eq!(p.pk_bytes(), 64);
        assert_eq!(p.sk_bytes(), 132);
    }

    #[test]
    fn test_derived_lengths_512_bit_sets() {
        let p = XmssParams::from_name("XMSS-SHA2_10_512").unwrap();
        assert_eq!(p.len1(), 128);
        assert_eq!(p.len2(), 3);
        assert_eq!(p.wots_len(), 131);
        assert_eq!(p.sig_bytes(), 4 + 64 + 131 * 64 + 10 * 64);
    }

    #[test]
    fn test_multi_tree_signature_width() {
        // RFC 8391: XMSSMT-SHA2_40/4_256 signatures are 9893 bytes.
        let p = XmssParams::from_name("XMSSMT-SHA2_40/4_256").unwrap();
        assert_eq!(p.idx_bytes(), 5);
        assert_eq!(p.tree_height(), 10);
        assert_eq!(
            p.sig_bytes(),
            p.idx_bytes() + p.n() + 4 * (p.wots_sig_bytes() + 10 * p.n())
        );
        assert_eq!(p.sig_bytes(), 9893);
    }

    #[test]
    fn test_oid_and_name_lookup_agree() {
        let by_oid = XmssParams::from_oid(3).unwrap();
        let by_name = XmssParams::from_name("XMSS-SHA2_20_256").unwrap();
        assert_eq!(by_oid, by_name);

        let mt_oid = XmssParams::from_mt_oid(0x14).unwrap();
        let mt_name = XmssParams::from_name("XMSSMT-SHAKE_40/4_256").unwrap();
        assert_eq!(mt_oid, mt_name);
    }

    #[test]
    fn test_unknown_sets_rejected() {
        assert!(matches!(
            XmssParams::from_oid(0xdead_beef),
            Err(Error::UnknownParameterSet(_))
        ));
        assert!(matches!(
            XmssParams::from_name("XMSS-MD5_10_128"),
            Err(Error::UnknownParameterSet(_))
        ));
    }

    #[test]
    fn test_invalid_custom_parameters() {
        // Height not divisible by the layer count.
        assert!(XmssParams::new(HashAlg::Sha256, 32, 10, 3).is_err());
        // SHA-256 cannot produce 64-byte outputs.
        assert!(XmssParams::new(HashAlg::Sha256, 64, 10, 1).is_err());
        // Per-layer height above 32 would overflow the leaf address word.
        assert!(XmssParams::new(HashAlg::Shake256, 64, 64, 1).is_err());
        // h == 64 itself is representable when split across layers.
        assert!(XmssParams::new(HashAlg::Shake256, 64, 64, 2).is_ok());
    }
}
