//! Keyed, domain-separated hash primitives (RFC 8391 section 5.1).
//!
//! Everything here is a thin arrangement around one configured one-way
//! hash: a `pad_len`-byte big-endian domain word, then the key, then the
//! message parts. The four public functions are the only hash entry
//! points the rest of the crate uses:
//!
//! * [`XmssHasher::prf`] - pseudorandom derivation (randomizers, chain
//!   keys and bitmasks),
//! * [`XmssHasher::keygen_hash`] - address-bound expansion of the secret
//!   seed into WOTS+ chain starts,
//! * [`XmssHasher::f`] / [`XmssHasher::h`] - the chain step and the
//!   two-child node combination,
//! * [`XmssHasher::h_msg`] - the randomized message digest bound to the
//!   public root and leaf index.
//!
//! Identical inputs always produce identical outputs; there is no hidden
//! state beyond the parameter set.

use crate::adrs::Adrs;
use crate::params::{HashAlg, XmssParams};
use crate::utils::set_be;
use sha2::{Digest, Sha256, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

const DOM_F: u64 = 0;
const DOM_H: u64 = 1;
const DOM_H_MSG: u64 = 2;
const DOM_PRF: u64 = 3;
const DOM_KEYGEN: u64 = 4;

enum HashState {
    Sha256(Sha256),
    Sha512(Sha512),
    Shake128(Shake128),
    Shake256(Shake256),
}

impl HashState {
    fn new(alg: HashAlg) -> Self {
        match alg {
            HashAlg::Sha256 => Self::Sha256(Sha256::new()),
            HashAlg::Sha512 => Self::Sha512(Sha512::new()),
            HashAlg::Shake128 => Self::Shake128(Shake128::default()),
            HashAlg::Shake256 => Self::Shake256(Shake256::default()),
        }
    }

    fn absorb(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(state) => Digest::update(state, data),
            Self::Sha512(state) => Digest::update(state, data),
            Self::Shake128(state) => state.update(data),
            Self::Shake256(state) => state.update(data),
        }
    }

    fn finalize_into(self, out: &mut [u8]) {
        match self {
            Self::Sha256(state) => out.copy_from_slice(&state.finalize()[..out.len()]),
            Self::Sha512(state) => out.copy_from_slice(&state.finalize()[..out.len()]),
            Self::Shake128(state) => state.finalize_xof().read(out),
            Self::Shake256(state) => state.finalize_xof().read(out),
        }
    }
}

/// Keyed-hash frontend for one parameter set.
#[derive(Copy, Clone, Debug)]
pub(crate) struct XmssHasher {
    alg: HashAlg,
    n: usize,
    pad_len: usize,
}

impl XmssHasher {
    pub fn new(params: &XmssParams) -> Self {
        Self {
            alg: params.hash(),
            n: params.n(),
            pad_len: params.pad_len(),
        }
    }

    /// out = Hash(toByte(domain, pad_len) || parts...), truncated to n.
    fn keyed(&self, out: &mut [u8], domain: u64, parts: &[&[u8]]) {
        let mut pad = [0u8; 64];
        set_be(&mut pad[..self.pad_len], domain);

        let mut state = HashState::new(self.alg);
        state.absorb(&pad[..self.pad_len]);
        for part in parts {
            state.absorb(part);
        }
        state.finalize_into(&mut out[..self.n]);
    }

    /// PRF(key, m): pseudorandom n bytes from an n-byte key and a 32-byte
    /// counter or address encoding.
    pub fn prf(&self, out: &mut [u8], key: &[u8], m: &[u8; 32]) {
        self.keyed(out, DOM_PRF, &[key, m]);
    }

    /// PRF over a 64-bit counter, big-endian in 32 bytes.
    pub fn prf_ctr(&self, out: &mut [u8], key: &[u8], ctr: u64) {
        let mut m = [0u8; 32];
        set_be(&mut m, ctr);
        self.prf(out, key, &m);
    }

    /// Expands the secret seed into one WOTS+ chain start, bound to the
    /// chain's address so no two chains ever share key material.
    pub fn keygen_hash(&self, out: &mut [u8], sk_seed: &[u8], adrs: &Adrs) {
        self.keyed(out, DOM_KEYGEN, &[sk_seed, &adrs.to_bytes()]);
    }

    /// One chain step, in place: key and bitmask come from `prf` over the
    /// address with key-and-mask 0 and 1, the input is XOR-masked, then
    /// hashed under the F domain.
    pub fn f(&self, pub_seed: &[u8], adrs: Adrs, inout: &mut [u8]) {
        let mut key = [0u8; 64];
        let mut mask = [0u8; 64];
        let mut a = adrs;
        a.set_key_and_mask(0);
        self.prf(&mut key[..self.n], pub_seed, &a.to_bytes());
        a.set_key_and_mask(1);
        self.prf(&mut mask[..self.n], pub_seed, &a.to_bytes());

        for (m, x) in mask[..self.n].iter_mut().zip(inout.iter()) {
            *m ^= x;
        }
        self.keyed(inout, DOM_F, &[&key[..self.n], &mask[..self.n]]);
    }

    /// Two-child node combination for L-trees and Merkle trees, with one
    /// bitmask per child (key-and-mask 0, 1, 2).
    pub fn h(&self, out: &mut [u8], pub_seed: &[u8], adrs: Adrs, left: &[u8], right: &[u8]) {
        let n = self.n;
        let mut key = [0u8; 64];
        let mut masked = [0u8; 128];
        let mut a = adrs;
        a.set_key_and_mask(0);
        self.prf(&mut key[..n], pub_seed, &a.to_bytes());
        a.set_key_and_mask(1);
        self.prf(&mut masked[..n], pub_seed, &a.to_bytes());
        a.set_key_and_mask(2);
        self.prf(&mut masked[n..2 * n], pub_seed, &a.to_bytes());

        for (m, x) in masked[..n].iter_mut().zip(left.iter()) {
            *m ^= x;
        }
        for (m, x) in masked[n..2 * n].iter_mut().zip(right.iter()) {
            *m ^= x;
        }
        self.keyed(out, DOM_H, &[&key[..n], &masked[..2 * n]]);
    }

    /// Randomized message digest keyed by `r || root || toByte(idx, n)`.
    /// Binding the root and index defeats multi-target precomputation
    /// against the one-time signatures underneath.
    pub fn h_msg(&self, out: &mut [u8], r: &[u8], root: &[u8], idx: u64, msg: &[u8]) {
        let mut idx_n = [0u8; 64];
        set_be(&mut idx_n[..self.n], idx);
        self.keyed(out, DOM_H_MSG, &[r, root, &idx_n[..self.n], msg]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrs::AdrsType;
    use crate::params::XmssParams;

    fn hasher() -> XmssHasher {
        let params = XmssParams::from_name("XMSS-SHA2_10_256").unwrap();
        XmssHasher::new(&params)
    }

    #[test]
    fn test_prf_is_deterministic() {
        let hasher = hasher();
        let key = [7u8; 32];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        hasher.prf_ctr(&mut a, &key, 42);
        hasher.prf_ctr(&mut b, &key, 42);
        assert_eq!(a, b);

        hasher.prf_ctr(&mut b, &key, 43);
        assert_ne!(a, b);
    }

    #[test]
    fn test_addresses_separate_domains() {
        let hasher = hasher();
        let seed = [3u8; 32];
        let input = [9u8; 32];

        let mut adrs = Adrs::new(AdrsType::OtsHash, 0, 0);
        adrs.set_chain_addr(1);
        let mut x = input;
        hasher.f(&seed, adrs, &mut x);

        adrs.set_chain_addr(2);
        let mut y = input;
        hasher.f(&seed, adrs, &mut y);

        assert_ne!(x, y);
    }

    #[test]
    fn test_h_msg_binds_index_and_root() {
        let hasher = hasher();
        let r = [1u8; 32];
        let root = [2u8; 32];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];

        hasher.h_msg(&mut a, &r, &root, 0, b"message");
        hasher.h_msg(&mut b, &r, &root, 1, b"message");
        assert_ne!(a, b);

        hasher.h_msg(&mut b, &r, &[3u8; 32], 0, b"message");
        assert_ne!(a, b);
    }

    #[test]
    fn test_shake_backend_matches_width() {
        let params = XmssParams::from_name("XMSS-SHAKE_10_512").unwrap();
        let hasher = XmssHasher::new(&params);
        let mut out = [0u8; 64];
        hasher.prf_ctr(&mut out, &[5u8; 64], 1);
        assert_ne!(out, [0u8; 64]);
    }
}
