//! # Winternitz One-Time Signature Plus (WOTS+)
//!
//! The one-time primitive underneath every XMSS leaf: an n-byte digest is
//! decomposed into base-w digits plus a checksum, and each digit selects
//! a position along an independent, domain-separated hash chain. Signing
//! reveals the chain value at the digit's position; verification continues
//! each chain to its endpoint and reproduces the public key without ever
//! seeing the private key.
//!
//! Chain starts are expanded on demand from `(sk_seed, Adrs)` and
//! discarded after use; nothing here is persisted. A keypair signs at
//! most one digest - reuse is the caller's catastrophic failure mode,
//! which the tree engines prevent by consuming each leaf index exactly
//! once.
//!
//! This module is not a standalone signature scheme; it exists to be
//! driven by the [`crate::xmss`] and [`crate::xmssmt`] engines.

use crate::adrs::{Adrs, AdrsType};
use crate::hash::XmssHasher;
use crate::params::{XmssParams, XMSS_LOG_W, XMSS_W};
use rayon::prelude::*;
use zeroize::Zeroize;

/// WOTS+ operations over one parameter set and public seed.
pub(crate) struct WotsPlus<'a> {
    params: &'a XmssParams,
    hasher: &'a XmssHasher,
    pub_seed: &'a [u8],
}

impl<'a> WotsPlus<'a> {
    pub fn new(params: &'a XmssParams, hasher: &'a XmssHasher, pub_seed: &'a [u8]) -> Self {
        Self {
            params,
            hasher,
            pub_seed,
        }
    }

    /// Derives the public key for the keypair addressed by `adrs`:
    /// every chain advanced from its secret start to the endpoint.
    ///
    /// The chains are independent of each other, so they are advanced in
    /// parallel; this is the hot path of leaf generation.
    pub fn pk_gen(&self, sk_seed: &[u8], adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let mut sk = self.expand_seed(sk_seed, adrs);
        let mut pk = vec![0u8; self.params.wots_sig_bytes()];

        pk.par_chunks_mut(n)
            .zip(sk.par_chunks(n))
            .enumerate()
            .for_each(|(i, (pk_chunk, sk_chunk))| {
                let mut chain_adrs = adrs;
                chain_adrs.set_chain_addr(i as u32);
                self.gen_chain(pk_chunk, sk_chunk, 0, XMSS_W - 1, chain_adrs);
            });

        sk.zeroize();
        pk
    }

    /// Signs an n-byte digest: chain `i` is advanced `digit_i` steps from
    /// its secret start, revealing exactly the value verification needs.
    pub fn sign(&self, digest: &[u8], sk_seed: &[u8], mut adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let lengths = self.chain_lengths(digest);
        let mut sk = self.expand_seed(sk_seed, adrs);
        let mut sig = vec![0u8; self.params.wots_sig_bytes()];

        for (i, &steps) in lengths.iter().enumerate() {
            adrs.set_chain_addr(i as u32);
            self.gen_chain(
                &mut sig[i * n..(i + 1) * n],
                &sk[i * n..(i + 1) * n],
                0,
                steps as usize,
                adrs,
            );
        }

        sk.zeroize();
        sig
    }

    /// Recovers the public key from a signature and the digest it claims
    /// to sign: chain `i` is advanced the remaining `w - 1 - digit_i`
    /// steps from the revealed value.
    pub fn pk_from_sig(&self, sig: &[u8], digest: &[u8], mut adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let lengths = self.chain_lengths(digest);
        let mut pk = vec![0u8; self.params.wots_sig_bytes()];

        for (i, &start) in lengths.iter().enumerate() {
            adrs.set_chain_addr(i as u32);
            self.gen_chain(
                &mut pk[i * n..(i + 1) * n],
                &sig[i * n..(i + 1) * n],
                start as usize,
                XMSS_W - 1 - start as usize,
                adrs,
            );
        }
        pk
    }

    /// Expands `sk_seed` into the `wots_len` secret chain starts for the
    /// keypair addressed by `adrs`. Callers zeroize the result.
    fn expand_seed(&self, sk_seed: &[u8], mut adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let mut sk = vec![0u8; self.params.wots_sig_bytes()];
        adrs.set_hash_addr(0);
        adrs.set_key_and_mask(0);
        for i in 0..self.params.wots_len() {
            adrs.set_chain_addr(i as u32);
            self.hasher
                .keygen_hash(&mut sk[i * n..(i + 1) * n], sk_seed, &adrs);
        }
        sk
    }

    /// Interprets `input` as the chain value at position `start` and
    /// applies `steps` chain-hash iterations, bumping the hash address at
    /// each position. Positions never run past the endpoint `w - 1`.
    fn gen_chain(&self, out: &mut [u8], input: &[u8], start: usize, steps: usize, mut adrs: Adrs) {
        let n = self.params.n();
        out.copy_from_slice(&input[..n]);

        for i in start..usize::min(start + steps, XMSS_W - 1) {
            adrs.set_hash_addr(i as u32);
            self.hasher.f(self.pub_seed, adrs, out);
        }
    }

    /// Converts bytes into base-w digits, most significant bits first.
    fn base_w(&self, out: &mut [u32], input: &[u8]) {
        let mut bits = 0;
        let mut total = 0u8;
        let mut input_index = 0;

        for digit in out.iter_mut() {
            if bits == 0 {
                total = input[input_index];
                input_index += 1;
                bits = 8;
            }
            bits -= XMSS_LOG_W;
            *digit = u32::from((total >> bits) & (XMSS_W - 1) as u8);
        }
    }

    /// Derives all `wots_len` chain positions for a digest: `len1`
    /// message digits followed by `len2` checksum digits.
    ///
    /// The checksum sums `w - 1 - digit` over the message digits, so any
    /// forged decrease of a message digit forces some checksum digit to
    /// increase - which would require walking a chain backwards.
    fn chain_lengths(&self, digest: &[u8]) -> Vec<u32> {
        let len1 = self.params.len1();
        let len2 = self.params.len2();
        let mut lengths = vec![0u32; self.params.wots_len()];
        self.base_w(&mut lengths[..len1], digest);

        let mut csum: u32 = lengths[..len1]
            .iter()
            .map(|&digit| (XMSS_W - 1) as u32 - digit)
            .sum();

        // Left-align the checksum so the empty low bits fall off when the
        // base-w digits are read most-significant-first.
        csum <<= (8 - (len2 * XMSS_LOG_W) % 8) % 8;
        let csum_bytes = (len2 * XMSS_LOG_W + 7) / 8;
        let packed = u64::from(csum).to_be_bytes();

        let (_, checksum_digits) = lengths.split_at_mut(len1);
        self.base_w(checksum_digits, &packed[8 - csum_bytes..]);
        lengths
    }
}
