//! Multi-tree XMSS^MT engine (RFC 8391 section 4.2).
//!
//! A hypertree of `d` layers, each a height `h/d` Merkle tree. Layer 0
//! trees sign messages; every tree above signs the root of one tree
//! below it, so only the single top tree root is public. The `h`-bit
//! global index selects one layer-0 leaf; its low `h/d` bits pick the
//! leaf within each tree and the rest walk up the layers.
//!
//! The state contract is the same as single-tree XMSS: one leaf per
//! signature, index ever-increasing, persist before release. Subtree
//! roots are recomputed on every call rather than cached; correctness
//! over traversal speed.

use crate::adrs::{Adrs, AdrsType};
use crate::error::{Error, Result};
use crate::hash::XmssHasher;
use crate::params::XmssParams;
use crate::tree::{root_from_sig, treehash};
use crate::utils::{ct_eq, get_be, set_be};
use crate::wots_plus::WotsPlus;
use crate::xmss::{XmssPublicKey, XmssSecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

/// The multi-tree signing and verifying engine.
pub struct XmssMt {
    params: XmssParams,
    hasher: XmssHasher,
}

impl XmssMt {
    /// Creates an engine for a multi-tree parameter set.
    pub fn new(params: XmssParams) -> Result<Self> {
        if params.layers() < 2 {
            return Err(Error::InvalidParameters(
                "single-tree parameter set; use Xmss",
            ));
        }
        let hasher = XmssHasher::new(&params);
        Ok(Self { params, hasher })
    }

    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// Generates a fresh keypair. Only the top-layer tree is hashed; the
    /// lower layers exist implicitly through the seed.
    pub fn keygen(&self) -> (XmssPublicKey, XmssSecretKey) {
        let n = self.params.n();
        let mut seed = vec![0u8; 3 * n];
        OsRng.fill_bytes(&mut seed);
        let keys = self.keygen_internal(&seed);
        seed.zeroize();
        keys
    }

    /// Deterministic key generation from `sk_seed ‖ sk_prf ‖ pub_seed`.
    pub fn keygen_from_seed(&self, seed: &[u8]) -> Result<(XmssPublicKey, XmssSecretKey)> {
        if seed.len() != 3 * self.params.n() {
            return Err(Error::BadLength(3 * self.params.n(), seed.len()));
        }
        Ok(self.keygen_internal(seed))
    }

    fn keygen_internal(&self, seed: &[u8]) -> (XmssPublicKey, XmssSecretKey) {
        let n = self.params.n();
        let sk_seed = seed[..n].to_vec();
        let sk_prf = seed[n..2 * n].to_vec();
        let pub_seed = seed[2 * n..3 * n].to_vec();

        let top_layer = self.params.layers() - 1;
        let (root, _) = treehash(
            &self.params,
            &self.hasher,
            &sk_seed,
            &pub_seed,
            top_layer,
            0,
            None,
        );

        let pk = XmssPublicKey {
            root: root.clone(),
            pub_seed: pub_seed.clone(),
        };
        let sk = XmssSecretKey {
            idx: 0,
            sk_seed,
            sk_prf,
            pub_seed,
            root,
        };
        (pk, sk)
    }

    /// Signs `msg`, consuming global leaf `sk.idx`. Returns
    /// `idx ‖ r ‖ d × (wots_sig ‖ auth) ‖ msg`: one one-time signature
    /// and authentication path per layer, bottom-up.
    pub fn sign(&self, sk: &mut XmssSecretKey, msg: &[u8]) -> Result<Vec<u8>> {
        let n = self.params.n();
        let h = self.params.full_height();
        let idx = sk.idx;
        // The final index is a reserved terminal sentinel (2^h - 1, or
        // u64::MAX for h = 64 where 2^64 is unrepresentable): it keeps
        // the stored index inside its ceil(h/8)-byte field, so an
        // exhausted key round-trips through to_bytes/from_bytes still
        // exhausted.
        let last = if h == 64 { u64::MAX } else { (1u64 << h) - 1 };
        if idx >= last {
            return Err(Error::KeyExhausted);
        }
        sk.idx += 1;

        let mut r = vec![0u8; n];
        self.hasher.prf_ctr(&mut r, &sk.sk_prf, idx);

        // Layer 0 signs the message digest; each layer above signs the
        // root of the subtree that just signed.
        let mut target = vec![0u8; n];
        self.hasher.h_msg(&mut target, &r, &sk.root, idx, msg);

        let mut sig = vec![0u8; self.params.idx_bytes()];
        set_be(&mut sig, idx);
        sig.reserve(self.params.sig_bytes() - sig.len() + msg.len());
        sig.extend_from_slice(&r);

        let tree_height = self.params.tree_height();
        let wots = WotsPlus::new(&self.params, &self.hasher, &sk.pub_seed);
        let mut tree_idx = idx;
        for layer in 0..self.params.layers() {
            let leaf = (tree_idx & ((1u64 << tree_height) - 1)) as u32;
            tree_idx >>= tree_height;

            let mut ots_adrs = Adrs::new(AdrsType::OtsHash, layer, tree_idx);
            ots_adrs.set_keypair_addr(leaf);
            let wots_sig = wots.sign(&target, &sk.sk_seed, ots_adrs);

            let (subroot, auth) = treehash(
                &self.params,
                &self.hasher,
                &sk.sk_seed,
                &sk.pub_seed,
                layer,
                tree_idx,
                Some(leaf),
            );
            sig.extend_from_slice(&wots_sig);
            sig.extend_from_slice(&auth.unwrap_or_default());
            target = subroot;
        }

        sig.extend_from_slice(msg);
        Ok(sig)
    }

    /// Verifies `sig` over `msg` against `pk`, recovering one subtree
    /// root per layer and comparing the last against the public root.
    ///
    /// Same surface as the single-tree engine: a too-short buffer is
    /// [`Error::BadLength`], a failed check is `Ok(false)`.
    pub fn verify(&self, pk: &XmssPublicKey, msg: &[u8], sig: &[u8]) -> Result<bool> {
        let n = self.params.n();
        let sig_bytes = self.params.sig_bytes();
        if sig.len() < sig_bytes {
            return Err(Error::BadLength(sig_bytes, sig.len()));
        }

        let idx_bytes = self.params.idx_bytes();
        let idx = get_be(&sig[..idx_bytes]);
        let h = self.params.full_height();
        if h < 64 && idx >= 1u64 << h {
            return Ok(false);
        }
        let r = &sig[idx_bytes..idx_bytes + n];

        let mut target = vec![0u8; n];
        self.hasher.h_msg(&mut target, r, &pk.root, idx, msg);

        let tree_height = self.params.tree_height();
        let block = self.params.wots_sig_bytes() + tree_height as usize * n;
        let mut tree_idx = idx;
        for layer in 0..self.params.layers() {
            let leaf = (tree_idx & ((1u64 << tree_height) - 1)) as u32;
            tree_idx >>= tree_height;

            let offset = idx_bytes + n + layer as usize * block;
            let wots_sig = &sig[offset..offset + self.params.wots_sig_bytes()];
            let auth = &sig[offset + self.params.wots_sig_bytes()..offset + block];

            target = root_from_sig(
                &self.params,
                &self.hasher,
                &pk.pub_seed,
                layer,
                tree_idx,
                leaf,
                wots_sig,
                auth,
                &target,
            );
        }

        Ok(ct_eq(&target, &pk.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::HashAlg;

    // Small enough to exercise every layer boundary in test time:
    // four layers of height-2 trees, 256 leaves total, 1-byte index.
    fn small_engine() -> XmssMt {
        let params = XmssParams::new(HashAlg::Sha256, 32, 8, 4).unwrap();
        XmssMt::new(params).unwrap()
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let mt = small_engine();
        let (pk, mut sk) = mt.keygen();

        let sig = mt.sign(&mut sk, b"first message").unwrap();
        assert_eq!(sig.len(), mt.params().sig_bytes() + b"first message".len());
        assert!(mt.verify(&pk, b"first message", &sig).unwrap());
        assert!(!mt.verify(&pk, b"other message", &sig).unwrap());

        let sig = mt.sign(&mut sk, b"second message").unwrap();
        assert_eq!(sk.idx(), 2);
        assert!(mt.verify(&pk, b"second message", &sig).unwrap());
    }

    #[test]
    fn test_indices_cross_tree_boundaries() {
        let mt = small_engine();
        let (pk, mut sk) = mt.keygen();
        let tree_height = mt.params().tree_height() as u64;

        // Walk past a layer-0 tree boundary (every 2^(h/d) signatures)
        // and check the signature at each side of it.
        for i in 0..(1u64 << tree_height) + 2 {
            let msg = i.to_be_bytes();
            let sig = mt.sign(&mut sk, &msg).unwrap();
            assert_eq!(get_be(&sig[..mt.params().idx_bytes()]), i);
            assert!(mt.verify(&pk, &msg, &sig).unwrap());
        }
    }

    #[test]
    fn test_exhaustion_on_tiny_hypertree() {
        let params = XmssParams::new(HashAlg::Sha256, 32, 4, 2).unwrap();
        let mt = XmssMt::new(params).unwrap();
        let (pk, mut sk) = mt.keygen();

        // 2^4 - 1 usable leaves; the 16th index is the terminal sentinel.
        for i in 0..15u64 {
            let sig = mt.sign(&mut sk, &i.to_be_bytes()).unwrap();
            assert!(mt.verify(&pk, &i.to_be_bytes(), &sig).unwrap());
        }
        assert_eq!(mt.sign(&mut sk, b"spent"), Err(Error::KeyExhausted));
    }

    #[test]
    fn test_exhausted_key_never_wraps_through_serialization() {
        // h = 8 packs the index into a single byte; the terminal
        // sentinel 255 is the largest value that byte can hold. A
        // restored exhausted key must stay exhausted instead of signing
        // from leaf 0 again.
        let mt = small_engine();
        let params = *mt.params();
        let (_, mut sk) = mt.keygen();
        sk.idx = 255;

        assert_eq!(mt.sign(&mut sk, b"spent"), Err(Error::KeyExhausted));

        let mut restored = XmssSecretKey::from_bytes(&params, &sk.to_bytes(&params)).unwrap();
        assert_eq!(restored.idx(), 255);
        assert_eq!(mt.sign(&mut restored, b"reuse"), Err(Error::KeyExhausted));
    }

    #[test]
    fn test_tampered_layers_are_rejected() {
        let mt = small_engine();
        let (pk, mut sk) = mt.keygen();
        let msg = b"layered";
        let sig = mt.sign(&mut sk, msg).unwrap();

        let idx_bytes = mt.params().idx_bytes();
        let n = mt.params().n();
        let block = mt.params().wots_sig_bytes() + mt.params().tree_height() as usize * n;

        // One flip per layer block, plus the randomizer.
        for layer in 0..mt.params().layers() as usize {
            let mut bad = sig.clone();
            bad[idx_bytes + n + layer * block + 7] ^= 0x20;
            assert!(!mt.verify(&pk, msg, &bad).unwrap());
        }
        let mut bad = sig.clone();
        bad[idx_bytes] ^= 1;
        assert!(!mt.verify(&pk, msg, &bad).unwrap());
    }

    #[test]
    fn test_malformed_length_is_an_error() {
        let mt = small_engine();
        let (pk, mut sk) = mt.keygen();
        let sig = mt.sign(&mut sk, b"m").unwrap();
        let sig_bytes = mt.params().sig_bytes();

        assert_eq!(
            mt.verify(&pk, b"m", &sig[..sig_bytes - 10]),
            Err(Error::BadLength(sig_bytes, sig_bytes - 10))
        );
    }

    #[test]
    fn test_key_serialization_uses_narrow_index() {
        let mt = small_engine();
        let params = *mt.params();
        assert_eq!(params.idx_bytes(), 1);

        let (pk, mut sk) = mt.keygen();
        let _ = mt.sign(&mut sk, b"advance").unwrap();

        let restored = XmssSecretKey::from_bytes(&params, &sk.to_bytes(&params)).unwrap();
        assert_eq!(restored.idx(), 1);

        let mut restored = restored;
        let sig = mt.sign(&mut restored, b"resumed").unwrap();
        assert!(mt.verify(&pk, b"resumed", &sig).unwrap());
    }

    #[test]
    fn test_rejects_single_tree_parameters() {
        let params = XmssParams::from_name("XMSS-SHA2_10_256").unwrap();
        assert!(XmssMt::new(params).is_err());
    }

    #[test]
    fn test_keygen_from_seed_is_deterministic() {
        let mt = small_engine();
        let seed = [0x31u8; 96];
        let (pk1, _) = mt.keygen_from_seed(&seed).unwrap();
        let (pk2, _) = mt.keygen_from_seed(&seed).unwrap();
        assert_eq!(pk1, pk2);
    }
}
