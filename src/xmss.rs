//! Single-tree XMSS engine (RFC 8391 section 4.1.9).
//!
//! One Merkle tree of height `h` over `2^h` WOTS+ keypairs. Signing is
//! STATEFUL: every signature consumes one leaf, the private key's index
//! advances past it forever, and reusing an index destroys security. The
//! `&mut XmssSecretKey` borrow on [`Xmss::sign`] is the in-process
//! single-writer lock; persisting the updated key before releasing the
//! signature is the caller's durability contract.
//!
//! Verification is stateless and needs only the public key.

use crate::adrs::{Adrs, AdrsType};
use crate::error::{Error, Result};
use crate::hash::XmssHasher;
use crate::params::XmssParams;
use crate::tree::{root_from_sig, treehash};
use crate::utils::{ct_eq, get_be, set_be};
use crate::wots_plus::WotsPlus;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public verification key: `root ‖ pub_seed`, `2n` bytes on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmssPublicKey {
    pub(crate) root: Vec<u8>,
    pub(crate) pub_seed: Vec<u8>,
}

impl XmssPublicKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.root.len() + self.pub_seed.len());
        bytes.extend_from_slice(&self.root);
        bytes.extend_from_slice(&self.pub_seed);
        bytes
    }

    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        if bytes.len() != params.pk_bytes() {
            return Err(Error::BadLength(params.pk_bytes(), bytes.len()));
        }
        Ok(Self {
            root: bytes[..n].to_vec(),
            pub_seed: bytes[n..].to_vec(),
        })
    }
}

/// Private signing key: `idx ‖ sk_seed ‖ sk_prf ‖ pub_seed ‖ root` on the
/// wire. The index is the only mutable field; everything else is fixed at
/// key generation. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct XmssSecretKey {
    pub(crate) idx: u64,
    pub(crate) sk_seed: Vec<u8>,
    pub(crate) sk_prf: Vec<u8>,
    pub(crate) pub_seed: Vec<u8>,
    pub(crate) root: Vec<u8>,
}

impl XmssSecretKey {
    /// Index of the next unused one-time leaf.
    pub fn idx(&self) -> u64 {
        self.idx
    }

    pub fn to_bytes(&self, params: &XmssParams) -> Vec<u8> {
        let idx_bytes = params.idx_bytes();
        let mut bytes = vec![0u8; params.sk_bytes()];
        set_be(&mut bytes[..idx_bytes], self.idx);
        let n = params.n();
        bytes[idx_bytes..idx_bytes + n].copy_from_slice(&self.sk_seed);
        bytes[idx_bytes + n..idx_bytes + 2 * n].copy_from_slice(&self.sk_prf);
        bytes[idx_bytes + 2 * n..idx_bytes + 3 * n].copy_from_slice(&self.pub_seed);
        bytes[idx_bytes + 3 * n..].copy_from_slice(&self.root);
        bytes
    }

    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != params.sk_bytes() {
            return Err(Error::BadLength(params.sk_bytes(), bytes.len()));
        }
        let idx_bytes = params.idx_bytes();
        let n = params.n();
        Ok(Self {
            idx: get_be(&bytes[..idx_bytes]),
            sk_seed: bytes[idx_bytes..idx_bytes + n].to_vec(),
            sk_prf: bytes[idx_bytes + n..idx_bytes + 2 * n].to_vec(),
            pub_seed: bytes[idx_bytes + 2 * n..idx_bytes + 3 * n].to_vec(),
            root: bytes[idx_bytes + 3 * n..].to_vec(),
        })
    }
}

/// The single-tree signing and verifying engine.
pub struct Xmss {
    params: XmssParams,
    hasher: XmssHasher,
}

impl Xmss {
    /// Creates an engine for a single-tree parameter set.
    pub fn new(params: XmssParams) -> Result<Self> {
        if params.layers() != 1 {
            return Err(Error::InvalidParameters(
                "multi-tree parameter set; use XmssMt",
            ));
        }
        let hasher = XmssHasher::new(&params);
        Ok(Self { params, hasher })
    }

    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// Generates a fresh keypair from the operating system RNG. The full
    /// tree is hashed once here to obtain the root.
    pub fn keygen(&self) -> (XmssPublicKey, XmssSecretKey) {
        let n = self.params.n();
        let mut seed = vec![0u8; 3 * n];
        OsRng.fill_bytes(&mut seed);
        let keys = self.keygen_internal(&seed);
        seed.zeroize();
        keys
    }

    /// Deterministic key generation from `sk_seed ‖ sk_prf ‖ pub_seed`
    /// (`3n` bytes). The same seed always yields the same keypair.
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

        let (root, _) = treehash(
            &self.params,
            &self.hasher,
            &sk_seed,
            &pub_seed,
            0,
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

    /// Signs `msg`, consuming leaf `sk.idx` and advancing the index.
    /// Returns `idx ‖ r ‖ wots_sig ‖ auth ‖ msg`.
    ///
    /// A key yields `2^h - 1` signatures; the final leaf index is a
    /// terminal sentinel. Once reached the key fails closed with
    /// [`Error::KeyExhausted`] on every subsequent call.
    pub fn sign(&self, sk: &mut XmssSecretKey, msg: &[u8]) -> Result<Vec<u8>> {
        let n = self.params.n();
        let h = self.params.full_height();
        let idx = sk.idx;
        // The final index 2^h - 1 is a reserved terminal sentinel, never
        // signed with: it keeps the stored index inside its serialized
        // field, so an exhausted key round-trips through
        // to_bytes/from_bytes still exhausted. Single-tree sets cap h at
        // 32, so the shift cannot overflow.
        if idx >= (1u64 << h) - 1 {
            return Err(Error::KeyExhausted);
        }
        // The leaf is spent from this point on, whatever happens below.
        sk.idx += 1;

        let mut r = vec![0u8; n];
        self.hasher.prf_ctr(&mut r, &sk.sk_prf, idx);
        let mut digest = vec![0u8; n];
        self.hasher.h_msg(&mut digest, &r, &sk.root, idx, msg);

        let wots = WotsPlus::new(&self.params, &self.hasher, &sk.pub_seed);
        let mut ots_adrs = Adrs::new(AdrsType::OtsHash, 0, 0);
        ots_adrs.set_keypair_addr(idx as u32);
        let wots_sig = wots.sign(&digest, &sk.sk_seed, ots_adrs);

        let (_, auth) = treehash(
            &self.params,
            &self.hasher,
            &sk.sk_seed,
            &sk.pub_seed,
            0,
            0,
            Some(idx as u32),
        );
        let auth = auth.unwrap_or_default();

        let mut sig = vec![0u8; self.params.idx_bytes()];
        set_be(&mut sig, idx);
        sig.reserve(self.params.sig_bytes() - sig.len() + msg.len());
        sig.extend_from_slice(&r);
        sig.extend_from_slice(&wots_sig);
        sig.extend_from_slice(&auth);
        sig.extend_from_slice(msg);
        Ok(sig)
    }

    /// Verifies `sig` over `msg` against `pk`.
    ///
    /// `sig` must carry at least the `sig_bytes()` signature proper; an
    /// appended message copy is ignored. A too-short buffer is malformed
    /// input and surfaces as [`Error::BadLength`]; a well-formed signature
    /// that does not check out returns `Ok(false)`.
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
        let wots_end = idx_bytes + n + self.params.wots_sig_bytes();
        let wots_sig = &sig[idx_bytes + n..wots_end];
        let auth = &sig[wots_end..sig_bytes];

        let mut digest = vec![0u8; n];
        self.hasher.h_msg(&mut digest, r, &pk.root, idx, msg);

        let root = root_from_sig(
            &self.params,
            &self.hasher,
            &pk.pub_seed,
            0,
            0,
            idx as u32,
            wots_sig,
            auth,
            &digest,
        );
        Ok(ct_eq(&root, &pk.root))
    }
}
