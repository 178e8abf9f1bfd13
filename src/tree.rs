//! L-trees and Merkle tree traversal.
//!
//! Two tree shapes live here. The unbalanced L-tree compresses a
//! `wots_len`-node WOTS+ public key down to a single n-byte leaf. The
//! binary Merkle tree over those leaves produces the tree root and, while
//! it is being computed, the authentication path for one chosen leaf.
//!
//! [`treehash`] uses the classic bounded-stack traversal: leaves are
//! produced left to right and adjacent equal-height nodes are merged
//! immediately, so at most `tree_height + 1` nodes are ever held at once
//! no matter how many leaves the tree has.

use crate::adrs::{Adrs, AdrsType};
use crate::hash::XmssHasher;
use crate::params::XmssParams;
use crate::wots_plus::WotsPlus;

/// Compresses a WOTS+ public key (`wots_len` n-byte nodes, modified in
/// place) into the n-byte Merkle leaf written to `out`.
///
/// Odd nodes at each level are carried up unhashed, per RFC 8391
/// algorithm 9.
pub(crate) fn ltree(
    params: &XmssParams,
    hasher: &XmssHasher,
    pub_seed: &[u8],
    mut adrs: Adrs,
    wots_pk: &mut [u8],
    out: &mut [u8],
) {
    let n = params.n();
    let mut l = params.wots_len();
    let mut height = 0u32;
    let mut parent = vec![0u8; n];

    while l > 1 {
        adrs.set_tree_height(height);
        for i in 0..l / 2 {
            adrs.set_tree_index(i as u32);
            hasher.h(
                &mut parent,
                pub_seed,
                adrs,
                &wots_pk[2 * i * n..(2 * i + 1) * n],
                &wots_pk[(2 * i + 1) * n..(2 * i + 2) * n],
            );
            wots_pk[i * n..(i + 1) * n].copy_from_slice(&parent);
        }
        if l % 2 == 1 {
            wots_pk.copy_within((l - 1) * n..l * n, (l / 2) * n);
        }
        l = (l + 1) / 2;
        height += 1;
    }
    out.copy_from_slice(&wots_pk[..n]);
}

/// Computes the Merkle root of the subtree `(layer, tree)` by the
/// bounded-stack traversal, deriving every leaf from `sk_seed`.
///
/// When `target_leaf` is given, the authentication path for that leaf is
/// captured on the way: `tree_height` nodes, the sibling at each height
/// from the bottom up.
pub(crate) fn treehash(
    params: &XmssParams,
    hasher: &XmssHasher,
    sk_seed: &[u8],
    pub_seed: &[u8],
    layer: u32,
    tree: u64,
    target_leaf: Option<u32>,
) -> (Vec<u8>, Option<Vec<u8>>) {
    let n = params.n();
    let tree_height = params.tree_height() as usize;
    let mut auth = target_leaf.map(|_| vec![0u8; tree_height * n]);

    let record = |auth: &mut Option<Vec<u8>>, height: usize, index: u32, node: &[u8]| {
        if let (Some(auth), Some(target)) = (auth.as_mut(), target_leaf) {
            if height < tree_height && index == (target >> height) ^ 1 {
                auth[height * n..(height + 1) * n].copy_from_slice(node);
            }
        }
    };

    let wots = WotsPlus::new(params, hasher, pub_seed);
    let mut stack: Vec<(usize, Vec<u8>)> = Vec::with_capacity(tree_height + 1);
    let mut root = vec![0u8; n];

    for leaf in 0..1u64 << tree_height {
        let leaf = leaf as u32;
        let mut ots_adrs = Adrs::new(AdrsType::OtsHash, layer, tree);
        ots_adrs.set_keypair_addr(leaf);
        let mut wots_pk = wots.pk_gen(sk_seed, ots_adrs);

        let mut ltree_adrs = Adrs::new(AdrsType::Ltree, layer, tree);
        ltree_adrs.set_ltree_addr(leaf);
        let mut node = vec![0u8; n];
        ltree(params, hasher, pub_seed, ltree_adrs, &mut wots_pk, &mut node);

        let mut height = 0usize;
        let mut index = leaf;
        record(&mut auth, height, index, &node);

        // Merge with the stack top while heights match; the stack then
        // holds at most one node per height.
        while let Some((top_height, left)) = stack.pop() {
            if top_height != height {
                stack.push((top_height, left));
                break;
            }
            let mut merge_adrs = Adrs::new(AdrsType::HashTree, layer, tree);
            merge_adrs.set_tree_height(height as u32);
            merge_adrs.set_tree_index(index >> 1);

            let mut parent = vec![0u8; n];
            hasher.h(&mut parent, pub_seed, merge_adrs, &left, &node);
            node = parent;
            height += 1;
            index >>= 1;
            record(&mut auth, height, index, &node);
        }

        if height == tree_height {
            // The rightmost leaf cascades all the way up to the root.
            root.copy_from_slice(&node);
        } else {
            stack.push((height, node));
        }
    }

    (root, auth)
}

/// Reconstructs the subtree root implied by a WOTS+ signature and its
/// authentication path, for the digest the signature claims to cover.
///
/// A forged signature still yields a root, just not the right one; the
/// caller compares against the trusted value.
pub(crate) fn root_from_sig(
    params: &XmssParams,
    hasher: &XmssHasher,
    pub_seed: &[u8],
    layer: u32,
    tree: u64,
    leaf_idx: u32,
    wots_sig: &[u8],
    auth: &[u8],
    digest: &[u8],
) -> Vec<u8> {
    let n = params.n();
    let tree_height = params.tree_height() as usize;
    let wots = WotsPlus::new(params, hasher, pub_seed);

    let mut ots_adrs = Adrs::new(AdrsType::OtsHash, layer, tree);
    ots_adrs.set_keypair_addr(leaf_idx);
    let mut wots_pk = wots.pk_from_sig(wots_sig, digest, ots_adrs);

    let mut ltree_adrs = Adrs::new(AdrsType::Ltree, layer, tree);
    ltree_adrs.set_ltree_addr(leaf_idx);
    let mut node = vec![0u8; n];
    ltree(params, hasher, pub_seed, ltree_adrs, &mut wots_pk, &mut node);

    let mut parent = vec![0u8; n];
    for k in 0..tree_height {
        let mut merge_adrs = Adrs::new(AdrsType::HashTree, layer, tree);
        merge_adrs.set_tree_height(k as u32);
        merge_adrs.set_tree_index(leaf_idx >> (k + 1));

        let sibling = &auth[k * n..(k + 1) * n];
        if (leaf_idx >> k) & 1 == 0 {
            hasher.h(&mut parent, pub_seed, merge_adrs, &node, sibling);
        } else {
            hasher.h(&mut parent, pub_seed, merge_adrs, sibling, &node);
        }
        node.copy_from_slice(&parent);
    }
    node
}
