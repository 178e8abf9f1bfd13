//! # xmssmt
//!
//! XMSS and XMSS^MT stateful hash-based signatures (RFC 8391), built from
//! WOTS+ one-time signatures, L-trees and Merkle authentication paths.
//! Security rests only on the second-preimage resistance of the
//! underlying hash function, which makes the schemes a conservative
//! post-quantum choice for firmware signing and similar long-lived keys.
//!
//! ## Statefulness
//!
//! These are NOT drop-in signature schemes. The private key holds an
//! index that must advance with every signature; signing twice from the
//! same index forfeits security for the messages involved. The API
//! encodes this contract as an exclusive `&mut XmssSecretKey` borrow, and
//! callers are responsible for durably persisting the updated key
//! (`to_bytes`) before releasing a signature. When every index is spent
//! the key fails closed with [`Error::KeyExhausted`].
//!
//! ## Example
//!
//! ```
//! use xmssmt::{HashAlg, Xmss, XmssParams};
//!
//! # fn main() -> xmssmt::Result<()> {
//! // A toy height-4 tree; production sets live in the RFC tables,
//! // e.g. XmssParams::from_name("XMSS-SHA2_10_256").
//! let params = XmssParams::new(HashAlg::Sha256, 32, 4, 1)?;
//! let xmss = Xmss::new(params)?;
//!
//! let (pk, mut sk) = xmss.keygen();
//! let sig = xmss.sign(&mut sk, b"attest this")?;
//! assert!(xmss.verify(&pk, b"attest this", &sig)?);
//! # Ok(())
//! # }
//! ```

mod adrs;
mod error;
mod hash;
mod tree;
mod utils;
mod wots_plus;

pub mod params;
pub mod xmss;
pub mod xmssmt;

pub use error::{Error, Result};
pub use params::{HashAlg, XmssParams};
pub use xmss::{Xmss, XmssPublicKey, XmssSecretKey};
pub use xmssmt::XmssMt;
