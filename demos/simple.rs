use xmssmt::{Error, HashAlg, Xmss, XmssMt, XmssParams, XmssSecretKey};

fn main() -> xmssmt::Result<()> {
    // Pick a parameter set. The RFC 8391 sets are available by name or
    // OID; XMSS-SHA2_10_256 gives 2^10 - 1 = 1023 signatures per key
    // (the final leaf index is a terminal sentinel).
    let params = XmssParams::from_name("XMSS-SHA2_10_256")?;
    let xmss = Xmss::new(params)?;

    // Key generation hashes the whole tree once, so it is the slow part.
    let (pk, mut sk) = xmss.keygen();
    println!(
        "generated a keypair, {} signatures available",
        (1u64 << params.full_height()) - 1
    );

    // Sign. The secret key is borrowed mutably because every signature
    // consumes one leaf index, forever.
    let msg1 = "Hi! This is my first XMSS-signed message.".as_bytes();
    let sig1 = xmss.sign(&mut sk, msg1)?;
    println!("signed message 1 with leaf 0, next index is {}", sk.idx());

    // IMPORTANT: persist the updated key BEFORE releasing the signature.
    // If the process crashes after the signature leaves this machine but
    // before the new index hits disk, the old index could be reused,
    // which breaks the scheme's security entirely.
    let sk_bytes = sk.to_bytes(&params);

    // Anyone holding the public key can verify.
    assert!(xmss.verify(&pk, msg1, &sig1)?);
    println!("message 1 verifies");

    // A tampered message does not.
    assert!(!xmss.verify(&pk, b"Hi! This is a forged message.....!", &sig1)?);
    println!("forgery rejected");

    // Restore the key from its serialized state and keep signing; the
    // index picks up where it left off.
    let mut sk = XmssSecretKey::from_bytes(&params, &sk_bytes)?;
    let msg2 = "And this is my second message.".as_bytes();
    let sig2 = xmss.sign(&mut sk, msg2)?;
    assert!(xmss.verify(&pk, msg2, &sig2)?);
    println!("message 2 signed with leaf 1 and verified");

    // When the usable leaves are spent, signing fails closed with
    // KeyExhausted. Demonstrate on a toy tree with 2^2 = 4 leaves,
    // which yields 3 signatures.
    let tiny = XmssParams::new(HashAlg::Sha256, 32, 2, 1)?;
    let tiny_xmss = Xmss::new(tiny)?;
    let (_, mut tiny_sk) = tiny_xmss.keygen();
    for _ in 0..3 {
        tiny_xmss.sign(&mut tiny_sk, b"spend a leaf")?;
    }
    assert_eq!(
        tiny_xmss.sign(&mut tiny_sk, b"one too many"),
        Err(Error::KeyExhausted)
    );
    println!("toy key exhausted after 3 signatures, as expected");

    // The multi-tree variant trades larger signatures for vastly more
    // leaves and cheaper keygen: only the top tree is hashed up front.
    let mt_params = XmssParams::new(HashAlg::Sha256, 32, 8, 4)?;
    let mt = XmssMt::new(mt_params)?;
    let (mt_pk, mut mt_sk) = mt.keygen();
    let sig = mt.sign(&mut mt_sk, b"hypertree message")?;
    assert!(mt.verify(&mt_pk, b"hypertree message", &sig)?);
    println!("multi-tree sign/verify round trip done");

    Ok(())
}
