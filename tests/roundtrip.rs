//! End-to-end round trips through the strategy registry, plus size and
//! tamper discipline.

use quantvault::{
    AeadCipher, Algorithm, ArenaMode, Cipher, CryptoError, GeneratedKey, IvSource, Kem,
    KeyAgreement, KeyGenerator, Mode, Registry, SecretContainer, SignatureScheme, StreamCipher,
};

fn registry() -> &'static Registry {
    Registry::global().unwrap()
}

fn symmetric_key(alg: Algorithm) -> std::sync::Arc<SecretContainer> {
    match registry().key_generator(alg).unwrap().generate().unwrap() {
        GeneratedKey::Symmetric(key) => key,
        GeneratedKey::KeyPair { .. } => panic!("expected symmetric key"),
    }
}

fn keypair(alg: Algorithm) -> (std::sync::Arc<SecretContainer>, std::sync::Arc<SecretContainer>) {
    match registry().key_generator(alg).unwrap().generate().unwrap() {
        GeneratedKey::KeyPair { public_key, private_key } => (public_key, private_key),
        GeneratedKey::Symmetric(_) => panic!("expected keypair"),
    }
}

// ---------------------------------------------------------------------------
// Seed scenarios
// ---------------------------------------------------------------------------

#[test]
fn aes_256_gcm_seed_scenario() {
    let mut cipher = registry().block_cipher(Algorithm::Aes256).unwrap().with_mode(Mode::Gcm);
    cipher.update_aad(b"hdr");
    let key = SecretContainer::new_from(&[0u8; 32]).unwrap();
    let plaintext = SecretContainer::new_from(b"Hello, AES!").unwrap();

    cipher.iv(IvSource::Bytes(vec![0u8; 12])).unwrap();
    let ciphertext = cipher.encrypt(&key, &plaintext, false).unwrap();
    // 11 plaintext bytes + 16 tag
    assert_eq!(ciphertext.byte_length(), 27);

    cipher.iv(IvSource::Bytes(vec![0u8; 12])).unwrap();
    let recovered = cipher.decrypt(&key, &ciphertext, false).unwrap();
    assert_eq!(recovered.export_to_heap().unwrap(), b"Hello, AES!");

    let mut tampered_bytes = ciphertext.export_to_heap().unwrap();
    tampered_bytes[5] ^= 0x01;
    let tampered = SecretContainer::new_from(&tampered_bytes).unwrap();
    cipher.iv(IvSource::Bytes(vec![0u8; 12])).unwrap();
    match cipher.decrypt(&key, &tampered, false) {
        Err(CryptoError::AuthenticationFailed { .. }) => {}
        other => panic!("expected authentication failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn chacha20_poly1305_seed_scenario() {
    let mut cipher = registry().aead_cipher(Algorithm::ChaCha20Poly1305).unwrap();
    let key = SecretContainer::new_from(&[0x01u8; 32]).unwrap();
    let plaintext = SecretContainer::new_from(&vec![0x42u8; 1024]).unwrap();

    let ciphertext = cipher.encrypt(&key, &plaintext, true).unwrap();
    // nonce 12 + body 1024 + tag 16
    assert_eq!(ciphertext.byte_length(), 1052);

    let recovered = cipher.decrypt(&key, &ciphertext, true).unwrap();
    assert!(recovered.ct_eq(&plaintext).unwrap());
}

#[test]
fn ml_kem_768_seed_scenario() {
    let (public_key, private_key) = keypair(Algorithm::MlKem768);
    assert_eq!(public_key.byte_length(), 1184);
    assert_eq!(private_key.byte_length(), 2400);

    let kem = registry().kem(Algorithm::MlKem768).unwrap();
    let encapsulated = kem.encapsulate(&public_key).unwrap();
    assert_eq!(encapsulated.byte_length(), 32);
    let ciphertext = encapsulated.child(0).unwrap().expect("ciphertext child");
    assert_eq!(ciphertext.byte_length(), 1088);

    let recovered = kem.decapsulate(&private_key, &ciphertext).unwrap();
    assert_eq!(recovered.byte_length(), 32);
    assert_eq!(
        hex::encode(recovered.export_to_heap().unwrap()),
        hex::encode(encapsulated.export_to_heap().unwrap())
    );
}

#[test]
fn ml_dsa_65_seed_scenario() {
    let (public_key, private_key) = keypair(Algorithm::MlDsa65);
    let scheme = registry().signature(Algorithm::MlDsa65).unwrap();

    let bundle = scheme.sign(&private_key, b"Quant").unwrap();
    assert_eq!(bundle.byte_length(), 3309);
    assert!(scheme.verify(&public_key, &bundle).unwrap());

    // A flipped signature bit reads as an invalid signature, not an error.
    {
        let mut view = bundle.segment_view().unwrap();
        view[1000] ^= 0x01;
    }
    assert!(!scheme.verify(&public_key, &bundle).unwrap());
}

// ---------------------------------------------------------------------------
// Symmetric round trips across modes (P6)
// ---------------------------------------------------------------------------

#[test]
fn block_cipher_all_modes_roundtrip() {
    let message = b"the quick brown fox jumps over thirteen lazy dogs";
    for alg in [
        Algorithm::Aes128,
        Algorithm::Aes192,
        Algorithm::Aes256,
        Algorithm::Aria128,
        Algorithm::Aria192,
        Algorithm::Aria256,
    ] {
        let key = symmetric_key(alg);
        let plaintext = SecretContainer::new_from(message).unwrap();
        for mode in [Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr, Mode::Gcm, Mode::Ccm] {
            let mut cipher = registry().block_cipher(alg).unwrap().with_mode(mode);
            let ciphertext = cipher.encrypt(&key, &plaintext, true).unwrap();
            let recovered = cipher.decrypt(&key, &ciphertext, true).unwrap();
            assert!(
                recovered.ct_eq(&plaintext).unwrap(),
                "{} {} round trip failed",
                alg.name(),
                mode
            );
        }
    }
}

#[test]
fn ecb_roundtrips_with_padding() {
    let key = symmetric_key(Algorithm::Aes128);
    let plaintext = SecretContainer::new_from(b"structure leaks here").unwrap();
    let mut cipher = registry().block_cipher(Algorithm::Aes128).unwrap().with_mode(Mode::Ecb);
    let ciphertext = cipher.encrypt(&key, &plaintext, false).unwrap();
    assert_eq!(ciphertext.byte_length(), 32);
    let recovered = cipher.decrypt(&key, &ciphertext, false).unwrap();
    assert!(recovered.ct_eq(&plaintext).unwrap());
}

#[test]
fn chacha20_container_roundtrip() {
    let key = symmetric_key(Algorithm::ChaCha20);
    let plaintext = SecretContainer::new_from(b"keystream, not a permutation").unwrap();
    let mut cipher = registry().stream_cipher(Algorithm::ChaCha20).unwrap();
    let ciphertext = cipher.encrypt(&key, &plaintext, true).unwrap();
    assert_eq!(ciphertext.byte_length(), 8 + plaintext.byte_length());
    let recovered = cipher.decrypt(&key, &ciphertext, true).unwrap();
    assert!(recovered.ct_eq(&plaintext).unwrap());
}

#[test]
fn chacha20_raw_streaming() {
    let key = symmetric_key(Algorithm::ChaCha20);
    let mut cipher = registry().stream_cipher(Algorithm::ChaCha20).unwrap();
    let input = [0xA5u8; 96];
    let mut encrypted = [0u8; 96];
    let mut decrypted = [0u8; 96];

    cipher.iv(IvSource::Bytes(vec![7u8; 8])).unwrap();
    let written = cipher.stream_encrypt(&key, &input, &mut encrypted).unwrap();
    assert_eq!(written, 96);
    assert_ne!(encrypted, input);

    cipher.iv(IvSource::Bytes(vec![7u8; 8])).unwrap();
    let written = cipher.stream_decrypt(&key, &encrypted, &mut decrypted).unwrap();
    assert_eq!(written, 96);
    assert_eq!(decrypted, input);
}

#[test]
fn iv_container_source_roundtrip() {
    let key = symmetric_key(Algorithm::Aes256);
    let plaintext = SecretContainer::new_from(b"iv from a sibling container").unwrap();
    let iv = SecretContainer::new_from_in(&[9u8; 16], ArenaMode::Shared).unwrap();

    let mut cipher = registry().block_cipher(Algorithm::Aes256).unwrap();
    cipher.iv(IvSource::Container(iv.clone())).unwrap();
    let ciphertext = cipher.encrypt(&key, &plaintext, false).unwrap();

    cipher.iv(IvSource::Container(iv)).unwrap();
    let recovered = cipher.decrypt(&key, &ciphertext, false).unwrap();
    assert!(recovered.ct_eq(&plaintext).unwrap());
}

// ---------------------------------------------------------------------------
// KEM and signatures across the families (P7, P8)
// ---------------------------------------------------------------------------

#[test]
fn kem_roundtrip_all_parameter_sets() {
    for alg in [Algorithm::MlKem512, Algorithm::MlKem768, Algorithm::MlKem1024] {
        let (public_key, private_key) = keypair(alg);
        let kem = registry().kem(alg).unwrap();
        let encapsulated = kem.encapsulate(&public_key).unwrap();
        let ciphertext = encapsulated.child(0).unwrap().expect("ciphertext child");
        assert_eq!(
            Some(ciphertext.byte_length()),
            alg.parameter_sizes().ciphertext,
            "{} ciphertext size",
            alg.name()
        );
        let recovered = kem.decapsulate(&private_key, &ciphertext).unwrap();
        assert!(recovered.ct_eq(&encapsulated).unwrap(), "{} secrets differ", alg.name());
    }
}

#[test]
fn signature_roundtrip_all_parameter_sets() {
    for alg in [Algorithm::MlDsa44, Algorithm::MlDsa65, Algorithm::MlDsa87] {
        let (public_key, private_key) = keypair(alg);
        let scheme = registry().signature(alg).unwrap();
        let bundle = scheme.sign(&private_key, b"entangled").unwrap();
        assert_eq!(Some(bundle.byte_length()), alg.parameter_sizes().signature);
        assert!(scheme.verify(&public_key, &bundle).unwrap(), "{} verify", alg.name());
    }
}

#[test]
fn signature_message_tamper_reads_false() {
    let (public_key, private_key) = keypair(Algorithm::MlDsa44);
    let scheme = registry().signature(Algorithm::MlDsa44).unwrap();
    let bundle = scheme.sign(&private_key, b"immutable message").unwrap();

    let message = bundle.child(0).unwrap().expect("message child");
    {
        let mut view = message.segment_view().unwrap();
        view[3] ^= 0x01;
    }
    assert!(!scheme.verify(&public_key, &bundle).unwrap());
}

#[test]
fn signature_bundle_without_message_is_malformed() {
    let (public_key, private_key) = keypair(Algorithm::MlDsa44);
    let scheme = registry().signature(Algorithm::MlDsa44).unwrap();
    let bundle = scheme.sign(&private_key, b"msg").unwrap();

    // Rebuild the root without its child: structurally broken.
    let orphan = SecretContainer::new_from(&bundle.export_to_heap().unwrap()).unwrap();
    match scheme.verify(&public_key, &orphan) {
        Err(CryptoError::AuthenticationFailed { .. }) => {}
        other => panic!("expected authentication failure, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// X25519 and the hybrid construction
// ---------------------------------------------------------------------------

#[test]
fn x25519_agreement_is_symmetric() {
    let (pk_a, sk_a) = keypair(Algorithm::X25519);
    let (pk_b, sk_b) = keypair(Algorithm::X25519);
    let ecdh = registry().key_agreement(Algorithm::X25519).unwrap();

    let ss_ab = ecdh.compute_shared(&sk_a, &pk_b).unwrap();
    let ss_ba = ecdh.compute_shared(&sk_b, &pk_a).unwrap();
    assert_eq!(ss_ab.byte_length(), 32);
    assert!(ss_ab.ct_eq(&ss_ba).unwrap());
}

#[test]
fn hybrid_kem_roundtrip() {
    let (public_key, private_key) = keypair(Algorithm::HybridX25519MlKem768);
    assert_eq!(public_key.byte_length(), 1216);
    assert_eq!(private_key.byte_length(), 2432);

    let kem = registry().kem(Algorithm::HybridX25519MlKem768).unwrap();
    let encapsulated = kem.encapsulate(&public_key).unwrap();
    assert_eq!(encapsulated.byte_length(), 32);

    let eph_pk = encapsulated.child(0).unwrap().expect("ephemeral public key");
    let kem_ct = encapsulated.child(1).unwrap().expect("ml-kem ciphertext");
    assert_eq!(eph_pk.byte_length(), 32);
    assert_eq!(kem_ct.byte_length(), 1088);

    // On the wire the two parts travel concatenated.
    let mut wire = eph_pk.export_to_heap().unwrap();
    wire.extend_from_slice(&kem_ct.export_to_heap().unwrap());
    let ciphertext = SecretContainer::new_from_owned(wire).unwrap();

    let recovered = kem.decapsulate(&private_key, &ciphertext).unwrap();
    assert!(recovered.ct_eq(&encapsulated).unwrap());
}

#[test]
fn hybrid_wrong_key_diverges() {
    let (public_key, _) = keypair(Algorithm::HybridX25519MlKem768);
    let (_, other_private) = keypair(Algorithm::HybridX25519MlKem768);

    let kem = registry().kem(Algorithm::HybridX25519MlKem768).unwrap();
    let encapsulated = kem.encapsulate(&public_key).unwrap();
    let mut wire = encapsulated.child(0).unwrap().unwrap().export_to_heap().unwrap();
    wire.extend_from_slice(&encapsulated.child(1).unwrap().unwrap().export_to_heap().unwrap());
    let ciphertext = SecretContainer::new_from_owned(wire).unwrap();

    let recovered = kem.decapsulate(&other_private, &ciphertext).unwrap();
    assert!(!recovered.ct_eq(&encapsulated).unwrap());
}

// ---------------------------------------------------------------------------
// Size validation (P5) and tamper detection (P9)
// ---------------------------------------------------------------------------

#[test]
fn wrong_key_size_is_a_size_mismatch() {
    let key = SecretContainer::new_from(&[0u8; 16]).unwrap();
    let plaintext = SecretContainer::new_from(b"data").unwrap();
    let mut cipher = registry().block_cipher(Algorithm::Aes256).unwrap();
    match cipher.encrypt(&key, &plaintext, true) {
        Err(CryptoError::SizeMismatch { expected: 32, actual: 16, .. }) => {}
        other => panic!("expected size mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn wrong_kem_input_sizes_are_rejected() {
    let kem = registry().kem(Algorithm::MlKem768).unwrap();
    let short_pk = SecretContainer::new_from(&vec![0u8; 800]).unwrap();
    assert!(matches!(
        kem.encapsulate(&short_pk),
        Err(CryptoError::SizeMismatch { expected: 1184, actual: 800, .. })
    ));

    let (_, private_key) = keypair(Algorithm::MlKem768);
    let short_ct = SecretContainer::new_from(&vec![0u8; 768]).unwrap();
    assert!(matches!(
        kem.decapsulate(&private_key, &short_ct),
        Err(CryptoError::SizeMismatch { expected: 1088, actual: 768, .. })
    ));
}

#[test]
fn wrong_signing_key_size_is_rejected() {
    let scheme = registry().signature(Algorithm::MlDsa87).unwrap();
    let short_sk = SecretContainer::new_from(&vec![0u8; 4032]).unwrap();
    assert!(matches!(
        scheme.sign(&short_sk, b"m"),
        Err(CryptoError::SizeMismatch { expected: 4896, actual: 4032, .. })
    ));
}

#[test]
fn aead_single_bit_flips_always_fail() {
    let key = symmetric_key(Algorithm::Aes256);
    let plaintext = SecretContainer::new_from(b"tamper evident payload").unwrap();
    let mut cipher = registry().block_cipher(Algorithm::Aes256).unwrap().with_mode(Mode::Gcm);
    let ciphertext = cipher.encrypt(&key, &plaintext, true).unwrap();
    let bytes = ciphertext.export_to_heap().unwrap();

    for index in [12, 13, bytes.len() / 2, bytes.len() - 1] {
        for bit in [0, 3, 7] {
            let mut tampered_bytes = bytes.clone();
            tampered_bytes[index] ^= 1 << bit;
            let tampered = SecretContainer::new_from(&tampered_bytes).unwrap();
            match cipher.decrypt(&key, &tampered, true) {
                Err(CryptoError::AuthenticationFailed { .. }) => {}
                other => panic!(
                    "byte {} bit {}: expected authentication failure, got {:?}",
                    index,
                    bit,
                    other.map(|_| ())
                ),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// IV discipline
// ---------------------------------------------------------------------------

#[test]
fn decrypt_never_infers_silently() {
    let key = symmetric_key(Algorithm::Aes128);
    let plaintext = SecretContainer::new_from(b"explicit beats implicit").unwrap();
    let mut cipher = registry().block_cipher(Algorithm::Aes128).unwrap();
    let ciphertext = cipher.encrypt(&key, &plaintext, true).unwrap();

    // infer_iv = false with nothing staged must refuse, even though the
    // ciphertext carries a chained IV.
    match cipher.decrypt(&key, &ciphertext, false) {
        Err(CryptoError::InvalidIv(_)) => {}
        other => panic!("expected invalid iv, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn wrong_iv_length_is_rejected_at_staging() {
    let mut cipher = registry().block_cipher(Algorithm::Aes128).unwrap().with_mode(Mode::Gcm);
    match cipher.iv(IvSource::Bytes(vec![0u8; 16])) {
        Err(CryptoError::InvalidIv(_)) => {}
        other => panic!("expected invalid iv, got {:?}", other),
    }
    match cipher.iv(IvSource::Generate(16)) {
        Err(CryptoError::InvalidIv(_)) => {}
        other => panic!("expected invalid iv, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Registry surface
// ---------------------------------------------------------------------------

#[test]
fn capability_mismatch_is_typed() {
    assert!(matches!(
        registry().kem(Algorithm::Aes128),
        Err(CryptoError::UnsupportedCapability { .. })
    ));
    assert!(matches!(
        registry().block_cipher(Algorithm::ChaCha20),
        Err(CryptoError::UnsupportedCapability { .. })
    ));
    assert!(matches!(
        registry().signature(Algorithm::X25519),
        Err(CryptoError::UnsupportedCapability { .. })
    ));
}

#[test]
fn slh_dsa_is_catalogued_but_not_registered() {
    for alg in [
        Algorithm::SlhDsaShake128s,
        Algorithm::SlhDsaShake128f,
        Algorithm::SlhDsaShake192s,
        Algorithm::SlhDsaShake192f,
        Algorithm::SlhDsaShake256s,
        Algorithm::SlhDsaShake256f,
    ] {
        assert!(alg.is_post_quantum());
        assert!(alg.parameter_sizes().signature.is_some());
        assert!(!registry().is_registered(alg));
    }
}

#[test]
fn asymmetric_padding_is_rejected_by_block_ciphers() {
    let cipher = registry().block_cipher(Algorithm::Aes128).unwrap();
    assert!(matches!(
        cipher.with_padding(quantvault::Padding::Pkcs1),
        Err(CryptoError::UnsupportedCapability { .. })
    ));
}
