//! Integration tests for the FishVault crypto module.

use fishvault::crypto::{
    derive, generate_salt, open, seal, EncryptedBlob, KdfParams, SessionKey, KEY_LEN,
};
use fishvault::errors::VaultError;
use proptest::prelude::*;

/// Cheapest Argon2id parameters the validator accepts.
const FAST: KdfParams = KdfParams::Argon2id {
    memory_kib: 8192,
    iterations: 1,
    parallelism: 1,
};

fn fixed_key(byte: u8) -> SessionKey {
    SessionKey::new([byte; KEY_LEN])
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn same_password_and_salt_give_the_same_key() {
    let salt = generate_salt();
    let a = derive(b"correct horse", &salt, &FAST).unwrap();
    let b = derive(b"correct horse", &salt, &FAST).unwrap();

    // Keys are opaque; prove equality by opening across them.
    let blob = seal(&a, b"probe", None).unwrap();
    assert_eq!(open(&b, &blob, None).unwrap().as_slice(), b"probe");
}

#[test]
fn different_salts_give_different_keys() {
    let a = derive(b"correct horse", &generate_salt(), &FAST).unwrap();
    let b = derive(b"correct horse", &generate_salt(), &FAST).unwrap();

    let blob = seal(&a, b"probe", None).unwrap();
    assert!(matches!(
        open(&b, &blob, None),
        Err(VaultError::AuthenticationFailed)
    ));
}

#[test]
fn pbkdf2_is_deterministic_too() {
    let salt = generate_salt();
    let params = KdfParams::Pbkdf2Sha256 {
        iterations: 100_000,
    };
    let a = derive(b"pw-pbkdf2", &salt, &params).unwrap();
    let b = derive(b"pw-pbkdf2", &salt, &params).unwrap();

    let blob = seal(&a, b"probe", None).unwrap();
    assert!(open(&b, &blob, None).is_ok());
}

#[test]
fn derive_rejects_bad_inputs_before_hashing() {
    let salt = generate_salt();
    assert!(matches!(
        derive(b"", &salt, &FAST),
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        derive(b"pw", &salt[..16], &FAST),
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        derive(
            b"pw",
            &salt,
            &KdfParams::Argon2id {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1
            }
        ),
        Err(VaultError::KeyDerivation(_))
    ));
}

#[test]
fn salts_are_random() {
    assert_ne!(generate_salt(), generate_salt());
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

#[test]
fn wrong_key_fails_authentication() {
    let blob = seal(&fixed_key(1), b"secret", None).unwrap();
    assert!(matches!(
        open(&fixed_key(2), &blob, None),
        Err(VaultError::AuthenticationFailed)
    ));
}

#[test]
fn wrong_associated_data_fails_authentication() {
    let key = fixed_key(1);
    let blob = seal(&key, b"secret", Some(b"owner:alice")).unwrap();
    assert!(open(&key, &blob, Some(b"owner:alice")).is_ok());
    assert!(matches!(
        open(&key, &blob, Some(b"owner:bob")),
        Err(VaultError::AuthenticationFailed)
    ));
    assert!(matches!(
        open(&key, &blob, None),
        Err(VaultError::AuthenticationFailed)
    ));
}

#[test]
fn nonces_are_unique_across_many_seals() {
    let key = fixed_key(7);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..1_000 {
        let blob = seal(&key, b"same plaintext", None).unwrap();
        assert!(seen.insert(blob.nonce), "nonce reused");
    }
}

#[test]
fn empty_plaintext_roundtrips() {
    let key = fixed_key(3);
    let blob = seal(&key, b"", None).unwrap();
    assert!(blob.ciphertext.is_empty());
    assert!(open(&key, &blob, None).unwrap().is_empty());
}

#[test]
fn unknown_algorithm_is_a_format_error() {
    let key = fixed_key(3);
    let mut blob = seal(&key, b"x", None).unwrap();
    blob.alg = "XC20P".into();
    assert!(matches!(open(&key, &blob, None), Err(VaultError::Format(_))));
}

#[test]
fn truncated_tag_fails_authentication() {
    let key = fixed_key(3);
    let mut blob = seal(&key, b"x", None).unwrap();
    blob.tag.pop();
    assert!(matches!(
        open(&key, &blob, None),
        Err(VaultError::AuthenticationFailed)
    ));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn open_inverts_seal(plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
                         aad in proptest::collection::vec(any::<u8>(), 0..64)) {
        let key = fixed_key(0x42);
        let blob = seal(&key, &plaintext, Some(&aad)).unwrap();
        let opened = open(&key, &blob, Some(&aad)).unwrap();
        prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn any_flipped_bit_is_detected(plaintext in proptest::collection::vec(any::<u8>(), 1..256),
                                   bit in any::<u32>()) {
        let key = fixed_key(0x42);
        let blob = seal(&key, &plaintext, None).unwrap();

        // Flip one bit somewhere in nonce || ciphertext || tag.
        let total_bits = (blob.nonce.len() + blob.ciphertext.len() + blob.tag.len()) * 8;
        let bit = bit as usize % total_bits;
        let (byte, mask) = (bit / 8, 1u8 << (bit % 8));

        let mut tampered: EncryptedBlob = blob.clone();
        let nonce_len = tampered.nonce.len();
        let ct_len = tampered.ciphertext.len();
        if byte < nonce_len {
            tampered.nonce[byte] ^= mask;
        } else if byte < nonce_len + ct_len {
            tampered.ciphertext[byte - nonce_len] ^= mask;
        } else {
            tampered.tag[byte - nonce_len - ct_len] ^= mask;
        }

        prop_assert!(matches!(open(&key, &tampered, None), Err(VaultError::AuthenticationFailed)));
    }
}
