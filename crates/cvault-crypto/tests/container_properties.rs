//! Property tests for the encrypt/decrypt contract.
//!
//! Every case runs the full 100k-round KDF at least once, so case counts
//! are kept small.

use cvault_crypto::{decrypt, encrypt, Container, CryptoError, OVERHEAD};
use proptest::prelude::*;
use secrecy::SecretString;

fn passphrase() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 !-~]{8,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn roundtrip_restores_plaintext(
        data in proptest::collection::vec(any::<u8>(), 1..4096),
        pass in passphrase(),
    ) {
        let secret = SecretString::from(pass);
        let container = encrypt(&data, &secret).unwrap();

        prop_assert_eq!(container.len(), data.len() + OVERHEAD);
        prop_assert_eq!(decrypt(&container, &secret).unwrap(), data);
    }

    #[test]
    fn wrong_passphrase_is_rejected(
        data in proptest::collection::vec(any::<u8>(), 1..512),
        pass in passphrase(),
        other in passphrase(),
    ) {
        prop_assume!(pass != other);
        let container = encrypt(&data, &SecretString::from(pass)).unwrap();

        prop_assert_eq!(
            decrypt(&container, &SecretString::from(other)),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn any_single_bit_flip_is_detected(
        data in proptest::collection::vec(any::<u8>(), 1..256),
        pos in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let secret = SecretString::from("bit-flip-passphrase");
        let mut container = encrypt(&data, &secret).unwrap();
        let idx = pos.index(container.len());
        container[idx] ^= 1 << bit;

        prop_assert_eq!(decrypt(&container, &secret), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn short_blobs_are_malformed(blob in proptest::collection::vec(any::<u8>(), 0..OVERHEAD)) {
        let secret = SecretString::from("irrelevant-pass");
        let malformed = matches!(
            decrypt(&blob, &secret),
            Err(CryptoError::MalformedContainer { .. })
        );
        prop_assert!(malformed);
    }
}

#[test]
fn container_header_matches_encrypt_output() {
    let secret = SecretString::from("header-check");
    let blob = encrypt(b"inspect me", &secret).unwrap();
    let parsed = Container::parse(&blob).unwrap();

    assert_eq!(parsed.plaintext_len(), 10);
    assert_eq!(parsed.sealed(), &blob[28..]);
    assert_eq!(&parsed.salt()[..], &blob[..16]);
    assert_eq!(&parsed.nonce()[..], &blob[16..28]);
}

#[test]
fn concurrent_encryptions_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let secret = SecretString::from("shared-passphrase");
                encrypt(b"same file", &secret).unwrap()
            })
        })
        .collect();

    let containers: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let secret = SecretString::from("shared-passphrase");
    for (i, a) in containers.iter().enumerate() {
        assert_eq!(decrypt(a, &secret).unwrap(), b"same file");
        for b in &containers[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
