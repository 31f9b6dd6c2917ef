//! Proptest generators for property-based testing.

use proptest::prelude::*;

use space_kernel_core::{AccountAddress, EventHash, SigningKeypair};
use space_kernel_events::{
    AcceptInvitationTransaction, CreateInvitationTransaction, CreateSpaceTransaction,
    DeleteSpaceTransaction, SpaceTransaction,
};
use space_kernel_keys::EncryptionSecretKey;

/// Generate a signing keypair. Rejects the rare invalid scalar.
pub fn signing_keypair() -> impl Strategy<Value = SigningKeypair> {
    any::<[u8; 32]>().prop_filter_map("valid secp256k1 scalar", |seed| {
        SigningKeypair::from_seed(&seed).ok()
    })
}

/// Generate an encryption secret key.
pub fn encryption_secret_key() -> impl Strategy<Value = EncryptionSecretKey> {
    any::<[u8; 32]>().prop_map(EncryptionSecretKey::from_bytes)
}

/// Generate an EventHash.
pub fn event_hash() -> impl Strategy<Value = EventHash> {
    any::<[u8; 32]>().prop_map(EventHash::from_bytes)
}

/// Generate an account address shaped like an EOA address.
pub fn account_address() -> impl Strategy<Value = AccountAddress> {
    any::<[u8; 20]>().prop_map(|bytes| AccountAddress::new(format!("0x{}", hex::encode(bytes))))
}

/// Generate a transaction id.
pub fn transaction_id() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,36}".prop_map(String::from)
}

/// Generate a transaction of any type.
pub fn space_transaction() -> impl Strategy<Value = SpaceTransaction> {
    prop_oneof![
        (transaction_id(), account_address()).prop_map(|(id, creator_account_address)| {
            SpaceTransaction::CreateSpace(CreateSpaceTransaction {
                id,
                creator_account_address,
            })
        }),
        (transaction_id(), event_hash()).prop_map(|(id, previous_event_hash)| {
            SpaceTransaction::DeleteSpace(DeleteSpaceTransaction {
                id,
                previous_event_hash,
            })
        }),
        (transaction_id(), account_address(), event_hash()).prop_map(
            |(id, invitee_account_address, previous_event_hash)| {
                SpaceTransaction::CreateInvitation(CreateInvitationTransaction {
                    id,
                    invitee_account_address,
                    previous_event_hash,
                })
            }
        ),
        (transaction_id(), event_hash()).prop_map(|(id, previous_event_hash)| {
            SpaceTransaction::AcceptInvitation(AcceptInvitationTransaction {
                id,
                previous_event_hash,
            })
        }),
    ]
}

/// Generate an arbitrary JSON value without floats.
pub fn json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        ".{0,12}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(".{0,8}", inner, 0..8)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_kernel_core::canonicalize;
    use space_kernel_keys::{decrypt_key_box, encrypt_key_box, DecryptKeyBoxParams, EncryptKeyBoxParams};

    proptest! {
        #[test]
        fn test_canonical_form_is_a_fixed_point(value in json_value()) {
            let canonical = canonicalize(&value).unwrap();
            let reparsed: serde_json::Value = serde_json::from_str(&canonical).unwrap();
            prop_assert_eq!(canonicalize(&reparsed).unwrap(), canonical);
        }

        #[test]
        fn test_transaction_signing_bytes_deterministic(tx in space_transaction()) {
            prop_assert_eq!(tx.signing_bytes().unwrap(), tx.clone().signing_bytes().unwrap());
        }

        #[test]
        fn test_transaction_survives_wire(tx in space_transaction()) {
            let json = serde_json::to_string(&tx).unwrap();
            let back: SpaceTransaction = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, tx);
        }

        #[test]
        fn test_signature_recovers_signer(keypair in signing_keypair(), message in payload(256)) {
            let signature = keypair.sign(&message).unwrap();
            prop_assert!(signature.recover(&message).unwrap() == keypair.public_key());
        }

        #[test]
        fn test_key_box_opens_for_recipient(
            author in encryption_secret_key(),
            recipient in encryption_secret_key(),
            nonce in any::<[u8; 24]>(),
            message in payload(128),
        ) {
            let ciphertext = encrypt_key_box(EncryptKeyBoxParams {
                message: &message,
                nonce: &nonce,
                public_key: &recipient.public_key(),
                secret_key: &author,
            })
            .unwrap();
            prop_assert_eq!(ciphertext.len(), message.len() + 16);

            let opened = decrypt_key_box(DecryptKeyBoxParams {
                ciphertext: &ciphertext,
                nonce: &nonce,
                public_key: &author.public_key(),
                secret_key: &recipient,
            })
            .unwrap();
            prop_assert_eq!(opened, message);
        }
    }
}
