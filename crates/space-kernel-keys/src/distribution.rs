//! Space key distribution.
//!
//! The space secret key never travels in the clear. The creator self-boxes
//! it at space creation; an admin re-boxes it for each invitee when the
//! invitee accepts. Boxes ride alongside the events that admit members,
//! outside the event log itself.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use space_kernel_core::AccountAddress;

use crate::crypto::{EncryptionKeypair, EncryptionPublicKey, EncryptionSecretKey, SymmetricKey, KEY_LENGTH};
use crate::error::{KeysError, Result};
use crate::keybox::KeyBox;

/// A space's symmetric secret key with its key id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceKey {
    pub id: String,
    pub key: SymmetricKey,
}

/// A key box carrying a space key, tagged with the key id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceKeyBox {
    pub id: String,
    #[serde(flatten)]
    pub key_box: KeyBox,
}

/// Generate a fresh space key.
pub fn generate_space_key() -> SpaceKey {
    SpaceKey {
        id: Uuid::new_v4().to_string(),
        key: SymmetricKey::generate(),
    }
}

/// Seal the space key for its creator, to their own encryption keypair.
pub fn seal_space_key_for_creator(
    space_key: &SpaceKey,
    creator: &EncryptionKeypair,
    creator_address: AccountAddress,
) -> Result<SpaceKeyBox> {
    let key_box = KeyBox::seal(
        space_key.key.as_bytes(),
        &creator.secret,
        &creator.public,
        creator_address,
    )?;
    Ok(SpaceKeyBox {
        id: space_key.id.clone(),
        key_box,
    })
}

/// Re-seal the space key from an admin to an accepting invitee.
pub fn seal_space_key_for_invitee(
    space_key: &SpaceKey,
    admin: &EncryptionSecretKey,
    invitee_public: &EncryptionPublicKey,
    invitee_address: AccountAddress,
) -> Result<SpaceKeyBox> {
    let key_box = KeyBox::seal(space_key.key.as_bytes(), admin, invitee_public, invitee_address)?;
    tracing::debug!(key_id = %space_key.id, recipient = %key_box.recipient_account_address, "sealed space key");
    Ok(SpaceKeyBox {
        id: space_key.id.clone(),
        key_box,
    })
}

/// Open a space key box with the recipient's secret key.
///
/// Fails on wrong keys or corrupted boxes; never yields an empty key.
pub fn open_space_key(space_key_box: &SpaceKeyBox, recipient: &EncryptionSecretKey) -> Result<SpaceKey> {
    let bytes = space_key_box.key_box.open(recipient).map_err(|e| {
        tracing::warn!(key_id = %space_key_box.id, error = %e, "failed to open space key box");
        e
    })?;
    Ok(SpaceKey {
        id: space_key_box.id.clone(),
        key: SymmetricKey::from_bytes(secret_array(&bytes)?),
    })
}

pub(crate) fn secret_array(bytes: &[u8]) -> Result<[u8; KEY_LENGTH]> {
    bytes.try_into().map_err(|_| KeysError::InvalidSecretLength {
        expected: KEY_LENGTH,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyBoxError;

    #[test]
    fn test_creator_self_box() {
        let creator = EncryptionKeypair::generate();
        let space_key = generate_space_key();

        let sealed = seal_space_key_for_creator(&space_key, &creator, AccountAddress::new("0xa")).unwrap();
        assert_eq!(sealed.key_box.author_public_key, creator.public);

        let opened = open_space_key(&sealed, &creator.secret).unwrap();
        assert_eq!(opened, space_key);
    }

    #[test]
    fn test_invitee_receives_space_key() {
        let admin = EncryptionKeypair::generate();
        let invitee = EncryptionKeypair::generate();
        let space_key = generate_space_key();

        let sealed = seal_space_key_for_invitee(
            &space_key,
            &admin.secret,
            &invitee.public,
            AccountAddress::new("0xb"),
        )
        .unwrap();
        assert_eq!(sealed.key_box.recipient_account_address.as_str(), "0xb");

        let opened = open_space_key(&sealed, &invitee.secret).unwrap();
        assert_eq!(opened.key, space_key.key);
    }

    #[test]
    fn test_outsider_cannot_open() {
        let admin = EncryptionKeypair::generate();
        let invitee = EncryptionKeypair::generate();
        let outsider = EncryptionKeypair::generate();
        let space_key = generate_space_key();

        let sealed = seal_space_key_for_invitee(
            &space_key,
            &admin.secret,
            &invitee.public,
            AccountAddress::new("0xb"),
        )
        .unwrap();

        let result = open_space_key(&sealed, &outsider.secret);
        assert!(matches!(result, Err(KeysError::KeyBox(KeyBoxError::DecryptionFailed))));
    }

    #[test]
    fn test_space_key_box_wire_format() {
        let creator = EncryptionKeypair::generate();
        let space_key = generate_space_key();
        let sealed = seal_space_key_for_creator(&space_key, &creator, AccountAddress::new("0xa")).unwrap();

        let json = serde_json::to_value(&sealed).unwrap();
        assert_eq!(json["id"], space_key.id.as_str());
        assert_eq!(json["accountAddress"], "0xa");
        assert!(json["ciphertext"].is_string());
    }

    #[test]
    fn test_wrong_width_secret_rejected() {
        let owner = EncryptionKeypair::generate();
        let key_box = KeyBox::seal(b"short", &owner.secret, &owner.public, AccountAddress::new("0xa")).unwrap();
        let sealed = SpaceKeyBox {
            id: "k".into(),
            key_box,
        };

        assert!(matches!(
            open_space_key(&sealed, &owner.secret),
            Err(KeysError::InvalidSecretLength { expected: 32, actual: 5 })
        ));
    }
}
