//! Inboxes: public drop boxes for messages addressed to a space or account.
//!
//! An inbox has its own curve25519 keypair. The public half is published;
//! the secret half is sealed with the space key (space inboxes) or boxed
//! to the owner's encryption key (account inboxes). Senders seal each
//! message to the inbox public key with a one-time key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use space_kernel_core::wire::hex_bytes;
use space_kernel_core::{canonical_bytes, AccountAddress, RecoverableSignature, SigningKeypair};

use crate::crypto::{EncryptionPublicKey, EncryptionSecretKey};
use crate::distribution::{secret_array, SpaceKey};
use crate::error::{KeysError, Result};
use crate::keybox::{open_with_nonce, seal_with_nonce};

/// Who may post to an inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxAuthPolicy {
    /// Every message must be signed by its sender.
    RequiresAuth,
    /// Messages must not carry a sender.
    Anonymous,
    /// Either is accepted; a present signature must verify.
    OptionalAuth,
}

/// A published inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbox {
    pub inbox_id: String,
    pub encryption_public_key: EncryptionPublicKey,
    /// `nonce || ciphertext` of the inbox secret key.
    #[serde(with = "hex_bytes")]
    pub encrypted_secret_key: Vec<u8>,
    pub is_public: bool,
    pub auth_policy: InboxAuthPolicy,
}

/// Create a space inbox. The inbox secret is sealed with the space key.
///
/// Returns the inbox and its secret key for the creator's immediate use.
pub fn create_space_inbox(
    space_key: &SpaceKey,
    is_public: bool,
    auth_policy: InboxAuthPolicy,
) -> Result<(Inbox, EncryptionSecretKey)> {
    let secret = EncryptionSecretKey::generate();
    let encrypted_secret_key = space_key.key.seal(&secret.to_bytes())?;

    let inbox = Inbox {
        inbox_id: Uuid::new_v4().to_string(),
        encryption_public_key: secret.public_key(),
        encrypted_secret_key,
        is_public,
        auth_policy,
    };
    Ok((inbox, secret))
}

/// Create an account inbox. The inbox secret is boxed to the owner.
pub fn create_account_inbox(
    owner: &EncryptionSecretKey,
    is_public: bool,
    auth_policy: InboxAuthPolicy,
) -> Result<(Inbox, EncryptionSecretKey)> {
    let secret = EncryptionSecretKey::generate();
    let encrypted_secret_key = seal_with_nonce(&secret.to_bytes(), owner, &owner.public_key())?;

    let inbox = Inbox {
        inbox_id: Uuid::new_v4().to_string(),
        encryption_public_key: secret.public_key(),
        encrypted_secret_key,
        is_public,
        auth_policy,
    };
    Ok((inbox, secret))
}

/// Recover a space inbox's secret key with the space key.
pub fn open_space_inbox_secret(inbox: &Inbox, space_key: &SpaceKey) -> Result<EncryptionSecretKey> {
    let bytes = space_key.key.open(&inbox.encrypted_secret_key)?;
    checked_inbox_secret(inbox, &bytes)
}

/// Recover an account inbox's secret key with the owner's secret key.
pub fn open_account_inbox_secret(inbox: &Inbox, owner: &EncryptionSecretKey) -> Result<EncryptionSecretKey> {
    let bytes = open_with_nonce(&inbox.encrypted_secret_key, &owner.public_key(), owner)?;
    checked_inbox_secret(inbox, &bytes)
}

fn checked_inbox_secret(inbox: &Inbox, bytes: &[u8]) -> Result<EncryptionSecretKey> {
    let secret = EncryptionSecretKey::from_bytes(secret_array(bytes)?);
    if secret.public_key() != inbox.encryption_public_key {
        return Err(KeysError::InboxKeyMismatch(inbox.inbox_id.clone()));
    }
    Ok(secret)
}

/// The sender of an authenticated inbox message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxMessageAuthor {
    pub account_address: AccountAddress,
    pub signature: RecoverableSignature,
}

/// A message sealed to an inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxMessage {
    /// One-time public key of the sender.
    pub ephemeral_public_key: EncryptionPublicKey,
    /// `nonce || ciphertext`.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<InboxMessageAuthor>,
}

/// The part of a message an authenticated sender signs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedInboxPayload<'a> {
    inbox_id: &'a str,
    ephemeral_public_key: &'a EncryptionPublicKey,
    #[serde(with = "hex_bytes")]
    ciphertext: &'a [u8],
}

impl InboxMessage {
    fn signing_bytes(&self, inbox_id: &str) -> Result<Vec<u8>> {
        Ok(canonical_bytes(&SignedInboxPayload {
            inbox_id,
            ephemeral_public_key: &self.ephemeral_public_key,
            ciphertext: &self.ciphertext,
        })?)
    }
}

/// Seal `plaintext` to an inbox, signing it when a sender is given.
///
/// The sender must be given for `requires_auth` inboxes and must not be
/// given for `anonymous` ones.
pub fn seal_inbox_message(
    inbox: &Inbox,
    plaintext: &[u8],
    sender: Option<(&AccountAddress, &SigningKeypair)>,
) -> Result<InboxMessage> {
    match (inbox.auth_policy, sender.is_some()) {
        (InboxAuthPolicy::RequiresAuth, false) => return Err(KeysError::AuthRequired),
        (InboxAuthPolicy::Anonymous, true) => return Err(KeysError::UnexpectedAuth),
        _ => {}
    }

    let ephemeral = EncryptionSecretKey::generate();
    let ciphertext = seal_with_nonce(plaintext, &ephemeral, &inbox.encryption_public_key)?;

    let mut message = InboxMessage {
        ephemeral_public_key: ephemeral.public_key(),
        ciphertext,
        author: None,
    };

    if let Some((account_address, signing_key)) = sender {
        let signature = signing_key.sign(&message.signing_bytes(&inbox.inbox_id)?)?;
        message.author = Some(InboxMessageAuthor {
            account_address: account_address.clone(),
            signature,
        });
    }

    Ok(message)
}

/// Check a received message against the inbox's auth policy.
///
/// Returns the verified sender, if any. A present signature must recover
/// a key whose account address is the claimed sender.
pub fn check_auth_policy(inbox: &Inbox, message: &InboxMessage) -> Result<Option<AccountAddress>> {
    match (inbox.auth_policy, &message.author) {
        (InboxAuthPolicy::RequiresAuth, None) => Err(KeysError::AuthRequired),
        (InboxAuthPolicy::Anonymous, Some(_)) => Err(KeysError::UnexpectedAuth),
        (_, None) => Ok(None),
        (_, Some(author)) => {
            let signing_bytes = message.signing_bytes(&inbox.inbox_id)?;
            let recovered = author
                .signature
                .recover(&signing_bytes)
                .and_then(|key| key.to_account_address())
                .map_err(|_| KeysError::InvalidMessageSignature(author.account_address.clone()))?;

            if !recovered.as_str().eq_ignore_ascii_case(author.account_address.as_str()) {
                return Err(KeysError::InvalidMessageSignature(author.account_address.clone()));
            }
            Ok(Some(author.account_address.clone()))
        }
    }
}

/// Open a message with the inbox secret key.
pub fn open_inbox_message(message: &InboxMessage, inbox_secret: &EncryptionSecretKey) -> Result<Vec<u8>> {
    Ok(open_with_nonce(
        &message.ciphertext,
        &message.ephemeral_public_key,
        inbox_secret,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionKeypair;
    use crate::distribution::generate_space_key;
    use crate::error::KeyBoxError;

    #[test]
    fn test_space_inbox_secret_roundtrip() {
        let space_key = generate_space_key();
        let (inbox, secret) = create_space_inbox(&space_key, true, InboxAuthPolicy::OptionalAuth).unwrap();

        let opened = open_space_inbox_secret(&inbox, &space_key).unwrap();
        assert_eq!(opened.public_key(), secret.public_key());
        assert_eq!(opened.public_key(), inbox.encryption_public_key);
    }

    #[test]
    fn test_space_inbox_wrong_space_key_fails() {
        let (inbox, _) = create_space_inbox(&generate_space_key(), false, InboxAuthPolicy::RequiresAuth).unwrap();
        let result = open_space_inbox_secret(&inbox, &generate_space_key());
        assert!(matches!(result, Err(KeysError::KeyBox(KeyBoxError::DecryptionFailed))));
    }

    #[test]
    fn test_account_inbox_secret_roundtrip() {
        let owner = EncryptionKeypair::generate();
        let (inbox, secret) = create_account_inbox(&owner.secret, false, InboxAuthPolicy::Anonymous).unwrap();

        let opened = open_account_inbox_secret(&inbox, &owner.secret).unwrap();
        assert_eq!(opened.public_key(), secret.public_key());

        let stranger = EncryptionKeypair::generate();
        assert!(open_account_inbox_secret(&inbox, &stranger.secret).is_err());
    }

    #[test]
    fn test_swapped_secret_detected() {
        let space_key = generate_space_key();
        let (mut inbox, _) = create_space_inbox(&space_key, true, InboxAuthPolicy::Anonymous).unwrap();
        let (other, _) = create_space_inbox(&space_key, true, InboxAuthPolicy::Anonymous).unwrap();
        inbox.encrypted_secret_key = other.encrypted_secret_key;

        assert!(matches!(
            open_space_inbox_secret(&inbox, &space_key),
            Err(KeysError::InboxKeyMismatch(_))
        ));
    }

    #[test]
    fn test_anonymous_message_roundtrip() {
        let space_key = generate_space_key();
        let (inbox, secret) = create_space_inbox(&space_key, true, InboxAuthPolicy::Anonymous).unwrap();

        let message = seal_inbox_message(&inbox, b"hello inbox", None).unwrap();
        assert_eq!(check_auth_policy(&inbox, &message).unwrap(), None);
        assert_eq!(open_inbox_message(&message, &secret).unwrap(), b"hello inbox");
    }

    #[test]
    fn test_authenticated_message() {
        let owner = EncryptionKeypair::generate();
        let (inbox, secret) = create_account_inbox(&owner.secret, true, InboxAuthPolicy::RequiresAuth).unwrap();

        let sender = SigningKeypair::from_seed(&[0x21; 32]).unwrap();
        let address = sender.account_address().unwrap();
        let message = seal_inbox_message(&inbox, b"signed", Some((&address, &sender))).unwrap();

        assert_eq!(check_auth_policy(&inbox, &message).unwrap(), Some(address));
        assert_eq!(open_inbox_message(&message, &secret).unwrap(), b"signed");
    }

    #[test]
    fn test_policy_enforced_on_seal() {
        let space_key = generate_space_key();
        let (requires, _) = create_space_inbox(&space_key, true, InboxAuthPolicy::RequiresAuth).unwrap();
        let (anonymous, _) = create_space_inbox(&space_key, true, InboxAuthPolicy::Anonymous).unwrap();

        assert!(matches!(seal_inbox_message(&requires, b"x", None), Err(KeysError::AuthRequired)));

        let sender = SigningKeypair::generate();
        let address = sender.account_address().unwrap();
        assert!(matches!(
            seal_inbox_message(&anonymous, b"x", Some((&address, &sender))),
            Err(KeysError::UnexpectedAuth)
        ));
    }

    #[test]
    fn test_forged_sender_rejected() {
        let space_key = generate_space_key();
        let (inbox, _) = create_space_inbox(&space_key, true, InboxAuthPolicy::OptionalAuth).unwrap();

        let sender = SigningKeypair::generate();
        let claimed = AccountAddress::new("0x0000000000000000000000000000000000000001");
        let message = seal_inbox_message(&inbox, b"x", Some((&claimed, &sender))).unwrap();

        assert!(matches!(
            check_auth_policy(&inbox, &message),
            Err(KeysError::InvalidMessageSignature(_))
        ));
    }

    #[test]
    fn test_auth_policy_wire_names() {
        assert_eq!(
            serde_json::to_string(&InboxAuthPolicy::RequiresAuth).unwrap(),
            "\"requires_auth\""
        );
        assert_eq!(
            serde_json::to_string(&InboxAuthPolicy::OptionalAuth).unwrap(),
            "\"optional_auth\""
        );
    }
}
