//! Event constructors.
//!
//! Each constructor builds one transaction type and signs its canonical
//! bytes with the author's signing key. Constructors do not check
//! authorization; that is the reducer's job.

use uuid::Uuid;

use space_kernel_core::{AccountAddress, EventHash, SigningKeypair};

use crate::error::SignError;
use crate::event::{
    AcceptInvitationTransaction, Author, CreateInvitationTransaction, CreateSpaceTransaction,
    DeleteSpaceTransaction, SpaceEvent, SpaceTransaction,
};

/// An account address with the key that signs for it.
#[derive(Debug, Clone)]
pub struct EventAuthor {
    pub account_address: AccountAddress,
    pub signing_key: SigningKeypair,
}

impl EventAuthor {
    /// Pair an account address with its signing key.
    pub fn new(account_address: AccountAddress, signing_key: SigningKeypair) -> Self {
        Self {
            account_address,
            signing_key,
        }
    }

    /// Use the key's own externally-owned address as the account.
    pub fn from_signing_key(signing_key: SigningKeypair) -> Result<Self, SignError> {
        let account_address = signing_key.account_address()?;
        Ok(Self::new(account_address, signing_key))
    }
}

fn sign(author: &EventAuthor, transaction: SpaceTransaction) -> Result<SpaceEvent, SignError> {
    let signature = author.signing_key.sign(&transaction.signing_bytes()?)?;
    Ok(SpaceEvent {
        transaction,
        author: Author {
            account_address: author.account_address.clone(),
            signature,
        },
    })
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the genesis event. A fresh id is generated unless one is given.
pub fn create_space(author: &EventAuthor, space_id: Option<String>) -> Result<SpaceEvent, SignError> {
    sign(
        author,
        SpaceTransaction::CreateSpace(CreateSpaceTransaction {
            id: space_id.unwrap_or_else(new_id),
            creator_account_address: author.account_address.clone(),
        }),
    )
}

/// Invite `invitee`, extending `previous_event_hash`.
pub fn create_invitation(
    author: &EventAuthor,
    previous_event_hash: EventHash,
    invitee: AccountAddress,
) -> Result<SpaceEvent, SignError> {
    sign(
        author,
        SpaceTransaction::CreateInvitation(CreateInvitationTransaction {
            id: new_id(),
            invitee_account_address: invitee,
            previous_event_hash,
        }),
    )
}

/// Accept the author's open invitation.
pub fn accept_invitation(author: &EventAuthor, previous_event_hash: EventHash) -> Result<SpaceEvent, SignError> {
    sign(
        author,
        SpaceTransaction::AcceptInvitation(AcceptInvitationTransaction {
            id: new_id(),
            previous_event_hash,
        }),
    )
}

/// Delete the space `id`.
pub fn delete_space(
    author: &EventAuthor,
    id: String,
    previous_event_hash: EventHash,
) -> Result<SpaceEvent, SignError> {
    sign(
        author,
        SpaceTransaction::DeleteSpace(DeleteSpaceTransaction {
            id,
            previous_event_hash,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> EventAuthor {
        EventAuthor::from_signing_key(SigningKeypair::from_seed(&[0x42; 32]).unwrap()).unwrap()
    }

    #[test]
    fn test_create_space_signs_transaction() {
        let author = author();
        let event = create_space(&author, Some("space-1".into())).unwrap();

        assert_eq!(event.transaction.id(), "space-1");
        assert_eq!(event.author.account_address, author.account_address);

        let recovered = event
            .author
            .signature
            .recover(&event.transaction.signing_bytes().unwrap())
            .unwrap();
        assert_eq!(recovered, author.signing_key.public_key());
    }

    #[test]
    fn test_create_space_generates_uuid() {
        let event = create_space(&author(), None).unwrap();
        assert!(Uuid::parse_str(event.transaction.id()).is_ok());
    }

    #[test]
    fn test_ids_are_unique() {
        let author = author();
        let tip = EventHash::from_bytes([1; 32]);
        let a = create_invitation(&author, tip, AccountAddress::new("0xb")).unwrap();
        let b = create_invitation(&author, tip, AccountAddress::new("0xb")).unwrap();
        assert_ne!(a.transaction.id(), b.transaction.id());
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn test_constructors_reference_tip() {
        let author = author();
        let tip = EventHash::from_bytes([7; 32]);

        let invite = create_invitation(&author, tip, AccountAddress::new("0xb")).unwrap();
        let accept = accept_invitation(&author, tip).unwrap();
        let delete = delete_space(&author, "space-1".into(), tip).unwrap();

        for event in [invite, accept, delete] {
            assert_eq!(event.transaction.previous_event_hash(), Some(&tip));
        }
    }

    #[test]
    fn test_signature_excludes_author() {
        let author = author();
        let event = create_space(&author, Some("s".into())).unwrap();

        // Re-attributing the event leaves the signature untouched
        let mut relabelled = event.clone();
        relabelled.author.account_address = AccountAddress::new("0xsomeone");
        let recovered = relabelled
            .author
            .signature
            .recover(&relabelled.transaction.signing_bytes().unwrap())
            .unwrap();
        assert_eq!(recovered, author.signing_key.public_key());
    }
}
