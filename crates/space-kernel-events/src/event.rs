//! The space event: a signed transaction in a hash-chained log.
//!
//! An event is `{ transaction, author }`. The author signs the canonical
//! bytes of the transaction only. The event hash covers both parts and is
//! what the next event references as its `previousEventHash`.

use serde::{Deserialize, Serialize};

use space_kernel_core::{
    canonical_bytes, AccountAddress, CanonicalError, EventHash, RecoverableSignature, Sha256Hash,
};

use crate::error::ParseError;

/// Genesis of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceTransaction {
    pub id: String,
    pub creator_account_address: AccountAddress,
}

/// Terminal event: every member is moved to `removedMembers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSpaceTransaction {
    pub id: String,
    pub previous_event_hash: EventHash,
}

/// An admin invites an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationTransaction {
    pub id: String,
    pub invitee_account_address: AccountAddress,
    pub previous_event_hash: EventHash,
}

/// An invitee accepts their open invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationTransaction {
    pub id: String,
    pub previous_event_hash: EventHash,
}

/// A transaction, discriminated on `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SpaceTransaction {
    CreateSpace(CreateSpaceTransaction),
    DeleteSpace(DeleteSpaceTransaction),
    CreateInvitation(CreateInvitationTransaction),
    AcceptInvitation(AcceptInvitationTransaction),
}

impl SpaceTransaction {
    /// The author-generated transaction id.
    pub fn id(&self) -> &str {
        match self {
            SpaceTransaction::CreateSpace(tx) => &tx.id,
            SpaceTransaction::DeleteSpace(tx) => &tx.id,
            SpaceTransaction::CreateInvitation(tx) => &tx.id,
            SpaceTransaction::AcceptInvitation(tx) => &tx.id,
        }
    }

    /// The chain tip this transaction extends. `None` only for genesis.
    pub fn previous_event_hash(&self) -> Option<&EventHash> {
        match self {
            SpaceTransaction::CreateSpace(_) => None,
            SpaceTransaction::DeleteSpace(tx) => Some(&tx.previous_event_hash),
            SpaceTransaction::CreateInvitation(tx) => Some(&tx.previous_event_hash),
            SpaceTransaction::AcceptInvitation(tx) => Some(&tx.previous_event_hash),
        }
    }

    /// The wire `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            SpaceTransaction::CreateSpace(_) => "create-space",
            SpaceTransaction::DeleteSpace(_) => "delete-space",
            SpaceTransaction::CreateInvitation(_) => "create-invitation",
            SpaceTransaction::AcceptInvitation(_) => "accept-invitation",
        }
    }

    /// The exact bytes the author signs.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, CanonicalError> {
        canonical_bytes(self)
    }
}

/// The signer of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub account_address: AccountAddress,
    pub signature: RecoverableSignature,
}

/// A signed space event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceEvent {
    pub transaction: SpaceTransaction,
    pub author: Author,
}

impl SpaceEvent {
    /// Compute this event's hash.
    pub fn hash(&self) -> Result<EventHash, CanonicalError> {
        hash_event(self)
    }

    /// Parse an event from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        serde_json::from_str(json).map_err(|e| ParseError::new(e.to_string()))
    }

    /// Canonical JSON of the full event.
    pub fn to_canonical_json(&self) -> Result<String, CanonicalError> {
        space_kernel_core::canonicalize(self)
    }
}

/// SHA-256 over the canonical encoding of the full event.
pub fn hash_event(event: &SpaceEvent) -> Result<EventHash, CanonicalError> {
    let bytes = canonical_bytes(event)?;
    Ok(EventHash::from_bytes(*Sha256Hash::hash(&bytes).as_bytes()))
}

/// Decode a raw event, failing with [`ParseError`] on any shape mismatch.
pub fn parse_event(raw: &serde_json::Value) -> Result<SpaceEvent, ParseError> {
    SpaceEvent::deserialize(raw).map_err(|e| ParseError::new(e.to_string()))
}
