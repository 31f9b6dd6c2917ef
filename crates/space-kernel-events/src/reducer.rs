//! The space state machine.
//!
//! `apply_event` folds one event onto the prior state and returns the next
//! state or a typed error. Rules are checked in a fixed order:
//!
//! 1. Schema: the raw event decodes ([`apply_raw_event`] only)
//! 2. Chain continuity: non-genesis events extend the current tip
//! 3. Signature: the transaction signature binds to the author's identity
//! 4. Authorization and effect, per transaction type
//! 5. The new tip is the hash of the applied event
//!
//! The prior state is borrowed, never mutated. A rejected event leaves the
//! caller's state exactly as it was.

use std::collections::BTreeMap;

use space_kernel_core::{AccountAddress, SignaturePublicKey};

use crate::error::{
    ApplyError, InvalidEventError, InvalidIdentityError, ParseError, VerifySignatureError,
};
use crate::event::{hash_event, parse_event, SpaceEvent, SpaceTransaction};
use crate::identity::IdentityResolver;
use crate::state::{Invitation, Member, Role, SpaceState};

/// Apply a decoded event to `state` (`None` means no space yet).
pub fn apply_event<R>(
    state: Option<&SpaceState>,
    event: &SpaceEvent,
    identities: &R,
) -> Result<SpaceState, ApplyError>
where
    R: IdentityResolver + ?Sized,
{
    let result = apply_checked(state, event, identities);
    match &result {
        Ok(next) => tracing::debug!(
            kind = event.transaction.kind(),
            author = %event.author.account_address,
            tip = %next.last_event_hash,
            "applied space event"
        ),
        Err(e) => tracing::warn!(
            kind = event.transaction.kind(),
            author = %event.author.account_address,
            error = %e,
            "rejected space event"
        ),
    }
    result
}

/// Decode a raw JSON event and apply it.
pub fn apply_raw_event<R>(
    state: Option<&SpaceState>,
    raw: &serde_json::Value,
    identities: &R,
) -> Result<SpaceState, ApplyError>
where
    R: IdentityResolver + ?Sized,
{
    let event = parse_event(raw).map_err(|e| {
        tracing::warn!(error = %e, "rejected malformed space event");
        e
    })?;
    apply_event(state, &event, identities)
}

fn apply_checked<R>(
    state: Option<&SpaceState>,
    event: &SpaceEvent,
    identities: &R,
) -> Result<SpaceState, ApplyError>
where
    R: IdentityResolver + ?Sized,
{
    let transaction = &event.transaction;

    // 2. Chain continuity
    if let Some(previous) = transaction.previous_event_hash() {
        let state = state.ok_or_else(|| {
            InvalidEventError::new(format!("{} requires an existing space", transaction.kind()))
        })?;
        if *previous != state.last_event_hash {
            return Err(InvalidEventError::new(format!(
                "previousEventHash {} does not match tip {}",
                previous, state.last_event_hash
            ))
            .into());
        }
    }

    // 3. Signature authentication
    verify_author(event, identities)?;

    let event_hash = hash_event(event)
        .map_err(|e| ParseError::new(format!("event cannot be canonicalized: {e}")))?;

    // 4. Authorization and effect
    let author = &event.author.account_address;
    let mut next = match (transaction, state) {
        (SpaceTransaction::CreateSpace(tx), None) => {
            if tx.creator_account_address != *author {
                return Err(InvalidEventError::new(format!(
                    "{author} cannot create a space for {}",
                    tx.creator_account_address
                ))
                .into());
            }
            let mut members = BTreeMap::new();
            members.insert(
                tx.creator_account_address.clone(),
                Member {
                    account_address: tx.creator_account_address.clone(),
                    role: Role::Admin,
                },
            );
            SpaceState {
                id: tx.id.clone(),
                members,
                removed_members: BTreeMap::new(),
                invitations: BTreeMap::new(),
                last_event_hash: event_hash,
            }
        }
        (SpaceTransaction::CreateSpace(_), Some(_)) => {
            return Err(InvalidEventError::new("space already exists").into());
        }
        (SpaceTransaction::AcceptInvitation(_), Some(state)) => {
            if state.is_member(author) {
                return Err(InvalidEventError::new(format!("{author} is already a member")).into());
            }
            let invitation_id = state
                .invitation_for(author)
                .map(|(id, _)| id.clone())
                .ok_or_else(|| InvalidEventError::new(format!("no open invitation for {author}")))?;

            let mut next = state.clone();
            next.invitations.remove(&invitation_id);
            next.removed_members.remove(author);
            next.members.insert(
                author.clone(),
                Member {
                    account_address: author.clone(),
                    role: Role::Member,
                },
            );
            next
        }
        (SpaceTransaction::CreateInvitation(tx), Some(state)) => {
            require_admin(state, author)?;
            let invitee = &tx.invitee_account_address;
            if state.is_member(invitee) {
                return Err(InvalidEventError::new(format!("{invitee} is already a member")).into());
            }
            if state.invitation_for(invitee).is_some() {
                return Err(InvalidEventError::new(format!("{invitee} already has an open invitation")).into());
            }

            let mut next = state.clone();
            next.invitations.insert(
                tx.id.clone(),
                Invitation {
                    invitee_account_address: invitee.clone(),
                },
            );
            next
        }
        (SpaceTransaction::DeleteSpace(tx), Some(state)) => {
            require_admin(state, author)?;
            if tx.id != state.id {
                return Err(InvalidEventError::new(format!(
                    "delete-space names {}, not {}",
                    tx.id, state.id
                ))
                .into());
            }
            let mut next = state.clone();
            next.removed_members = std::mem::take(&mut next.members);
            next.invitations.clear();
            next
        }
        (_, None) => {
            // Rule 2 already rejected every non-genesis event without state
            return Err(InvalidEventError::new("event requires an existing space").into());
        }
    };

    // 5. Hash chaining
    next.last_event_hash = event_hash;
    Ok(next)
}

fn require_admin(state: &SpaceState, author: &AccountAddress) -> Result<(), InvalidEventError> {
    if state.is_admin(author) {
        Ok(())
    } else {
        Err(InvalidEventError::new(format!("{author} is not an admin")))
    }
}

/// Recover the signing key and bind it to the author's verified identity.
fn verify_author<R>(event: &SpaceEvent, identities: &R) -> Result<SignaturePublicKey, ApplyError>
where
    R: IdentityResolver + ?Sized,
{
    let signing_bytes = event
        .transaction
        .signing_bytes()
        .map_err(|e| ParseError::new(format!("transaction cannot be canonicalized: {e}")))?;

    let recovered = event
        .author
        .signature
        .recover(&signing_bytes)
        .map_err(|e| VerifySignatureError::new(format!("cannot recover public key: {e}")))?;

    let author = &event.author.account_address;
    let identity = identities.get_verified_identity(author, Some(&recovered))?;
    if identity.account_address != *author {
        return Err(InvalidIdentityError::new(format!(
            "resolver returned {} for {author}",
            identity.account_address
        ))
        .into());
    }
    if identity.signature_public_key != recovered {
        return Err(VerifySignatureError::new(format!(
            "signature was not made by the signing key of {author}"
        ))
        .into());
    }

    Ok(recovered)
}
