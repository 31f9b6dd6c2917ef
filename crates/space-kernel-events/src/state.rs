//! Space membership state.
//!
//! `SpaceState` is the fold of an event log. It is only ever produced by
//! the reducer: every applied event yields a new value and the previous
//! one stays valid as a snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use space_kernel_core::{AccountAddress, EventHash};

/// A member's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// A member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub account_address: AccountAddress,
    pub role: Role,
}

/// An open invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub invitee_account_address: AccountAddress,
}

/// Membership state of a space after some prefix of its log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceState {
    /// Space id, fixed at genesis.
    pub id: String,

    /// Current members by account address.
    pub members: BTreeMap<AccountAddress, Member>,

    /// Members at the time the space was deleted.
    pub removed_members: BTreeMap<AccountAddress, Member>,

    /// Open invitations by invitation id.
    pub invitations: BTreeMap<String, Invitation>,

    /// Hash of the last applied event; the chain tip.
    pub last_event_hash: EventHash,
}

impl SpaceState {
    /// Get a member's role.
    pub fn role_of(&self, account_address: &AccountAddress) -> Option<Role> {
        self.members.get(account_address).map(|m| m.role)
    }

    /// Check if an account is a current member.
    pub fn is_member(&self, account_address: &AccountAddress) -> bool {
        self.members.contains_key(account_address)
    }

    /// Check if an account is a current admin.
    pub fn is_admin(&self, account_address: &AccountAddress) -> bool {
        self.role_of(account_address) == Some(Role::Admin)
    }

    /// Find the open invitation for an invitee.
    pub fn invitation_for(&self, invitee: &AccountAddress) -> Option<(&String, &Invitation)> {
        self.invitations
            .iter()
            .find(|(_, invitation)| invitation.invitee_account_address == *invitee)
    }

    /// Iterate over current admins.
    pub fn admins(&self) -> impl Iterator<Item = &AccountAddress> {
        self.members
            .values()
            .filter(|m| m.role == Role::Admin)
            .map(|m| &m.account_address)
    }

    /// Whether the space has been deleted: nobody is left to admit anyone.
    pub fn is_deleted(&self) -> bool {
        self.members.is_empty() && !self.removed_members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SpaceState {
        let alice = AccountAddress::new("0xalice");
        let bob = AccountAddress::new("0xbob");
        let mut members = BTreeMap::new();
        members.insert(
            alice.clone(),
            Member {
                account_address: alice,
                role: Role::Admin,
            },
        );
        let mut invitations = BTreeMap::new();
        invitations.insert(
            "inv-1".to_string(),
            Invitation {
                invitee_account_address: bob,
            },
        );
        SpaceState {
            id: "space".into(),
            members,
            removed_members: BTreeMap::new(),
            invitations,
            last_event_hash: EventHash::from_bytes([0; 32]),
        }
    }

    #[test]
    fn test_role_queries() {
        let state = state();
        let alice = AccountAddress::new("0xalice");
        let bob = AccountAddress::new("0xbob");

        assert!(state.is_admin(&alice));
        assert!(!state.is_member(&bob));
        assert_eq!(state.role_of(&bob), None);
        assert_eq!(state.admins().collect::<Vec<_>>(), vec![&alice]);
        assert!(!state.is_deleted());
    }

    #[test]
    fn test_invitation_lookup() {
        let state = state();
        let (id, _) = state.invitation_for(&AccountAddress::new("0xbob")).unwrap();
        assert_eq!(id, "inv-1");
        assert!(state.invitation_for(&AccountAddress::new("0xcarol")).is_none());
    }

    #[test]
    fn test_state_wire_format() {
        let json = serde_json::to_value(state()).unwrap();
        assert_eq!(json["members"]["0xalice"]["role"], "admin");
        assert_eq!(json["invitations"]["inv-1"]["inviteeAccountAddress"], "0xbob");
        assert!(json["removedMembers"].as_object().unwrap().is_empty());
        assert_eq!(json["lastEventHash"], "00".repeat(32));
    }
}
