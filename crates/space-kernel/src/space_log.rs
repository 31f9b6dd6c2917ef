//! The space log: an in-memory fold of one space's event chain.
//!
//! The log owns the current state, the accepted events and, optionally,
//! every intermediate state. It is the single place where the reducer's
//! output replaces the previous state.

use std::collections::HashMap;

use space_kernel_core::{AccountAddress, EventHash};
use space_kernel_events::{
    accept_invitation, apply_event, create_invitation, create_space, delete_space, parse_event,
    ApplyError, EventAuthor, IdentityResolver, SpaceEvent, SpaceState,
};

use crate::config::SpaceLogConfig;
use crate::error::{KernelError, Result};

/// Result of ingesting an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestResult {
    /// Event was applied; this is the new chain tip.
    Accepted(EventHash),
    /// Event was already in the log.
    Duplicate,
}

/// Evidence that two events were built against the same chain tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkEvidence {
    /// The tip both events extend.
    pub previous: EventHash,
    /// The event the log accepted.
    pub accepted: EventHash,
    /// The event the log rejected.
    pub rejected: EventHash,
}

/// The event log of a single space.
pub struct SpaceLog<R: IdentityResolver> {
    /// Identity lookup handed to the reducer.
    identities: R,
    /// Configuration.
    config: SpaceLogConfig,
    /// Current state, `None` before genesis.
    state: Option<SpaceState>,
    /// Accepted events in order.
    events: Vec<SpaceEvent>,
    /// Hashes of accepted events, parallel to `events`.
    hashes: Vec<EventHash>,
    /// Position of each accepted event.
    positions: HashMap<EventHash, usize>,
    /// State after each accepted event (when retaining history).
    history: Vec<SpaceState>,
    /// Detected forks.
    forks: Vec<ForkEvidence>,
}

impl<R: IdentityResolver> SpaceLog<R> {
    /// Create an empty log.
    pub fn new(identities: R, config: SpaceLogConfig) -> Self {
        Self {
            identities,
            config,
            state: None,
            events: Vec::new(),
            hashes: Vec::new(),
            positions: HashMap::new(),
            history: Vec::new(),
            forks: Vec::new(),
        }
    }

    /// Create an empty log with the default configuration.
    pub fn with_identities(identities: R) -> Self {
        Self::new(identities, SpaceLogConfig::default())
    }

    /// Get the identity resolver.
    pub fn identities(&self) -> &R {
        &self.identities
    }

    /// Get the identity resolver mutably, e.g. to register a new account.
    pub fn identities_mut(&mut self) -> &mut R {
        &mut self.identities
    }

    /// Get the configuration.
    pub fn config(&self) -> &SpaceLogConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The current state, `None` before genesis.
    pub fn state(&self) -> Option<&SpaceState> {
        self.state.as_ref()
    }

    /// The current chain tip.
    pub fn tip(&self) -> Option<EventHash> {
        self.state.as_ref().map(|s| s.last_event_hash)
    }

    /// Accepted events in order.
    pub fn events(&self) -> &[SpaceEvent] {
        &self.events
    }

    /// Number of accepted events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been accepted.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether an event hash is in the log.
    pub fn contains(&self, hash: &EventHash) -> bool {
        self.positions.contains_key(hash)
    }

    /// The state right after the event at `index`.
    ///
    /// Without retained history only the latest state is available.
    pub fn snapshot(&self, index: usize) -> Option<&SpaceState> {
        if self.config.retain_history {
            self.history.get(index)
        } else if self.events.len().checked_sub(1) == Some(index) {
            self.state.as_ref()
        } else {
            None
        }
    }

    /// Forks detected so far.
    pub fn forks(&self) -> &[ForkEvidence] {
        &self.forks
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingest
    // ─────────────────────────────────────────────────────────────────────────

    /// Ingest an event from a peer or relay.
    ///
    /// On error the log is unchanged.
    pub fn ingest(&mut self, event: SpaceEvent) -> Result<IngestResult> {
        let hash = event.hash()?;

        if self.config.report_duplicates && self.positions.contains_key(&hash) {
            tracing::debug!(event = %hash, "duplicate space event");
            return Ok(IngestResult::Duplicate);
        }

        let next = match apply_event(self.state.as_ref(), &event, &self.identities) {
            Ok(next) => next,
            Err(e) => {
                if let ApplyError::InvalidEvent(_) = &e {
                    self.record_fork(&event, hash);
                }
                return Err(e.into());
            }
        };

        self.positions.insert(hash, self.events.len());
        self.events.push(event);
        self.hashes.push(hash);
        if self.config.retain_history {
            self.history.push(next.clone());
        }
        self.state = Some(next);

        Ok(IngestResult::Accepted(hash))
    }

    /// Decode and ingest a raw JSON event.
    pub fn ingest_raw(&mut self, raw: &serde_json::Value) -> Result<IngestResult> {
        let event = parse_event(raw).map_err(ApplyError::from)?;
        self.ingest(event)
    }

    /// Ingest events in order, stopping at the first failure.
    ///
    /// Returns the number of events newly accepted.
    pub fn replay<I>(&mut self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = SpaceEvent>,
    {
        let mut accepted = 0;
        for event in events {
            if let IngestResult::Accepted(_) = self.ingest(event)? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    fn record_fork(&mut self, event: &SpaceEvent, rejected: EventHash) {
        let Some(previous) = event.transaction.previous_event_hash() else {
            return;
        };
        let Some(&position) = self.positions.get(previous) else {
            return;
        };
        let Some(&accepted) = self.hashes.get(position + 1) else {
            return;
        };
        if accepted == rejected {
            return;
        }

        tracing::warn!(
            previous = %previous,
            accepted = %accepted,
            rejected = %rejected,
            "fork detected: event extends a superseded tip"
        );
        self.forks.push(ForkEvidence {
            previous: *previous,
            accepted,
            rejected,
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authoring
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the space and apply the genesis event.
    pub fn create_space(&mut self, author: &EventAuthor, space_id: Option<String>) -> Result<SpaceEvent> {
        let event = create_space(author, space_id)?;
        self.ingest(event.clone())?;
        Ok(event)
    }

    /// Invite an account, extending the current tip.
    pub fn invite(&mut self, author: &EventAuthor, invitee: AccountAddress) -> Result<SpaceEvent> {
        let tip = self.tip().ok_or(KernelError::NoSpace)?;
        let event = create_invitation(author, tip, invitee)?;
        self.ingest(event.clone())?;
        Ok(event)
    }

    /// Accept the author's open invitation.
    pub fn accept_invitation(&mut self, author: &EventAuthor) -> Result<SpaceEvent> {
        let tip = self.tip().ok_or(KernelError::NoSpace)?;
        let event = accept_invitation(author, tip)?;
        self.ingest(event.clone())?;
        Ok(event)
    }

    /// Delete the space.
    pub fn delete_space(&mut self, author: &EventAuthor) -> Result<SpaceEvent> {
        let state = self.state.as_ref().ok_or(KernelError::NoSpace)?;
        let event = delete_space(author, state.id.clone(), state.last_event_hash)?;
        self.ingest(event.clone())?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_kernel_core::SigningKeypair;
    use space_kernel_events::{IdentityDirectory, PublicIdentity, Role};
    use space_kernel_keys::EncryptionSecretKey;

    fn account(seed: u8) -> (EventAuthor, PublicIdentity) {
        let signing_key = SigningKeypair::from_seed(&[seed; 32]).unwrap();
        let identity = PublicIdentity {
            account_address: signing_key.account_address().unwrap(),
            signature_public_key: signing_key.public_key(),
            encryption_public_key: EncryptionSecretKey::from_bytes([seed; 32]).public_key(),
        };
        (EventAuthor::from_signing_key(signing_key).unwrap(), identity)
    }

    fn setup(config: SpaceLogConfig) -> (SpaceLog<IdentityDirectory>, EventAuthor, EventAuthor) {
        let (alice, alice_id) = account(1);
        let (bob, bob_id) = account(2);
        let directory = vec![alice_id, bob_id].into_iter().collect();
        (SpaceLog::new(directory, config), alice, bob)
    }

    #[test]
    fn test_authoring_flow() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default());

        log.create_space(&alice, Some("space-1".into())).unwrap();
        log.invite(&alice, bob.account_address.clone()).unwrap();
        log.accept_invitation(&bob).unwrap();

        let state = log.state().unwrap();
        assert_eq!(state.role_of(&bob.account_address), Some(Role::Member));
        assert_eq!(log.len(), 3);
        assert_eq!(log.tip(), Some(log.events()[2].hash().unwrap()));
    }

    #[test]
    fn test_invite_requires_space() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default());
        assert!(matches!(
            log.invite(&alice, bob.account_address.clone()),
            Err(KernelError::NoSpace)
        ));
    }

    #[test]
    fn test_duplicate_reported() {
        let (mut log, alice, _) = setup(SpaceLogConfig::default());
        let genesis = log.create_space(&alice, None).unwrap();

        assert_eq!(log.ingest(genesis).unwrap(), IngestResult::Duplicate);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_strict_duplicates_rejected() {
        let (mut log, alice, _) = setup(SpaceLogConfig::default().strict_duplicates());
        let genesis = log.create_space(&alice, None).unwrap();

        let err = log.ingest(genesis).unwrap_err();
        assert_eq!(err.tag(), "InvalidEventError");
        assert!(log.forks().is_empty());
    }

    #[test]
    fn test_failed_ingest_leaves_log_unchanged() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default());
        log.create_space(&alice, None).unwrap();
        let before = log.state().cloned();

        assert!(log.accept_invitation(&bob).is_err());
        assert_eq!(log.state().cloned(), before);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_history_snapshots() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default());
        log.create_space(&alice, None).unwrap();
        log.invite(&alice, bob.account_address.clone()).unwrap();

        assert!(log.snapshot(0).unwrap().invitations.is_empty());
        assert_eq!(log.snapshot(1).unwrap().invitations.len(), 1);
        assert!(log.snapshot(2).is_none());
    }

    #[test]
    fn test_without_history_keeps_latest_only() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default().without_history());
        log.create_space(&alice, None).unwrap();
        log.invite(&alice, bob.account_address.clone()).unwrap();

        assert!(log.snapshot(0).is_none());
        assert_eq!(log.snapshot(1), log.state());
        assert!(log.snapshot(usize::MAX).is_none());
    }

    #[test]
    fn test_snapshot_of_empty_log() {
        let (log, _, _) = setup(SpaceLogConfig::default().without_history());
        assert!(log.snapshot(0).is_none());
        assert!(log.snapshot(usize::MAX).is_none());
    }

    #[test]
    fn test_fork_recorded() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default());
        log.create_space(&alice, None).unwrap();
        let genesis_tip = log.tip().unwrap();

        let first = create_invitation(&alice, genesis_tip, bob.account_address.clone()).unwrap();
        let second = delete_space(&alice, log.state().unwrap().id.clone(), genesis_tip).unwrap();

        log.ingest(first.clone()).unwrap();
        assert!(log.ingest(second.clone()).is_err());

        assert_eq!(
            log.forks(),
            &[ForkEvidence {
                previous: genesis_tip,
                accepted: first.hash().unwrap(),
                rejected: second.hash().unwrap(),
            }]
        );
    }

    #[test]
    fn test_replay_into_fresh_log() {
        let (mut log, alice, bob) = setup(SpaceLogConfig::default());
        log.create_space(&alice, None).unwrap();
        log.invite(&alice, bob.account_address.clone()).unwrap();
        log.accept_invitation(&bob).unwrap();
        log.delete_space(&alice).unwrap();

        let (mut fresh, _, _) = setup(SpaceLogConfig::default());
        assert_eq!(fresh.replay(log.events().to_vec()).unwrap(), 4);
        assert_eq!(fresh.state(), log.state());

        // Replaying again only yields duplicates
        assert_eq!(fresh.replay(log.events().to_vec()).unwrap(), 0);
    }

    #[test]
    fn test_ingest_raw() {
        let (mut log, alice, _) = setup(SpaceLogConfig::default());
        let genesis = create_space(&alice, None).unwrap();
        let raw = serde_json::to_value(&genesis).unwrap();

        assert!(matches!(log.ingest_raw(&raw).unwrap(), IngestResult::Accepted(_)));

        let err = log.ingest_raw(&serde_json::json!({"nope": true})).unwrap_err();
        assert_eq!(err.tag(), "ParseError");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn test_replay_prefix_matches_snapshot(cut in 1usize..=3) {
                let (mut origin, alice, bob) = setup(SpaceLogConfig::default());
                origin.create_space(&alice, None).unwrap();
                origin.invite(&alice, bob.account_address.clone()).unwrap();
                origin.accept_invitation(&bob).unwrap();

                let (mut replica, _, _) = setup(SpaceLogConfig::default());
                let accepted = replica.replay(origin.events()[..cut].iter().cloned()).unwrap();

                prop_assert_eq!(accepted, cut);
                prop_assert_eq!(replica.state(), origin.snapshot(cut - 1));
            }
        }
    }
}
