//! End-to-end membership scenarios.
//!
//! Alice creates a space, invites Bob, Bob accepts and receives the space
//! key, and the log is replayed on a second device.

use space_kernel::events::{create_invitation, ApplyError};
use space_kernel::keys::{
    check_auth_policy, create_space_inbox, decrypt_identity, encrypt_identity, generate_space_key,
    open_inbox_message, open_space_inbox_secret, open_space_key, seal_inbox_message,
    seal_space_key_for_creator, seal_space_key_for_invitee, IdentityKeys, InboxAuthPolicy,
};
use space_kernel::{IngestResult, KernelError, Role, SpaceLog, SpaceLogConfig};
use space_kernel_testkit::{directory_for, multi_party_accounts, verify_all_vectors};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_golden_vectors() {
    if let Err(errors) = verify_all_vectors() {
        panic!("golden vectors failed:\n{}", errors.join("\n"));
    }
}

#[test]
fn test_invite_accept_and_key_distribution() {
    init_tracing();
    let accounts = multi_party_accounts(3);
    let (alice, bob, carol) = (&accounts[0], &accounts[1], &accounts[2]);
    let mut log = SpaceLog::new(directory_for(&accounts), SpaceLogConfig::default());

    log.create_space(&alice.author, Some("space-1".into())).unwrap();
    let space_key = generate_space_key();
    let creator_box =
        seal_space_key_for_creator(&space_key, &alice.encryption, alice.address().clone()).unwrap();

    log.invite(&alice.author, bob.address().clone()).unwrap();
    assert!(log.state().unwrap().invitation_for(bob.address()).is_some());

    log.accept_invitation(&bob.author).unwrap();
    let state = log.state().unwrap();
    assert_eq!(state.role_of(alice.address()), Some(Role::Admin));
    assert_eq!(state.role_of(bob.address()), Some(Role::Member));
    assert!(state.invitations.is_empty());
    assert!(!state.is_member(carol.address()));

    // Alice opens her own box, then re-seals the key for Bob
    let alice_key = open_space_key(&creator_box, &alice.encryption.secret).unwrap();
    let bob_box = seal_space_key_for_invitee(
        &alice_key,
        &alice.encryption.secret,
        &bob.identity().encryption_public_key,
        bob.address().clone(),
    )
    .unwrap();
    assert_eq!(open_space_key(&bob_box, &bob.encryption.secret).unwrap(), space_key);
    assert!(open_space_key(&bob_box, &carol.encryption.secret).is_err());

    // Members can post to the space inbox
    let (inbox, _) = create_space_inbox(&space_key, false, InboxAuthPolicy::RequiresAuth).unwrap();
    let message = seal_inbox_message(
        &inbox,
        b"hello space",
        Some((bob.address(), &bob.author.signing_key)),
    )
    .unwrap();
    assert_eq!(check_auth_policy(&inbox, &message).unwrap().as_ref(), Some(bob.address()));
    let bob_space_key = open_space_key(&bob_box, &bob.encryption.secret).unwrap();
    let bob_inbox_secret = open_space_inbox_secret(&inbox, &bob_space_key).unwrap();
    assert_eq!(open_inbox_message(&message, &bob_inbox_secret).unwrap(), b"hello space");
}

#[test]
fn test_replay_on_second_device() {
    init_tracing();
    let accounts = multi_party_accounts(2);
    let (alice, bob) = (&accounts[0], &accounts[1]);

    let mut origin = SpaceLog::new(directory_for(&accounts), SpaceLogConfig::default());
    origin.create_space(&alice.author, None).unwrap();
    origin.invite(&alice.author, bob.address().clone()).unwrap();
    origin.accept_invitation(&bob.author).unwrap();

    // Ship events over the wire as JSON
    let wire: Vec<serde_json::Value> = origin
        .events()
        .iter()
        .map(|e| serde_json::from_str(&e.to_canonical_json().unwrap()).unwrap())
        .collect();

    let mut replica = SpaceLog::new(directory_for(&accounts), SpaceLogConfig::default());
    for raw in &wire {
        assert!(matches!(replica.ingest_raw(raw).unwrap(), IngestResult::Accepted(_)));
    }

    assert_eq!(replica.state(), origin.state());
    assert_eq!(replica.tip(), origin.tip());

    // Redelivery is harmless
    assert_eq!(replica.ingest_raw(&wire[1]).unwrap(), IngestResult::Duplicate);
    assert_eq!(replica.len(), 3);
}

#[test]
fn test_concurrent_invitations_fork() {
    init_tracing();
    let accounts = multi_party_accounts(3);
    let (alice, bob, carol) = (&accounts[0], &accounts[1], &accounts[2]);
    let mut log = SpaceLog::new(directory_for(&accounts), SpaceLogConfig::default());

    log.create_space(&alice.author, None).unwrap();
    let genesis_tip = log.tip().unwrap();

    let first = create_invitation(&alice.author, genesis_tip, bob.address().clone()).unwrap();
    let second = create_invitation(&alice.author, genesis_tip, carol.address().clone()).unwrap();

    log.ingest(first).unwrap();
    let err = log.ingest(second).unwrap_err();
    assert!(matches!(err, KernelError::Apply(ApplyError::InvalidEvent(_))));
    assert_eq!(log.forks().len(), 1);
    assert_eq!(log.forks()[0].previous, genesis_tip);
    assert!(log.state().unwrap().invitation_for(carol.address()).is_none());
}

#[test]
fn test_delete_space_keeps_removed_members() {
    init_tracing();
    let accounts = multi_party_accounts(2);
    let (alice, bob) = (&accounts[0], &accounts[1]);
    let mut log = SpaceLog::new(directory_for(&accounts), SpaceLogConfig::default());

    log.create_space(&alice.author, None).unwrap();
    log.invite(&alice.author, bob.address().clone()).unwrap();
    log.accept_invitation(&bob.author).unwrap();

    // Only admins may delete
    assert!(log.delete_space(&bob.author).is_err());

    log.delete_space(&alice.author).unwrap();
    let state = log.state().unwrap();
    assert!(state.is_deleted());
    assert!(state.members.is_empty());
    assert_eq!(state.removed_members.len(), 2);
}

#[test]
fn test_unknown_author_rejected() {
    init_tracing();
    let accounts = multi_party_accounts(2);
    // Directory only knows Alice
    let mut log = SpaceLog::new(directory_for(&accounts[..1]), SpaceLogConfig::default());

    let err = log.create_space(&accounts[1].author, None).unwrap_err();
    assert!(matches!(err, KernelError::Apply(ApplyError::InvalidIdentity(_))));
    assert!(log.is_empty());
}

#[test]
fn test_identity_encryption_round_trip() {
    init_tracing();
    let accounts = multi_party_accounts(1);
    let wallet = &accounts[0].author.signing_key;

    let keys = IdentityKeys {
        signing_key: space_kernel::SigningKeypair::generate(),
        encryption_key: space_kernel::keys::EncryptionSecretKey::generate(),
    };
    let encrypted = encrypt_identity(wallet, &keys).unwrap();
    let decrypted = decrypt_identity(wallet, &encrypted).unwrap();

    assert_eq!(decrypted.signing_key.public_key(), keys.signing_key.public_key());
    assert_eq!(decrypted.encryption_key.public_key(), keys.encryption_key.public_key());

    // Another wallet cannot unlock it
    let other = multi_party_accounts(2).pop().unwrap();
    assert!(decrypt_identity(&other.author.signing_key, &encrypted).is_err());
}
