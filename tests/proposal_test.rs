//! Tests for the proposal builder and the structural validation every replica performs on
//! candidate batches.

mod common;

use forum_app::moderation::words::WordList;
use forum_app::proposal::{build, validate, ProposalError};
use forum_app::types::transaction::Transaction;

use crate::common::{ban, garbage, post};

#[test]
fn empty_word_list_passes_the_batch_through() {
    let raw = vec![post("alice", "hello"), post("bob", "hi")];
    let batch = build(&raw, &WordList::default());
    assert_eq!(batch, raw);
}

#[test]
fn flagged_sender_is_banned_and_silenced() {
    let words = WordList::decode("badword").unwrap();
    let raw = vec![post("bob", "badword stuff")];

    let batch = build(&raw, &words);
    assert_eq!(batch, vec![ban("bob")]);
}

#[test]
fn all_of_a_banned_senders_posts_are_suppressed() {
    let words = WordList::decode("badword").unwrap();
    let raw = vec![
        post("bob", "perfectly fine"),
        post("alice", "hello"),
        post("bob", "badword stuff"),
        post("bob", "also fine"),
    ];

    let batch = build(&raw, &words);
    // One ban for bob, then only alice's post; bob's clean posts are gone too.
    assert_eq!(batch, vec![ban("bob"), post("alice", "hello")]);
}

#[test]
fn one_ban_per_sender_however_many_posts_flagged() {
    let words = WordList::decode("badword").unwrap();
    let raw = vec![
        post("bob", "badword one"),
        post("bob", "badword two"),
        post("carol", "badword three"),
    ];

    let batch = build(&raw, &words);
    assert_eq!(batch, vec![ban("bob"), ban("carol")]);
}

#[test]
fn bans_precede_posts_and_relative_order_is_kept() {
    let words = WordList::decode("badword").unwrap();
    let raw = vec![
        post("alice", "first"),
        post("bob", "badword"),
        post("carol", "second"),
        post("dave", "badword"),
        post("erin", "third"),
    ];

    let batch = build(&raw, &words);
    assert_eq!(
        batch,
        vec![
            ban("bob"),
            ban("dave"),
            post("alice", "first"),
            post("carol", "second"),
            post("erin", "third"),
        ]
    );
    validate(&batch).unwrap();
}

#[test]
fn builder_drops_unparseable_and_client_submitted_ban_entries() {
    let raw = vec![garbage(), ban("alice"), post("bob", "hello")];
    let batch = build(&raw, &WordList::default());
    assert_eq!(batch, vec![post("bob", "hello")]);
}

#[test]
fn builder_output_always_validates() {
    let words = WordList::decode("spam|scam").unwrap();
    let raw = vec![
        post("alice", "scam alert"),
        garbage(),
        post("bob", "hello"),
        post("alice", "follow-up"),
        post("carol", "spam spam spam"),
    ];

    let batch = build(&raw, &words);
    validate(&batch).unwrap();

    // No surviving post's sender appears among the bans.
    let banned: Vec<String> = batch
        .iter()
        .filter_map(|raw| match Transaction::parse(raw) {
            Some(Transaction::Ban(ban)) => Some(ban.target),
            _ => None,
        })
        .collect();
    for raw in &batch {
        if let Some(Transaction::Post(message)) = Transaction::parse(raw) {
            assert!(!banned.contains(&message.sender));
        }
    }
}

#[test]
fn validator_accepts_the_empty_batch() {
    validate(&[]).unwrap();
}

#[test]
fn validator_accepts_a_ban_only_batch() {
    validate(&[ban("alice"), ban("bob")]).unwrap();
}

#[test]
fn validator_rejects_a_ban_after_the_boundary() {
    let batch = vec![ban("alice"), post("bob", "hello"), ban("carol")];
    assert_eq!(
        validate(&batch),
        Err(ProposalError::BanAfterBoundary { index: 2 })
    );
}

#[test]
fn validator_rejects_a_post_from_a_banned_sender() {
    let batch = vec![ban("bob"), post("alice", "hello"), post("bob", "hi")];
    assert_eq!(
        validate(&batch),
        Err(ProposalError::BannedSenderPost {
            index: 2,
            sender: "bob".to_string()
        })
    );
}

#[test]
fn validator_rejects_malformed_entries_anywhere() {
    let in_prefix = vec![garbage(), ban("alice")];
    assert_eq!(
        validate(&in_prefix),
        Err(ProposalError::MalformedTransaction { index: 0 })
    );

    let after_boundary = vec![ban("alice"), post("bob", "hello"), garbage()];
    assert_eq!(
        validate(&after_boundary),
        Err(ProposalError::MalformedTransaction { index: 2 })
    );
}
