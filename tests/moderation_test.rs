//! Tests for the word-list codec, the content classifier, and the vote-extension aggregation
//! threshold.

mod common;

use forum_app::moderation::quorum::{quorum_words, ValidatorExtension};
use forum_app::moderation::words::{WordList, WordListError};
use forum_app::types::validators::ValidatorAddress;

use crate::common::{addresses, keygen};

#[test]
fn decode_rejects_duplicate_words() {
    let result = WordList::decode("spam|scam|spam");
    assert_eq!(
        result,
        Err(WordListError::DuplicateWord {
            word: "spam".to_string()
        })
    );
}

#[test]
fn decode_then_encode_is_identity() {
    let payload = "spam|scam|shill";
    let words = WordList::decode(payload).unwrap();
    assert_eq!(words.encode(), payload);
}

#[test]
fn empty_payload_decodes_to_the_empty_list() {
    let words = WordList::decode("").unwrap();
    assert!(words.is_empty());
    assert_eq!(words.encode(), "");
}

#[test]
fn from_words_keeps_first_occurrences() {
    let words = WordList::from_words(
        ["spam", "scam", "spam"].iter().map(|w| w.to_string()),
    );
    assert_eq!(words.encode(), "spam|scam");
}

#[test]
fn classifier_matches_substrings() {
    let words = WordList::decode("spam").unwrap();

    // A clean occurrence and an embedded occurrence both match under the substring policy.
    assert!(words.flags("this is spam"));
    assert!(words.flags("stop spamming me"));

    // A word split by whitespace is a near-miss, not a match.
    assert!(!words.flags("this is sp am"));
    assert!(!words.flags("perfectly fine message"));

    // The empty list flags nothing.
    assert!(!WordList::default().flags("spam"));
}

#[test]
fn words_at_exactly_a_third_are_never_adopted() {
    // Registry of 6: floor(6/3) = 2, so two supporters are not enough and three are.
    let validators = addresses(&keygen(6));
    let extensions: Vec<ValidatorExtension> = validators
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, validator)| {
            let payload = if i < 2 { "spam|scam" } else { "spam" };
            ValidatorExtension::new(*validator, WordList::decode(payload).unwrap())
        })
        .collect();

    let agreed = quorum_words(&extensions, validators.len());
    assert!(agreed.contains("spam"), "three supporters must be adopted");
    assert!(!agreed.contains("scam"), "two supporters must not be adopted");
}

#[test]
fn duplicate_validator_addresses_do_not_double_count() {
    // One validator repeated twice still counts as a single supporter: floor(4/3) = 1, and a
    // single supporter is never enough.
    let validators = addresses(&keygen(4));
    let repeated = ValidatorExtension::new(validators[0], WordList::decode("spam").unwrap());
    let extensions = vec![repeated.clone(), repeated];

    let agreed = quorum_words(&extensions, validators.len());
    assert!(agreed.is_empty());
}

#[test]
fn agreed_words_keep_first_seen_order() {
    let validators = addresses(&keygen(3));
    let extensions: Vec<ValidatorExtension> = validators
        .iter()
        .map(|validator| {
            ValidatorExtension::new(*validator, WordList::decode("scam|spam").unwrap())
        })
        .collect();

    let agreed = quorum_words(&extensions, validators.len());
    assert_eq!(agreed.encode(), "scam|spam");
}

#[test]
fn three_of_four_validators_adopt_a_word() {
    // From the protocol description: registry of 4, three extensions containing {spam}, one
    // empty. floor(4/3) = 1 and 3 > 1, so "spam" is adopted.
    let validators = addresses(&keygen(4));
    let extensions: Vec<ValidatorExtension> = validators
        .iter()
        .enumerate()
        .map(|(i, validator)| {
            let payload = if i < 3 { "spam" } else { "" };
            ValidatorExtension::new(*validator, WordList::decode(payload).unwrap())
        })
        .collect();

    let agreed = quorum_words(&extensions, validators.len());
    assert_eq!(agreed.encode(), "spam");
}

#[test]
fn empty_registry_adopts_nothing() {
    let extensions: Vec<ValidatorExtension> = Vec::new();
    assert!(quorum_words(&extensions, 0).is_empty());
}

#[test]
fn addresses_are_deterministic_per_key() {
    let keys = keygen(1);
    assert_eq!(ValidatorAddress::of(&keys[0]), ValidatorAddress::of(&keys[0]));
}
