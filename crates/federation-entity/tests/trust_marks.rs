//! Trust mark lifecycle against an in-process federation
//!
//! The anchor issues trust marks, the subject entity records them, its
//! Entity Configuration carries them, and the validator judges them against
//! a freshly resolved chain.

mod common;

use federation_core::Clock;
use federation_entity::trust_marks::{add_received_trust_mark, issue_trust_mark};
use federation_entity::{validate_trust_marks, TrustChainResolver};

use common::{four_node_line, publish};

const SIRTFI: &str = "https://refeds.org/sirtfi";

#[tokio::test]
async fn issued_mark_appears_in_entity_configuration() {
    let line = four_node_line();

    let mark = issue_trust_mark(&line.edugain, SIRTFI, "https://op.umu.se", None).unwrap();
    add_received_trust_mark(&line.op_umu, &mark).unwrap();
    publish(&line.fetcher, &line.op_umu);

    let resolver = TrustChainResolver::new(line.fetcher.clone());
    let result = resolver
        .resolve("https://op.umu.se", "https://edugain.geant.org")
        .await;
    assert!(result.valid, "errors: {:?}", result.errors);

    let config = &result.statements[0];
    assert_eq!(config.trust_marks(), vec![mark]);
}

#[tokio::test]
async fn mark_from_anchor_validates_against_chain() {
    let line = four_node_line();

    let mark = issue_trust_mark(&line.edugain, SIRTFI, "https://op.umu.se", None).unwrap();
    add_received_trust_mark(&line.op_umu, &mark).unwrap();
    publish(&line.fetcher, &line.op_umu);

    let resolver = TrustChainResolver::new(line.fetcher.clone());
    let result = resolver
        .resolve("https://op.umu.se", "https://edugain.geant.org")
        .await;
    assert!(result.valid, "errors: {:?}", result.errors);

    let verdicts = validate_trust_marks(
        &result.statements[0],
        "https://op.umu.se",
        &result.statements,
        line.clock.now(),
    );

    assert_eq!(verdicts.len(), 1);
    let verdict = &verdicts[0];
    assert!(verdict.valid, "error: {:?}", verdict.error);
    assert_eq!(verdict.trust_mark_id.as_deref(), Some(SIRTFI));
    assert_eq!(verdict.issuer.as_deref(), Some("https://edugain.geant.org"));
    assert_eq!(verdict.subject.as_deref(), Some("https://op.umu.se"));
}

#[tokio::test]
async fn tampered_mark_fails_signature_check() {
    let line = four_node_line();

    let mut mark = issue_trust_mark(&line.edugain, SIRTFI, "https://op.umu.se", None).unwrap();
    // Flip a character in the signature segment; the JWT still parses, so
    // intake accepts it, and only signature verification can catch it
    let last = mark.pop().unwrap();
    mark.push(if last == 'A' { 'B' } else { 'A' });

    add_received_trust_mark(&line.op_umu, &mark).unwrap();
    publish(&line.fetcher, &line.op_umu);

    let resolver = TrustChainResolver::new(line.fetcher.clone());
    let result = resolver
        .resolve("https://op.umu.se", "https://edugain.geant.org")
        .await;
    assert!(result.valid, "errors: {:?}", result.errors);

    let verdicts = validate_trust_marks(
        &result.statements[0],
        "https://op.umu.se",
        &result.statements,
        line.clock.now(),
    );

    assert_eq!(verdicts.len(), 1);
    assert!(!verdicts[0].valid);
    assert!(verdicts[0].error.as_ref().unwrap().contains("signature"));
}

#[tokio::test]
async fn expired_mark_is_rejected() {
    let line = four_node_line();

    let mark = issue_trust_mark(&line.edugain, SIRTFI, "https://op.umu.se", Some(3600)).unwrap();
    add_received_trust_mark(&line.op_umu, &mark).unwrap();
    publish(&line.fetcher, &line.op_umu);

    let resolver = TrustChainResolver::new(line.fetcher.clone());
    let result = resolver
        .resolve("https://op.umu.se", "https://edugain.geant.org")
        .await;
    assert!(result.valid, "errors: {:?}", result.errors);

    // Past the mark's lifetime
    line.clock.advance(7200);

    let verdicts = validate_trust_marks(
        &result.statements[0],
        "https://op.umu.se",
        &result.statements,
        line.clock.now(),
    );

    assert!(!verdicts[0].valid);
    assert!(verdicts[0].error.as_ref().unwrap().contains("expired"));
}

#[tokio::test]
async fn mark_from_issuer_outside_chain_is_rejected() {
    let line = four_node_line();

    // UMU's mark about OP.UMU is fine, but a mark from an entity with no
    // statement in the chain cannot be verified
    let stranger = common::entity(
        "ligo",
        "https://ligo.example.org",
        &line.fetcher,
        &line.clock,
    );
    let mark = issue_trust_mark(&stranger, SIRTFI, "https://op.umu.se", None).unwrap();
    add_received_trust_mark(&line.op_umu, &mark).unwrap();
    publish(&line.fetcher, &line.op_umu);

    let resolver = TrustChainResolver::new(line.fetcher.clone());
    let result = resolver
        .resolve("https://op.umu.se", "https://edugain.geant.org")
        .await;
    assert!(result.valid, "errors: {:?}", result.errors);

    let verdicts = validate_trust_marks(
        &result.statements[0],
        "https://op.umu.se",
        &result.statements,
        line.clock.now(),
    );

    assert!(!verdicts[0].valid);
    assert!(verdicts[0]
        .error
        .as_ref()
        .unwrap()
        .contains("issuer not in chain"));
}

#[tokio::test]
async fn intake_rejects_marks_about_other_entities() {
    let line = four_node_line();

    let mark = issue_trust_mark(&line.edugain, SIRTFI, "https://op.umu.se", None).unwrap();

    // UMU is not the subject of this mark
    let err = add_received_trust_mark(&line.umu, &mark).unwrap_err();
    assert!(matches!(
        err,
        federation_core::FederationError::SubjectMismatch { .. }
    ));
}

#[tokio::test]
async fn issuer_keeps_a_record_of_issued_marks() {
    let line = four_node_line();

    issue_trust_mark(&line.edugain, SIRTFI, "https://op.umu.se", None).unwrap();

    let issued = line.edugain.state.issued_trust_mark(SIRTFI).unwrap();
    assert_eq!(issued.issuer, "https://edugain.geant.org");
    assert_eq!(issued.subject, "https://op.umu.se");

    assert!(line.edugain.state.remove_issued_trust_mark(SIRTFI));
    assert!(line.edugain.state.issued_trust_mark(SIRTFI).is_none());
}
