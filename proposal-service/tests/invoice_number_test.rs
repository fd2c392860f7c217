//! Invoice-number derivation.

use proposal_service::domain::invoice_number::{InvoiceSuffix, ProposalNumber};

#[test]
fn structured_numbers_swap_the_prefix() {
    let number = ProposalNumber::parse("PROP-2024-001");

    assert_eq!(
        number,
        ProposalNumber::Structured {
            id: "2024-001".to_string()
        }
    );
    assert_eq!(
        number.invoice_number(InvoiceSuffix::Upfront),
        "INV-2024-001-1"
    );
    assert_eq!(
        number.invoice_number(InvoiceSuffix::FirstRecurring),
        "INV-2024-001-R1"
    );
}

#[test]
fn opaque_numbers_get_the_suffix_verbatim() {
    let number = ProposalNumber::parse("X-55");

    assert_eq!(
        number,
        ProposalNumber::Opaque {
            raw: "X-55".to_string()
        }
    );
    assert_eq!(number.invoice_number(InvoiceSuffix::Upfront), "X-55-1");
    assert_eq!(
        number.invoice_number(InvoiceSuffix::FirstRecurring),
        "X-55-R1"
    );
}

#[test]
fn prefix_match_is_case_sensitive() {
    let number = ProposalNumber::parse("prop-77");

    assert!(matches!(number, ProposalNumber::Opaque { .. }));
    assert_eq!(number.invoice_number(InvoiceSuffix::Upfront), "prop-77-1");
}

#[test]
fn sequence_suffixes_count_up() {
    let number = ProposalNumber::parse("PROP-9");

    assert_eq!(number.invoice_number(InvoiceSuffix::Sequence(1)), "INV-9-1");
    assert_eq!(number.invoice_number(InvoiceSuffix::Sequence(7)), "INV-9-7");
}

#[test]
fn probing_starts_at_one() {
    let number = ProposalNumber::parse("PROP-2024-001");

    assert_eq!(number.next_sequential_number(&[]), "INV-2024-001-1");
}

#[test]
fn probing_skips_taken_numbers() {
    let number = ProposalNumber::parse("PROP-2024-001");
    let existing = vec![
        "INV-2024-001-1".to_string(),
        "INV-2024-001-2".to_string(),
    ];

    assert_eq!(number.next_sequential_number(&existing), "INV-2024-001-3");
}

#[test]
fn probing_fills_gaps_from_the_bottom() {
    let number = ProposalNumber::parse("PROP-2024-001");
    // -1 was deleted at some point; probing reuses the lowest free slot
    let existing = vec!["INV-2024-001-2".to_string()];

    assert_eq!(number.next_sequential_number(&existing), "INV-2024-001-1");
}

#[test]
fn probing_ignores_other_kinds_of_suffixes() {
    let number = ProposalNumber::parse("PROP-2024-001");
    let existing = vec!["INV-2024-001-R1".to_string()];

    assert_eq!(number.next_sequential_number(&existing), "INV-2024-001-1");
}
