//! Invoice-number derivation from proposal numbers.

use std::fmt;

const PROPOSAL_PREFIX: &str = "PROP-";
const INVOICE_PREFIX: &str = "INV-";

/// Parsed form of a proposal number, so suffixing never re-checks prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalNumber {
    /// Matches the `PROP-` convention; `id` is the part after the prefix.
    Structured { id: String },
    /// Anything else; suffixes are appended to the raw string verbatim.
    Opaque { raw: String },
}

impl ProposalNumber {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PROPOSAL_PREFIX) {
            Some(id) => ProposalNumber::Structured { id: id.to_string() },
            None => ProposalNumber::Opaque {
                raw: raw.to_string(),
            },
        }
    }

    /// The invoice-number base this proposal number maps to.
    fn invoice_base(&self) -> String {
        match self {
            ProposalNumber::Structured { id } => format!("{}{}", INVOICE_PREFIX, id),
            ProposalNumber::Opaque { raw } => raw.clone(),
        }
    }

    pub fn invoice_number(&self, suffix: InvoiceSuffix) -> String {
        format!("{}{}", self.invoice_base(), suffix)
    }

    /// Lowest-numbered free sequence suffix, probing `-1`, `-2`, … against
    /// the proposal's existing invoice numbers.
    pub fn next_sequential_number(&self, existing: &[String]) -> String {
        let mut n: u32 = 1;
        loop {
            let candidate = self.invoice_number(InvoiceSuffix::Sequence(n));
            if !existing.iter().any(|e| e == &candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Suffix distinguishing the invoice kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSuffix {
    Upfront,
    FirstRecurring,
    Sequence(u32),
}

impl fmt::Display for InvoiceSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceSuffix::Upfront => write!(f, "-1"),
            InvoiceSuffix::FirstRecurring => write!(f, "-R1"),
            InvoiceSuffix::Sequence(n) => write!(f, "-{}", n),
        }
    }
}
