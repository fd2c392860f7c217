//! Pure financial-derivation logic.
//!
//! Everything in here computes over already-loaded records and performs no
//! I/O; the handlers own loading, validation responses and writes.

pub mod billing;
pub mod generation;
pub mod invoice_number;
pub mod payment_terms;
