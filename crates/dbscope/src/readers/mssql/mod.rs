//! SQL Server reader implementations.
//!
//! The second product family only needs the contracts its browse
//! surface uses: sequence metadata (which exercises the shared option
//! formatter) and the BCP format writer. Everything else resolves to
//! "capability not supported" in the reader factory.

mod sequence;

pub use sequence::SqlServerSequenceReader;
