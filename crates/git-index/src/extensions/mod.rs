//! Trailing index extension blocks.
//!
//! Only the DIRC v2 base entries are given structured meaning; any extension
//! block (`TREE`, `REUC`, `UNTR`, or anything else a writer might have added)
//! is read as an opaque, signature-tagged byte blob and re-emitted verbatim
//! on write, so round-tripping an index never drops or corrupts data outside
//! the scope this store actually understands.

/// An opaque extension block, preserved for round-trip.
#[derive(Debug, Clone)]
pub struct RawExtension {
    pub signature: [u8; 4],
    pub data: Vec<u8>,
}
