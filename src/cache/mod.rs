//! Dependency snapshot cache
//!
//! Installed dependency trees are stored as tagged commits in a dedicated
//! git repository, keyed by a content hash of the manifest. Same manifest
//! = same tag, so a tree is resolved and installed once and then checked
//! out everywhere else.
//!
//! # Flow
//!
//! | Step | Component | On failure |
//! |------|-----------|------------|
//! | Hash the manifest | [`Manifest`] | fatal |
//! | Clone or refresh the mirror | [`MirrorLocator`] | fatal |
//! | Check out the tag | [`SnapshotResolver`] | slow path |
//! | Install, commit, tag, push | [`Sealer`] | fatal |
//!
//! Snapshots are never rewritten. Two machines sealing the same
//! fingerprint race on the tag push; the loser's run fails and its next
//! run takes the fast path.

pub mod manifest;
pub mod mirror;
pub mod seal;
pub mod snapshot;
pub mod sync;
#[cfg(test)]
pub(crate) mod testing;

pub use manifest::{Fingerprint, Manifest};
pub use mirror::{Mirror, MirrorLocator, MirrorState, MirrorStatus};
pub use seal::{Sealed, Sealer};
pub use snapshot::{Resolution, SnapshotResolver};
pub use sync::{resolve_repository, SyncOptions, SyncPath, SyncReport, Syncer};
