//! Component deduplication and playbook synthesis.
//!
//! One pass, tightly coupled: the synthesized playbook's source list is
//! exactly the deduplicator's accepted set. Discovery walks each checkout
//! for component manifests; dedup claims declared names first-wins; the
//! playbook binds every accepted component to its checkout-relative path.

pub mod discover;
pub mod playbook;

pub use discover::{DiscoveryReport, MANIFEST_FILE, SkippedDuplicate, discover_components};
pub use playbook::{PLAYBOOK_FILE, Playbook, PlaybookSource, SITE_OUTPUT_DIR};
