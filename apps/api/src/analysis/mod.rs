// Read-only analysis over a content tree: who plays which role, where the real content
// sits, and what looks wrong afterwards.

pub mod bounds;
pub mod roles;
pub mod warnings;

pub use bounds::combine_child_bounds;
pub use roles::{NodeRole, ResolvedRole, RoleClassifier};
pub use warnings::{collect_warnings, VariantWarning, WarningCode};
