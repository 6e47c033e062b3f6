//! Planning interactive rebases from an in-memory commit graph.

pub mod cancel;
pub mod config;
pub mod editor;
pub mod entry;
pub mod metadata;
pub mod rebase;
pub mod rebase_log;
pub mod repository;

pub use cancel::{CancellationFlag, CancellationSignal, Cancelled, NeverCancelled};
pub use config::{ConfigError, ResolverConfig, RootPolicy};
pub use editor::{validate_entries, EditorError, LogRebaseEditorHandler};
pub use entry::{format_todo, parse_todo, GeneratedEntry, RebaseAction, RebaseEntry, TodoError};
pub use metadata::{CommitMetadata, MetadataError, MetadataLookup, Signature};
pub use rebase::{PlanError, PlanSource, RebasePlan, RebasePlanner};
pub use rebase_log::{LinearHistoryResolver, Reason, RebaseLogError, ResolveError, ResolvedHistory};
pub use repository::Repository;
