//! Editor-facing analysis over tokenized CSDL.
//!
//! Everything here works on the token stream produced by `csdl-parser` and talks to the host
//! editor through narrow traits, so the same logic serves a browser widget, a terminal
//! editor or the `csdl` command line tool.
//!
//!     completion     context-aware candidates for the token under the cursor
//!     folding        collapsing long string literals into placeholders
//!     smart_fields   list / geo value editors for operator arguments
//!     list_value     comma list and basic CSV codecs used by the list editor
//!     geo_value      coordinate codecs used by the geo selection editor
//!     help           per-target help text cache

pub mod completion;
pub mod folding;
pub mod geo_value;
pub mod help;
pub mod list_value;
pub mod smart_fields;

pub use completion::{
    compute_completions, CompletionCandidate, CompletionContext, CompletionList, CompletionSession,
};
pub use folding::{FoldOptions, FoldRegistry, FoldSurface, GutterMarker, MarkerId};
pub use geo_value::{GeoPoint, GeoShape, GeoValue, GeoValueError};
pub use help::{HelpOptions, TargetHelp};
pub use list_value::{format_list, parse_csv, parse_list, CsvImport};
pub use smart_fields::{smart_field_at, SmartField, SmartFieldKind, TextEdit};
