//! Template extraction and storage
//!
//! The extractor pairs scanner markers into named [`Fragment`]s and stores
//! them in a [`Registry`]. Two declaration forms exist:
//!
//! ```text
//! //#line-template MapEntry
//! "key": "value",
//!
//! //#template begin PrintFunction
//! log_key: function () {
//!     console.log(MAP.key);
//! },
//! //#template end PrintFunction
//! ```
//!
//! Template names are global within a registry; a second definition of the
//! same name is an error, whatever its kind.

mod extractor;
mod fragment;
mod registry;

pub(crate) use extractor::{run, Extraction};
pub use extractor::extract_markers;
pub use fragment::{Fragment, FragmentKind, Provenance, SourceLine};
pub use registry::Registry;
