//! Parsing of bundle text into page records and of page bodies into sections.
//!
//! Both parsers are pure functions of their input text. The bundle parser is
//! the only place in the core that can fail, and only when a bundle yields
//! zero pages; everything else is reported as a [`ParseDiagnostic`] and
//! absorbed downstream.

mod bundle;
mod diagnostic;
mod section;

pub use bundle::parse_bundle;
pub use diagnostic::ParseDiagnostic;
pub use section::extract_sections;
