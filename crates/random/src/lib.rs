//! Random entity records for testing bulk-edit flows.
//!
//! [`string`] builds random strings from a token grammar, [`record`] builds
//! whole records from field templates with controlled divergence across a
//! set, and [`examples`] is a catalog of ready-made templates.

pub mod examples;
pub mod record;
pub mod string;

pub use examples::{ballot, breakout_room, comment, meeting, webex_account};
pub use record::{FieldKind, FieldTemplate, RecordTemplate};
pub use string::{random_string, Token};
