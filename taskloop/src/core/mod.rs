//! Pure parsing and text-surgery logic. No I/O, fully testable in isolation.

pub mod directive;
pub mod extract;
pub mod section;
