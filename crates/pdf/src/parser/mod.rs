//! Content-stream parsing: the backend seam, the operator interpreter and
//! the layout builder.

pub mod backend;
pub mod interpreter;
pub mod layout;
