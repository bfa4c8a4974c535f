//! Multi-image enrollment.
//!
//! Sign-up collects several frames from a capture session. The session
//! itself only ever holds one frame; the buffer here is the layer that
//! accumulates them, in capture order.

mod buffer;

pub use buffer::EnrollmentBuffer;
