//! Authentication service client.
//!
//! Turns sign-in and sign-up requests into JSON POSTs against the
//! configured service and folds every response, including transport
//! faults, into an [`AuthenticationOutcome`].
//!
//! # Wire Format
//!
//! ```text
//! POST <base>/signin  {"username": "...", "image": "data:image/jpeg;base64,..." | null}
//! POST <base>/signup  {"username": "...", "password": "...", "images": ["data:..."]}
//! response            {"success": true | false, "message"?: "..."}
//! ```

mod config;
mod http;
mod outcome;
mod request;

pub use config::{ServiceConfig, APP_USER_AGENT};
pub use http::{AuthenticationClient, ClientError};
pub use outcome::{AuthFailure, AuthenticationOutcome, Endpoint};
pub use request::{SigninRequest, SignupRequest};
