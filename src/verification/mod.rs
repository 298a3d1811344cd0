//! Email-ownership verification: signed links, verify/notice/resend handlers.

mod handlers;
mod link;

pub use handlers::{notice, resend, verify};
pub use link::{LinkSigner, SignedLink};
