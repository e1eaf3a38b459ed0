//! Login / registration modal state

pub mod code_input;
pub mod countdown;
pub mod flow;

pub use code_input::{CodeInput, CODE_LENGTH};
pub use countdown::{Countdown, RESEND_COOLDOWN_SECS};
pub use flow::{AuthCall, AuthFlow, AuthOutcome, AuthRequest, AuthResponse, AuthStep};
