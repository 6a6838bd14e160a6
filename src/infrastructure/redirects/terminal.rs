#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use owo_colors::OwoColorize;
use owo_colors::Stream;

use crate::domain::models::AuthRedirect;

pub const SESSION_EXPIRED_NOTICE: &str =
    "Your session has expired or is invalid. Run `shotsmith login` to sign in again.";

/// Terminal stand-in for navigating to the sign-in page: prints a notice on
/// stderr once per rejected request.
#[derive(Default)]
pub struct TerminalRedirect {
    on_auth_view: bool,
    redirects: AtomicUsize,
}

impl TerminalRedirect {
    /// Used by `login` and `register`, where a 401 means bad credentials
    /// rather than an expired session.
    pub fn on_auth_view() -> TerminalRedirect {
        return TerminalRedirect {
            on_auth_view: true,
            redirects: AtomicUsize::new(0),
        };
    }

    pub fn redirect_count(&self) -> usize {
        return self.redirects.load(Ordering::SeqCst);
    }
}

impl AuthRedirect for TerminalRedirect {
    fn is_on_auth_view(&self) -> bool {
        return self.on_auth_view;
    }

    fn redirect_to_auth(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        eprintln!(
            "{}",
            SESSION_EXPIRED_NOTICE.if_supports_color(Stream::Stderr, |text| return text.yellow())
        );
    }
}
