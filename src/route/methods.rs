//! The canonical HTTP method list and the per-verb registration surface.
//!
//! One macro invocation produces both [`METHODS`] and a `Route::<verb>` method
//! for every entry, so the list and the API cannot drift apart. Every generated
//! method forwards to [`Route::register`].

use super::Route;
use crate::error::RouteError;
use crate::handler::HandlerArg;

macro_rules! http_methods {
    ($($fn_name:ident => $name:literal),* $(,)?) => {
        /// Canonical HTTP method names, lower-cased.
        pub const METHODS: &[&str] = &[$($name),*];

        impl Route {
            $(
                #[doc = concat!("Register handlers for `", $name, "` requests.")]
                ///
                /// # Errors
                ///
                /// See [`Route::register`].
                pub fn $fn_name(
                    &mut self,
                    handlers: impl Into<HandlerArg>,
                ) -> Result<&mut Self, RouteError> {
                    self.register($name, handlers)
                }
            )*
        }
    };
}

http_methods! {
    acl => "acl",
    bind => "bind",
    checkout => "checkout",
    connect => "connect",
    copy => "copy",
    delete => "delete",
    get => "get",
    head => "head",
    link => "link",
    lock => "lock",
    m_search => "m-search",
    merge => "merge",
    mkactivity => "mkactivity",
    mkcalendar => "mkcalendar",
    mkcol => "mkcol",
    r#move => "move",
    notify => "notify",
    options => "options",
    patch => "patch",
    post => "post",
    propfind => "propfind",
    proppatch => "proppatch",
    purge => "purge",
    put => "put",
    query => "query",
    rebind => "rebind",
    report => "report",
    search => "search",
    source => "source",
    subscribe => "subscribe",
    trace => "trace",
    unbind => "unbind",
    unlink => "unlink",
    unlock => "unlock",
    unsubscribe => "unsubscribe",
}

/// Whether `method` (any case) is one of [`METHODS`].
#[must_use]
pub fn is_standard_method(method: &str) -> bool {
    METHODS.iter().any(|m| m.eq_ignore_ascii_case(method))
}
