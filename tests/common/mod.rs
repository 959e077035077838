#![allow(dead_code)]

pub mod recorder {
    use brrtstack::handler::{Handler, HandlerError, Next};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Shared log of which handlers ran, in order.
    #[derive(Clone, Default)]
    pub struct Trace(Arc<Mutex<Vec<String>>>);

    impl Trace {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, entry: impl Into<String>) {
            self.0.lock().push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }

        /// Request handler that records `label` and answers `next`.
        pub fn step(&self, label: &str, next: fn() -> Next) -> Handler {
            let trace = self.clone();
            let name = label_name(label);
            let label = label.to_string();
            Handler::request(move |_req, _res| {
                trace.push(label.clone());
                next()
            })
            .named(&name)
        }

        /// Error handler that records `label` plus the error text and answers `next`.
        pub fn catch(&self, label: &str, next: fn(HandlerError) -> Next) -> Handler {
            let trace = self.clone();
            let name = label_name(label);
            let label = label.to_string();
            Handler::error(move |err, _req, _res| {
                trace.push(format!("{label}:{err}"));
                next(err)
            })
            .named(&name)
        }
    }

    fn label_name(label: &str) -> String {
        format!("test_{label}")
    }

    pub fn cont() -> Next {
        Next::Continue
    }

    pub fn fail() -> Next {
        Next::Error(HandlerError::msg(500, "boom"))
    }

    pub fn rethrow(err: HandlerError) -> Next {
        Next::Error(err)
    }

    pub fn absorb(_err: HandlerError) -> Next {
        Next::Continue
    }
}

pub mod test_runtime {
    use std::sync::Once;

    static MAY_INIT: Once = Once::new();

    /// Configure the `may` runtime once per test binary
    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}
