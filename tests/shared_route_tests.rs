//! Tests for concurrent use of routes
//!
//! - `SharedRoute` registration while snapshots are in use
//! - Dispatch on `may` coroutines via `Route::spawn_dispatch`

#![allow(clippy::unwrap_used, clippy::expect_used, unsafe_code)]

mod common;

use brrtstack::context::{Request, Response};
use brrtstack::handler::{Handler, Next};
use brrtstack::route::{Completion, Route, SharedRoute};
use brrtstack::runtime_config::RuntimeConfig;
use common::recorder::{cont, Trace};
use common::test_runtime::setup_may_runtime;
use http::Method;
use may::sync::mpsc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Counts INFO events emitted by this crate.
struct InfoCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for InfoCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::INFO && meta.target().starts_with("brrtstack") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_registration_is_visible_to_new_snapshots_only() {
    let trace = Trace::new();
    let shared = SharedRoute::new(Route::new("/a").unwrap());
    let before = shared.load();
    shared.register("get", trace.step("late", cont)).unwrap();

    let mut req = Request::new(Method::GET, "/a");
    let mut res = Response::new();
    assert!(matches!(before.run(&mut req, &mut res), Completion::Passed));
    assert!(trace.entries().is_empty());

    shared.run(&mut req, &mut res);
    assert_eq!(trace.entries(), vec!["late"]);
    assert!(shared.load().supports_method("get"));
}

#[test]
fn test_shared_route_rejects_invalid_registration() {
    let shared = SharedRoute::from(Route::new("/a").unwrap());
    assert!(shared.register("bad method", Handler::request(|_r, _s| Next::Continue)).is_err());
    assert!(shared.load().is_empty());
}

#[test]
fn test_concurrent_registration_loses_nothing() {
    let shared = Arc::new(SharedRoute::new(Route::new("/a").unwrap()));
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for j in 0..10 {
                    let name = format!("h{i}_{j}");
                    shared
                        .all(Handler::request(|_r, _s| Next::Continue).named(&name))
                        .unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(shared.load().stack().len(), 80);
}

#[test]
fn test_concurrent_registration_logs_once_per_call() {
    let count = Arc::new(AtomicUsize::new(0));
    let dispatch = tracing::Dispatch::new(
        tracing_subscriber::registry().with(InfoCounter(Arc::clone(&count))),
    );
    let shared = Arc::new(SharedRoute::new(Route::new("/a").unwrap()));
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let shared = Arc::clone(&shared);
            let dispatch = dispatch.clone();
            std::thread::spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    for _ in 0..10 {
                        shared.register("get", Handler::request(|_r, _s| Next::Continue)).unwrap();
                    }
                })
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(shared.load().stack().len(), 80);
    assert_eq!(count.load(Ordering::SeqCst), 80);
}

#[test]
fn test_empty_shared_registration_is_silent() {
    let count = Arc::new(AtomicUsize::new(0));
    let dispatch = tracing::Dispatch::new(
        tracing_subscriber::registry().with(InfoCounter(Arc::clone(&count))),
    );
    let shared = SharedRoute::new(Route::new("/a").unwrap());
    let before = shared.load();
    tracing::dispatcher::with_default(&dispatch, || {
        shared.register("get", Vec::<Handler>::new()).unwrap();
    });
    assert!(Arc::ptr_eq(&before, &shared.load()));
    assert!(!shared.load().supports_method("get"));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_shared_route_handle_matches_path() {
    let shared = SharedRoute::new(Route::new("/items/:id").unwrap());
    shared
        .register(
            "get",
            Handler::request(|req, res| {
                let id = req.param("id").unwrap_or_default().to_string();
                res.json(serde_json::json!({ "id": id }));
                Next::Halt
            }),
        )
        .unwrap();

    let mut req = Request::new(Method::GET, "/items/7");
    let mut res = Response::new();
    assert!(matches!(shared.handle(&mut req, &mut res), Completion::Handled));
    assert_eq!(res.body["id"], "7");
}

#[test]
fn test_spawn_dispatch_runs_on_coroutine() {
    setup_may_runtime();
    let mut route = Route::new("/pets/:id").unwrap();
    route
        .get(Handler::request(|req, res| {
            let id = req.param("id").unwrap_or_default().to_string();
            res.status(200).json(serde_json::json!({ "id": id }));
            Next::Halt
        }))
        .unwrap();
    let route = Arc::new(route);

    let mut req = Request::new(Method::GET, "/pets/5");
    req.params = route.pattern().matches(req.path()).unwrap().unwrap().params;

    let (tx, rx) = mpsc::channel();
    let config = RuntimeConfig::default();
    let handle = unsafe {
        route
            .spawn_dispatch(req, Response::new(), config.stack_size, move |completion, _req, res| {
                let _ = tx.send((matches!(completion, Completion::Handled), res));
            })
            .expect("spawn dispatch")
    };

    let (handled, res) = rx.recv().expect("completion");
    handle.join().expect("coroutine join");
    assert!(handled);
    assert_eq!(res.body["id"], "5");
}

#[test]
fn test_spawn_dispatch_reports_failure() {
    setup_may_runtime();
    let mut route = Route::new("/a").unwrap();
    route.get(Handler::request(|_req, _res| panic!("inside coroutine"))).unwrap();
    let route = Arc::new(route);

    let (tx, rx) = mpsc::channel();
    let handle = unsafe {
        route
            .spawn_dispatch(
                Request::new(Method::GET, "/a"),
                Response::new(),
                0x8000,
                move |completion, _req, _res| {
                    let status = match completion {
                        Completion::Failed(err) => err.status(),
                        _ => 0,
                    };
                    let _ = tx.send(status);
                },
            )
            .expect("spawn dispatch")
    };

    assert_eq!(rx.recv().expect("completion"), 500);
    handle.join().expect("coroutine join");
}
