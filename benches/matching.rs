use brrtstack::context::{Request, Response};
use brrtstack::handler::{Handler, Next};
use brrtstack::layer::{MatchOptions, PathPattern};
use brrtstack::route::Route;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use std::hint::black_box;

fn bench_pattern_match(c: &mut Criterion) {
    let root = PathPattern::new("/", MatchOptions::prefix()).expect("root pattern");
    let wildcard = PathPattern::new("*", MatchOptions::default()).expect("wildcard pattern");
    let params = PathPattern::new(
        "/zoo/:category/animals/:id/habitats/:habitat_id",
        MatchOptions::default(),
    )
    .expect("param pattern");

    let paths = [
        "/zoo/cats/animals/123/habitats/88",
        "/zoo/dogs/animals/7/habitats/a%20b",
        "/zoo/animals",
    ];

    c.bench_function("match_fast_root", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(root.matches(path).ok());
            }
        })
    });
    c.bench_function("match_fast_wildcard", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(wildcard.matches(path).ok());
            }
        })
    });
    c.bench_function("match_params", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(params.matches(path).ok());
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let mut route = Route::new("/zoo/:id").expect("route");
    for _ in 0..8 {
        route
            .all(Handler::request(|_req, _res| Next::Continue))
            .expect("register");
    }
    route
        .post(Handler::request(|_req, _res| Next::Continue))
        .expect("register")
        .get(Handler::request(|_req, res| {
            res.status(204);
            Next::Halt
        }))
        .expect("register");

    c.bench_function("route_handle", |b| {
        b.iter(|| {
            let mut req = Request::new(Method::GET, "/zoo/42");
            let mut res = Response::new();
            black_box(route.handle(&mut req, &mut res));
        })
    });
}

criterion_group!(benches, bench_pattern_match, bench_dispatch);
criterion_main!(benches);
