use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::StatusCode;
use waymark::{respond, Context, Engine, HandlerResult, Request, Response};

fn ok(_cx: &Context) -> HandlerResult {
    respond(Response::text(StatusCode::OK, "ok"))
}

fn example_engine() -> Engine {
    Engine::build(|root| {
        root.get("/", ok);
        root.get("/zoo/animals", ok);
        root.post("/zoo/animals", ok);
        root.get(("animal", "/zoo/animals/{id:int}"), ok);
        root.get(("animal_toy", "/zoo/animals/{id:int}/toys/{toy:int}"), ok);
        root.get(
            (
                "habitat_section",
                "/zoo/{category}/animals/{id:int}/habitats/{habitat:int}/sections/{section:int}",
            ),
            ok,
        );
        root.get(("deep", "/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}"), ok);
        root.get(("asset", "/assets/{file:path}"), ok);
        root.get(("archive", "/archive[/{page:int}]"), ok);
    })
    .expect("failed to build engine")
}

fn bench_match_throughput(c: &mut Criterion) {
    let engine = example_engine();
    c.bench_function("route_match", |b| {
        let requests = [
            Request::get("/zoo/animals/123"),
            Request::get("/zoo/animals/123/toys/456"),
            Request::get("/zoo/cats/animals/123/habitats/88/sections/5"),
            Request::get("/complex/1/2/3/4/5/6/7/8/9"),
            Request::get("/assets/css/site.css"),
        ];
        b.iter(|| {
            for request in requests.iter() {
                let res = engine.dispatch(request);
                black_box(&res);
            }
        })
    });

    c.bench_function("redirect_match", |b| {
        let requests = [
            Request::get("/zoo/animals/"),
            Request::get("/ZOO/ANIMALS"),
        ];
        b.iter(|| {
            for request in requests.iter() {
                let res = engine.dispatch(request);
                black_box(&res);
            }
        })
    });

    c.bench_function("url_build", |b| {
        b.iter(|| {
            let url = engine.url("animal_toy", (123, 456));
            black_box(&url);
        })
    });
}

criterion_group!(benches, bench_match_throughput);
criterion_main!(benches);
