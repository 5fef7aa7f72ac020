use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mlb_edge::odds_fetch::parse_odds_api_json;
use mlb_edge::sample_slate::{seed_odds, seed_projections};
use mlb_edge::team_names::TeamNameMap;
use mlb_edge::top_picks::select_top;
use mlb_edge::valuation::{OddsEncoding, ProjectionRecord, evaluate_slate};

const ODDS_JSON: &str = include_str!("../tests/fixtures/odds_api.json");

fn big_slate(copies: usize) -> Vec<ProjectionRecord> {
    let base = seed_projections();
    (0..copies)
        .flat_map(|idx| {
            base.iter().map(move |r| {
                let mut r = r.clone();
                r.away_runs += (idx % 7) as f64 * 0.1;
                r
            })
        })
        .collect()
}

fn bench_evaluate_slate(c: &mut Criterion) {
    let records = big_slate(200);
    let odds = seed_odds();
    c.bench_function("evaluate_slate_1400", |b| {
        b.iter(|| {
            let evals = evaluate_slate(black_box(&records), black_box(&odds));
            black_box(evals.len());
        })
    });
}

fn bench_select_top(c: &mut Criterion) {
    let records = big_slate(200);
    let evals = evaluate_slate(&records, &seed_odds());
    c.bench_function("select_top_3", |b| {
        b.iter(|| {
            let top = select_top(black_box(&evals), 3);
            black_box(top.len());
        })
    });
}

fn bench_odds_parse(c: &mut Criterion) {
    let names = TeamNameMap::mlb_default();
    c.bench_function("odds_api_parse", |b| {
        b.iter(|| {
            let lookup =
                parse_odds_api_json(black_box(ODDS_JSON), OddsEncoding::American, &names).unwrap();
            black_box(lookup.len());
        })
    });
}

criterion_group!(benches, bench_evaluate_slate, bench_select_top, bench_odds_parse);
criterion_main!(benches);
