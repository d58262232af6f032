use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use adjudicator::board::standard::{AUSTRIA, ENGLAND, FRANCE, GERMANY, ITALY, RUSSIA, TURKEY};
use adjudicator::board::{
    opening_position, standard_map, validate_order, MapTopology, Order, Phase, PhaseKind, Position, Power,
};
use adjudicator::config::Rules;
use adjudicator::game::{process_many, Game, Judge, TurnState};
use adjudicator::protocol::dson::parse_orders;
use adjudicator::resolve::Resolver;

/// A busy Spring 1901: every power moves, with supports and a bounce.
const OPENING_ORDERS: [(Power, &str); 7] = [
    (AUSTRIA, "A vie - gal ; A bud - ser ; F tri - alb"),
    (ENGLAND, "F lon - nth ; F edi - nrg ; A lvp - yor"),
    (FRANCE, "A par - bur ; A mar S A par - bur ; F bre - mao"),
    (GERMANY, "A mun - bur ; A ber - kie ; F kie - den"),
    (ITALY, "A ven - tyr ; A rom - apu ; F nap - ion"),
    (RUSSIA, "A war - gal ; A mos - ukr ; F sev - bla ; F stp/sc - bot"),
    (TURKEY, "F ank - bla ; A con - bul ; A smy - arm"),
];

fn opening_turn(map: &MapTopology) -> TurnState {
    let mut turn = TurnState::new(Phase::spring(1901), opening_position(map).unwrap());
    for (power, text) in OPENING_ORDERS {
        turn.submit_orders(power, parse_orders(map, text).unwrap()).unwrap();
    }
    turn
}

fn normalized(map: &MapTopology, position: &Position, turn: &TurnState) -> Vec<(Order, Power)> {
    turn.orders()
        .filter_map(|(power, order)| {
            validate_order(map, position, PhaseKind::Movement, power, order)
                .ok()
                .map(|o| (o, power))
        })
        .collect()
}

fn bench_resolve_holds(c: &mut Criterion) {
    let map = standard_map();
    let position = opening_position(&map).unwrap();
    // Units without orders hold.
    let orders: Vec<(Order, Power)> = Vec::new();
    c.bench_function("resolve_22_holds", |b| {
        let mut resolver = Resolver::new(&map);
        b.iter(|| resolver.resolve(black_box(&orders), black_box(&position)))
    });
}

fn bench_resolve_opening(c: &mut Criterion) {
    let map = standard_map();
    let turn = opening_turn(&map);
    let orders = normalized(&map, turn.position(), &turn);
    c.bench_function("resolve_opening_moves", |b| {
        let mut resolver = Resolver::new(&map);
        b.iter(|| resolver.resolve(black_box(&orders), black_box(turn.position())))
    });
}

fn bench_adjudicate_phase(c: &mut Criterion) {
    let map = Arc::new(standard_map());
    let judge = Judge::new(map.clone(), Rules::default());
    let turn = opening_turn(&map);
    c.bench_function("adjudicate_opening_phase", |b| {
        b.iter(|| judge.adjudicate(black_box(turn.clone())))
    });
}

fn bench_process_many(c: &mut Criterion) {
    c.bench_function("process_many_64_games", |b| {
        b.iter(|| {
            let mut games: Vec<Game> = (0..64).map(|_| Game::standard(Rules::default()).unwrap()).collect();
            process_many(black_box(&mut games))
        })
    });
}

fn bench_position_clone(c: &mut Criterion) {
    let map = standard_map();
    let position = opening_position(&map).unwrap();
    c.bench_function("position_clone", |b| b.iter(|| black_box(&position).clone()));
}

criterion_group!(
    benches,
    bench_resolve_holds,
    bench_resolve_opening,
    bench_adjudicate_phase,
    bench_process_many,
    bench_position_clone,
);
criterion_main!(benches);
