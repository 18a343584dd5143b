use criterion::{black_box, criterion_group, criterion_main, Criterion};
use draughts::core::{
    all_maximal_sequences, evaluate_winner, resolve_chain, selectable_moves, Board, MatchState,
};
use draughts::sync::{build_move_message, parse_message, Envelope};
use draughts::types::{Move, Piece, Player, Pos};

/// Kings and men spread so that several long chains compete
fn busy_board() -> Board {
    [
        (7, 0, Piece::man(Player::One)),
        (6, 1, Piece::man(Player::Two)),
        (4, 1, Piece::man(Player::Two)),
        (4, 3, Piece::man(Player::Two)),
        (2, 1, Piece::man(Player::Two)),
        (2, 3, Piece::man(Player::Two)),
        (2, 5, Piece::man(Player::Two)),
        (4, 4, Piece::king(Player::One)),
        (0, 7, Piece::man(Player::Two)),
    ]
    .into_iter()
    .fold(Board::blank(), |b, (r, c, p)| b.place(Pos::new(r, c), p))
}

fn bench_selectable_moves(c: &mut Criterion) {
    let board = Board::initial();

    c.bench_function("selectable_moves_initial", |b| {
        b.iter(|| {
            for (pos, _) in board.pieces_of(Player::One) {
                black_box(selectable_moves(black_box(&board), pos, Player::One));
            }
        })
    });
}

fn bench_chain_search(c: &mut Criterion) {
    let board = busy_board();

    c.bench_function("all_maximal_sequences", |b| {
        b.iter(|| all_maximal_sequences(black_box(&board), Pos::new(7, 0)))
    });

    c.bench_function("resolve_chain", |b| {
        b.iter(|| {
            resolve_chain(
                black_box(&board),
                Pos::new(7, 0),
                Move::jump(Pos::new(5, 2), Pos::new(6, 1)),
            )
        })
    });
}

fn bench_evaluate_winner(c: &mut Criterion) {
    let board = Board::initial();

    c.bench_function("evaluate_winner", |b| {
        b.iter(|| evaluate_winner(black_box(&board)))
    });
}

fn bench_move_message(c: &mut Criterion) {
    let state = MatchState::new();
    let line = Envelope::Move(build_move_message("bench", &state))
        .to_line()
        .unwrap_or_default();

    c.bench_function("encode_move_message", |b| {
        b.iter(|| Envelope::Move(build_move_message("bench", black_box(&state))).to_line())
    });

    c.bench_function("parse_move_message", |b| {
        b.iter(|| parse_message(black_box(&line)))
    });
}

criterion_group!(
    benches,
    bench_selectable_moves,
    bench_chain_search,
    bench_evaluate_winner,
    bench_move_message
);
criterion_main!(benches);
