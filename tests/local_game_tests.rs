use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{AutoPlayer, LocalGame, TOTAL_SHIP_CELLS};

#[test]
fn auto_players_finish_a_hot_seat_game() {
    for seed in 0..8 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut game = LocalGame::new(Box::new(AutoPlayer::new()), Box::new(AutoPlayer::new()));
        let winner = game.run(&mut rng).unwrap();
        assert_eq!(game.winner(), Some(winner));
        assert!(game.board(winner.other()).is_defeated());
        assert!(!game.board(winner).is_defeated());
        assert!(game.shots(winner) >= TOTAL_SHIP_CELLS);
    }
}

#[test]
fn a_hit_keeps_the_turn() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut game = LocalGame::new(Box::new(AutoPlayer::new()), Box::new(AutoPlayer::new()));
    game.setup(&mut rng).unwrap();
    while game.winner().is_none() {
        let shooter = game.turn();
        let target = shooter.other();
        let before = game.board(target).hits().count_ones();
        game.play_turn(&mut rng).unwrap();
        let hit = game.board(target).hits().count_ones() > before;
        if game.winner().is_none() {
            if hit {
                assert_eq!(game.turn(), shooter);
            } else {
                assert_eq!(game.turn(), target);
            }
        }
    }
}
