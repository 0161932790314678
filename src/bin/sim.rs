use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{
    AutoPlayer, InMemoryLink, MatchOutcome, MatchReport, NetConfig, Player, Role, TurnSynchronizer,
};
use serde_json::json;

async fn play(link: InMemoryLink, role: Role, seed: u64) -> anyhow::Result<MatchReport> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut player = AutoPlayer::new();
    let board = player.place_ships(&mut rng)?;
    let config = NetConfig::default();
    let mut sync = TurnSynchronizer::new(&link, board, role, &config);
    sync.run(&mut player, &mut rng).await?;
    Ok(sync.report())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let (l1, l2) = InMemoryLink::pair();
    let (r1, r2) = tokio::try_join!(play(l1, Role::Host, seed1), play(l2, Role::Join, seed2))?;

    let winner = match (r1.outcome, r2.outcome) {
        (Some(MatchOutcome::Won), Some(MatchOutcome::Lost)) => Some("player1"),
        (Some(MatchOutcome::Lost), Some(MatchOutcome::Won)) => Some("player2"),
        _ => None,
    };

    let result = json!({
        "player1": r1,
        "player2": r2,
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
