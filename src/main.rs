use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::{
    init_logging, AutoPlayer, CliPlayer, LocalGame, MatchOutcome, NetConfig, Player, Role, Seat,
    Session, TurnSynchronizer, DEFAULT_PORT,
};

#[derive(Parser)]
#[command(author, version, about = "Two-player sea battle over a direct TCP link", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PlayerType {
    Human,
    Auto,
}

#[derive(Subcommand)]
enum Commands {
    /// Play on this machine, either hot-seat or against the computer.
    Local {
        #[arg(long, value_enum, default_value_t = PlayerType::Auto)]
        opponent: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Host a game and wait for the other player to join.
    Host {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Join a game hosted by another player.
    Join {
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {s} (game will be reproducible)");
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

fn make_player(kind: PlayerType, name: &str) -> Box<dyn Player> {
    match kind {
        PlayerType::Human => Box::new(CliPlayer::stdio(name)),
        PlayerType::Auto => Box::new(AutoPlayer::new()),
    }
}

fn run_local(opponent: PlayerType, seed: Option<u64>) -> anyhow::Result<()> {
    let mut rng = make_rng(seed);
    let second = match opponent {
        PlayerType::Human => make_player(PlayerType::Human, "Player 2"),
        PlayerType::Auto => make_player(PlayerType::Auto, "Computer"),
    };
    let mut game = LocalGame::new(make_player(PlayerType::Human, "Player 1"), second);
    let winner = game.run(&mut rng)?;
    match winner {
        Seat::First => println!("Player 1 wins after {} shots!", game.shots(winner)),
        Seat::Second => println!("Player 2 wins after {} shots!", game.shots(winner)),
    }
    Ok(())
}

async fn run_network(
    mut session: Session,
    role: Role,
    kind: PlayerType,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    if role == Role::Host {
        if let Some(addr) = session.local_info() {
            println!(
                "Waiting for a player to join on port {} (any local address)...",
                addr.port()
            );
        }
        session.wait_until_connected().await?;
    }
    if let Some(peer) = session.peer_info() {
        println!("Connected to {peer}");
    }

    let mut rng = make_rng(seed);
    let mut player = make_player(kind, "You");
    let board = player.place_ships(&mut rng)?;
    println!("Waiting for the other player's fleet...");

    let config = *session.config();
    let result = {
        let mut sync = TurnSynchronizer::new(&session, board, role, &config);
        let outcome = sync.run(&mut player, &mut rng).await;
        log::info!("{:?}", sync.report());
        outcome
    };
    session.disconnect().await;

    match result? {
        MatchOutcome::Won => println!("You won!"),
        MatchOutcome::Lost => println!("You lost."),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { opponent, seed } => run_local(opponent, seed)?,
        Commands::Host { port, player, seed } => {
            let mut session = Session::new(NetConfig::default());
            session.host_game(port).await?;
            run_network(session, Role::Host, player, seed).await?;
        }
        Commands::Join {
            ip,
            port,
            player,
            seed,
        } => {
            println!("Connecting to {ip}:{port}...");
            let mut session = Session::new(NetConfig::default());
            session.join_game(&ip, port).await?;
            run_network(session, Role::Join, player, seed).await?;
        }
    }
    Ok(())
}
