use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use game_online::{Config, MemoryRoomStore, RoomClient, RoomError, RoomStore, StaticIdentity};
use game_types::Winner;

/// Plays one online round between simulated devices sharing an in-process
/// store. Every device votes for the first suspect on the roster.
async fn simulate(config: Config) -> Result<(), RoomError> {
    let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new());
    let names = ["Ana", "Ben", "Caro", "Dani"];

    let mut clients = Vec::with_capacity(names.len());
    for (i, _) in names.iter().enumerate() {
        let identity = StaticIdentity::new(format!("device-{}", i + 1));
        clients.push(RoomClient::connect(store.clone(), &identity, config.clone(), false).await?);
    }

    let host = &clients[0];
    let code = host.create_room(names[0]).await?;
    info!("{} opened room {}", names[0], code);

    for (client, name) in clients.iter().zip(names).skip(1) {
        if !client.join_room(&code.to_lowercase(), name).await? {
            warn!("{} could not find room {}", name, code);
            return Ok(());
        }
    }

    host.start_game().await?;
    host.start_voting().await?;

    let mut out: HashSet<String> = HashSet::new();
    let winner = loop {
        let Some(room) = host.state().await.room else {
            warn!("Room {} disappeared mid-game", code);
            break None;
        };
        let Some(suspect) = room
            .roster()
            .into_iter()
            .find(|p| !out.contains(&p.id) && p.id != room.host_id)
            .map(|p| p.id.clone())
        else {
            break None;
        };

        for client in clients.iter().filter(|c| c.player_id() != suspect) {
            if out.contains(client.player_id()) {
                continue;
            }
            if let Err(e) = client.submit_vote(&suspect).await {
                warn!("{} could not vote: {}", client.player_id(), e);
            }
        }
        if let Some(tally) = host.vote_tally().await {
            info!("Votes so far: {:?}", tally.counts);
        }

        let Some(outcome) = host.eliminate_player(&suspect).await? else {
            warn!("Elimination of {} did not go through", suspect);
            break None;
        };
        info!(
            "{} eliminated, impostor: {}, impostors left: {}",
            outcome.eliminated, outcome.was_impostor, outcome.remaining_impostors
        );
        out.insert(suspect);
        if outcome.winner.is_some() {
            break outcome.winner;
        }
    };

    match winner {
        Some(Winner::Civilians) => info!("Civilians found every impostor"),
        Some(Winner::Impostors) => info!("The impostors took over"),
        None => info!("Round ended without a winner"),
    }

    for client in clients.iter().rev() {
        client.leave_room().await?;
    }
    info!("Room {} closed", code);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::new();
    info!(
        "Simulating an online round ({} to {} players per room)",
        config.min_players_to_start, config.max_players_per_room
    );

    if let Err(e) = simulate(config).await {
        error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}
