//! Walkthrough: Joe, Quentin and Aaron become (and stop being) friends
//!
//! ```sh
//! RUST_LOG=friendly=debug cargo run --example walkthrough
//! ```

use anyhow::Result;
use friendly::prelude::*;
use tracing_subscriber::EnvFilter;

struct User {
    id: Uuid,
    name: &'static str,
}

impl User {
    fn new(name: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

impl Entity for User {
    fn type_path() -> &'static str {
        "Social::User"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

fn names(ids: &[Uuid], people: &[&User]) -> Vec<&'static str> {
    ids.iter()
        .filter_map(|id| people.iter().find(|p| p.id == *id).map(|p| p.name))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("friendly=info")),
        )
        .init();

    let bus = EventBus::default();
    let mut events = bus.subscribe();
    let registry =
        FriendlyRegistry::new(Arc::new(InMemoryRepository::new())).with_event_bus(bus.clone());
    let users = registry.enable_friendly::<User>(FriendlyOptions::default())?;

    println!("Join type schema:\n{}", registry.schema_sql());

    let joe = User::new("Joe");
    let quentin = User::new("Quentin");
    let aaron = User::new("Aaron");
    let everyone = [&joe, &quentin, &aaron];

    users.request_friendship(&joe, &quentin).await?;
    println!(
        "Quentin's friends after Joe asked: {:?}",
        names(&users.friends(&quentin).await?, &everyone)
    );

    users.confirm_friendship_with(&quentin, &joe).await?;
    println!(
        "Joe's friends after Quentin confirmed: {:?}",
        names(&users.friends(&joe).await?, &everyone)
    );

    users.request_friendship(&joe, &aaron).await?;
    println!(
        "Aaron has a request from Joe to accept: {}",
        users.is_friendship_to_accept(&aaron, &joe).await?
    );

    users.end_friendship_with(&quentin, &joe).await?;
    println!(
        "Joe's friends after Quentin ended it: {:?}",
        names(&users.friends(&joe).await?, &everyone)
    );

    while let Ok(envelope) = events.try_recv() {
        println!("event: {} on {}", envelope.event.action(), envelope.event.join_type());
    }

    Ok(())
}
