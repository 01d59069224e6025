//! Ticket Credential Demo
//!
//! Walks one ticket through its lifecycle against in-memory stores:
//! - Organizer login (session token)
//! - Ticket issuance (credential, QR artifact, digest)
//! - Credential verification and digest lookup
//! - Scan-to-redeem, then a rejected second scan
//! - Event deletion cascading to its tickets
//!
//! # Usage
//!
//! ```bash
//! # Secrets come from the environment (or a .env file)
//! export SESSION_TOKEN_SECRET="$(openssl rand -hex 32)"
//! export TICKET_CREDENTIAL_SECRET="$(openssl rand -hex 32)"
//!
//! cargo run --bin demo
//! ```

use anyhow::Context;
use chrono::{Duration, Utc};
use gatepass_tickets::mocks::{MockEventRepository, MockTicketRepository, MockUserRepository};
use gatepass_tickets::types::{Event, EventId, User, UserId, UserRole};
use gatepass_tickets::{
    SessionAuthenticator, SessionIssuer, TicketEnvironment, TicketError, TicketManager,
    TicketingConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gatepass_tickets=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = TicketingConfig::from_env().context("loading ticketing configuration")?;

    println!("\n🎫 ============================================");
    println!("   Gatepass - Ticket Credential Demo");
    println!("============================================\n");

    // ========== Seed external entities ==========

    let organizer = User {
        id: UserId::new(),
        name: "Olga Organizer".to_string(),
        email: "olga@example.com".to_string(),
        role: UserRole::Organizer,
    };
    let holder = User {
        id: UserId::new(),
        name: "Hank Holder".to_string(),
        email: "hank@example.com".to_string(),
        role: UserRole::Buyer,
    };
    let event = Event {
        id: EventId::new(),
        name: "Summer Music Festival".to_string(),
        starts_at: Utc::now() + Duration::days(30),
        location: "Riverside Park".to_string(),
        organizer_id: organizer.id,
    };

    let (events, users, tickets) = (
        MockEventRepository::new(),
        MockUserRepository::new(),
        MockTicketRepository::new(),
    );
    users.insert(organizer.clone())?;
    users.insert(holder.clone())?;
    events.insert(event.clone())?;

    let env = TicketEnvironment::new(events, users.clone(), tickets);
    let clock = Arc::clone(&env.clock);
    let manager = TicketManager::new(env, &config);

    // Step 1: Organizer logs in
    println!("1️⃣  Organizer logs in...");
    let sessions = SessionIssuer::from_config(&config, Arc::clone(&clock));
    let authenticator = SessionAuthenticator::from_config(&config, clock, users);
    let header = format!("Bearer {}", sessions.issue(&organizer)?);
    let actor = authenticator.authenticate(&header).await?;
    println!("   ✓ Authenticated as {} ({})\n", actor.name, actor.role.as_str());

    // Step 2: Issue a ticket
    println!("2️⃣  Issuing ticket for {} to \"{}\"...", holder.name, event.name);
    let issued = manager.issue(event.id, holder.id).await?;
    println!("   ✓ Ticket {}", issued.ticket_id);
    println!("   ✓ Credential: {}…", &issued.token[..issued.token.len().min(48)]);
    println!("   ✓ Artifact: {} base64 chars\n", issued.artifact.len());

    // Step 3: Verify the credential offline
    println!("3️⃣  Verifying credential...");
    let claims = manager.verify_credential(&issued.token)?;
    println!(
        "   ✓ event={} holder={} status={}\n",
        claims.event_id, claims.holder_id, claims.status
    );

    // Step 4: Find by digest
    println!("4️⃣  Looking up ticket by artifact digest...");
    let stored = manager
        .tickets_for_holder(holder.id)
        .await?
        .into_iter()
        .next()
        .context("issued ticket missing from holder listing")?;
    let found = manager.find_by_digest(&stored.artifact_digest).await?;
    println!("   ✓ Digest {} → {:?}\n", stored.artifact_digest, found.map(|t| t.id));

    // Step 5: Scan at the gate
    println!("5️⃣  Scanning at the gate...");
    let status = manager.redeem_credential(&issued.token, actor.id).await?;
    println!("   ✓ Status now {status}");

    match manager.redeem_credential(&issued.token, actor.id).await {
        Err(e @ TicketError::InvalidTransition { .. }) => println!("   ✓ Second scan rejected: {e}\n"),
        other => anyhow::bail!("second scan should be rejected, got {other:?}"),
    }

    // Step 6: Delete the event
    println!("6️⃣  Deleting event...");
    let removed = manager.delete_event(event.id, actor.id).await?;
    println!("   ✓ Removed event and {removed} ticket(s)\n");

    println!("============================================");
    println!("   Demo complete");
    println!("============================================\n");

    Ok(())
}
