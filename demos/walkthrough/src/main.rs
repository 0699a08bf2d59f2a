//! Scripted walkthrough of the booking engine.
//!
//! Runs every flow the engine offers against the in-memory backend: a
//! customer walks the wizard and submits, the operator drives the
//! booking to completion, an admin edits the catalog and the calendar.
//!
//! ```bash
//! cargo run --bin walkthrough
//! ```

use std::sync::Arc;

use tidybook_core::types::{
    Address, CleanerId, ContactInfo, FrequencyId, OptionId, ProofOfPayment, ServiceTypeId,
};
use tidybook_engine::{Engine, EngineConfig};
use tidybook_testing::fixtures::{scheduled_instant, seeded_backend};
use tidybook_testing::test_clock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkthrough=info,tidybook_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Tidybook Booking Walkthrough ===\n");

    // The fixed clock keeps the seeded schedule in the future
    let engine = Engine::init(
        EngineConfig::default(),
        Arc::new(seeded_backend()),
        Arc::new(test_clock()),
    )
    .await;

    let catalog = engine.catalog().snapshot().await;
    println!("Catalog ({} source):", engine.catalog().source().await);
    for service_type in &catalog.service_types {
        println!("  {} at {:.2}", service_type.name, service_type.base_price);
    }

    // ------------------------------------------------------------------
    // A customer walks the wizard
    // ------------------------------------------------------------------

    let mut session = engine.new_session();

    println!("\n>>> Checking postal code 10115");
    session.set_postal_code("10115").await;
    let outcome = session.check_postal_code().await;
    println!("Coverage: {:?}", outcome.area_name());

    session.select_service_type(ServiceTypeId::new("standard"));
    session.select_frequency(FrequencyId::new("weekly"));
    session.set_scheduled_at(scheduled_instant());
    let step = session
        .try_advance()
        .await
        .map_err(|errors| anyhow::anyhow!("service selection rejected: {errors}"))?;
    println!("Advanced to {step}");

    session.add_extra(OptionId::new("fridge"));
    session.increment_extra(&OptionId::new("fridge"));
    session.add_extra(OptionId::new("oven"));
    let step = session
        .try_advance()
        .await
        .map_err(|errors| anyhow::anyhow!("add-ons rejected: {errors}"))?;
    println!("Advanced to {step}");

    session.set_contact(ContactInfo {
        first_name: "Lena".to_string(),
        last_name: "Vogel".to_string(),
        email: "lena@example.com".to_string(),
        phone: "030 1234 5678".to_string(),
    });
    session.set_address(Address {
        street: "Invalidenstr. 12".to_string(),
        city: "Berlin".to_string(),
        postal_code: "10115".to_string(),
    });
    let step = session
        .try_advance()
        .await
        .map_err(|errors| anyhow::anyhow!("billing rejected: {errors}"))?;
    println!("Advanced to {step}");

    let quote = session.quote().await.rounded();
    println!("\nQuote:");
    println!("  base        {:>8.2}", quote.base_price);
    println!("  discount   -{:>8.2}", quote.frequency_discount);
    println!("  extras      {:>8.2}", quote.extras_total);
    println!("  subtotal    {:>8.2}", quote.subtotal);
    println!("  tax         {:>8.2}", quote.tax);
    println!("  total       {:>8.2}", quote.grand_total);

    println!("\n>>> Submitting");
    let record = session.submit().await?;
    println!(
        "Booked {} for {:.2}, status {}",
        record.booking_id, record.total_price, record.status
    );

    // ------------------------------------------------------------------
    // The operator drives the booking to completion
    // ------------------------------------------------------------------

    engine.lifecycle().refresh().await;

    println!("\n>>> Assigning Ada");
    let assigned = engine
        .lifecycle()
        .assign(&record.booking_id, &CleanerId::new("cl-1"))
        .await?;
    println!("Status: {}", assigned.status);

    println!(">>> Uploading proof of payment");
    let proof = ProofOfPayment::new("receipt.pdf", "application/pdf", vec![37, 80, 68, 70]);
    let paid = engine
        .lifecycle()
        .mark_paid(&record.booking_id, Some(&proof))
        .await?;
    println!("Status: {}", paid.status);

    println!(">>> Confirming completion");
    let done = engine
        .lifecycle()
        .confirm_completion(&record.booking_id)
        .await?;
    println!("Status: {}", done.status);

    println!("\nCleaner overview:");
    for entry in engine.lifecycle().cleaner_overview().await {
        println!(
            "  {} {} is {} with {} active booking(s)",
            entry.cleaner.first_name,
            entry.cleaner.last_name,
            entry.status,
            entry.active_bookings
        );
    }

    // ------------------------------------------------------------------
    // An admin blocks the calendar and a submission bounces off it
    // ------------------------------------------------------------------

    let service_day = scheduled_instant().date_naive();
    println!("\n>>> Blocking {service_day}");
    engine.availability().block(vec![service_day]).await?;

    let mut blocked_session = engine.new_session();
    blocked_session.set_postal_code("10115").await;
    blocked_session.check_postal_code().await;
    blocked_session.select_service_type(ServiceTypeId::new("deep"));
    blocked_session.select_frequency(FrequencyId::new("once"));
    blocked_session.set_scheduled_at(scheduled_instant());
    blocked_session.set_contact(ContactInfo {
        first_name: "Timo".to_string(),
        last_name: "Brandt".to_string(),
        email: "timo@example.com".to_string(),
        phone: "030 8765 4321".to_string(),
    });
    blocked_session.set_address(Address {
        street: "Boxhagener Str. 3".to_string(),
        city: "Berlin".to_string(),
        postal_code: "10245".to_string(),
    });
    match blocked_session.submit().await {
        Ok(_) => println!("Unexpectedly accepted"),
        Err(error) => println!("Rejected as expected: {error}"),
    }

    println!(">>> Freeing {service_day}");
    let freed = engine.availability().free(service_day).await?;
    println!("Outcome: {freed:?}");

    engine.dispose().await;
    println!("\nDone.");
    Ok(())
}
