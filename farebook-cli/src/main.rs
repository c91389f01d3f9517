use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Parser, Subcommand};
use farebook::{
    Config, Error, Farebook, booking,
    model::{CoffeeKind, OrderLine},
    orders,
    workflow::Resolution,
};
use tokio::{
    signal,
    sync::{mpsc, oneshot},
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    info!("Starting Farebook binary...");
    if let Err(e) = run(args).await {
        error!("Error: {e:?}");
    } else {
        info!("Farebook has been terminated.");
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config()?;

    let (farebook, command_sender) = Farebook::new(config)?;
    let (ready_sender, ready_receiver) = oneshot::channel();
    let farebook_task = tokio::spawn(async move { farebook.run(ready_sender).await });
    ready_receiver.await??;

    tokio::select! {
        result = handle_command(&command_sender, args.command) => result?,
        _ = shutdown_signal() => {}
    }

    // Shutdown Farebook.
    command_sender
        .send(farebook::Command::Shutdown)
        .await
        .inspect_err(|e| {
            error!("Channel send error: {e}");
        })?;
    info!("Waiting for Farebook to terminate...");
    if let Err(e) = farebook_task.await {
        error!("Failed to wait until Farebook is terminated: {e}");
    }
    Ok(())
}

/// A future that resolves when a termination signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Termination signal received");
}

async fn handle_command(
    command_sender: &mpsc::Sender<farebook::Command>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Search {
            destination,
            departure,
            return_date,
            passengers,
            select,
        } => {
            handle_search(
                command_sender,
                SearchArgs {
                    destination,
                    departure,
                    return_date,
                    passengers,
                    select,
                },
            )
            .await?;
        }
        Command::Total { orders } => {
            handle_total(command_sender, orders).await?;
        }
    }
    Ok(())
}

struct SearchArgs {
    destination: String,
    departure: String,
    return_date: Option<String>,
    passengers: u8,
    select: Option<String>,
}

async fn handle_search(
    command_sender: &mpsc::Sender<farebook::Command>,
    args: SearchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Searching flights to {}", args.destination);

    let mut messages = vec![
        booking::Message::SetDestination(args.destination),
        booking::Message::SetDeparture(args.departure),
        booking::Message::SetRoundtrip(args.return_date.is_some()),
    ];
    if let Some(return_date) = args.return_date {
        messages.push(booking::Message::SetArrival(return_date));
    }
    for msg in messages {
        command_sender.send(farebook::Command::Booking(msg)).await?;
    }

    let (msg, reply_receiver) = booking::Message::set_passenger_count(args.passengers);
    command_sender.send(farebook::Command::Booking(msg)).await?;
    reply_receiver.await?.map_err(Error::from)?;

    let (msg, reply_receiver) = booking::Message::submit();
    command_sender.send(farebook::Command::Booking(msg)).await?;
    let reply = reply_receiver.await?.map_err(Error::from)?;
    debug!("Search {} resolved: {:?}", reply.token, reply.resolution);
    if let Resolution::Applied(status) = reply.resolution {
        info!("Search status: {status:?}");
    }

    if let Some(id) = args.select {
        command_sender
            .send(farebook::Command::Booking(booking::Message::SelectFlight(
                id,
            )))
            .await?;
    }

    let (msg, reply_receiver) = booking::Message::snapshot();
    command_sender.send(farebook::Command::Booking(msg)).await?;
    let snapshot = reply_receiver.await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn handle_total(
    command_sender: &mpsc::Sender<farebook::Command>,
    lines: Vec<OrderArg>,
) -> Result<(), Box<dyn std::error::Error>> {
    for OrderArg(line) in lines {
        command_sender
            .send(farebook::Command::Orders(orders::Message::Add {
                kind: line.kind,
                price: line.price,
                quantity: line.quantity,
            }))
            .await?;
    }

    let (reply_sender, reply_receiver) = oneshot::channel();
    command_sender
        .send(farebook::Command::Orders(orders::Message::List { reply_sender }))
        .await?;
    let lines = reply_receiver.await?;

    let (reply_sender, reply_receiver) = oneshot::channel();
    command_sender
        .send(farebook::Command::Orders(orders::Message::Total {
            reply_sender,
        }))
        .await?;
    let total = reply_receiver.await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "orders": lines,
            "total": total,
        }))?
    );
    Ok(())
}

/// `<kind>:<price>:<quantity>`, e.g. `latte:3.5:2`.
#[derive(Debug, Clone)]
struct OrderArg(OrderLine);

impl FromStr for OrderArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(kind), Some(price), Some(quantity), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected <kind>:<price>:<quantity>, got {s}"));
        };
        let kind = CoffeeKind::from_str(kind)?;
        let price = price
            .parse::<f64>()
            .map_err(|e| format!("invalid price {price}: {e}"))?;
        let quantity = quantity
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity {quantity}: {e}"))?;
        Ok(Self(OrderLine::new(kind, price, quantity)))
    }
}

#[derive(Debug, Parser)]
struct Args {
    /// JSON config file. Flags below override its values.
    #[clap(long)]
    config: Option<PathBuf>,
    #[clap(long)]
    catalog: Option<PathBuf>,
    #[clap(long, value_parser = humantime::parse_duration)]
    latency: Option<Duration>,
    #[clap(subcommand)]
    command: Command,
}

impl Args {
    fn to_config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(catalog) = &self.catalog {
            if !catalog.is_file() {
                return Err(Error::InvalidConfig(format!(
                    "catalog file not found: {}",
                    catalog.display()
                )));
            }
            config.lookup.catalog_path = Some(catalog.clone());
        }
        if self.latency.is_some() {
            config.lookup.latency = self.latency;
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search flights and optionally pick one to price.
    Search {
        #[clap(long)]
        destination: String,
        #[clap(long)]
        departure: String,
        /// Makes the search a roundtrip.
        #[clap(long)]
        return_date: Option<String>,
        #[clap(long, default_value_t = 1)]
        passengers: u8,
        #[clap(long)]
        select: Option<String>,
    },
    /// Print the total of a list of coffee orders.
    Total {
        #[clap(long = "order", required = true)]
        orders: Vec<OrderArg>,
    },
}
