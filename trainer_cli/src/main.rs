use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use trainer_core::schema::{apply_schema, seed_demo};
use trainer_core::*;

#[derive(Parser)]
#[command(name = "ptrainer")]
#[command(about = "Personal trainer bookings, ratings and programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Username of the client acting
    #[arg(long, short, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    Init {
        /// Also load demo clients, trainers and programs
        #[arg(long)]
        demo: bool,
    },

    /// List trainers you are connected with
    Trainers {
        /// List trainers you are not connected with instead
        #[arg(long)]
        unconnected: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a trainer's profile
    Info { trainer: TrainerId },

    /// Connect with a trainer
    Connect { trainer: TrainerId },

    /// Remove your connection with a trainer
    Disconnect { trainer: TrainerId },

    /// Show a trainer's weekly timeslots
    Schedule { trainer: TrainerId },

    /// Book one of a trainer's half-hour timeslots
    Book {
        trainer: TrainerId,
        /// Day of the week (Monday or Mon)
        day: String,
        /// Half-hour slot, 0 = 00:00 .. 47 = 23:30
        index: u32,
    },

    /// Rate a trainer from 1 to 5
    Rate {
        trainer: TrainerId,

        /// Rating value; prompts when omitted
        #[arg(long)]
        value: Option<String>,
    },

    /// List a trainer's programs
    Programs {
        trainer: TrainerId,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Purchase a program
    Purchase { program: ProgramId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    trainer_core::logging::init_with_level(&config.logging.level);

    let database = cli
        .database
        .unwrap_or_else(|| config.store.database_path.clone());
    let store = Arc::new(SqliteStore::open(database));

    if let Commands::Init { demo } = cli.command {
        return cmd_init(&store, demo);
    }

    let ctx = AppContext::new(store);
    let client = login(&ctx, cli.user.as_deref())?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Trainers { unconnected, json } => cmd_trainers(&ctx, client, unconnected, json),
        Commands::Info { trainer } => cmd_info(&ctx, trainer),
        Commands::Connect { trainer } => cmd_connect(&ctx, client, trainer),
        Commands::Disconnect { trainer } => cmd_disconnect(&ctx, client, trainer),
        Commands::Schedule { trainer } => cmd_schedule(&ctx, client, trainer),
        Commands::Book {
            trainer,
            day,
            index,
        } => cmd_book(&ctx, client, trainer, day.parse()?, index),
        Commands::Rate { trainer, value } => cmd_rate(&ctx, client, trainer, value),
        Commands::Programs { trainer, json } => cmd_programs(&ctx, client, trainer, json),
        Commands::Purchase { program } => cmd_purchase(&ctx, client, program),
    }
}

fn cmd_init(store: &SqliteStore, demo: bool) -> Result<()> {
    apply_schema(store)?;
    if demo {
        seed_demo(store)?;
        println!("✓ Database initialized with demo data");
    } else {
        println!("✓ Database initialized");
    }
    Ok(())
}

fn login<'a>(ctx: &'a AppContext, user: Option<&str>) -> Result<&'a Client> {
    let username = user.ok_or_else(|| Error::Other("--user <USERNAME> is required".into()))?;
    ctx.clients
        .by_username(username)?
        .ok_or_else(|| Error::Other(format!("Unknown username '{}'", username)))
}

fn require_connection(ctx: &AppContext, client: &Client, trainer: &Trainer) -> Result<()> {
    if ctx.connections().is_connected(client.id, trainer.id)? {
        Ok(())
    } else {
        Err(Error::MissingConnection {
            client_id: client.id,
            trainer_id: trainer.id,
        })
    }
}

fn cmd_trainers(ctx: &AppContext, client: &Client, unconnected: bool, json: bool) -> Result<()> {
    let trainers = if unconnected {
        ctx.connections().unconnected_trainers(client.id)?
    } else {
        ctx.connections().connections(client.id)?
    };

    if json {
        let out = serde_json::to_string_pretty(&trainers)
            .map_err(|e| Error::Other(format!("Failed to encode trainers: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if trainers.is_empty() {
        if unconnected {
            println!("You are connected with every trainer.");
        } else {
            println!("No connected trainers yet. Try `ptrainer trainers --unconnected`.");
        }
        return Ok(());
    }

    for trainer in trainers {
        println!(
            "  {:>3}  {} ({}) ${:.2}/h",
            trainer.id,
            trainer.full_name(),
            trainer.city,
            trainer.hourly_rate
        );
    }
    Ok(())
}

fn cmd_info(ctx: &AppContext, trainer_id: TrainerId) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    let programs = ctx.purchases().program_count(trainer.id)?;

    println!("\n  {}", trainer.full_name());
    println!("  {} charges ${:.2} per hour", trainer.first_name, trainer.hourly_rate);
    println!("  {} is located in {}", trainer.first_name, trainer.city);
    println!(
        "  {} has been training for {} years",
        trainer.first_name, trainer.years_experience
    );
    println!(
        "  {} has {} programs available to purchase",
        trainer.first_name, programs
    );
    if let Some(average) = ctx.ratings().average_rating(trainer.id)? {
        println!(
            "  {} has been rated {:.1}/5 by their clients",
            trainer.first_name, average
        );
    }
    println!();
    Ok(())
}

fn cmd_connect(ctx: &AppContext, client: &Client, trainer_id: TrainerId) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    if ctx.connections().is_connected(client.id, trainer.id)? {
        println!("Already connected with {}.", trainer.first_name);
        return Ok(());
    }
    ctx.connections().create(client.id, trainer.id)?;
    println!("✓ Connected with {}", trainer.full_name());
    Ok(())
}

fn cmd_disconnect(ctx: &AppContext, client: &Client, trainer_id: TrainerId) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    ctx.connections().remove(client.id, trainer.id)?;
    println!("✓ Disconnected from {}", trainer.full_name());
    Ok(())
}

fn cmd_schedule(ctx: &AppContext, client: &Client, trainer_id: TrainerId) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    require_connection(ctx, client, trainer)?;

    let week = ctx.bookings().weekly_schedule(trainer.id, client.id)?;

    println!("\n  {}'s week   . free   * yours   x taken\n", trainer.first_name);
    print!("         ");
    for (day, _) in &week {
        print!(" {}", &day.as_str()[..3]);
    }
    println!();

    for index in 0..SLOTS_PER_DAY {
        print!("  {:>2} {}", index, slot_label(index)?);
        for (_, slots) in &week {
            let mark = match slots[index as usize] {
                SlotStatus::Available => '.',
                SlotStatus::BookedBySelf => '*',
                SlotStatus::BookedByOther => 'x',
            };
            print!("   {}", mark);
        }
        println!();
    }
    println!();
    Ok(())
}

fn cmd_book(
    ctx: &AppContext,
    client: &Client,
    trainer_id: TrainerId,
    day: Day,
    index: u32,
) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    require_connection(ctx, client, trainer)?;

    match ctx.bookings().status(trainer.id, day, index, client.id)? {
        SlotStatus::Available => {}
        SlotStatus::BookedBySelf => {
            println!("You already have {} {} booked.", day, slot_label(index)?);
            return Ok(());
        }
        SlotStatus::BookedByOther => {
            return Err(Error::Conflict(format!(
                "{} {} is already taken",
                day,
                slot_label(index)?
            )));
        }
    }

    ctx.bookings()
        .create_booking(client.id, trainer.id, day, index)?;
    println!(
        "✓ Booked {} on {} at {}",
        trainer.first_name,
        day,
        slot_label(index)?
    );
    Ok(())
}

fn cmd_rate(
    ctx: &AppContext,
    client: &Client,
    trainer_id: TrainerId,
    value: Option<String>,
) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    require_connection(ctx, client, trainer)?;

    if ctx.ratings().has_rated(trainer.id, client.id)? {
        println!("You have already rated {}.", trainer.first_name);
        return Ok(());
    }

    let rating = match value {
        Some(value) => value.parse::<RatingValue>()?,
        None => {
            let stdin = io::stdin();
            match prompt_rating(trainer, &mut stdin.lock())? {
                Some(rating) => rating,
                None => {
                    println!("\nRating cancelled.");
                    return Ok(());
                }
            }
        }
    };

    ctx.ratings().rate(trainer.id, client.id, rating.get())?;
    println!("✓ Rated {} {}/5", trainer.first_name, rating.get());
    Ok(())
}

/// Keep asking until a valid rating is entered; `None` on end of input
fn prompt_rating(trainer: &Trainer, input: &mut impl BufRead) -> Result<Option<RatingValue>> {
    loop {
        print!(
            "Give {} a rating! (whole number from {} to {})\n> ",
            trainer.first_name,
            RatingValue::MIN,
            RatingValue::MAX
        );
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match line.parse::<RatingValue>() {
            Ok(rating) => return Ok(Some(rating)),
            Err(e) => {
                tracing::debug!("Rejected rating input: {}", e);
                println!("{}", e);
            }
        }
    }
}

fn cmd_programs(ctx: &AppContext, client: &Client, trainer_id: TrainerId, json: bool) -> Result<()> {
    let trainer = ctx.trainers.get(trainer_id)?;
    let programs = ctx.programs.for_trainer(trainer.id);

    if json {
        let out = serde_json::to_string_pretty(&programs)
            .map_err(|e| Error::Other(format!("Failed to encode programs: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if programs.is_empty() {
        println!("{} has no programs for sale.", trainer.first_name);
        return Ok(());
    }

    for program in programs {
        let owned = ctx.purchases().has_purchased(program.id, client.id)?;
        println!(
            "\n  [{}] {}{}",
            program.id,
            program.title,
            if owned { "  (purchased)" } else { "" }
        );
        if !owned {
            continue;
        }
        for (number, exercise) in program.exercises.iter().enumerate() {
            println!("    Exercise {}: {}", number + 1, exercise.title);
            println!(
                "      {} sets x {} reps, {} seconds rest, RPE {}",
                exercise.num_sets, exercise.num_reps, exercise.rest_time, exercise.rpe
            );
            if let Some(ref video) = exercise.video_path {
                println!("      Video: {}", video);
            }
        }
    }
    println!();
    Ok(())
}

fn cmd_purchase(ctx: &AppContext, client: &Client, program_id: ProgramId) -> Result<()> {
    let program = ctx.programs.get(program_id)?;
    let trainer = ctx.trainers.get(program.trainer_id)?;
    require_connection(ctx, client, trainer)?;

    if ctx.purchases().has_purchased(program.id, client.id)? {
        println!("You already own {}.", program.title);
        return Ok(());
    }

    ctx.purchases().purchase(program.id, client.id)?;
    println!("✓ Purchased {} from {}", program.title, trainer.first_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer() -> Trainer {
        Trainer {
            id: 7,
            first_name: "Tom".into(),
            last_name: "Nguyen".into(),
            city: "Sydney".into(),
            hourly_rate: 70.0,
            years_experience: 4,
            picture_path: None,
        }
    }

    #[test]
    fn test_prompt_reprompts_until_valid() {
        let mut input = io::Cursor::new("9\nfive\n\n3\n");
        let rating = prompt_rating(&trainer(), &mut input).unwrap();
        assert_eq!(rating.map(|r| r.get()), Some(3));
    }

    #[test]
    fn test_prompt_cancelled_on_eof() {
        let mut input = io::Cursor::new("0\n");
        assert!(prompt_rating(&trainer(), &mut input).unwrap().is_none());
    }
}
