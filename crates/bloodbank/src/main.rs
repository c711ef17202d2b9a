//! `bbank` - CLI for bloodbank
//!
//! This binary provides the command-line interface for registering donors and
//! recipients, filing blood requests and tracking inventory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use serde::Serialize;

use bloodbank::cli::{
    Cli, Command, ConfigCommand, ContactCommand, DonorCommand, EligibilityCommand,
    InventoryCommand, OutputFormat, RecipientCommand, RequestCommand, SearchArgs, ThemeCommand,
    ValidateCommand,
};
use bloodbank::intake;
use bloodbank::model::{DirectoryEntry, FormData};
use bloodbank::validation::{check_eligibility_with, rules, validate_form, EligibilityCriteria};
use bloodbank::{
    init_logging, BloodRequest, BloodType, Config, Donor, Error, KeyValueStore, Recipient,
    RecordStore,
};

type Store = RecordStore<Box<dyn KeyValueStore>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Init => {
            let (store, seeded) = open_store(&config)?;
            if seeded.is_empty() {
                println!("Store already initialized ({}).", store.backend().describe());
            } else {
                println!("Seeded {} into {}.", seeded.join(", "), store.backend().describe());
            }
            Ok(())
        }
        Command::Donors(cmd) => handle_donors(&config, &mut open_store(&config)?.0, cmd),
        Command::Recipients(cmd) => handle_recipients(&mut open_store(&config)?.0, cmd),
        Command::Requests(cmd) => handle_requests(&mut open_store(&config)?.0, cmd),
        Command::Contact(ContactCommand::Submit(args)) => {
            let (mut store, _) = open_store(&config)?;
            let submission = intake::submit_contact(&mut store, args.into())?;
            println!("Thank you, {}. Your message was received.", submission.name);
            Ok(())
        }
        Command::Inventory(cmd) => handle_inventory(&mut open_store(&config)?.0, cmd),
        Command::Eligibility(cmd) => handle_eligibility(&config, &cmd),
        Command::Validate(cmd) => handle_validate(&cmd),
        Command::Theme(cmd) => handle_theme(&mut open_store(&config)?.0, &cmd),
        Command::Status(cmd) => handle_status(&open_store(&config)?.0, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Open the configured store and seed any missing starter data.
fn open_store(config: &Config) -> anyhow::Result<(Store, Vec<&'static str>)> {
    let mut store = RecordStore::open(config).context("failed to open record store")?;
    let seeded = store.initialize().context("failed to seed starter data")?;
    Ok((store, seeded))
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(Error::ValidationFailed(fields)) => {
            eprintln!("Please correct the following:");
            for (field, message) in fields {
                eprintln!("  {field}: {message}");
            }
        }
        Some(Error::Ineligible(reasons)) => {
            eprintln!("Not eligible to donate:");
            for reason in reasons {
                eprintln!("  - {reason}");
            }
        }
        _ => eprintln!("Error: {err:#}"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit<T: Serialize>(
    items: &[T],
    format: OutputFormat,
    noun: &str,
    table: fn(&[T]),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Table if items.is_empty() => {
            println!("No {noun} found.");
            Ok(())
        }
        OutputFormat::Table => {
            table(items);
            println!();
            println!("{} {noun}", items.len());
            Ok(())
        }
    }
}

fn donor_table(donors: &[Donor]) {
    println!(
        "{:<14} {:<24} {:>3}  {:<4} {:<16} {:<28} REGISTERED",
        "ID", "NAME", "AGE", "TYPE", "PHONE", "EMAIL"
    );
    for d in donors {
        println!(
            "{:<14} {:<24} {:>3}  {:<4} {:<16} {:<28} {}",
            d.id,
            d.name,
            d.age,
            d.blood_type,
            d.phone,
            d.email,
            d.registration_date.format("%Y-%m-%d")
        );
    }
}

fn recipient_table(recipients: &[Recipient]) {
    println!(
        "{:<14} {:<24} {:>3}  {:<5} {:<7} {:<24} HOSPITAL",
        "ID", "NAME", "AGE", "NEEDS", "URGENCY", "CONDITION"
    );
    for r in recipients {
        println!(
            "{:<14} {:<24} {:>3}  {:<5} {:<7} {:<24} {}",
            r.id,
            r.name,
            r.age,
            r.blood_type_needed,
            r.urgency,
            r.condition,
            r.hospital.as_deref().unwrap_or("-")
        );
    }
}

fn request_table(requests: &[BloodRequest]) {
    println!(
        "{:<14} {:<24} {:<4} {:>5}  {:<7} {:<9} HOSPITAL",
        "ID", "PATIENT", "TYPE", "UNITS", "URGENCY", "STATUS"
    );
    for r in requests {
        let urgency = r.urgency.map_or_else(|| "-".to_string(), |u| u.to_string());
        println!(
            "{:<14} {:<24} {:<4} {:>5}  {:<7} {:<9} {}",
            r.id, r.patient_name, r.blood_type, r.units_required, urgency, r.status, r.hospital
        );
    }
}

fn parse_blood_type(token: Option<&str>) -> anyhow::Result<Option<BloodType>> {
    Ok(token.map(str::parse::<BloodType>).transpose()?)
}

fn search_directory<R: DirectoryEntry>(store: &Store, args: &SearchArgs) -> anyhow::Result<Vec<R>> {
    if args.quick {
        Ok(store.quick_search(args.query.as_deref().unwrap_or_default())?)
    } else {
        let blood_type = parse_blood_type(args.blood_type.as_deref())?;
        Ok(store.search(args.query.as_deref(), blood_type)?)
    }
}

fn handle_donors(config: &Config, store: &mut Store, cmd: DonorCommand) -> anyhow::Result<()> {
    match cmd {
        DonorCommand::List { format } => {
            let donors = store.list::<Donor>()?;
            emit(&donors, format, "donors", donor_table)
        }
        DonorCommand::Search(args) => {
            let donors: Vec<Donor> = search_directory(store, &args)?;
            emit(&donors, args.format, "donors", donor_table)
        }
        DonorCommand::Find { id } => {
            let donor = store
                .find::<Donor>(&id)?
                .ok_or_else(|| anyhow!("no donor with id {id}"))?;
            print_json(&donor)
        }
        DonorCommand::Register(args) => {
            let (draft, questionnaire) = args.into_parts()?;
            let criteria = EligibilityCriteria::from(&config.eligibility);
            let donor = intake::register_donor(store, draft, &questionnaire, &criteria)?;
            println!(
                "Registered donor {} ({}) with id {}.",
                donor.name, donor.blood_type, donor.id
            );
            Ok(())
        }
    }
}

fn handle_recipients(store: &mut Store, cmd: RecipientCommand) -> anyhow::Result<()> {
    match cmd {
        RecipientCommand::List { by_urgency, format } => {
            let recipients = if by_urgency {
                store.recipients_by_urgency()?
            } else {
                store.list::<Recipient>()?
            };
            emit(&recipients, format, "recipients", recipient_table)
        }
        RecipientCommand::Search(args) => {
            let recipients: Vec<Recipient> = search_directory(store, &args)?;
            emit(&recipients, args.format, "recipients", recipient_table)
        }
        RecipientCommand::Find { id } => {
            let recipient = store
                .find::<Recipient>(&id)?
                .ok_or_else(|| anyhow!("no recipient with id {id}"))?;
            print_json(&recipient)
        }
        RecipientCommand::Register(args) => {
            let recipient = intake::register_recipient(store, args.try_into()?)?;
            println!(
                "Registered recipient {} ({}, {} urgency) with id {}.",
                recipient.name, recipient.blood_type_needed, recipient.urgency, recipient.id
            );
            Ok(())
        }
    }
}

fn handle_requests(store: &mut Store, cmd: RequestCommand) -> anyhow::Result<()> {
    match cmd {
        RequestCommand::List { format } => {
            let requests = store.list::<BloodRequest>()?;
            emit(&requests, format, "requests", request_table)
        }
        RequestCommand::Submit(args) => {
            let request = intake::submit_blood_request(store, args.try_into()?)?;
            println!(
                "Filed request {} for {} unit(s) of {} ({}).",
                request.id, request.units_required, request.blood_type, request.status
            );
            Ok(())
        }
    }
}

fn handle_inventory(store: &mut Store, cmd: InventoryCommand) -> anyhow::Result<()> {
    match cmd {
        InventoryCommand::Show { format } => {
            let inventory = store.inventory()?;
            if format == OutputFormat::Json {
                return print_json(&inventory);
            }
            let thresholds = store.stock_thresholds();
            println!("{:<4} {:>6}  LEVEL", "TYPE", "UNITS");
            for (blood_type, units) in inventory.iter() {
                println!(
                    "{:<4} {:>6}  {}",
                    blood_type,
                    units,
                    thresholds.classify(units)
                );
            }
            println!();
            println!("Total units: {}", inventory.total_units());
        }
        InventoryCommand::Get { blood_type } => {
            let units = store.units_for_token(&blood_type)?;
            println!("{units}");
        }
        InventoryCommand::Adjust { blood_type, delta } => {
            let units = store
                .adjust_token(&blood_type, delta)
                .with_context(|| format!("failed to adjust {blood_type}"))?;
            println!("{} units of {}", units, blood_type.trim().to_uppercase());
        }
    }
    Ok(())
}

fn handle_theme(store: &mut Store, cmd: &ThemeCommand) -> anyhow::Result<()> {
    let theme = match cmd {
        ThemeCommand::Show => store.theme()?,
        ThemeCommand::Set { theme } => {
            store.set_theme((*theme).into())?;
            (*theme).into()
        }
        ThemeCommand::Toggle => store.toggle_theme()?,
    };
    println!("{theme}");
    Ok(())
}

fn handle_status(store: &Store, json: bool) -> anyhow::Result<()> {
    let stats = store.stats()?;
    let theme = store.theme()?;
    if json {
        let status = serde_json::json!({
            "storage": store.backend().describe(),
            "theme": theme,
            "stats": stats,
        });
        return print_json(&status);
    }

    println!("bbank status");
    println!("------------");
    println!("Storage:             {}", store.backend().describe());
    println!("Theme:               {theme}");
    println!("Donors:              {}", stats.donors);
    println!("Recipients:          {}", stats.recipients);
    println!("Units in stock:      {}", stats.total_units);
    println!("Pending requests:    {}", stats.pending_requests);
    println!("Active requests:     {}", stats.active_requests);
    println!("Fulfilled requests:  {}", stats.fulfilled_requests);
    println!("Contact messages:    {}", stats.contact_submissions);
    Ok(())
}

fn handle_eligibility(config: &Config, cmd: &EligibilityCommand) -> anyhow::Result<()> {
    let EligibilityCommand::Check { age, health, json } = cmd;
    let criteria = EligibilityCriteria::from(&config.eligibility);
    let result = check_eligibility_with(&health.to_questionnaire(*age), &criteria);

    if *json {
        return print_json(&result);
    }
    if result.eligible {
        println!("Eligible to donate.");
    } else {
        println!("Not eligible to donate:");
        for reason in &result.reasons {
            println!("  - {reason}");
        }
    }
    Ok(())
}

fn handle_validate(cmd: &ValidateCommand) -> anyhow::Result<()> {
    let rules = rules::by_name(cmd.form.as_str())
        .ok_or_else(|| anyhow!("unknown form: {}", cmd.form.as_str()))?;
    let form: FormData = cmd.fields.iter().cloned().collect();

    let errors = validate_form(&form, &rules);
    if !errors.is_empty() {
        bail!(Error::ValidationFailed(errors));
    }
    println!("All fields valid.");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                return print_json(config);
            }
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Storage]");
            println!("  Backend:            {:?}", config.storage.backend);
            println!("  Database path:      {}", config.database_path().display());
            println!("  On malformed data:  {:?}", config.storage.on_malformed);
            match config.quota() {
                Some(bytes) => println!("  Quota (bytes):      {bytes}"),
                None => println!("  Quota (bytes):      unlimited"),
            }
            println!();
            println!("[Seed]");
            println!("  Enabled:            {}", config.seed.enabled);
            println!();
            println!("[Eligibility]");
            println!(
                "  Age range:          {}-{}",
                config.eligibility.min_age, config.eligibility.max_age
            );
            println!("  Min weight (kg):    {}", config.eligibility.min_weight_kg);
            println!();
            println!("[Inventory]");
            println!("  Critical below:     {}", config.inventory.critical_below);
            println!("  Low below:          {}", config.inventory.low_below);
            println!("  Medium below:       {}", config.inventory.medium_below);
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!(e),
            }
        }
    }
    Ok(())
}
