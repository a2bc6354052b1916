use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use lending_core::client::Client;
use lending_core::redirection::status::redirection_status;
use lending_core::schedule::parse_date;

use crate::input;

/// Arguments for the redirection status check
#[derive(Args)]
pub struct RedirectionStatusArgs {
    /// Path to JSON input file: a client record, or `{client, today}`
    #[arg(long)]
    pub input: Option<String>,

    /// Evaluate as of this date (defaults to the local date)
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusInput {
    WithDate {
        client: Client,
        today: NaiveDate,
    },
    Bare(Client),
}

pub fn run_redirection_status(
    args: RedirectionStatusArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let payload: StatusInput = input::read_required(args.input.as_deref(), "redirection-status")?;
    let flag_today = args.today.as_deref().map(parse_date).transpose()?;

    let (client, today) = match payload {
        StatusInput::WithDate { client, today } => (client, flag_today.unwrap_or(today)),
        StatusInput::Bare(client) => (
            client,
            flag_today.unwrap_or_else(|| Local::now().date_naive()),
        ),
    };

    let status = redirection_status(&client, today);
    let mut value = serde_json::to_value(status)?;
    value["client_id"] = json!(client.id);
    value["today"] = json!(today);
    Ok(value)
}
