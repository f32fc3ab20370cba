//! The `tns` utility commands: endpoint probing and credential checks.

use anyhow::Context;

use firstlight_config::FirstlightConfig;
use firstlight_tns::{TnsClient, mask};

use crate::cli::TnsCommands;

pub async fn handle(action: &TnsCommands) -> anyhow::Result<()> {
    let config = FirstlightConfig::load_with_dotenv(None).context("loading configuration")?;
    match action {
        TnsCommands::Probe => probe(&config).await,
        TnsCommands::Envcheck { show_ua } => {
            envcheck(&config, *show_ua);
            Ok(())
        }
    }
}

async fn probe(config: &FirstlightConfig) -> anyhow::Result<()> {
    let client = TnsClient::new(config.tns.clone());
    if !client.is_enabled() {
        anyhow::bail!(
            "TNS not enabled. Set FIRSTLIGHT_TNS__BOT_ID, FIRSTLIGHT_TNS__BOT_NAME, \
             FIRSTLIGHT_TNS__API_KEY, FIRSTLIGHT_TNS__API_URL."
        );
    }

    let report = client.probe_endpoints().await?;
    println!("submit_url: {}", report.submit_url.as_deref().unwrap_or("none"));
    println!("status_url: {}", report.status_url.as_deref().unwrap_or("none"));
    println!("notes:");
    for note in &report.notes {
        println!(" - {note}");
    }
    Ok(())
}

fn envcheck(config: &FirstlightConfig, show_ua: bool) {
    let tns = &config.tns;
    let set_or = |value: &str| {
        if value.is_empty() {
            "(unset)".to_string()
        } else {
            value.to_string()
        }
    };

    println!(
        "bot_id:               {}",
        if tns.bot_id == 0 {
            "(unset)".to_string()
        } else {
            tns.bot_id.to_string()
        }
    );
    println!("bot_name:             {}", set_or(&tns.bot_name));
    println!(
        "api_key:              {}",
        if tns.api_key.is_empty() {
            "(unset)".to_string()
        } else {
            mask(&tns.api_key)
        }
    );
    println!("api_url:              {}", set_or(&tns.api_url));
    println!("reporter_name:        {}", set_or(&tns.reporter_name));
    println!("reporter_email:       {}", set_or(&tns.reporter_email));
    println!("reporter_institution: {}", set_or(&tns.reporter_institution));
    println!(
        "configured:           {}",
        if tns.is_configured() { "yes" } else { "no" }
    );

    if show_ua {
        println!("user_agent:           {}", firstlight_tns::marker(tns));
    }
}
