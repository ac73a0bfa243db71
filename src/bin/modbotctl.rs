//! modbotctl - query and update a running modbot through its control API.
//!
//! Usage: `modbotctl [stats | rules | set <name> <key> [value]]`
//!
//! The server address is taken from `MODBOT_CONTROL_URL`
//! (default `http://127.0.0.1:8089`).

use anyhow::bail;
use modbot::control::ControlClient;

const URL_ENV: &str = "MODBOT_CONTROL_URL";
const DEFAULT_URL: &str = "http://127.0.0.1:8089";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base = std::env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_URL.to_string());
    let client = ControlClient::new(&base)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] | ["stats"] => {
            let stats = client.stats().await?;
            println!("uptime:            {}", stats.uptime);
            println!("start_time:        {}", stats.start_time);
            println!("commands_executed: {}", stats.commands_executed);
            println!("guild_count:       {}", stats.guild_count);
            println!("active_rules:      {}", stats.active_rules);
        }
        ["rules"] => {
            for rule in client.rules().await? {
                let state = if rule.enabled { "on " } else { "off" };
                println!(
                    "[{state}] {:<16} {}={}  {}",
                    rule.name, rule.key, rule.value, rule.description
                );
            }
        }
        ["set", name, key] => {
            client.set_rule(name, key, "").await?;
            println!("ok");
        }
        ["set", name, key, value] => {
            client.set_rule(name, key, value).await?;
            println!("ok");
        }
        other => bail!("unrecognized arguments: {}", other.join(" ")),
    }
    Ok(())
}
