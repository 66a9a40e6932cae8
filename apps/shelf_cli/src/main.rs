use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shelf_core::{
    config::{load_settings, Settings},
    HttpShelfClient, Order, Section, Shelf, ShelfSource, ShelfTransport, TitleCard, UpdateRequest,
};
use url::Url;

#[derive(Parser, Debug)]
struct Cli {
    /// Base URL of the shelf server. Overrides `rematch.toml` and the
    /// REMATCH_SERVER_URL environment variable.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every card on a listing or search result.
    List {
        #[arg(long, default_value_t = Section::Movies)]
        section: Section,
        #[arg(long, default_value_t = Order::Title)]
        order: Order,
        /// Search the index instead of listing a section.
        #[arg(long)]
        query: Option<String>,
    },
    /// Print the candidate matches hidden under one title.
    Candidates {
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = Section::Movies)]
        section: Section,
        #[arg(long)]
        query: Option<String>,
    },
    /// Re-point a title at a chosen provider URL and print the new rating line.
    Apply {
        #[arg(long)]
        title: String,
        /// 1-based index into the candidate list shown by `candidates`.
        #[arg(long)]
        candidate: Option<usize>,
        /// Provider title URL to use directly.
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value_t = Section::Movies)]
        section: Section,
        #[arg(long)]
        query: Option<String>,
    },
}

fn shelf_source(section: Section, order: Order, query: Option<String>) -> ShelfSource {
    match query {
        Some(query) => ShelfSource::search(query),
        None => ShelfSource::listing(section, order),
    }
}

fn find_card<'a>(shelf: &'a Shelf, title: &str) -> Result<&'a TitleCard> {
    shelf
        .card_by_title(title)
        .with_context(|| format!("no title '{title}' on {}", shelf.source))
}

fn resolve_server_url(flag: Option<String>, settings: &Settings) -> String {
    flag.unwrap_or_else(|| settings.server_url.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let settings = load_settings();
    let server_url = resolve_server_url(cli.server_url, &settings);
    let base = Url::parse(&server_url)
        .with_context(|| format!("'{server_url}' is not a valid server URL"))?;
    let update_timeout = settings.update_timeout();
    let client = HttpShelfClient::with_settings(base, settings.csrf_cookie, update_timeout);

    match cli.command {
        Command::List {
            section,
            order,
            query,
        } => {
            let shelf = client.fetch_shelf(&shelf_source(section, order, query)).await?;
            for card in &shelf.cards {
                println!("{}", card.rating_line);
                if let Some(line) = card.blurb.lines().next() {
                    let line = line.trim();
                    if !line.is_empty() {
                        println!("    {line}");
                    }
                }
            }
        }
        Command::Candidates {
            title,
            section,
            query,
        } => {
            let shelf = client
                .fetch_shelf(&shelf_source(section, Order::Title, query))
                .await?;
            let card = find_card(&shelf, &title)?;
            if card.candidates.entries.is_empty() {
                println!("no candidates for {} ({})", card.title, card.video_type);
                return Ok(());
            }
            for (index, entry) in card.candidates.entries.iter().enumerate() {
                println!("{:>2}. {}  {}", index + 1, entry.label, entry.url);
            }
        }
        Command::Apply {
            title,
            candidate,
            url,
            section,
            query,
        } => {
            let shelf = client
                .fetch_shelf(&shelf_source(section, Order::Title, query))
                .await?;
            let card = find_card(&shelf, &title)?;
            let chosen_url = match (candidate, url) {
                (Some(index), None) => {
                    let entries = &card.candidates.entries;
                    let entry = index
                        .checked_sub(1)
                        .and_then(|i| entries.get(i))
                        .with_context(|| {
                            format!(
                                "candidate {index} is out of range, the list has {} entries",
                                entries.len()
                            )
                        })?;
                    entry.url.clone()
                }
                (None, Some(url)) => url,
                _ => bail!("pass exactly one of --candidate or --url"),
            };

            let request = UpdateRequest {
                title: card.title.clone(),
                update_url: card.update_url.clone(),
                chosen_url,
                video_type: card.video_type,
            };
            let update = client.apply_update(request).await?;
            println!(
                "{}",
                shelf_core::shelf::format_rating_line(&update.rating, &card.title)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_flag_overrides_configured_settings() {
        let settings = Settings {
            server_url: "http://configured.test:9000".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            resolve_server_url(Some("http://flag.test:1".to_string()), &settings),
            "http://flag.test:1"
        );
        assert_eq!(
            resolve_server_url(None, &settings),
            "http://configured.test:9000"
        );
    }
}
