//! `posts` binary entry point.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use posts_core::db::migrations::latest_version;
use posts_core::{
    core_version, default_log_level, init_logging, open_db, PostId, PostsRepository,
    PostsService, PostsUpdateRequest, SqlitePostsRepository,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let service = PostsService::new(SqlitePostsRepository::new(&conn));

    run(cli.command, &service, cli.json)
}

fn run<R: PostsRepository>(command: Commands, service: &PostsService<R>, json: bool) -> Result<()> {
    match command {
        Commands::Add {
            title,
            content,
            author,
        } => {
            let id = service.save(title, content, author)?;
            if json {
                println!("{}", serde_json::json!({ "id": id }));
            } else {
                println!("created post {id}");
            }
        }
        Commands::Get { id } => {
            let Some(post) = service.find_by_id(id)? else {
                bail!("post not found: {id}");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                println!("#{} {}", post.id, post.title);
                if let Some(author) = &post.author {
                    println!("by {author}");
                }
                println!();
                println!("{}", post.content);
            }
        }
        Commands::List { asc: false } => {
            let listing = service.find_all_desc()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                for item in listing {
                    println!("{}", listing_line(item.id, &item.title, item.author.as_deref()));
                }
            }
        }
        Commands::List { asc: true } => {
            let posts = service.find_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                for post in posts {
                    println!("{}", listing_line(post.id, &post.title, post.author.as_deref()));
                }
            }
        }
        Commands::Update {
            id,
            title,
            content,
            author,
            clear_author,
        } => {
            let request = PostsUpdateRequest {
                title,
                content,
                author: if clear_author { Some(None) } else { author.map(Some) },
            };
            let post = service.update(id, request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                println!("updated post {}", post.id);
            }
        }
        Commands::Delete { id } => {
            service.delete(id)?;
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("deleted post {id}");
            }
        }
        Commands::Count => {
            let count = service.count()?;
            if json {
                println!("{}", serde_json::json!({ "count": count }));
            } else {
                println!("{count}");
            }
        }
        Commands::Ping => {
            // Reaching here means the database opened and migrated.
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": core_version(),
                        "schema_version": latest_version(),
                    })
                );
            } else {
                println!(
                    "posts_core version={} schema_version={}",
                    core_version(),
                    latest_version()
                );
            }
        }
    }

    log::debug!("event=cli_command module=cli status=ok");
    Ok(())
}

/// One tab-separated `id title author` line; tabs and line breaks are escaped.
fn listing_line(id: PostId, title: &str, author: Option<&str>) -> String {
    format!(
        "{id}\t{}\t{}",
        escape_field(title),
        author.map_or_else(|| "-".to_string(), escape_field)
    )
}

fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{listing_line, run};
    use crate::cli::Commands;
    use posts_core::{open_db_in_memory, PostsService, SqlitePostsRepository};

    #[test]
    fn listing_line_escapes_tabs_and_line_breaks() {
        let line = listing_line(7, "a\tb\nc", Some("x\\y\r"));
        assert_eq!(line, "7\ta\\tb\\nc\tx\\\\y\\r");
        assert_eq!(line.lines().count(), 1);
        assert_eq!(line.split('\t').count(), 3);
    }

    #[test]
    fn listing_line_marks_missing_author() {
        assert_eq!(listing_line(1, "title", None), "1\ttitle\t-");
    }

    #[test]
    fn ping_and_ascending_list_dispatch_through_run() {
        let conn = open_db_in_memory().unwrap();
        let service = PostsService::new(SqlitePostsRepository::new(&conn));
        service
            .save("multi\tline", "body\nwith\ttabs", None)
            .unwrap();

        run(Commands::Ping, &service, false).unwrap();
        run(Commands::Ping, &service, true).unwrap();
        run(Commands::List { asc: true }, &service, false).unwrap();
    }
}
