use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use kimai_tray::config::{self, Config};
use kimai_tray::models::{MenuState, RECENT_LIMIT, Task};
use kimai_tray::{Action, Dispatcher, HttpClient, Synchronizer, TaskBackend, TaskId, duration};

mod cli;

use cli::{Cli, Commands};

fn main() {
    kimai_tray::logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the service refused an action.
fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Commands::Config => {
            let path = cli.config.clone().unwrap_or_else(config::config_file_path);
            println!("{}", path.display());
        }
        Commands::Status => {
            let client = connect(cli)?;
            match client.fetch_active().context("Failed to fetch active task")? {
                Some(task) => {
                    let elapsed = task
                        .start
                        .as_deref()
                        .map(duration::format)
                        .unwrap_or_else(|| duration::INVALID_DURATION.to_string());
                    println!("{}", status_line(&task, &elapsed));
                }
                None => println!("No active task"),
            }
        }
        Commands::Recent => {
            let tasks = connect(cli)?
                .fetch_recent(RECENT_LIMIT)
                .context("Failed to fetch recent tasks")?;
            if tasks.is_empty() {
                println!("No recent tasks");
            }
            for task in tasks {
                println!("{}", task_line(&task));
            }
        }
        Commands::Restart { id } => {
            return Ok(dispatch(connect(cli)?, Action::Restart(TaskId(*id))));
        }
        Commands::Stop { id } => {
            let client = connect(cli)?;
            let id = match id {
                Some(id) => TaskId(*id),
                None => match client.fetch_active().context("Failed to fetch active task")? {
                    Some(task) => task.id,
                    None => bail!("No active task to stop"),
                },
            };
            return Ok(dispatch(client, Action::Stop(id)));
        }
    }
    Ok(true)
}

/// Right-aligned id column followed by the task label.
fn task_line(task: &Task) -> String {
    format!("{:>8}  {}", task.id.0, task.label())
}

fn status_line(task: &Task, elapsed: &str) -> String {
    format!("{} ({elapsed})", task_line(task))
}

fn connect(cli: &Cli) -> Result<Arc<HttpClient>> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let client = HttpClient::new(&config).context("Failed to create API client")?;
    Ok(Arc::new(client))
}

fn dispatch(client: Arc<HttpClient>, action: Action) -> bool {
    let sync = Arc::new(Synchronizer::new(client));
    let report = |state: MenuState| match state.active {
        Some(task) => println!("Now running: {}", task.label()),
        None => println!("No active task"),
    };
    let dispatcher = Dispatcher::new(sync, Arc::new(report));
    if !dispatcher.dispatch(action) {
        eprintln!("Could not {action}");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_lines_align_ids() {
        let task = Task {
            id: TaskId(7),
            project_name: "Acme".to_string(),
            activity_name: "Review".to_string(),
            start: None,
        };
        assert_eq!(task_line(&task), "       7  [Acme] Review");
        assert_eq!(
            status_line(&task, "1:5 h"),
            "       7  [Acme] Review (1:5 h)"
        );
    }
}
