use std::io::Write as _;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_client::notification::{Notification, NotificationLevel};
use todo_client::task::{DayOfWeek, Filter, Task, TaskListViewModel};
use todo_client::{Config, TaskGateway};

type InputLines = Lines<BufReader<Stdin>>;

enum Action {
    Render,
    Silent,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Task backend at {}", config.api_base_url);

    let gateway = TaskGateway::new(&config.api_base_url);
    let mut view = TaskListViewModel::new(gateway);
    let mut notifications = view.subscribe();

    // Initial load; a failure is already reported through the notification
    // stream, and the empty list renders as the empty state.
    let _ = view.refresh().await;
    drain_notifications(&mut notifications);
    render(&view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let action = dispatch(&mut view, &mut lines, line.trim()).await?;
        drain_notifications(&mut notifications);
        match action {
            Action::Quit => break,
            Action::Render => render(&view),
            Action::Silent => {}
        }
        prompt()?;
    }

    Ok(())
}

async fn dispatch(view: &mut TaskListViewModel, lines: &mut InputLines, input: &str) -> Result<Action> {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command {
        "" => Ok(Action::Silent),
        "q" | "quit" | "exit" => Ok(Action::Quit),
        "help" => {
            print_help();
            Ok(Action::Silent)
        }
        "list" => {
            let _ = view.refresh().await;
            Ok(Action::Render)
        }
        "all" => {
            view.set_filter(Filter::All);
            Ok(Action::Render)
        }
        "done" => {
            view.set_filter(Filter::Completed);
            Ok(Action::Render)
        }
        "todo" => {
            view.set_filter(Filter::Incomplete);
            Ok(Action::Render)
        }
        "add" => {
            let (description, day) = split_day_tag(rest);
            let _ = view.add_task(description, day).await;
            Ok(Action::Render)
        }
        "check" => {
            let Some(id) = parse_id(rest) else {
                return Ok(Action::Silent);
            };
            let _ = view.complete_task(id).await;
            Ok(Action::Render)
        }
        "uncheck" => {
            let Some(id) = parse_id(rest) else {
                return Ok(Action::Silent);
            };
            let _ = view.uncomplete_task(id).await;
            Ok(Action::Render)
        }
        "edit" => {
            let Some((id_text, description)) = rest.split_once(char::is_whitespace) else {
                println!("usage: edit <id> <description>");
                return Ok(Action::Silent);
            };
            let Some(id) = parse_id(id_text) else {
                return Ok(Action::Silent);
            };
            let _ = view.update_description(id, description).await;
            Ok(Action::Render)
        }
        "rm" => {
            let Some(id) = parse_id(rest) else {
                return Ok(Action::Silent);
            };
            if !confirm(lines, &format!("Delete task #{id}?")).await? {
                return Ok(Action::Silent);
            }
            let _ = view.delete_task(id).await;
            Ok(Action::Render)
        }
        "clear" => {
            let count = view.completed_count();
            if count > 0 && !confirm(lines, &format!("Delete all {count} completed tasks?")).await? {
                return Ok(Action::Silent);
            }
            let _ = view.delete_all_completed().await;
            Ok(Action::Render)
        }
        "day" => {
            match rest.parse::<DayOfWeek>() {
                Ok(day) => match view.tasks_for_day(day).await {
                    Ok(tasks) => print_day_tasks(day, &tasks),
                    Err(err) => println!("{err}"),
                },
                Err(err) => println!("{err}"),
            }
            Ok(Action::Silent)
        }
        "show" => {
            let Some(id) = parse_id(rest) else {
                return Ok(Action::Silent);
            };
            match view.task_details(id).await {
                Ok(task) => print_task_details(&task),
                Err(err) if err.is_not_found() => println!("Task #{id} not found"),
                Err(err) => println!("{err}"),
            }
            Ok(Action::Silent)
        }
        "stats" => {
            match view.statistics().await {
                Ok(stats) => println!(
                    "{} total, {} completed, {} incomplete",
                    stats.total, stats.completed, stats.incomplete
                ),
                Err(err) => println!("{err}"),
            }
            Ok(Action::Silent)
        }
        other => {
            println!("Unknown command: {other} (try 'help')");
            Ok(Action::Silent)
        }
    }
}

/// Split a trailing `@day` tag off the description, if one parses.
fn split_day_tag(input: &str) -> (&str, Option<DayOfWeek>) {
    if let Some((head, tail)) = input.rsplit_once(char::is_whitespace) {
        if let Some(day) = tail.strip_prefix('@').and_then(|tag| tag.parse::<DayOfWeek>().ok()) {
            return (head.trim_end(), Some(day));
        }
    } else if let Some(day) = input.strip_prefix('@').and_then(|tag| tag.parse::<DayOfWeek>().ok()) {
        return ("", Some(day));
    }
    (input, None)
}

fn parse_id(text: &str) -> Option<i64> {
    match text.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("Expected a numeric task id, got {text:?}");
            None
        }
    }
}

async fn confirm(lines: &mut InputLines, question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    Ok(matches!(
        lines.next_line().await?.as_deref().map(str::trim),
        Some("y" | "Y" | "yes")
    ))
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn drain_notifications(notifications: &mut broadcast::Receiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        match notification.level {
            NotificationLevel::Success => println!("* {}", notification.message),
            NotificationLevel::Error => println!("! {}", notification.message),
        }
    }
}

fn render(view: &TaskListViewModel) {
    let visible = view.visible_tasks();
    println!();
    println!("Tasks [{}]", view.filter().label());
    if visible.is_empty() {
        println!("  No tasks found. Add a new task to get started.");
    } else {
        for task in visible {
            println!("  {}", task_line(task));
        }
    }
    println!();
}

fn task_line(task: &Task) -> String {
    let marker = if task.completed { "[x]" } else { "[ ]" };
    match task.day_of_week {
        Some(day) => format!("{marker} #{} {} @{}", task.id, task.description, day.short_label()),
        None => format!("{marker} #{} {}", task.id, task.description),
    }
}

fn print_day_tasks(day: DayOfWeek, tasks: &[Task]) {
    if tasks.is_empty() {
        println!("Nothing scheduled for {day}");
        return;
    }
    println!("Scheduled for {day}:");
    for task in tasks {
        println!("  {}", task_line(task));
    }
}

fn print_task_details(task: &Task) {
    println!("Task #{}", task.id);
    println!("  description: {}", task.description);
    let day = task
        .day_of_week
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_owned());
    println!("  day:         {day}");
    println!("  completed:   {}", if task.completed { "yes" } else { "no" });
    println!("  created:     {}", task.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(completed_at) = task.completed_at {
        println!("  done at:     {}", completed_at.format("%Y-%m-%d %H:%M"));
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list                     reload tasks from the backend");
    println!("  all | done | todo        switch the visible filter");
    println!("  add <description> [@day] create a task (e.g. add Water plants @fri)");
    println!("  check <id>               mark a task completed");
    println!("  uncheck <id>             move a task back to incomplete");
    println!("  edit <id> <description>  replace a task's description");
    println!("  rm <id>                  delete a task (asks first)");
    println!("  clear                    delete all completed tasks (asks first)");
    println!("  day <weekday>            list tasks scheduled for a weekday");
    println!("  show <id>                show one task in detail");
    println!("  stats                    show task counts");
    println!("  quit                     exit");
}
