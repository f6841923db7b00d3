//! Snapshot rendering for the terminal

use colored::Colorize;

use crate::app::{AppSnapshot, Notice, NoticeLevel, Phase, UiMode};
use crate::domain::{Identity, Mood, TimeOfDay};

pub(crate) fn phase_line(snapshot: &AppSnapshot) -> String {
    match snapshot.phase {
        Phase::Unauthenticated => "Not signed in".dimmed().to_string(),
        Phase::Authenticating(kind) => format!("Signing in with {}...", kind).yellow().to_string(),
        Phase::Active(mode) => {
            let who = match &snapshot.identity {
                Identity::Guest { id } => format!("Guest (id {})", id),
                Identity::Registered { id, full_name } => format!("{} (id {})", full_name, id),
                other => other.display_name(),
            };
            let mode = match mode {
                UiMode::Suggest => "suggest",
                UiMode::Plan => "plan",
            };
            format!("{} {} [{}]", "Signed in as".dimmed(), who.bright_green(), mode)
        }
    }
}

pub(crate) fn notice_line(notice: &Notice) -> String {
    let tag = format!("[{}]", notice.id);
    match notice.level {
        NoticeLevel::Info => format!("{} {}", tag.dimmed(), notice.message),
        NoticeLevel::Error if notice.retryable => {
            format!("{} {} {}", tag.dimmed(), notice.message.red(), "(try again)".dimmed())
        }
        NoticeLevel::Error => format!("{} {}", tag.dimmed(), notice.message.red()),
    }
}

/// Print the parts of the state that matter for the current mode
pub(crate) fn print_snapshot(snapshot: &AppSnapshot) {
    println!("{}", phase_line(snapshot));
    let Phase::Active(mode) = snapshot.phase else {
        return;
    };

    match mode {
        UiMode::Suggest => {
            println!(
                "  {} {} / {}",
                "Criteria:".dimmed(),
                snapshot.criteria.mood.to_string().cyan(),
                snapshot.criteria.time_of_day.to_string().cyan()
            );
            if snapshot.suggestion_pending {
                println!("  {}", "Thinking about your next meal...".yellow());
            } else if let Some(rec) = &snapshot.recommendation {
                println!("  {} {}", "Try:".bright_cyan(), rec.name.bold());
                println!("  {}", rec.reason.italic());
            }
        }
        UiMode::Plan => print_plan(snapshot),
    }

    if let Some(pending) = snapshot.pending_schedule {
        let state = if snapshot.committing { " (saving...)" } else { "" };
        println!(
            "  {} {} {}{}",
            "Scheduling for".dimmed(),
            pending.date.format("%a %b %e").to_string().bright_yellow(),
            pending.slot.to_string().bright_yellow(),
            state.dimmed()
        );
    }
}

fn print_plan(snapshot: &AppSnapshot) {
    if snapshot.plan_loading {
        println!("  {}", "Loading plan...".yellow());
    }
    if snapshot.plan.is_empty() {
        println!("  {}", "Your plan is empty.".dimmed());
        return;
    }
    println!("  {}", "Your plan:".bright_cyan());
    for entry in &snapshot.plan {
        println!(
            "  {:>4}  {}  {:9}  {} {}",
            entry.id.to_string().dimmed(),
            entry.date.format("%Y-%m-%d"),
            entry.meal_type.to_string(),
            entry.meal.name,
            format!("({})", entry.meal.category).dimmed()
        );
    }
}

pub(crate) fn print_help() {
    println!();
    println!("{}", "Identity:".bright_cyan());
    println!("  {:44} Create an account", "/register <email> <diet> <region> [name...]".yellow());
    println!("  {:44} Sign in with a known user id", "/login <id>".yellow());
    println!("  {:44} Continue as guest", "/guest".yellow());
    println!("  {:44} Sign in with the external provider", "/federated".yellow());
    println!("  {:44} Hand back the provider's session", "/federated-complete <token> <subject>".yellow());
    println!("  {:44} Sign out", "/signout".yellow());
    println!();
    println!("{}", "Suggestions:".bright_cyan());
    println!("  {:44} Set the mood", "/mood <mood>".yellow());
    println!("  {:44} Set the time of day", "/time <time>".yellow());
    println!("  {:44} Ask for a suggestion", "/suggest".yellow());
    println!();
    println!("{}", "Plan:".bright_cyan());
    println!("  {:44} Show your plan", "/plan".yellow());
    println!("  {:44} Back to suggestions", "/suggest-mode".yellow());
    println!("  {:44} Reload the plan", "/refresh".yellow());
    println!("  {:44} Schedule the current suggestion", "/schedule".yellow());
    println!("  {:44} Pick the day", "/date <YYYY-MM-DD|+N>".yellow());
    println!("  {:44} Pick the slot", "/slot <slot>".yellow());
    println!("  {:44} Save to your plan", "/commit".yellow());
    println!("  {:44} Stop scheduling", "/cancel".yellow());
    println!();
    println!("  {:44} Dismiss a notice", "/dismiss <id>".yellow());
    println!("  {:44} Show everything", "/status".yellow());
    println!("  {:44} Exit", "/quit".yellow());
    println!();
    let moods: Vec<&str> = Mood::ALL.iter().map(|m| m.as_str()).collect();
    println!("{} {}", "Moods:".dimmed(), moods.join(", "));
    let times: Vec<&str> = TimeOfDay::ALL.iter().map(|t| t.as_str()).collect();
    println!("{} {}", "Times:".dimmed(), times.join(", "));
    println!();
}
