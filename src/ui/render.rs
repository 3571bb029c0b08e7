//! Plain-text rendering of views for the terminal.
//!
//! Every function returns a `String` so output can be tested without a TTY;
//! callers decide where it goes.

use std::fmt::Write as _;

use console::style;

use crate::admin::ReportedTask;
use crate::lifecycle::{AdminSummary, TaskSummary, render_stars};
use crate::messaging::{Alignment, ChatLine};
use crate::models::{TaskStatus, User};
use crate::notifications::NotificationEntry;
use crate::session::TaskDetail;
use crate::timefmt::{self, DateStyle};
use crate::ui::icons::{BELL, CALENDAR, CHAT, FLAG, MONEY, PERSON, PIN};
use crate::views::{ListOutcome, Paginator, TaskCard};

const WRAP_WIDTH: usize = 78;

pub fn status_badge(status: TaskStatus) -> String {
    let label = format!("[{}]", status.label());
    match status {
        TaskStatus::Available => style(label).green().to_string(),
        TaskStatus::Ongoing => style(label).cyan().to_string(),
        TaskStatus::PendingConfirmation => style(label).yellow().to_string(),
        TaskStatus::Completed => style(label).blue().to_string(),
        TaskStatus::Cancelled => style(label).red().to_string(),
    }
}

fn indent_wrapped(out: &mut String, text: &str, indent: &str) {
    let opts = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent(indent)
        .subsequent_indent(indent);
    for line in textwrap::wrap(text, opts) {
        let _ = writeln!(out, "{}", line);
    }
}

pub fn task_card(card: &TaskCard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {}",
        style(format!("#{}", card.id)).dim(),
        style(&card.title).bold(),
        status_badge(card.status)
    );
    if !card.description.is_empty() {
        indent_wrapped(&mut out, &card.description, "    ");
    }
    let _ = write!(out, "    {}{}  {}by {}", MONEY, card.payment, PERSON, card.poster_name);
    if let Some(seeker) = &card.seeker_name {
        let _ = write!(out, "  accepted by {}", seeker);
    }
    out.push('\n');
    out
}

/// Page footer: `Prev 3 4 [5] 6 7 Next`, only once the list is long enough.
pub fn pagination(paginator: &Paginator, page: usize) -> Option<String> {
    if !paginator.shows_controls() {
        return None;
    }
    let mut parts = Vec::new();
    if page > 1 {
        parts.push("Prev".to_string());
    }
    for p in paginator.window(page) {
        if p == page {
            parts.push(format!("[{}]", p));
        } else {
            parts.push(p.to_string());
        }
    }
    if page < paginator.total_pages() {
        parts.push("Next".to_string());
    }
    Some(format!(
        "Page {} of {}: {}",
        page,
        paginator.total_pages(),
        parts.join(" ")
    ))
}

pub fn task_list(outcome: &ListOutcome) -> String {
    match outcome {
        ListOutcome::Empty(message) => format!("{}\n", style(message).dim()),
        ListOutcome::Page {
            cards,
            paginator,
            page,
        } => {
            let mut out = String::new();
            for card in cards {
                out.push_str(&task_card(card));
                out.push('\n');
            }
            if let Some(footer) = pagination(paginator, *page) {
                let _ = writeln!(out, "{}", style(footer).dim());
            }
            out
        }
    }
}

pub fn task_detail(detail: &TaskDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(format!("Title: {}", detail.title)).bold());
    let _ = writeln!(out, "Created by: {}", detail.poster_name);
    let _ = writeln!(out, "Status: {}", detail.status_label);
    out.push('\n');
    let _ = writeln!(out, "Description:");
    indent_wrapped(&mut out, &detail.description, "  ");
    out.push('\n');
    let _ = writeln!(out, "{}Payment: {}", MONEY, detail.payment);
    if let Some(contact) = &detail.contact_number {
        let _ = writeln!(out, "Contact: {}", contact);
    }
    if let Some(schedule) = &detail.schedule {
        let _ = writeln!(out, "{}Schedule: {}", CALENDAR, schedule);
    }
    for loc in &detail.locations {
        let _ = writeln!(
            out,
            "{}Location: {} ({:.5}, {:.5})",
            PIN,
            loc.address.as_deref().unwrap_or("-"),
            loc.lat,
            loc.lng
        );
    }
    if let Some(proof) = &detail.proof_image {
        let _ = writeln!(out, "Proof: {}", proof);
    }

    if let Some(feedback) = &detail.feedback {
        out.push('\n');
        match feedback {
            Some(f) => {
                let _ = writeln!(out, "Feedback: {} ({}/5)", render_stars(f.rating), f.rating);
                if let Some(comment) = &f.comment {
                    indent_wrapped(&mut out, comment, "  ");
                }
                if !f.submitted.is_empty() {
                    let _ = writeln!(out, "  {}", style(&f.submitted).dim());
                }
            }
            None => {
                let _ = writeln!(out, "No feedback has been submitted yet.");
            }
        }
        match &detail.seeker_rating {
            Some(rating) => {
                let _ = writeln!(out, "Seeker Score: {}", rating.describe());
            }
            None => {
                let _ = writeln!(out, "The seeker has not received any ratings yet.");
            }
        }
    }

    if !detail.actions.is_empty() {
        out.push('\n');
        let labels: Vec<&str> = detail.actions.iter().map(|a| a.label()).collect();
        let _ = writeln!(out, "Actions: {}", style(labels.join(" | ")).cyan());
    }
    if detail.chat_visible {
        let _ = writeln!(out, "{}Chat is open for this task.", CHAT);
    }
    if detail.can_report {
        let _ = writeln!(out, "{}{}", FLAG, style("Report This Task").red());
    }
    out
}

pub fn chat(lines: &[ChatLine]) -> String {
    if lines.is_empty() {
        return format!("{}\n", style("No messages yet.").dim());
    }
    let mut out = String::new();
    for line in lines {
        let header = format!("{} · {}", line.sender_name, line.timestamp);
        match line.alignment {
            Alignment::Sent => {
                let _ = writeln!(out, "{:>width$}", style(header).dim(), width = WRAP_WIDTH);
                let _ = writeln!(out, "{:>width$}", style(&line.content).green(), width = WRAP_WIDTH);
            }
            Alignment::Received => {
                let _ = writeln!(out, "{}", style(header).dim());
                let _ = writeln!(out, "{}", line.content);
            }
        }
    }
    out
}

pub fn notifications(entries: &[NotificationEntry], badge: Option<usize>) -> String {
    let mut out = String::new();
    match badge {
        Some(n) => {
            let _ = writeln!(out, "{}{}", BELL, style(format!("{} unread", n)).yellow().bold());
        }
        None => {
            let _ = writeln!(out, "{}", BELL);
        }
    }
    if entries.is_empty() {
        let _ = writeln!(out, "{}", style("No notifications").dim());
        return out;
    }
    for entry in entries {
        let marker = if entry.unread { "●" } else { " " };
        let _ = writeln!(
            out,
            "{} {} {}",
            style(marker).yellow(),
            style(format!("#{}", entry.id)).dim(),
            style(&entry.title).bold()
        );
        indent_wrapped(&mut out, &entry.message, "    ");
        let mut actions = Vec::new();
        if entry.has_view {
            actions.push("view");
        }
        if entry.has_delete {
            actions.push("delete");
        }
        let _ = writeln!(
            out,
            "    {}  {}",
            style(&entry.timestamp).dim(),
            style(actions.join(" / ")).dim()
        );
    }
    out
}

pub fn summary(s: &TaskSummary) -> String {
    format!(
        "Posted: {}   Accepted: {}   Completed: {}   Active: {}\n",
        s.posted, s.accepted, s.completed, s.active
    )
}

pub fn admin_summary(s: &AdminSummary) -> String {
    format!(
        "Users: {}   Tasks: {}   Available: {}   Ongoing: {}   Completed: {}\n",
        s.total_users, s.total_tasks, s.available, s.ongoing, s.completed
    )
}

pub fn users(list: &[User]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:<28} {:<32} {:<6} Joined", "ID", "Name", "Email", "Admin");
    for user in list {
        let _ = writeln!(
            out,
            "{:<6} {:<28} {:<32} {:<6} {}",
            user.id,
            user.name.as_deref().unwrap_or("-"),
            user.email.as_deref().unwrap_or("-"),
            if user.is_admin { "Yes" } else { "No" },
            timefmt::format_opt(user.created_at.as_deref(), DateStyle::DateOnly)
        );
    }
    out
}

pub fn profile(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}{}", PERSON, style(user.display_name()).bold());
    if let Some(email) = &user.email {
        let _ = writeln!(out, "Email: {}", email);
    }
    if let Some(address) = user.address.as_deref().filter(|a| !a.is_empty()) {
        let _ = writeln!(out, "Address: {}", address);
    }
    if user.is_admin {
        let _ = writeln!(out, "Role: admin");
    }
    out
}

pub fn reported(list: &[ReportedTask]) -> String {
    if list.is_empty() {
        return format!("{}\n", style("No reported tasks.").dim());
    }
    let mut out = String::new();
    for item in list {
        let r = &item.report;
        let _ = writeln!(
            out,
            "{}{} {} (task #{})",
            FLAG,
            style(format!("Report #{}", r.id)).bold(),
            style(&r.report_type).red(),
            r.task_id
        );
        let _ = writeln!(out, "    Task: {}", item.task_title());
        if let Some(desc) = r.description.as_deref().filter(|d| !d.is_empty()) {
            indent_wrapped(&mut out, desc, "    ");
        }
        let _ = writeln!(
            out,
            "    {}",
            style(timefmt::format_opt(r.created_at.as_deref(), DateStyle::DateTime)).dim()
        );
    }
    out
}
