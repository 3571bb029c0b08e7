//! Task lists and the task detail commands.

use anyhow::{Context, Result};
use console::style;
use taskerrand::lifecycle::summarize;
use taskerrand::models::TaskStatus;
use taskerrand::names::NameCache;
use taskerrand::poll::PollingUpdates;
use taskerrand::session::{ActionRequest, TaskSession};
use taskerrand::ui::icons::{CHECK, CLOCK};
use taskerrand::ui::render;
use taskerrand::views::{ListSource, TaskListView, fetch_tasks};

use super::{Ctx, confirm, parse_id};
use crate::TaskCommands;

fn list_view(ctx: &Ctx) -> TaskListView {
    TaskListView::new(ctx.api.clone(), NameCache::new(), ctx.config.view_config())
}

pub async fn cmd_browse(ctx: &Ctx, page: usize) -> Result<()> {
    let outcome = list_view(ctx).load(&ListSource::Browse, page).await?;
    print!("{}", render::task_list(&outcome));
    Ok(())
}

pub async fn cmd_search(
    ctx: &Ctx,
    query: &str,
    status: Option<TaskStatus>,
    page: usize,
) -> Result<()> {
    let source = ListSource::Search {
        query: query.to_string(),
        status,
    };
    let outcome = list_view(ctx).load(&source, page).await?;
    print!("{}", render::task_list(&outcome));
    Ok(())
}

pub async fn cmd_dashboard(ctx: &Ctx, status: Option<TaskStatus>, page: usize) -> Result<()> {
    let viewer = ctx.api.current_user().await?;
    let all = fetch_tasks(&ctx.api, &ListSource::MyTasks { status: None }).await?;

    println!("Welcome, {}", style(viewer.display_name()).bold());
    print!("{}", render::summary(&summarize(&all, &viewer.id)));
    println!();

    let source = ListSource::MyTasks { status };
    let visible: Vec<_> = all
        .into_iter()
        .filter(|t| status.is_none_or(|s| t.status == s))
        .collect();
    let outcome = list_view(ctx).paginate(&source, &visible, page).await;
    print!("{}", render::task_list(&outcome));
    Ok(())
}

pub async fn cmd_user(
    ctx: &Ctx,
    id: &str,
    status: Option<TaskStatus>,
    page: usize,
) -> Result<()> {
    let user_id = parse_id(id);
    let user = ctx.api.user(&user_id).await?;
    let all = fetch_tasks(
        &ctx.api,
        &ListSource::OtherUser {
            user_id: user_id.clone(),
            status: None,
        },
    )
    .await?;

    print!("{}", render::profile(&user));
    print!("{}", render::summary(&summarize(&all, &user_id)));
    println!();

    let source = ListSource::OtherUser { user_id, status };
    let visible: Vec<_> = all
        .into_iter()
        .filter(|t| status.is_none_or(|s| t.status == s))
        .collect();
    let outcome = list_view(ctx).paginate(&source, &visible, page).await;
    print!("{}", render::task_list(&outcome));
    Ok(())
}

async fn open_session(ctx: &Ctx, id: &str) -> Result<TaskSession> {
    let task_id = parse_id(id);
    Ok(TaskSession::open(ctx.api.clone(), &task_id).await?)
}

async fn run_action(
    ctx: &Ctx,
    id: &str,
    request: ActionRequest,
    prompt: Option<(&str, bool)>,
) -> Result<()> {
    let mut session = open_session(ctx, id).await?;
    if let Some((question, yes)) = prompt {
        if !confirm(question, yes) {
            println!("Cancelled");
            return Ok(());
        }
    }
    let message = request.success_message();
    let task = session.dispatch(request).await?;
    println!("{}{}", CHECK, message);
    println!("Status: {}", render::status_badge(task.status));
    Ok(())
}

pub async fn cmd_task(ctx: &Ctx, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Show { id } => {
            let session = open_session(ctx, &id).await?;
            print!("{}", render::task_detail(&session.detail_view().await));
        }
        TaskCommands::Watch { id } => watch(ctx, &id).await?,
        TaskCommands::Open { id } => {
            let url = ctx.config.task_url(&parse_id(&id));
            println!("Opening {}", url);
            open::that(&url).with_context(|| format!("Failed to open {}", url))?;
        }
        TaskCommands::Accept { id, yes } => {
            run_action(ctx, &id, ActionRequest::Accept, Some(("Accept this task?", yes))).await?
        }
        TaskCommands::Done { id, yes } => {
            run_action(
                ctx,
                &id,
                ActionRequest::MarkDone,
                Some(("Mark this task as done?", yes)),
            )
            .await?
        }
        TaskCommands::Confirm { id, yes } => {
            run_action(
                ctx,
                &id,
                ActionRequest::Confirm,
                Some(("Confirm that this task is completed?", yes)),
            )
            .await?
        }
        TaskCommands::Cancel { id, yes } => {
            run_action(
                ctx,
                &id,
                ActionRequest::Cancel,
                Some(("Are you sure you want to cancel this task?", yes)),
            )
            .await?
        }
        TaskCommands::Feedback {
            id,
            rating,
            comment,
        } => run_action(ctx, &id, ActionRequest::Feedback { rating, comment }, None).await?,
        TaskCommands::Proof { id, file } => {
            run_action(ctx, &id, ActionRequest::UploadProof(file), None).await?
        }
    }
    Ok(())
}

/// Print the task, then every status or seeker change until Ctrl-C.
async fn watch(ctx: &Ctx, id: &str) -> Result<()> {
    let mut session = open_session(ctx, id).await?;
    print!("{}", render::task_detail(&session.detail_view().await));

    let updates = PollingUpdates::new(ctx.api.clone(), ctx.config.poll_interval());
    session.start_live_updates(&updates);
    println!(
        "\n{}{}",
        CLOCK,
        style(format!(
            "Watching for changes every {}s (Ctrl-C to stop)",
            ctx.config.poll_interval().as_secs()
        ))
        .dim()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = session.next_change() => match change {
                Some(change) => {
                    println!();
                    println!("{} {}", style("Task updated:").bold(), render::status_badge(change.task.status));
                    print!("{}", render::task_detail(&session.detail_view().await));
                    if change.chat_visible {
                        println!("{}", style(format!("Chat: taskerrand chat {}", session.task().id)).dim());
                    }
                }
                None => break,
            },
        }
    }

    session.stop_live_updates();
    Ok(())
}
