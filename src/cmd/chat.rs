//! Task chat: `chat` (interactive) and `messages` (history).

use anyhow::{Result, bail};
use console::style;
use taskerrand::lifecycle::ViewerRole;
use taskerrand::messaging::{ChatLine, Key, MessagePanel};
use taskerrand::session::TaskSession;
use taskerrand::ui::icons::{CHAT, CROSS};
use taskerrand::ui::render;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::{Ctx, parse_id};

async fn open_panel(ctx: &Ctx, id: &str) -> Result<MessagePanel> {
    let session = TaskSession::open(ctx.api.clone(), &parse_id(id)).await?;
    if !session.chat_visible() || session.role() == ViewerRole::Other {
        bail!("Chat is only available to the poster and seeker once the task is accepted");
    }
    Ok(MessagePanel::new(
        ctx.api.clone(),
        session.task().id.clone(),
        session.viewer().id.clone(),
        session.names().clone(),
    ))
}

/// Print lines past `shown`, returning the new count.
fn print_new(lines: &[ChatLine], shown: usize) -> usize {
    if lines.len() > shown {
        print!("{}", render::chat(&lines[shown..]));
    }
    lines.len()
}

pub async fn cmd_messages(ctx: &Ctx, id: &str) -> Result<()> {
    let panel = open_panel(ctx, id).await?;
    print!("{}", render::chat(&panel.load().await?));
    Ok(())
}

pub async fn cmd_chat(ctx: &Ctx, id: &str) -> Result<()> {
    let panel = open_panel(ctx, id).await?;
    let lines = panel.load().await?;
    print!("{}", render::chat(&lines));
    let mut shown = lines.len();
    println!(
        "{}{}",
        CHAT,
        style("Type a message and press Enter. /quit to leave.").dim()
    );

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(ctx.config.poll_interval());
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    refresh.tick().await;

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break };
                if line.trim() == "/quit" {
                    break;
                }
                match panel.handle_key(&line, Key::Enter).await {
                    Some(Ok(lines)) => shown = print_new(&lines, shown),
                    Some(Err(e)) => eprintln!("{}{}", CROSS, e),
                    None => {}
                }
            }
            _ = refresh.tick() => match panel.load().await {
                Ok(lines) => shown = print_new(&lines, shown),
                Err(e) => tracing::warn!(task_id = %panel.task_id(), error = %e, "chat refresh failed"),
            },
        }
    }
    Ok(())
}
