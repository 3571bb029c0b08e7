//! Notification bell: `taskerrand notifications`.

use anyhow::{Context, Result, bail};
use taskerrand::models::Id;
use taskerrand::notifications::{Modifiers, NotificationPanel, PanelConfig, PanelEvent};
use taskerrand::session::TaskSession;
use taskerrand::ui::icons::{BELL, CHECK};
use taskerrand::ui::render;

use super::{Ctx, parse_id};
use crate::NotificationCommands;

async fn open_panel(ctx: &Ctx) -> Result<NotificationPanel> {
    let mut panel = NotificationPanel::new(PanelConfig::default());
    panel.load(&ctx.api).await?;
    panel.handle(PanelEvent::BellClicked);
    Ok(panel)
}

fn ensure_known(panel: &NotificationPanel, id: &Id) -> Result<()> {
    if !panel.items().iter().any(|n| n.id.matches(id)) {
        bail!("Notification #{} not found", id);
    }
    Ok(())
}

fn print_badge(panel: &NotificationPanel) {
    match panel.badge() {
        Some(n) => println!("{}{} unread", BELL, n),
        None => println!("{}No unread notifications", BELL),
    }
}

pub async fn cmd_notifications(ctx: &Ctx, command: Option<NotificationCommands>) -> Result<()> {
    let mut panel = open_panel(ctx).await?;

    match command {
        None | Some(NotificationCommands::List) => {
            print!("{}", render::notifications(&panel.entries(), panel.badge()));
        }
        Some(NotificationCommands::View { id, new_tab }) => {
            let id = parse_id(&id);
            ensure_known(&panel, &id)?;
            let modifiers = Modifiers {
                ctrl: new_tab,
                meta: false,
            };
            match panel.view(&ctx.api, &id, modifiers).await? {
                Some(nav) if nav.new_tab => {
                    let url = ctx.config.task_url(&nav.task_id);
                    println!("Opening {}", url);
                    open::that(&url).with_context(|| format!("Failed to open {}", url))?;
                }
                Some(nav) => {
                    let session = TaskSession::open(ctx.api.clone(), &nav.task_id).await?;
                    print!("{}", render::task_detail(&session.detail_view().await));
                }
                None => println!("Notification #{} has no linked task", id),
            }
        }
        Some(NotificationCommands::Delete { id }) => {
            let id = parse_id(&id);
            ensure_known(&panel, &id)?;
            panel.delete(&ctx.api, &id).await?;
            println!("{}Notification deleted", CHECK);
            print_badge(&panel);
        }
        Some(NotificationCommands::Read { id }) => {
            let id = parse_id(&id);
            ensure_known(&panel, &id)?;
            panel.view(&ctx.api, &id, Modifiers::default()).await?;
            println!("{}Marked as read", CHECK);
            print_badge(&panel);
        }
    }

    Ok(())
}
