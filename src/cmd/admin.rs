//! Moderation commands: `taskerrand admin`.

use anyhow::Result;
use console::style;
use taskerrand::admin::AdminConsole;
use taskerrand::names::NameCache;
use taskerrand::ui::icons::CHECK;
use taskerrand::ui::render;
use taskerrand::views::{ListSource, TaskListView};

use super::{Ctx, confirm, parse_id};
use crate::AdminCommands;

pub async fn cmd_admin(ctx: &Ctx, command: Option<AdminCommands>) -> Result<()> {
    let mut console = AdminConsole::open(ctx.api.clone()).await?;
    tracing::debug!(admin = %console.admin().id, "admin console opened");

    match command {
        None | Some(AdminCommands::Stats) => {
            let (summary, _) = console.dashboard().await?;
            println!("{}", style("Admin Dashboard").bold());
            print!("{}", render::admin_summary(&summary));
        }
        Some(AdminCommands::Users) => {
            let (_, users) = console.dashboard().await?;
            print!("{}", render::users(&users));
        }
        Some(AdminCommands::Tasks { status, page }) => {
            let view = TaskListView::new(ctx.api.clone(), NameCache::new(), ctx.config.view_config());
            let outcome = view.load(&ListSource::Admin { status }, page).await?;
            print!("{}", render::task_list(&outcome));
        }
        Some(AdminCommands::Reports) => {
            let reported = console.reported().await?;
            print!("{}", render::reported(&reported));
        }
        Some(AdminCommands::DeleteTask { id, report, yes }) => {
            let task_id = parse_id(&id);
            if !confirm(
                &format!("Delete task #{}? This cannot be undone.", task_id),
                yes,
            ) {
                println!("Cancelled");
                return Ok(());
            }
            let report_id = report.as_deref().map(parse_id);
            console
                .delete_reported_task(&task_id, report_id.as_ref())
                .await?;
            println!("{}Task deleted successfully", CHECK);
        }
        Some(AdminCommands::Dismiss { id }) => {
            console.dismiss(&parse_id(&id)).await?;
            println!("{}Report dismissed", CHECK);
        }
    }

    Ok(())
}
