//! `post` and `edit`: the task form from the command line.

use anyhow::{Result, bail};
use chrono::Utc;
use taskerrand::form::{FormMode, LocationInput, Redirect, TaskForm, ensure_poster};
use taskerrand::ui::icons::CHECK;

use super::{Ctx, parse_id};
use crate::TaskArgs;

/// Overlay the given flags onto `form`.
fn apply_args(form: &mut TaskForm, args: &TaskArgs) -> Result<()> {
    let set = |slot: &mut String, value: &Option<String>| {
        if let Some(v) = value {
            *slot = v.clone();
        }
    };
    set(&mut form.title, &args.title);
    set(&mut form.description, &args.description);
    set(&mut form.payment, &args.payment);
    set(&mut form.contact_number, &args.contact_number);
    set(&mut form.schedule, &args.schedule);

    let mut locations = Vec::new();
    if args.address.is_some() || args.lat.is_some() || args.lng.is_some() {
        locations.push(LocationInput {
            address: args.address.clone().unwrap_or_default(),
            lat: args.lat.clone().unwrap_or_default(),
            lng: args.lng.clone().unwrap_or_default(),
        });
    }
    for raw in &args.locations {
        match LocationInput::parse(raw) {
            Some(loc) => locations.push(loc),
            None => bail!("Invalid --location '{}': expected address:lat:lng", raw),
        }
    }
    if !locations.is_empty() {
        form.locations = locations;
    }
    Ok(())
}

fn report_redirect(redirect: &Redirect) {
    match redirect {
        Redirect::Dashboard => println!("Next: taskerrand dashboard"),
        Redirect::TaskDetail(id) => println!("Next: taskerrand task show {}", id),
    }
}

pub async fn cmd_post(ctx: &Ctx, args: &TaskArgs) -> Result<()> {
    let mut form = TaskForm::default();
    apply_args(&mut form, args)?;
    let (task, redirect) = form.submit(&ctx.api, &FormMode::Create, Utc::now()).await?;
    println!("{}Task posted successfully! (#{})", CHECK, task.id);
    report_redirect(&redirect);
    Ok(())
}

pub async fn cmd_edit(ctx: &Ctx, id: &str, args: &TaskArgs) -> Result<()> {
    let task_id = parse_id(id);
    let (viewer, task) = tokio::try_join!(ctx.api.current_user(), ctx.api.task(&task_id))?;
    ensure_poster(&task, &viewer)?;

    let mut form = TaskForm::from_task(&task);
    apply_args(&mut form, args)?;
    let (_, redirect) = form
        .submit(&ctx.api, &FormMode::Edit(task_id), Utc::now())
        .await?;
    println!("{}Task updated successfully!", CHECK);
    report_redirect(&redirect);
    Ok(())
}
