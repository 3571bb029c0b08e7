use anyhow::Result;
use taskerrand::form::ReportForm;
use taskerrand::ui::icons::CHECK;

use super::{Ctx, parse_id};

/// File a report against a task.
pub async fn cmd_report(
    ctx: &Ctx,
    task_id: &str,
    report_type: &str,
    description: Option<&str>,
) -> Result<()> {
    let form = ReportForm {
        task_id: parse_id(task_id),
        report_type: report_type.to_string(),
        description: description.unwrap_or_default().to_string(),
    };
    let (report, _) = form.submit(&ctx.api).await?;
    println!(
        "{}Report #{} submitted. An admin will review it.",
        CHECK, report.id
    );
    Ok(())
}
