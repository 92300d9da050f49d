//! Customer notifications.

use anyhow::{bail, Result};
use console::style;

use shopfront_commerce::ids::NotificationId;
use shopfront_core::{NotifierError, OrderStatusNotifier};
use shopfront_data::MemoryBackend;

use super::{NotificationsArgs, NotificationsCommand};
use crate::context::Context;

type Notifier = OrderStatusNotifier<std::sync::Arc<MemoryBackend>>;

/// Run the notifications command.
pub async fn run(args: NotificationsArgs, ctx: &Context) -> Result<()> {
    let mut notifier = match OrderStatusNotifier::start(
        ctx.backend.clone(),
        ctx.config.store.notification_limit,
    )
    .await
    {
        Ok(notifier) => notifier,
        Err(e) => bail!("{}", e.user_message()),
    };

    let result = match args.command.unwrap_or(NotificationsCommand::List) {
        NotificationsCommand::List => {
            list_notifications(&notifier, ctx);
            Ok(())
        }
        NotificationsCommand::Read { id } => {
            mark_read(&mut notifier, &[NotificationId::new(id)], ctx).await
        }
        NotificationsCommand::ReadAll => {
            let unread: Vec<NotificationId> = notifier
                .notifications()
                .iter()
                .filter(|n| !n.read)
                .map(|n| n.id.clone())
                .collect();
            mark_read(&mut notifier, &unread, ctx).await
        }
    };
    notifier.close();
    result
}

fn list_notifications(notifier: &Notifier, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&notifier.notifications());
        return;
    }

    ctx.output.header(&format!(
        "Notifications ({} unread)",
        notifier.unread_count()
    ));
    if notifier.notifications().is_empty() {
        ctx.output.info("No notifications");
        return;
    }
    for n in notifier.notifications() {
        let marker = if n.read {
            style("·").dim().to_string()
        } else {
            style("●").blue().to_string()
        };
        println!(
            "  {} {}  {}  {}",
            marker,
            style(n.id.as_str()).dim(),
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.message
        );
    }
}

async fn mark_read(notifier: &mut Notifier, ids: &[NotificationId], ctx: &Context) -> Result<()> {
    let mut marked = 0;
    for id in ids {
        match notifier.mark_read(id).await {
            Ok(true) => marked += 1,
            Ok(false) => ctx
                .output
                .warn(&format!("Notification {} is unknown or already read", id)),
            Err(e @ NotifierError::Backend(_)) => {
                if marked > 0 {
                    ctx.persist()?;
                }
                return Err(e.into());
            }
            Err(e) => bail!("{}", e.user_message()),
        }
    }

    if marked > 0 {
        ctx.persist()?;
    }
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "marked": marked,
            "unread": notifier.unread_count(),
        }));
    } else {
        ctx.output.success(&format!(
            "Marked {} notification(s) read, {} unread",
            marked,
            notifier.unread_count()
        ));
    }
    Ok(())
}
