use chrono::{Datelike, Local};
use estate_portal::calendar::{group_by_day, CalendarMonth};
use estate_portal::domain::{Estate, EstateFilter, EntityId, Notification, RequestFilter};
use estate_portal::pagination::{InfiniteList, Page};
use estate_portal::storage::{FileKv, NotificationReadStore};
use estate_portal::PortalError;
use tokio::sync::broadcast::error::RecvError;

use crate::cli::{
    EstatesCommand, NotificationsCommand, PreferencesCommand, RequestsCommand, SessionsCommand,
};
use crate::infra::AppContext;

pub(crate) async fn estates(ctx: &AppContext, command: EstatesCommand) -> Result<(), PortalError> {
    match command {
        EstatesCommand::List(args) => {
            let filter = EstateFilter {
                search: args.search,
                category_id: args.category.map(EntityId::from),
                region_id: args.region.map(EntityId::from),
                page: Some(args.page),
                limit: Some(args.limit),
                ..EstateFilter::default()
            };
            let page = ctx
                .client
                .estates()
                .list(&filter)
                .await
                .ok_or(PortalError::Unavailable("estate list"))?;

            for estate in page.items() {
                println!("{}", estate_row(estate));
            }
            println!("{}", page_footer(&page, args.page));
        }
        EstatesCommand::Show { id } => {
            let estate = ctx
                .client
                .estates()
                .get(&EntityId::from(id))
                .await
                .ok_or(PortalError::Unavailable("estate"))?;
            render_estate(&estate);
        }
        EstatesCommand::Browse(args) => {
            let source = ctx.client.estates().pages(&EstateFilter::default(), args.limit);
            let mut list = InfiniteList::new();
            let loaded = list.load_until(&source, args.max_pages).await;

            for estate in list.items() {
                println!("{}", estate_row(estate));
            }
            println!(
                "{} estates across {} pages{}",
                list.len(),
                loaded,
                if list.has_next_page() { ", more available" } else { "" }
            );
        }
    }
    Ok(())
}

pub(crate) async fn notifications(
    ctx: &AppContext,
    command: NotificationsCommand,
) -> Result<(), PortalError> {
    let states = ctx.read_states();
    match command {
        NotificationsCommand::List(args) => {
            let list = load_notifications(ctx, args.limit, args.max_pages).await;
            for notification in list.items() {
                let marker = if states.is_read(notification.id.as_str()) { "x" } else { " " };
                println!(
                    "[{marker}] {:>6}  {}  {}",
                    notification.id,
                    notification.created_at.format("%Y-%m-%d %H:%M"),
                    notification.title
                );
            }
            let unread = states.unread_count(list.items().map(|n| n.id.as_str()));
            println!("{unread} unread of {}", list.len());
        }
        NotificationsCommand::Read { id } => {
            states.mark_as_read(&id)?;
            println!("marked {id} read");
        }
        NotificationsCommand::Unread { id } => {
            states.mark_as_unread(&id)?;
            println!("marked {id} unread");
        }
        NotificationsCommand::ReadAll(args) => {
            let list = load_notifications(ctx, args.limit, args.max_pages).await;
            mark_loaded_read(&states, &list)?;
        }
        NotificationsCommand::Prune { days } => {
            let removed = states.clear_old_states(days)?;
            println!("removed {removed} read markers older than {days} days");
        }
        NotificationsCommand::Reset => {
            states.clear_all_states()?;
            println!("cleared every read marker");
        }
        NotificationsCommand::Watch => watch(ctx).await?,
    }
    Ok(())
}

async fn load_notifications(ctx: &AppContext, limit: u32, max_pages: usize) -> InfiniteList<Notification> {
    let source = ctx.client.notifications().pages(limit);
    let mut list = InfiniteList::new();
    list.load_until(&source, max_pages).await;
    list
}

fn mark_loaded_read(
    states: &NotificationReadStore<FileKv>,
    list: &InfiniteList<Notification>,
) -> Result<(), PortalError> {
    let ids: Vec<&str> = list.items().map(|n| n.id.as_str()).collect();
    if ids.is_empty() {
        println!("no notifications loaded");
        return Ok(());
    }
    states.mark_all_as_read(&ids)?;
    println!("marked {} notifications read", ids.len());
    Ok(())
}

async fn watch(ctx: &AppContext) -> Result<(), PortalError> {
    let feed = ctx.feed();
    let mut events = feed.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{} {}", event.name, event.payload),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification printer fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    eprintln!("watching {} (ctrl-c to stop)", ctx.config.api.socket_url);
    let outcome = feed.run(&ctx.config.api.socket_url).await;
    drop(feed);
    if let Err(err) = printer.await {
        tracing::warn!(error = %err, "notification printer stopped unexpectedly");
    }
    outcome.map_err(PortalError::from)
}

pub(crate) async fn sessions(ctx: &AppContext, command: SessionsCommand) -> Result<(), PortalError> {
    match command {
        SessionsCommand::Month { year, month } => {
            let today = Local::now().date_naive();
            let month = CalendarMonth::new(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
                .unwrap_or_else(|| CalendarMonth::containing(today));
            let sessions = ctx
                .client
                .sessions()
                .month(month)
                .await
                .ok_or(PortalError::Unavailable("session calendar"))?;

            println!("Sessions for {month}");
            let days = group_by_day(&sessions);
            if days.is_empty() {
                println!("  nothing booked");
            }
            for (day, booked) in days {
                println!("{} {}", day, day.format("%a"));
                for session in booked {
                    println!(
                        "  {}-{}  {} ({} participants)",
                        session.starts_at.format("%H:%M"),
                        session.ends_at.format("%H:%M"),
                        session.title,
                        session.participants.len()
                    );
                }
            }
        }
    }
    Ok(())
}

pub(crate) async fn requests(ctx: &AppContext, command: RequestsCommand) -> Result<(), PortalError> {
    match command {
        RequestsCommand::List { status, limit } => {
            let filter = RequestFilter {
                status: status.map(Into::into),
                page: Some(1),
                limit: Some(limit),
            };
            let page = ctx
                .client
                .requests()
                .list(&filter)
                .await
                .ok_or(PortalError::Unavailable("estate requests"))?;

            for request in page.items() {
                let estate = request
                    .estate
                    .as_ref()
                    .map(|estate| estate.title.as_str())
                    .unwrap_or("-");
                println!(
                    "{:>6}  {:<9} {}  {}  {}",
                    request.id,
                    request.status.label(),
                    request.name,
                    request.phone,
                    estate
                );
            }
            println!("{}", page_footer(&page, 1));
        }
    }
    Ok(())
}

pub(crate) fn preferences(ctx: &AppContext, command: PreferencesCommand) -> Result<(), PortalError> {
    let store = ctx.preferences();
    match command {
        PreferencesCommand::ToggleSidebar => {
            let collapsed = store.toggle_sidebar()?;
            println!("sidebar {}", if collapsed { "collapsed" } else { "expanded" });
        }
        PreferencesCommand::Show => {
            let preferences = store.load();
            println!("sidebar collapsed: {}", preferences.sidebar_collapsed);
        }
    }
    Ok(())
}

fn estate_row(estate: &Estate) -> String {
    let price = estate
        .price
        .map(|price| format!("{price:.0}"))
        .unwrap_or_else(|| "-".to_string());
    let status = estate
        .status
        .map(|status| format!("{status:?}").to_lowercase())
        .unwrap_or_else(|| "-".to_string());
    format!("{:>6}  {:<40} {:>10}  {}", estate.id, estate.title, price, status)
}

fn page_footer<T>(page: &Page<T>, requested: u32) -> String {
    match page.total {
        Some(total) => format!("page {requested} of {} ({total} total)", page.total_pages),
        None => format!("page {requested} of {}", page.total_pages),
    }
}

fn render_estate(estate: &Estate) {
    println!("{} (#{})", estate.title, estate.id);
    if let Some(address) = &estate.address {
        println!("  address: {address}");
    }
    if let Some(price) = estate.price {
        println!("  price: {price:.0}");
    }
    if let Some(rooms) = estate.rooms {
        println!("  rooms: {rooms}");
    }
    if let Some(area) = estate.area {
        println!("  area: {area} m²");
    }
    if let Some(category) = &estate.category {
        println!("  category: {}", category.name);
    }
    if let Some(region) = &estate.region {
        println!("  region: {}", region.name);
    }
    if let Some(owner) = &estate.owner {
        println!("  owner: {}", owner.name);
    }
    if let Some(description) = &estate.description {
        println!("\n{description}");
    }
}
