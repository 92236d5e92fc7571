//! Line-oriented dialog surface for an edit session
//!
//! Drives the orchestrator against a live edit service without any GUI:
//! slash commands map to surface gestures, plain lines go to freeform
//! chat, and new conversation entries are printed after every turn.

use std::io::{self, BufRead, Write};
use wayfarer::client::HttpEditClient;
use wayfarer::dialog::FocusTarget;
use wayfarer::model::{ChatSender, MealSlot, Preview, ViewMode};
use wayfarer::session::EditSession;
use wayfarer::QuickAction;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
commands:
  /replace               quick action: change the focused place
  /food                  quick action: recommend restaurants
  /transport             quick action: change the focused leg's mode
  /focus <day> <name>    focus the first activity matching <name>
  /leg <day> <index>     focus the leg after activity <index> (0-based)
  /meal <breakfast|lunch|dinner>
  /pick <message-id> <index>   select a recommendation card
  /skip <message-id>     dismiss an open recommendation prompt
  /apply <message-id>    apply a change preview
  /day <n>  /view <overview|daily>
  /close                 close the dialog surface
  /quit
anything else is sent as chat text";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let Some(itinerary_id) = std::env::args().nth(1) else {
        eprintln!("usage: wayfarer-repl <itinerary-id>");
        eprintln!("       (service root from WAYFARER_API_BASE)");
        std::process::exit(2);
    };

    let client = HttpEditClient::from_env();
    tracing::info!(base = client.base_url(), %itinerary_id, "fetching itinerary");
    let itinerary = client.fetch_itinerary(&itinerary_id).await?;
    println!(
        "{} — {}일 일정",
        itinerary.planner_data.country,
        itinerary.overview.len()
    );

    let mut session = EditSession::new(itinerary, client);
    let mut printed = 0;
    print_new_messages(&session, &mut printed);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["/quit" | "/exit"] => break,
            ["/help"] => println!("{USAGE}"),
            ["/replace"] => session.quick_action(QuickAction::Replace).await,
            ["/food"] => session.quick_action(QuickAction::Restaurant).await,
            ["/transport"] => session.quick_action(QuickAction::Transport).await,
            ["/close"] => {
                session.close_surface().await;
                if let Some(highlight) = session.active_highlight() {
                    println!("(highlight: {highlight:?})");
                }
            }
            ["/day", day] => match day.parse() {
                Ok(day) => session.select_day(day),
                Err(_) => println!("day must be a number"),
            },
            ["/view", "overview"] => session.set_view(ViewMode::Overview),
            ["/view", "daily"] => session.set_view(ViewMode::Daily),
            ["/meal", slot] => match parse_meal(slot) {
                Some(meal) => session.choose_meal(meal).await,
                None => println!("unknown meal slot: {slot}"),
            },
            ["/skip", message_id] => {
                let message_id = (*message_id).to_string();
                session.skip_recommendation(&message_id).await;
            }
            ["/apply", message_id] => {
                let message_id = (*message_id).to_string();
                session.apply_preview(&message_id).await;
            }
            ["/pick", message_id, index] => {
                pick_recommendation(&mut session, message_id, index).await;
            }
            ["/leg", day, index] => focus_leg(&mut session, day, index),
            ["/focus", day, rest @ ..] if !rest.is_empty() => {
                focus_activity(&mut session, day, &rest.join(" "));
            }
            _ if line.starts_with('/') => println!("unknown command (try /help)"),
            _ => session.send_text(line).await,
        }

        print_new_messages(&session, &mut printed);
    }

    Ok(())
}

fn parse_meal(slot: &str) -> Option<MealSlot> {
    match slot {
        "breakfast" | "아침" => Some(MealSlot::Breakfast),
        "lunch" | "점심" => Some(MealSlot::Lunch),
        "dinner" | "저녁" => Some(MealSlot::Dinner),
        _ => None,
    }
}

fn focus_activity(session: &mut EditSession<HttpEditClient>, day: &str, name: &str) {
    let Ok(day) = day.parse::<u32>() else {
        println!("day must be a number");
        return;
    };
    let activities = session.itinerary().activities_for_day(day);
    match wayfarer::matching::find_activity(activities, name) {
        Some(activity) => {
            let target = FocusTarget::Activity {
                day,
                activity_id: activity.id.clone(),
                name: activity.name.clone(),
                location: activity.location.clone(),
            };
            session.set_focus(target);
        }
        None => println!("no activity on day {day} matches \"{name}\""),
    }
}

fn focus_leg(session: &mut EditSession<HttpEditClient>, day: &str, index: &str) {
    let (Ok(day), Ok(index)) = (day.parse::<u32>(), index.parse::<usize>()) else {
        println!("usage: /leg <day> <index>");
        return;
    };
    let activities = session.itinerary().activities_for_day(day);
    let (Some(from), Some(to)) = (activities.get(index), activities.get(index + 1)) else {
        println!("day {day} has no leg after activity {index}");
        return;
    };
    let target = FocusTarget::Transport {
        day,
        from: from.name.clone(),
        to: to.name.clone(),
    };
    session.set_focus(target);
}

async fn pick_recommendation(
    session: &mut EditSession<HttpEditClient>,
    message_id: &str,
    index: &str,
) {
    let Ok(index) = index.parse::<usize>() else {
        println!("usage: /pick <message-id> <index>");
        return;
    };
    let card = session.log().get(message_id).and_then(|m| match &m.preview {
        Some(Preview::Recommendation { recommendations, .. }) => {
            recommendations.get(index).cloned()
        }
        _ => None,
    });
    match card {
        Some(card) => session.select_recommendation(message_id, card).await,
        None => println!("no recommendation {index} on message {message_id}"),
    }
}

fn print_new_messages(session: &EditSession<HttpEditClient>, printed: &mut usize) {
    for message in &session.log().messages()[*printed..] {
        let who = match (message.sender, message.variant.is_some()) {
            (_, true) => "· ",
            (ChatSender::User, _) => "you",
            (ChatSender::Assistant, _) => "ai ",
        };
        println!("[{}] {} {}", message.id, who, message.text);
        match &message.preview {
            Some(Preview::Change { title, changes, applied }) => {
                let tag = if *applied { " (적용됨)" } else { "" };
                println!("    {title}{tag} — /apply {} 로 적용", message.id);
                for change in changes {
                    let day = change.day.map_or_else(String::new, |d| format!("Day {d} - "));
                    let what = match (&change.target_location, &change.location) {
                        (Some(from), Some(to)) => format!("{from} → {to}"),
                        (_, Some(to)) => to.clone(),
                        _ => change.details.clone().unwrap_or_default(),
                    };
                    println!("      {day}{what}");
                }
            }
            Some(Preview::Recommendation { title, recommendations }) => {
                println!("    {title} — /pick {} <n> 으로 선택", message.id);
                for (i, card) in recommendations.iter().enumerate() {
                    let cuisine = card
                        .cuisine
                        .as_deref()
                        .map_or_else(String::new, |c| format!(" ({c})"));
                    println!("      {i}: {}{cuisine}", card.name);
                }
            }
            None => {}
        }
    }
    *printed = session.log().len();
}
