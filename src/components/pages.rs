use leptos::*;

use super::layout::{render_page, SITE_NAME};
use super::widgets::Kpis;
use crate::models::missions::{Badge, LeaderboardEntry, Mission, MissionBoard};
use crate::models::product::SiteStats;

#[component]
pub fn AboutPage(stats: SiteStats) -> impl IntoView {
    view! {
        <h1>{format!("About {SITE_NAME}")}</h1>
        <p>
            { "We are a community of makeup lovers sharing honest reviews, swatches and wear tests \
               so everyone can find products that work for their skin." }
        </p>
        <Kpis stats=stats/>
        <h2>{ "How reviews work" }</h2>
        <ul>
            <li>{ "One review per member per product, editable by its author." }</li>
            <li>{ "Verified purchases are marked so you know who actually bought the product." }</li>
            <li>{ "Helpful votes push the most useful reviews to the top." }</li>
        </ul>
    }
}

fn mission_row(mission: Mission) -> impl IntoView {
    let percent = mission.percent();
    let status = if mission.completed {
        "Completed".to_string()
    } else {
        format!("{}/{}", mission.progress.min(mission.target), mission.target)
    };
    view! {
        <tr>
            <td>{mission.icon}</td>
            <td>
                <strong>{mission.title}</strong>
                <div class="muted">{mission.description}</div>
            </td>
            <td><span class="bar"><span style={format!("width: {percent}%")}></span></span></td>
            <td>{status}</td>
            <td>{format!("+{} pts", mission.points)}</td>
        </tr>
    }
}

fn badge_tile(badge: Badge) -> impl IntoView {
    let class = if badge.earned { "card" } else { "card muted" };
    view! {
        <div class=class style={format!("border-color: {}", badge.color)}>
            <div>{badge.icon}</div>
            <strong>{badge.name}</strong>
            <p class="muted">{badge.description}</p>
            <span class="badge">{if badge.earned { "Earned" } else { "Locked" }}</span>
        </div>
    }
}

fn leaderboard_row(entry: LeaderboardEntry) -> impl IntoView {
    let name = if entry.crown {
        format!("👑 {}", entry.username)
    } else {
        entry.username
    };
    view! {
        <tr class={if entry.is_current_user { "current-user" } else { "" }}>
            <td>{entry.rank.to_string()}</td>
            <td><span class="badge">{entry.avatar}</span>{name}</td>
            <td>{format!("{} pts", entry.points)}</td>
        </tr>
    }
}

#[component]
pub fn MissionsPage(board: MissionBoard) -> impl IntoView {
    let MissionBoard {
        daily,
        weekly,
        badges,
        leaderboard,
        total_points,
        earned_badges,
    } = board;

    view! {
        <h1>{ "Missions" }</h1>
        <div class="kpis">
            <div><strong>{total_points.to_string()}</strong>{ "Points earned" }</div>
            <div><strong>{earned_badges.to_string()}</strong>{ "Badges earned" }</div>
        </div>
        <h2>{ "Daily missions" }</h2>
        <table>{daily.into_iter().map(mission_row).collect_view()}</table>
        <h2>{ "Weekly missions" }</h2>
        <table>{weekly.into_iter().map(mission_row).collect_view()}</table>
        <h2>{ "Badges" }</h2>
        <div class="grid">{badges.into_iter().map(badge_tile).collect_view()}</div>
        <h2>{ "Leaderboard" }</h2>
        <table>{leaderboard.into_iter().map(leaderboard_row).collect_view()}</table>
    }
}

fn error_title(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        403 => "Permission denied",
        404 => "Page not found",
        _ => "Server error",
    }
}

/// Standalone error document; used where no request context is available.
pub fn render_error_page(status: u16, message: String) -> String {
    let title = error_title(status);
    render_page(title, None, None, move || {
        view! {
            <h1>{format!("{status} · {title}")}</h1>
            <p>{message}</p>
            <p><a href="/">{ "Back to the home page" }</a></p>
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_shows_status_and_message() {
        let html = render_error_page(404, "Not found".into());
        assert!(html.contains("404 · Page not found"));
        assert!(html.contains("Not found"));
    }
}
