use leptos::*;

use crate::models::user::User;

pub const SITE_NAME: &str = "The Makeup Community";
const STYLES: &str = include_str!("../../style/main.css");

#[component]
fn NavBar(viewer: Option<User>) -> impl IntoView {
    let account_links = match viewer {
        Some(user) => view! {
            <a href="/missions/">{ "Missions" }</a>
            <a href="/profile/">{ user.username }</a>
            <form method="post" action="/logout/" class="inline">
                <button type="submit" class="secondary">{ "Log out" }</button>
            </form>
        }
        .into_view(),
        None => view! {
            <a href="/login/">{ "Log in" }</a>
            <a href="/signup/">{ "Sign up" }</a>
        }
        .into_view(),
    };

    view! {
        <header class="site-header">
            <a class="brand" href="/">{ SITE_NAME }</a>
            <nav>
                <a href="/products/">{ "Browse" }</a>
                <a href="/trends/">{ "Trends" }</a>
                <a href="/about/">{ "About" }</a>
                {account_links}
            </nav>
        </header>
    }
}

#[component]
fn Shell(viewer: Option<User>, flash: Option<String>, content: View) -> impl IntoView {
    view! {
        <NavBar viewer=viewer/>
        {flash.map(|message| view! { <div class="flash" role="status">{message}</div> })}
        <main class="container">{content}</main>
        <footer class="site-footer">{ format!("© {SITE_NAME}") }</footer>
    }
}

/// Renders a complete HTML document around `content`.
pub fn render_page<F, N>(
    title: &str,
    viewer: Option<User>,
    flash: Option<String>,
    content: F,
) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView,
{
    let title = format!("{title} · {SITE_NAME}");
    let head = leptos::ssr::render_to_string(move || view! { <title>{title}</title> });
    let body = leptos::ssr::render_to_string(move || {
        let content = content().into_view();
        view! { <Shell viewer=viewer flash=flash content=content/> }
    });

    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"/>\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>\
         {head}<style>{STYLES}</style></head><body>{body}</body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn page_carries_title_nav_and_flash() {
        let user = User {
            id: 1,
            username: "lumi".into(),
            date_joined: Utc::now(),
        };
        let html = render_page("Browse", Some(user), Some("Saved <b>".into()), || {
            view! { <p>{ "hello" }</p> }
        });
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Browse · The Makeup Community"));
        assert!(html.contains("/logout/"));
        assert!(html.contains("lumi"));
        assert!(html.contains("Saved &lt;b&gt;"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn anonymous_nav_offers_login() {
        let html = render_page("Home", None, None, || view! { <p>{ "x" }</p> });
        assert!(html.contains("/login/"));
        assert!(html.contains("/signup/"));
        assert!(!html.contains("/logout/"));
    }
}
