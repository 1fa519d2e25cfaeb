use leptos::*;

use super::reviews::ReviewCard;
use super::widgets::{FieldErrors, Pagination};
use crate::forms::account::{LoginForm, SignUpForm};
use crate::models::page::Page;
use crate::models::review::ReviewEntry;
use crate::models::user::User;

fn with_next(path: &str, next: &str) -> String {
    if next == "/" {
        path.to_string()
    } else {
        format!("{path}?next={}", urlencoding::encode(next))
    }
}

#[component]
pub fn SignUpPage(form: SignUpForm, next: String) -> impl IntoView {
    let errors = form.errors.clone();
    let login_href = with_next("/login/", &next);

    view! {
        <h1>{ "Create an account" }</h1>
        <form method="post" class="stacked">
            <input type="hidden" name="next" value=next/>
            <FieldErrors errors={errors.non_field()}/>
            <label>{ "Username" }
                <input type="text" name="username" maxlength="150" autocomplete="username" value={form.username}/>
            </label>
            <FieldErrors errors={errors.field("username")}/>
            <p class="muted">{ "150 characters or fewer. Letters, digits and @/./+/-/_ only." }</p>
            <label>{ "Password" }
                <input type="password" name="password1" autocomplete="new-password"/>
            </label>
            <FieldErrors errors={errors.field("password1")}/>
            <label>{ "Password confirmation" }
                <input type="password" name="password2" autocomplete="new-password"/>
            </label>
            <FieldErrors errors={errors.field("password2")}/>
            <button type="submit">{ "Sign up" }</button>
        </form>
        <p>{ "Already a member? " }<a href=login_href>{ "Log in" }</a></p>
    }
}

#[component]
pub fn LoginPage(form: LoginForm, next: String) -> impl IntoView {
    let errors = form.errors.clone();
    let signup_href = with_next("/signup/", &next);

    view! {
        <h1>{ "Log in" }</h1>
        <form method="post" class="stacked">
            <input type="hidden" name="next" value=next/>
            <FieldErrors errors={errors.non_field()}/>
            <label>{ "Username" }
                <input type="text" name="username" autocomplete="username" value={form.username}/>
            </label>
            <FieldErrors errors={errors.field("username")}/>
            <label>{ "Password" }
                <input type="password" name="password" autocomplete="current-password"/>
            </label>
            <FieldErrors errors={errors.field("password")}/>
            <button type="submit">{ "Log in" }</button>
        </form>
        <p>{ "New here? " }<a href=signup_href>{ "Create an account" }</a></p>
    }
}

pub struct ProfileContext {
    pub user: User,
    pub page: Page<ReviewEntry>,
    pub total_reviews: i64,
    pub average_rating: f64,
}

#[component]
pub fn ProfilePage(ctx: ProfileContext) -> impl IntoView {
    let ProfileContext {
        user,
        page,
        total_reviews,
        average_rating,
    } = ctx;
    let (number, num_pages) = (page.number, page.num_pages);
    let viewer_id = Some(user.id);
    let entries = if page.items.is_empty() {
        view! {
            <p class="muted">
                { "You have not written any reviews yet. " }
                <a href="/products/">{ "Find something to review" }</a>
            </p>
        }
        .into_view()
    } else {
        page.items
            .into_iter()
            .map(|entry| view! { <ReviewCard entry=entry viewer_id=viewer_id show_product=true/> })
            .collect_view()
    };

    view! {
        <h1>{user.username.clone()}</h1>
        <p class="muted">{format!("Member since {}", user.date_joined.format("%B %Y"))}</p>
        <div class="kpis">
            <div><strong>{total_reviews.to_string()}</strong>{ "Reviews" }</div>
            <div><strong>{format!("{average_rating:.1}")}</strong>{ "Average rating given" }</div>
        </div>
        <h2>{ "Your reviews" }</h2>
        {entries}
        <Pagination path="/profile/" query="" number=number num_pages=num_pages/>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_carried_between_auth_pages() {
        assert_eq!(with_next("/login/", "/"), "/login/");
        assert_eq!(
            with_next("/signup/", "/products/3/reviews/new/"),
            "/signup/?next=%2Fproducts%2F3%2Freviews%2Fnew%2F"
        );
    }
}
