use leptos::*;

use crate::models::product::{ProductSummary, SiteStats};

/// Five stars with the average rounded to the nearest whole star.
pub fn star_string(average: f64) -> String {
    let filled = (average.round().max(0.0) as usize).min(5);
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn format_price(price: Option<crate::models::price::Price>) -> String {
    match price {
        Some(p) => format!("${p}"),
        None => "Price not listed".to_string(),
    }
}

/// `<option>` list for one of the choice enums, led by a blank entry.
pub fn choice_options<T: Copy>(
    choices: &[T],
    code: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
    selected: &str,
    blank: &'static str,
) -> View {
    let mut options = vec![view! { <option value="" selected={selected.is_empty()}>{blank}</option> }
        .into_view()];
    options.extend(choices.iter().map(|&choice| {
        let value = code(choice);
        view! { <option value=value selected={selected == value}>{label(choice)}</option> }
            .into_view()
    }));
    options.into_view()
}

#[component]
pub fn StarRating(average: f64, count: i64) -> impl IntoView {
    let noun = if count == 1 { "review" } else { "reviews" };
    view! {
        <span class="stars" title={format!("{average:.1} out of 5")}>{star_string(average)}</span>
        <span class="muted">{format!(" {average:.1} ({count} {noun})")}</span>
    }
}

#[component]
pub fn FieldErrors(errors: Vec<String>) -> impl IntoView {
    (!errors.is_empty()).then(|| {
        view! {
            <ul class="errorlist">
                {errors.into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
            </ul>
        }
    })
}

/// Previous/next links that keep the current filters.
#[component]
pub fn Pagination(
    #[prop(into)] path: String,
    #[prop(into)] query: String,
    number: i64,
    num_pages: i64,
) -> impl IntoView {
    let link = move |n: i64| {
        if query.is_empty() {
            format!("{path}?page={n}")
        } else {
            format!("{path}?{query}&page={n}")
        }
    };

    (num_pages > 1).then(move || {
        view! {
            <nav class="pagination">
                {(number > 1).then(|| view! { <a href={link(1)}>{ "« First" }</a> })}
                {(number > 1).then(|| view! { <a href={link(number - 1)}>{ "‹ Previous" }</a> })}
                <span>{format!("Page {number} of {num_pages}")}</span>
                {(number < num_pages).then(|| view! { <a href={link(number + 1)}>{ "Next ›" }</a> })}
                {(number < num_pages).then(|| view! { <a href={link(num_pages)}>{ "Last »" }</a> })}
            </nav>
        }
    })
}

#[component]
pub fn ProductCard(summary: ProductSummary) -> impl IntoView {
    let ProductSummary {
        product,
        avg_rating,
        review_count,
    } = summary;
    let href = format!("/products/{}/", product.id);
    let image = (!product.image_url.is_empty()).then(|| {
        let src = product.image_url.clone();
        let alt = product.display_name();
        view! { <img src=src alt=alt loading="lazy"/> }
    });

    view! {
        <article class="card">
            {image}
            <h3><a href=href>{product.name.clone()}</a></h3>
            <p class="muted">{format!("{} · {}", product.brand, product.category.label())}</p>
            <StarRating average=avg_rating count=review_count/>
            <p>{format_price(product.price)}</p>
        </article>
    }
}

#[component]
pub fn ProductGrid(items: Vec<ProductSummary>) -> impl IntoView {
    if items.is_empty() {
        return view! { <p class="muted">{ "No products found." }</p> }.into_view();
    }
    view! {
        <div class="grid">
            {items.into_iter().map(|summary| view! { <ProductCard summary=summary/> }).collect_view()}
        </div>
    }
    .into_view()
}

#[component]
pub fn Kpis(stats: SiteStats) -> impl IntoView {
    let tiles = [
        ("Products", stats.products),
        ("Reviews", stats.reviews),
        ("Members", stats.users),
        ("Active reviewers", stats.active_reviewers),
    ];
    view! {
        <div class="kpis">
            {tiles
                .into_iter()
                .map(|(label, value)| view! { <div><strong>{value.to_string()}</strong>{label}</div> })
                .collect::<Vec<_>>()}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_round_and_saturate() {
        assert_eq!(star_string(0.0), "☆☆☆☆☆");
        assert_eq!(star_string(3.6), "★★★★☆");
        assert_eq!(star_string(4.4), "★★★★☆");
        assert_eq!(star_string(9.0), "★★★★★");
    }

    #[test]
    fn pagination_keeps_filters() {
        let html = leptos::ssr::render_to_string(|| {
            view! { <Pagination path="/products/" query="q=gloss" number=2 num_pages=3/> }
        })
        .to_string();
        assert!(html.contains("/products/?q=gloss"));
        assert!(html.contains("page=1"));
        assert!(html.contains("page=3"));
        assert!(html.contains("Page 2 of 3"));
    }

    #[test]
    fn single_page_has_no_pagination() {
        let html = leptos::ssr::render_to_string(|| {
            view! { <Pagination path="/" query="" number=1 num_pages=1/> }
        })
        .to_string();
        assert!(!html.contains("<nav"));
        assert!(!html.contains("Page 1 of"));
    }
}
