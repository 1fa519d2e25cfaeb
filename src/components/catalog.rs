use leptos::*;

use super::reviews::ReviewCard;
use super::widgets::{
    choice_options, format_price, FieldErrors, Kpis, Pagination, ProductGrid, StarRating,
};
use crate::forms::product::ProductForm;
use crate::models::choices::Category;
use crate::models::page::Page;
use crate::models::product::{Product, ProductStats, ProductSummary, SiteStats, TrendingProduct};
use crate::models::query::{BrowseSort, TRENDING_DAY_OPTIONS};
use crate::models::review::ReviewEntry;

pub struct HomeContext {
    pub page: Page<ProductSummary>,
    pub stats: SiteStats,
}

#[component]
pub fn HomePage(ctx: HomeContext) -> impl IntoView {
    let HomeContext { page, stats } = ctx;
    let (number, num_pages) = (page.number, page.num_pages);
    view! {
        <section class="hero">
            <h1>{ "Honest makeup reviews from real people" }</h1>
            <p class="muted">{ "Swatches, wear tests and skin-type notes from the community." }</p>
        </section>
        <Kpis stats=stats/>
        <h2>{ "Latest products" }</h2>
        <ProductGrid items={page.items}/>
        <Pagination path="/" query="" number=number num_pages=num_pages/>
    }
}

/// Filter values echo what was typed, valid or not.
pub struct BrowseContext {
    pub page: Page<ProductSummary>,
    pub query_string: String,
    pub q: String,
    pub category: String,
    pub min: String,
    pub max: String,
    pub sort: BrowseSort,
    pub stats: SiteStats,
}

#[component]
pub fn BrowsePage(ctx: BrowseContext) -> impl IntoView {
    let BrowseContext {
        page,
        query_string,
        q,
        category,
        min,
        max,
        sort,
        stats,
    } = ctx;
    let (number, num_pages, total) = (page.number, page.num_pages, page.total);
    let categories = choice_options(
        Category::ALL,
        Category::code,
        Category::label,
        &category,
        "All categories",
    );
    let sorts = BrowseSort::ALL
        .iter()
        .map(|s| view! { <option value={s.key()} selected={*s == sort}>{s.label()}</option> })
        .collect_view();

    view! {
        <h1>{ "Browse products" }</h1>
        <p class="muted">
            {format!("{} reviews from {} active reviewers", stats.reviews, stats.active_reviewers)}
        </p>
        <form method="get" action="/products/" class="filters">
            <label>{ "Search" }
                <input type="search" name="q" value=q placeholder="Brand or product"/>
            </label>
            <label>{ "Category" }
                <select name="category">{categories}</select>
            </label>
            <label>{ "Min price" }
                <input type="number" name="min" min="0" step="0.01" value=min/>
            </label>
            <label>{ "Max price" }
                <input type="number" name="max" min="0" step="0.01" value=max/>
            </label>
            <label>{ "Sort by" }
                <select name="sort">{sorts}</select>
            </label>
            <button type="submit">{ "Apply" }</button>
            <a href="/products/">{ "Reset" }</a>
        </form>
        <p class="muted">{format!("{total} products")}</p>
        <ProductGrid items={page.items}/>
        <Pagination path="/products/" query=query_string number=number num_pages=num_pages/>
    }
}

pub struct TrendsContext {
    pub page: Page<TrendingProduct>,
    pub days: i64,
    pub category: String,
    pub query_string: String,
}

#[component]
pub fn TrendsPage(ctx: TrendsContext) -> impl IntoView {
    let TrendsContext {
        page,
        days,
        category,
        query_string,
    } = ctx;
    let (number, num_pages) = (page.number, page.num_pages);
    let first_rank = (number - 1) * crate::models::page::PRODUCTS_PER_PAGE;
    let day_options = TRENDING_DAY_OPTIONS
        .iter()
        .map(|&d| {
            view! { <option value={d.to_string()} selected={d == days}>{format!("Last {d} days")}</option> }
        })
        .collect_view();
    let categories = choice_options(
        Category::ALL,
        Category::code,
        Category::label,
        &category,
        "All categories",
    );

    let rows = page
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let href = format!("/products/{}/", item.product.id);
            view! {
                <tr>
                    <td>{(first_rank + i as i64 + 1).to_string()}</td>
                    <td>
                        <a href=href>{item.product.display_name()}</a>
                        <div class="muted">{item.product.category.label()}</div>
                    </td>
                    <td>{item.recent_reviews.to_string()}</td>
                    <td>{format!("{:.1}", item.recent_avg)}</td>
                    <td>{format!("{:.1}", item.avg_rating)}</td>
                    <td>{format!("+{:.1}", item.rating_delta)}</td>
                    <td><strong>{format!("{:.1}", item.trending_score)}</strong></td>
                </tr>
            }
        })
        .collect_view();

    view! {
        <h1>{ "Trending now" }</h1>
        <p class="muted">
            {format!("Ranked by review activity and rating momentum over the last {days} days.")}
        </p>
        <form method="get" action="/trends/" class="filters">
            <label>{ "Window" }<select name="days">{day_options}</select></label>
            <label>{ "Category" }<select name="category">{categories}</select></label>
            <button type="submit">{ "Update" }</button>
        </form>
        <table>
            <thead>
                <tr>
                    <th>{ "#" }</th>
                    <th>{ "Product" }</th>
                    <th>{ "Recent reviews" }</th>
                    <th>{ "Recent avg" }</th>
                    <th>{ "Lifetime avg" }</th>
                    <th>{ "Momentum" }</th>
                    <th>{ "Score" }</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
        <Pagination path="/trends/" query=query_string number=number num_pages=num_pages/>
    }
}

pub struct ProductDetailContext {
    pub product: Product,
    pub stats: ProductStats,
    pub reviews: Vec<ReviewEntry>,
    pub verified_count: usize,
    pub viewer_id: Option<i64>,
    /// The viewer's own review of this product, if they wrote one.
    pub own_review: Option<i64>,
}

#[component]
fn RatingDistribution(stats: ProductStats) -> impl IntoView {
    let rows = stats
        .distribution
        .iter()
        .rev()
        .map(|bucket| {
            let width = format!("width: {:.0}%", stats.share(bucket));
            view! {
                <tr>
                    <td>{format!("{} ★", bucket.rating)}</td>
                    <td><span class="bar"><span style=width></span></span></td>
                    <td class="muted">{bucket.count.to_string()}</td>
                </tr>
            }
        })
        .collect_view();
    view! { <table class="distribution">{rows}</table> }
}

#[component]
pub fn ProductDetailPage(ctx: ProductDetailContext) -> impl IntoView {
    let ProductDetailContext {
        product,
        stats,
        reviews,
        verified_count,
        viewer_id,
        own_review,
    } = ctx;
    let id = product.id;
    let image = (!product.image_url.is_empty()).then(|| {
        let src = product.image_url.clone();
        view! { <img src=src alt={product.display_name()} class="hero-image"/> }
    });

    let actions = viewer_id.map(|_| {
        let review_link = match own_review {
            Some(review_id) => view! {
                <a href={format!("/reviews/{review_id}/edit/")}>{ "Edit your review" }</a>
            },
            None => view! {
                <a href={format!("/products/{id}/reviews/new/")}>{ "Write a review" }</a>
            },
        };
        view! {
            <p class="actions">
                {review_link}
                " · "
                <a href={format!("/products/{id}/edit/")}>{ "Edit product" }</a>
                " · "
                <a href={format!("/products/{id}/delete/")}>{ "Delete product" }</a>
            </p>
        }
    });
    let login_prompt = viewer_id.is_none().then(|| {
        view! {
            <p class="muted">
                <a href={format!("/login/?next=/products/{id}/reviews/new/")}>{ "Log in" }</a>
                { " to write a review." }
            </p>
        }
    });

    let review_count = stats.review_count;
    let average = stats.average_rating;
    let entries = if reviews.is_empty() {
        view! { <p class="muted">{ "No reviews yet. Be the first!" }</p> }.into_view()
    } else {
        reviews
            .into_iter()
            .map(|entry| view! { <ReviewCard entry=entry viewer_id=viewer_id show_product=false/> })
            .collect_view()
    };

    view! {
        <article class="product">
            {image}
            <h1>{product.name.clone()}</h1>
            <p class="muted">{format!("{} · {}", product.brand, product.category.label())}</p>
            <p><strong>{format_price(product.price)}</strong></p>
            <p>{product.description.clone()}</p>
            <StarRating average=average count=review_count/>
            <RatingDistribution stats=stats/>
            <p class="muted">{format!("{verified_count} verified purchases")}</p>
            {actions}
            {login_prompt}
        </article>
        <section>
            <h2>{ "Reviews" }</h2>
            <a href={format!("/products/{id}/reviews/")}>{ "Filter and sort reviews" }</a>
            {entries}
        </section>
    }
}

pub struct ProductFormContext {
    pub heading: String,
    pub form: ProductForm,
    pub cancel_href: String,
}

#[component]
pub fn ProductFormPage(ctx: ProductFormContext) -> impl IntoView {
    let ProductFormContext {
        heading,
        form,
        cancel_href,
    } = ctx;
    let errors = form.errors.clone();
    let categories = choice_options(
        Category::ALL,
        Category::code,
        Category::label,
        &form.category,
        "---------",
    );

    view! {
        <h1>{heading}</h1>
        <form method="post" class="stacked">
            <FieldErrors errors={errors.non_field()}/>
            <label>{ "Brand" }<input type="text" name="brand" maxlength="100" value={form.brand}/></label>
            <FieldErrors errors={errors.field("brand")}/>
            <label>{ "Name" }<input type="text" name="name" maxlength="150" value={form.name}/></label>
            <FieldErrors errors={errors.field("name")}/>
            <label>{ "Category" }<select name="category">{categories}</select></label>
            <FieldErrors errors={errors.field("category")}/>
            <label>{ "Price" }<input type="text" name="price" inputmode="decimal" value={form.price}/></label>
            <FieldErrors errors={errors.field("price")}/>
            <label>{ "Image URL" }<input type="text" name="image_url" maxlength="200" value={form.image_url}/></label>
            <FieldErrors errors={errors.field("image_url")}/>
            <label>{ "Description" }<textarea name="description" rows="4">{form.description}</textarea></label>
            <FieldErrors errors={errors.field("description")}/>
            <div>
                <button type="submit">{ "Save" }</button>
                " "
                <a href=cancel_href>{ "Cancel" }</a>
            </div>
        </form>
    }
}

/// Shared confirmation page for destructive POSTs back to the same URL.
pub struct ConfirmDeleteContext {
    pub heading: String,
    pub message: String,
    pub cancel_href: String,
}

#[component]
pub fn ConfirmDeletePage(ctx: ConfirmDeleteContext) -> impl IntoView {
    view! {
        <h1>{ctx.heading}</h1>
        <form method="post" class="stacked">
            <p>{ctx.message}</p>
            <div>
                <button type="submit">{ "Yes, delete" }</button>
                " "
                <a href={ctx.cancel_href}>{ "Cancel" }</a>
            </div>
        </form>
    }
}
