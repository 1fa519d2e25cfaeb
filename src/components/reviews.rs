use leptos::*;

use super::widgets::{choice_options, FieldErrors, Pagination};
use crate::forms::review::{MediaFormSet, ReviewEditForm, ReviewForm};
use crate::models::choices::{AgeRange, MediaKind, SkinTone, SkinType};
use crate::models::page::Page;
use crate::models::product::Product;
use crate::models::query::{ReviewQuery, ReviewSort};
use crate::models::review::{Rating, ReviewEntry, ReviewMedia, WearTest};

fn media_view(media: ReviewMedia) -> View {
    match media.kind {
        MediaKind::Photo => view! { <img src={media.file} alt="Review photo" loading="lazy"/> }.into_view(),
        MediaKind::Video => view! { <video src={media.file} controls=true preload="metadata"></video> }.into_view(),
    }
}

fn wear_test_view(test: WearTest) -> impl IntoView {
    let span = match test.end_time {
        Some(end) => format!(
            "Wear test: {} to {}",
            test.start_time.format("%b %-d, %H:%M"),
            end.format("%b %-d, %H:%M")
        ),
        None => format!("Wear test started {}", test.start_time.format("%b %-d, %H:%M")),
    };
    view! {
        <p class="muted">
            {span}
            {(!test.notes.is_empty()).then(|| format!(" · {}", test.notes))}
        </p>
    }
}

/// One review with attachments, vote buttons for signed-in users and author actions.
#[component]
pub fn ReviewCard(entry: ReviewEntry, viewer_id: Option<i64>, show_product: bool) -> impl IntoView {
    let helpful_percentage = entry.helpful_percentage();
    let ReviewEntry {
        review,
        author,
        product_name,
        not_helpful_votes,
        media,
        wear_test,
    } = entry;
    let id = review.id;

    let mut badges = Vec::new();
    if review.is_verified_purchase {
        badges.push("Verified purchase".to_string());
    }
    if let Some(skin_type) = review.skin_type {
        badges.push(format!("{} skin", skin_type.label()));
    }
    if let Some(skin_tone) = review.skin_tone {
        badges.push(format!("{} tone", skin_tone.label()));
    }
    if let Some(age_range) = review.age_range {
        badges.push(format!("Age {}", age_range.label()));
    }

    let product_link = show_product.then(|| {
        view! {
            <p><a href={format!("/products/{}/", review.product_id)}>{product_name}</a></p>
        }
    });
    let receipt = review.receipt.clone().map(|href| {
        view! { <a href=href class="muted">{ "Receipt" }</a> }
    });
    let votes = viewer_id.map(|_| {
        let action = format!("/reviews/{id}/helpful/");
        view! {
            <form method="post" action=action class="inline">
                <button type="submit" name="is_helpful" value="true" class="secondary">{ "Helpful" }</button>
                " "
                <button type="submit" name="is_helpful" value="false" class="secondary">{ "Not helpful" }</button>
            </form>
        }
    });
    let author_actions = (viewer_id == Some(review.user_id)).then(|| {
        view! {
            <p>
                <a href={format!("/reviews/{id}/edit/")}>{ "Edit" }</a>
                " · "
                <a href={format!("/reviews/{id}/delete/")}>{ "Delete" }</a>
            </p>
        }
    });

    view! {
        <article class="review" id={format!("review-{id}")}>
            {product_link}
            <h3>
                <span class="stars">{review.rating.stars()}</span>
                " "
                {review.title.clone()}
            </h3>
            <p class="muted">
                {format!("by {author} on {}", review.created_at.format("%b %-d, %Y"))}
            </p>
            <p>
                {badges.into_iter().map(|b| view! { <span class="badge">{b}</span> }).collect_view()}
            </p>
            <p>{review.body.clone()}</p>
            <div class="media">{media.into_iter().map(media_view).collect_view()}</div>
            {wear_test.map(wear_test_view)}
            {receipt}
            <p class="muted">
                {format!(
                    "{} found this helpful · {} did not ({:.0}% helpful)",
                    review.helpful_votes, not_helpful_votes, helpful_percentage
                )}
            </p>
            {votes}
            {author_actions}
        </article>
    }
}

pub struct ReviewListContext {
    pub product: Product,
    pub page: Page<ReviewEntry>,
    pub query: ReviewQuery,
    pub query_string: String,
    pub viewer_id: Option<i64>,
}

#[component]
pub fn ReviewListPage(ctx: ReviewListContext) -> impl IntoView {
    let ReviewListContext {
        product,
        page,
        query,
        query_string,
        viewer_id,
    } = ctx;
    let path = format!("/products/{}/reviews/", product.id);
    let (number, num_pages, total) = (page.number, page.num_pages, page.total);

    let ratings = (Rating::MIN..=Rating::MAX)
        .rev()
        .map(|r| {
            let label = if r == 1 { "1 star".to_string() } else { format!("{r} stars") };
            view! { <option value={r.to_string()} selected={query.rating == Some(r)}>{label}</option> }
        })
        .collect_view();
    let skin_types = choice_options(
        SkinType::ALL,
        SkinType::code,
        SkinType::label,
        query.skin_type.map(SkinType::code).unwrap_or_default(),
        "Any skin type",
    );
    let sorts = ReviewSort::ALL
        .iter()
        .map(|s| view! { <option value={s.key()} selected={*s == query.sort}>{s.label()}</option> })
        .collect_view();
    let entries = if page.items.is_empty() {
        view! { <p class="muted">{ "No reviews match these filters." }</p> }.into_view()
    } else {
        page.items
            .into_iter()
            .map(|entry| view! { <ReviewCard entry=entry viewer_id=viewer_id show_product=false/> })
            .collect_view()
    };

    view! {
        <h1>{format!("Reviews of {}", product.display_name())}</h1>
        <p><a href={format!("/products/{}/", product.id)}>{ "Back to product" }</a></p>
        <form method="get" action={path.clone()} class="filters">
            <label>{ "Rating" }
                <select name="rating">
                    <option value="" selected={query.rating.is_none()}>{ "All ratings" }</option>
                    {ratings}
                </select>
            </label>
            <label>{ "Skin type" }<select name="skin_type">{skin_types}</select></label>
            <label>
                <input type="checkbox" name="verified" value="true" checked={query.verified_only}/>
                { "Verified purchases only" }
            </label>
            <label>{ "Sort by" }<select name="sort">{sorts}</select></label>
            <button type="submit">{ "Apply" }</button>
        </form>
        <p class="muted">{format!("{total} reviews")}</p>
        {entries}
        <Pagination path=path query=query_string number=number num_pages=num_pages/>
    }
}

pub struct ReviewFormContext {
    pub product: Product,
    pub form: ReviewForm,
    pub media: MediaFormSet,
}

fn media_slots(media: MediaFormSet) -> impl IntoView {
    let total = media.forms.len().to_string();
    let slots = media
        .forms
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            let kinds = choice_options(
                MediaKind::ALL,
                MediaKind::code,
                MediaKind::label,
                &slot.kind,
                "---------",
            );
            view! {
                <div class="media-slot">
                    <label>{format!("Attachment {} path", i + 1)}
                        <input type="text" name={MediaFormSet::field_name(i, "file")} value={slot.file.clone()}/>
                    </label>
                    <FieldErrors errors={slot.errors.field("file")}/>
                    <label>{ "Kind" }
                        <select name={MediaFormSet::field_name(i, "kind")}>{kinds}</select>
                    </label>
                    <FieldErrors errors={slot.errors.field("kind")}/>
                    <label>
                        <input type="checkbox" name={MediaFormSet::field_name(i, "DELETE")} checked={slot.delete}/>
                        { "Remove" }
                    </label>
                </div>
            }
        })
        .collect_view();

    view! {
        <fieldset>
            <legend>{ "Photos and videos" }</legend>
            <input type="hidden" name={MediaFormSet::total_forms_name()} value=total/>
            {slots}
        </fieldset>
    }
}

#[component]
pub fn ReviewFormPage(ctx: ReviewFormContext) -> impl IntoView {
    let ReviewFormContext {
        product,
        form,
        media,
    } = ctx;
    let errors = form.errors.clone();
    let skin_types = choice_options(SkinType::ALL, SkinType::code, SkinType::label, &form.skin_type, "---------");
    let skin_tones = choice_options(SkinTone::ALL, SkinTone::code, SkinTone::label, &form.skin_tone, "---------");
    let age_ranges = choice_options(AgeRange::ALL, AgeRange::code, AgeRange::label, &form.age_range, "---------");

    view! {
        <h1>{format!("Review {}", product.display_name())}</h1>
        <form method="post" class="stacked">
            <FieldErrors errors={errors.non_field()}/>
            <label>{ "Title" }<input type="text" name="title" maxlength="120" value={form.title}/></label>
            <FieldErrors errors={errors.field("title")}/>
            <label>{ "Rating (1-5)" }<input type="number" name="rating" value={form.rating}/></label>
            <FieldErrors errors={errors.field("rating")}/>
            <label>{ "Your review" }<textarea name="body" rows="6">{form.body}</textarea></label>
            <FieldErrors errors={errors.field("body")}/>
            <label>
                <input type="checkbox" name="is_verified_purchase" checked={form.is_verified_purchase}/>
                { "I bought this product" }
            </label>
            <label>{ "Receipt path" }<input type="text" name="receipt" value={form.receipt}/></label>
            <FieldErrors errors={errors.field("receipt")}/>
            <label>{ "Skin type" }<select name="skin_type">{skin_types}</select></label>
            <FieldErrors errors={errors.field("skin_type")}/>
            <label>{ "Skin tone" }<select name="skin_tone">{skin_tones}</select></label>
            <FieldErrors errors={errors.field("skin_tone")}/>
            <label>{ "Age range" }<select name="age_range">{age_ranges}</select></label>
            <FieldErrors errors={errors.field("age_range")}/>
            <label>
                <input type="checkbox" name="start_wear_test" checked={form.start_wear_test}/>
                { "Start a wear test now" }
            </label>
            {media_slots(media)}
            <div>
                <button type="submit">{ "Post review" }</button>
                " "
                <a href={format!("/products/{}/", product.id)}>{ "Cancel" }</a>
            </div>
        </form>
    }
}

pub struct ReviewEditContext {
    pub product: Product,
    pub form: ReviewEditForm,
}

#[component]
pub fn ReviewEditPage(ctx: ReviewEditContext) -> impl IntoView {
    let ReviewEditContext { product, form } = ctx;
    let errors = form.errors.clone();

    view! {
        <h1>{format!("Edit your review of {}", product.display_name())}</h1>
        <form method="post" class="stacked">
            <label>{ "Title" }<input type="text" name="title" maxlength="120" value={form.title}/></label>
            <FieldErrors errors={errors.field("title")}/>
            <label>{ "Rating (1-5)" }<input type="number" name="rating" value={form.rating}/></label>
            <FieldErrors errors={errors.field("rating")}/>
            <label>{ "Your review" }<textarea name="body" rows="6">{form.body}</textarea></label>
            <FieldErrors errors={errors.field("body")}/>
            <div>
                <button type="submit">{ "Save changes" }</button>
                " "
                <a href={format!("/products/{}/", product.id)}>{ "Cancel" }</a>
            </div>
        </form>
    }
}
