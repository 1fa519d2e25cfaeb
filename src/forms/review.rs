use std::num::IntErrorKind;

use super::{check_length, optional_choice, require_text, FormData, FormErrors, REQUIRED};
use crate::models::choices::MediaKind;
use crate::models::review::{MediaInput, Rating, ReviewEdit, ReviewInput};

pub const MEDIA_PREFIX: &str = "media";
/// Blank media slots offered on a fresh form.
pub const MEDIA_EXTRA_FORMS: usize = 2;
pub const MEDIA_MAX_FORMS: usize = 10;

const TITLE_MAX: usize = 120;
const REFERENCE_MAX: usize = 255;

/// Integer rating pulled into 1..=5; non-integers are a field error.
fn clean_rating(errors: &mut FormErrors, raw: &str) -> Option<Rating> {
    if raw.is_empty() {
        errors.add("rating", REQUIRED);
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(Rating::clamped(value)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => Some(Rating::clamped(i64::MAX)),
        Err(e) if matches!(e.kind(), IntErrorKind::NegOverflow) => Some(Rating::clamped(i64::MIN)),
        Err(_) => {
            errors.add("rating", "Enter a whole number.");
            None
        }
    }
}

/// Attachments and receipts must point into the media store, not at another host.
fn check_reference(errors: &mut FormErrors, field: &str, value: &str) {
    if value.starts_with("//") || value.contains("://") || value.contains('\\') {
        errors.add(field, "Enter a path to an uploaded file, not a web address.");
    }
    check_length(errors, field, value, Some(REFERENCE_MAX));
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewForm {
    pub title: String,
    pub body: String,
    pub rating: String,
    pub is_verified_purchase: bool,
    pub receipt: String,
    pub skin_type: String,
    pub skin_tone: String,
    pub age_range: String,
    pub start_wear_test: bool,
    pub errors: FormErrors,
}

impl ReviewForm {
    pub fn bind(data: &FormData) -> Self {
        Self {
            title: data.text("title"),
            body: data.text("body"),
            rating: data.text("rating"),
            is_verified_purchase: data.checked("is_verified_purchase"),
            receipt: data.text("receipt"),
            skin_type: data.text("skin_type"),
            skin_tone: data.text("skin_tone"),
            age_range: data.text("age_range"),
            start_wear_test: data.checked("start_wear_test"),
            errors: FormErrors::default(),
        }
    }

    /// Validates the bound values, recording errors on the form.
    pub fn clean(&mut self) -> Option<ReviewInput> {
        let mut errors = FormErrors::default();
        require_text(&mut errors, "title", &self.title, Some(TITLE_MAX));
        require_text(&mut errors, "body", &self.body, None);
        let rating = clean_rating(&mut errors, &self.rating);
        check_reference(&mut errors, "receipt", &self.receipt);
        let skin_type = optional_choice(&mut errors, "skin_type", &self.skin_type);
        let skin_tone = optional_choice(&mut errors, "skin_tone", &self.skin_tone);
        let age_range = optional_choice(&mut errors, "age_range", &self.age_range);

        if let Some(rating) = rating {
            // Echo the clamped value if the form is shown again.
            self.rating = rating.value().to_string();
        }
        self.errors = errors;
        if !self.errors.is_empty() {
            return None;
        }

        Some(ReviewInput {
            title: self.title.clone(),
            body: self.body.clone(),
            rating: rating?,
            is_verified_purchase: self.is_verified_purchase,
            receipt: (!self.receipt.is_empty()).then(|| self.receipt.clone()),
            skin_type,
            skin_tone,
            age_range,
            start_wear_test: self.start_wear_test,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaForm {
    pub file: String,
    pub kind: String,
    pub delete: bool,
    pub errors: FormErrors,
}

impl MediaForm {
    fn is_blank(&self) -> bool {
        self.file.is_empty() && self.kind.is_empty()
    }
}

/// The attachment slots submitted alongside a review, as `media-<n>-<field>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFormSet {
    pub forms: Vec<MediaForm>,
}

impl Default for MediaFormSet {
    fn default() -> Self {
        Self {
            forms: vec![MediaForm::default(); MEDIA_EXTRA_FORMS],
        }
    }
}

impl MediaFormSet {
    pub fn field_name(index: usize, field: &str) -> String {
        format!("{MEDIA_PREFIX}-{index}-{field}")
    }

    pub fn total_forms_name() -> String {
        format!("{MEDIA_PREFIX}-TOTAL_FORMS")
    }

    pub fn bind(data: &FormData) -> Self {
        let total = data
            .get(&Self::total_forms_name())
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or(MEDIA_EXTRA_FORMS)
            .min(MEDIA_MAX_FORMS);

        let forms = (0..total)
            .map(|i| MediaForm {
                file: data.text(&Self::field_name(i, "file")),
                kind: data.text(&Self::field_name(i, "kind")),
                delete: data.checked(&Self::field_name(i, "DELETE")),
                errors: FormErrors::default(),
            })
            .collect();
        Self { forms }
    }

    pub fn has_errors(&self) -> bool {
        self.forms.iter().any(|f| !f.errors.is_empty())
    }

    /// Validates every filled, non-deleted slot; blank and deleted slots are skipped.
    pub fn clean(&mut self) -> Option<Vec<MediaInput>> {
        let mut media = Vec::new();
        for form in &mut self.forms {
            form.errors = FormErrors::default();
            if form.delete || form.is_blank() {
                continue;
            }

            if form.file.is_empty() {
                form.errors.add("file", REQUIRED);
            }
            check_reference(&mut form.errors, "file", &form.file);
            let kind = if form.kind.is_empty() {
                form.errors.add("kind", REQUIRED);
                None
            } else {
                optional_choice::<MediaKind>(&mut form.errors, "kind", &form.kind)
            };

            if let (true, Some(kind)) = (form.errors.is_empty(), kind) {
                media.push(MediaInput {
                    file: form.file.clone(),
                    kind,
                });
            }
        }

        if self.has_errors() {
            None
        } else {
            Some(media)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewEditForm {
    pub title: String,
    pub body: String,
    pub rating: String,
    pub errors: FormErrors,
}

impl ReviewEditForm {
    pub fn from_review(review: &crate::models::review::Review) -> Self {
        Self {
            title: review.title.clone(),
            body: review.body.clone(),
            rating: review.rating.value().to_string(),
            errors: FormErrors::default(),
        }
    }

    pub fn bind(data: &FormData) -> Self {
        Self {
            title: data.text("title"),
            body: data.text("body"),
            rating: data.text("rating"),
            errors: FormErrors::default(),
        }
    }

    pub fn clean(&mut self) -> Option<ReviewEdit> {
        let mut errors = FormErrors::default();
        require_text(&mut errors, "title", &self.title, Some(TITLE_MAX));
        require_text(&mut errors, "body", &self.body, None);
        let rating = clean_rating(&mut errors, &self.rating);
        self.errors = errors;
        if !self.errors.is_empty() {
            return None;
        }
        Some(ReviewEdit {
            title: self.title.clone(),
            body: self.body.clone(),
            rating: rating?,
        })
    }
}

/// A vote counts as helpful only when `is_helpful` is exactly "true".
pub fn helpful_vote(data: &FormData) -> bool {
    data.get("is_helpful") == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::choices::SkinTone;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn out_of_range_ratings_are_clamped() {
        for (raw, expected) in [
            ("7", 5),
            ("0", 1),
            ("-3", 1),
            ("4", 4),
            ("99999999999999999999", 5),
            ("-99999999999999999999", 1),
        ] {
            let mut form =
                ReviewForm::bind(&data(&[("title", "t"), ("body", "b"), ("rating", raw)]));
            let input = form.clean().expect("form should validate");
            assert_eq!(input.rating.value(), expected, "rating input {raw}");
        }
    }

    #[test]
    fn missing_and_malformed_fields_are_reported() {
        let long_title = "x".repeat(121);
        let mut form = ReviewForm::bind(&data(&[
            ("rating", "five"),
            ("skin_tone", "olive"),
            ("title", long_title.as_str()),
        ]));
        assert!(form.clean().is_none());
        assert_eq!(form.errors.field("body"), vec![REQUIRED.to_string()]);
        assert_eq!(
            form.errors.field("rating"),
            vec!["Enter a whole number.".to_string()]
        );
        assert!(form.errors.has("skin_tone"));
        assert!(form.errors.has("title"));
    }

    #[test]
    fn optional_fields_bind() {
        let mut form = ReviewForm::bind(&data(&[
            ("title", "Wear test"),
            ("body", "Held up for 12 hours"),
            ("rating", "5"),
            ("is_verified_purchase", "on"),
            ("receipt", "receipts/r1.pdf"),
            ("skin_tone", "deep"),
            ("start_wear_test", "on"),
        ]));
        let input = form.clean().unwrap();
        assert!(input.is_verified_purchase);
        assert!(input.start_wear_test);
        assert_eq!(input.receipt.as_deref(), Some("receipts/r1.pdf"));
        assert_eq!(input.skin_tone, Some(SkinTone::Deep));
        assert_eq!(input.skin_type, None);
    }

    #[test]
    fn media_formset_skips_blank_and_deleted_slots() {
        let mut formset = MediaFormSet::bind(&data(&[
            ("media-TOTAL_FORMS", "3"),
            ("media-0-file", "review_media/a.jpg"),
            ("media-0-kind", "photo"),
            ("media-2-file", "review_media/b.mp4"),
            ("media-2-kind", "video"),
            ("media-2-DELETE", "on"),
        ]));
        let media = formset.clean().unwrap();
        assert_eq!(
            media,
            vec![MediaInput {
                file: "review_media/a.jpg".into(),
                kind: MediaKind::Photo,
            }]
        );
    }

    #[test]
    fn media_formset_requires_file_and_kind_together() {
        let mut formset = MediaFormSet::bind(&data(&[
            ("media-0-file", "review_media/a.jpg"),
            ("media-1-kind", "hologram"),
        ]));
        assert!(formset.clean().is_none());
        assert_eq!(formset.forms[0].errors.field("kind"), vec![REQUIRED.to_string()]);
        assert!(formset.forms[1].errors.has("file"));
        assert!(formset.forms[1].errors.has("kind"));
    }

    #[test]
    fn references_to_other_hosts_are_rejected() {
        let mut formset = MediaFormSet::bind(&data(&[
            ("media-TOTAL_FORMS", "3"),
            ("media-0-file", "https://tracker.example/pixel.gif"),
            ("media-0-kind", "photo"),
            ("media-1-file", "//cdn.example/clip.mp4"),
            ("media-1-kind", "video"),
            ("media-2-file", "review_media/ok.jpg"),
            ("media-2-kind", "photo"),
        ]));
        assert!(formset.clean().is_none());
        assert!(formset.forms[0].errors.has("file"));
        assert!(formset.forms[1].errors.has("file"));
        assert!(formset.forms[2].errors.is_empty());

        let mut form = ReviewForm::bind(&data(&[
            ("title", "t"),
            ("body", "b"),
            ("rating", "4"),
            ("receipt", "http://elsewhere.example/receipt.pdf"),
        ]));
        assert!(form.clean().is_none());
        assert!(form.errors.has("receipt"));
    }

    #[test]
    fn media_formset_defaults_to_two_slots_and_caps_total() {
        assert_eq!(MediaFormSet::bind(&data(&[])).forms.len(), MEDIA_EXTRA_FORMS);
        let capped = MediaFormSet::bind(&data(&[("media-TOTAL_FORMS", "500")]));
        assert_eq!(capped.forms.len(), MEDIA_MAX_FORMS);
    }

    #[test]
    fn helpful_flag_requires_literal_true() {
        assert!(helpful_vote(&data(&[("is_helpful", "true")])));
        assert!(!helpful_vote(&data(&[("is_helpful", "yes")])));
        assert!(!helpful_vote(&data(&[])));
    }
}
