use super::{check_length, require_text, FormData, FormErrors, REQUIRED};
use crate::models::choices::Category;
use crate::models::price::Price;
use crate::models::product::{Product, ProductInput};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub brand: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
    pub description: String,
    pub errors: FormErrors,
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        Self {
            brand: product.brand.clone(),
            name: product.name.clone(),
            category: product.category.code().to_string(),
            price: product.price.map(|p| p.to_string()).unwrap_or_default(),
            image_url: product.image_url.clone(),
            description: product.description.clone(),
            errors: FormErrors::default(),
        }
    }

    pub fn bind(data: &FormData) -> Self {
        Self {
            brand: data.text("brand"),
            name: data.text("name"),
            category: data.text("category"),
            price: data.text("price"),
            image_url: data.text("image_url"),
            description: data.text("description"),
            errors: FormErrors::default(),
        }
    }

    pub fn clean(&mut self) -> Option<ProductInput> {
        let mut errors = FormErrors::default();
        require_text(&mut errors, "brand", &self.brand, Some(100));
        require_text(&mut errors, "name", &self.name, Some(150));

        let category = if self.category.is_empty() {
            errors.add("category", REQUIRED);
            None
        } else {
            match self.category.parse::<Category>() {
                Ok(c) => Some(c),
                Err(e) => {
                    errors.add("category", e.to_string());
                    None
                }
            }
        };

        let price = if self.price.is_empty() {
            None
        } else {
            match self.price.parse::<Price>() {
                Ok(p) => Some(p),
                Err(e) => {
                    errors.add("price", e.to_string());
                    None
                }
            }
        };

        check_length(&mut errors, "image_url", &self.image_url, Some(200));
        if !self.image_url.is_empty()
            && !(self.image_url.starts_with("http://")
                || self.image_url.starts_with("https://")
                || self.image_url.starts_with('/'))
        {
            errors.add("image_url", "Enter a valid URL.");
        }

        self.errors = errors;
        if !self.errors.is_empty() {
            return None;
        }
        Some(ProductInput {
            brand: self.brand.clone(),
            name: self.name.clone(),
            category: category?,
            price,
            image_url: self.image_url.clone(),
            description: self.description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn valid_product() {
        let mut form = ProductForm::bind(&data(&[
            ("brand", "Rare Beauty"),
            ("name", "Soft Pinch Liquid Blush"),
            ("category", "blush"),
            ("price", "23"),
        ]));
        let input = form.clean().unwrap();
        assert_eq!(input.category, Category::Blush);
        assert_eq!(input.price.map(Price::cents), Some(2300));
    }

    #[test]
    fn invalid_product_reports_each_field() {
        let mut form = ProductForm::bind(&data(&[
            ("category", "perfume"),
            ("price", "12.345"),
            ("image_url", "javascript:alert(1)"),
        ]));
        assert!(form.clean().is_none());
        for field in ["brand", "name", "category", "price", "image_url"] {
            assert!(form.errors.has(field), "expected an error on {field}");
        }
    }
}
