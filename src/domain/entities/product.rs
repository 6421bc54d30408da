use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        ProductId(value)
    }
}

impl From<ProductId> for i64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    MensClothing,
    WomensClothing,
    Jewelery,
    Electronics,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MensClothing,
        Category::WomensClothing,
        Category::Jewelery,
        Category::Electronics,
    ];

    /// Value used on the wire and in the category filter.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::MensClothing => "men's clothing",
            Category::WomensClothing => "women's clothing",
            Category::Jewelery => "jewelery",
            Category::Electronics => "electronics",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::MensClothing => "Men's Clothing",
            Category::WomensClothing => "Women's Clothing",
            Category::Jewelery => "Jewelery",
            Category::Electronics => "Electronics",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        let needle = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::parse(&value).ok_or_else(|| format!("unknown category: {value}"))
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// A validated product payload that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub title: String,
    pub price: f64,
    pub category: Category,
    pub description: String,
    pub image: String,
}

impl ProductDraft {
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            price: self.price,
            category: self.category,
            description: self.description,
            image: self.image,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductField {
    Title,
    Description,
    Price,
    Category,
    Image,
}

impl ProductField {
    pub fn label(self) -> &'static str {
        match self {
            ProductField::Title => "Title",
            ProductField::Description => "Description",
            ProductField::Price => "Price",
            ProductField::Category => "Category",
            ProductField::Image => "Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord> {
    errors: BTreeMap<F, String>,
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, field: F) {
        self.errors.remove(&field);
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.errors.keys().copied()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.values().map(String::as_str)
    }
}

impl<F: Ord> fmt::Display for FieldErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

pub type ProductFieldErrors = FieldErrors<ProductField>;

/// Raw editor input. Values stay as typed so a failed submit can be corrected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image: String,
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.as_str().to_string(),
            image: product.image.clone(),
        }
    }

    pub fn set(&mut self, field: ProductField, value: String) {
        match field {
            ProductField::Title => self.title = value,
            ProductField::Description => self.description = value,
            ProductField::Price => self.price = value,
            ProductField::Category => self.category = value,
            ProductField::Image => self.image = value,
        }
    }

    pub fn validate(&self) -> Result<ProductDraft, ProductFieldErrors> {
        let mut errors = ProductFieldErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.insert(ProductField::Title, "Product title required.");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert(ProductField::Description, "Product description required.");
        }

        let price = match self.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 1.0 => Some(price),
            Ok(_) => {
                errors.insert(ProductField::Price, "Price must be at least 1");
                None
            }
            Err(_) => {
                errors.insert(ProductField::Price, "Price must be a number");
                None
            }
        };

        let category = if self.category.trim().is_empty() {
            errors.insert(ProductField::Category, "Please select a category");
            None
        } else {
            let parsed = Category::parse(&self.category);
            if parsed.is_none() {
                errors.insert(ProductField::Category, "Please select a category");
            }
            parsed
        };

        let image = self.image.trim();
        if image.is_empty() {
            errors.insert(ProductField::Image, "Please upload an image");
        }

        match (price, category) {
            (Some(price), Some(category)) if errors.is_empty() => Ok(ProductDraft {
                title: title.to_string(),
                price,
                category,
                description: description.to_string(),
                image: image.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), FieldErrors<LoginField>> {
        let mut errors = FieldErrors::new();
        if self.username.trim().chars().count() < 3 {
            errors.insert(LoginField::Username, "Username is required");
        }
        if self.password.chars().count() < 6 {
            errors.insert(
                LoginField::Password,
                "Password must be at least 6 characters",
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ProductForm {
        ProductForm {
            title: "Backpack".to_string(),
            description: "Fits 15 inch laptops".to_string(),
            price: "1".to_string(),
            category: "Men's Clothing".to_string(),
            image: "https://example.com/bag.png".to_string(),
        }
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(Category::parse("ELECTRONICS"), Some(Category::Electronics));
        assert_eq!(
            Category::parse(" men's clothing "),
            Some(Category::MensClothing)
        );
        assert_eq!(Category::parse("toys"), None);
    }

    #[test]
    fn product_deserializes_service_payload() {
        let json = r#"{
            "id": 7,
            "title": "White Gold Plated Princess",
            "price": 9.99,
            "description": "Classic ring",
            "category": "jewelery",
            "image": "https://fakestoreapi.com/img/71YAIFU48IL._AC_UL640_QL65_ML3_.jpg",
            "rating": { "rate": 3, "count": 400 }
        }"#;

        let product: Product = serde_json::from_str(json).expect("payload should parse");

        assert_eq!(product.id, ProductId(7));
        assert_eq!(product.category, Category::Jewelery);
        assert_eq!(product.price, 9.99);
    }

    #[test]
    fn validate_accepts_minimum_price() {
        let draft = filled_form().validate().expect("form should validate");
        assert_eq!(draft.price, 1.0);
        assert_eq!(draft.category, Category::MensClothing);
    }

    #[test]
    fn validate_rejects_zero_price() {
        let mut form = filled_form();
        form.price = "0".to_string();

        let errors = form.validate().expect_err("price 0 should fail");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(ProductField::Price),
            Some("Price must be at least 1")
        );
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let errors = ProductForm::default()
            .validate()
            .expect_err("empty form should fail");

        let fields: Vec<ProductField> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![
                ProductField::Title,
                ProductField::Description,
                ProductField::Price,
                ProductField::Category,
                ProductField::Image,
            ]
        );
        assert_eq!(
            errors.get(ProductField::Image),
            Some("Please upload an image")
        );
    }

    #[test]
    fn credentials_enforce_minimum_lengths() {
        let credentials = Credentials {
            username: "mo".to_string(),
            password: "12345".to_string(),
        };
        let errors = credentials.validate().expect_err("short input should fail");
        assert_eq!(errors.get(LoginField::Username), Some("Username is required"));
        assert_eq!(
            errors.get(LoginField::Password),
            Some("Password must be at least 6 characters")
        );

        let ok = Credentials {
            username: "mor_2314".to_string(),
            password: "83r5^_".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
