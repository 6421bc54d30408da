use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::product::Product;

pub const EXPORT_HEADERS: [&str; 5] = ["id", "title", "category", "price", "image"];

pub fn export_products_csv(csv_path: &Path, products: &[Product]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(csv_path)
        .with_context(|| format!("failed to create csv: {}", csv_path.display()))?;

    writer
        .write_record(EXPORT_HEADERS)
        .context("failed to write csv header")?;

    for product in products {
        writer
            .write_record([
                product.id.to_string(),
                product.title.clone(),
                product.category.label().to_string(),
                product.price.to_string(),
                product.image.clone(),
            ])
            .with_context(|| format!("failed to write product #{}", product.id))?;
    }

    writer.flush().context("failed to flush csv")?;
    Ok(products.len())
}
