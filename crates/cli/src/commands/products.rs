//! Product catalog commands.

use velvet_mango_core::ProductId;
use velvet_mango_storefront::backend::{BackendClient, NewProduct};
use velvet_mango_storefront::services::CatalogService;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Print the full catalog as a table.
#[allow(clippy::print_stdout)]
pub async fn list(catalog: &CatalogService<BackendClient>) -> CommandResult {
    let products = catalog.products().await?;

    println!(
        "{:<38} {:<28} {:<14} {:>14} {:>6}",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
    );
    for product in products.iter() {
        println!(
            "{:<38} {:<28} {:<14} {:>14} {:>6}",
            product.id,
            product.name,
            product.category,
            product.price.to_string(),
            product.stock
        );
    }
    println!("{} product(s)", products.len());

    Ok(())
}

/// Insert a new product.
#[allow(clippy::print_stdout)]
pub async fn add(catalog: &CatalogService<BackendClient>, product: NewProduct) -> CommandResult {
    let created = catalog.create_product(&product).await?;
    println!("Created product {} ({})", created.id, created.name);
    Ok(())
}

/// Replace a product's fields.
#[allow(clippy::print_stdout)]
pub async fn update(
    catalog: &CatalogService<BackendClient>,
    id: ProductId,
    product: NewProduct,
) -> CommandResult {
    let updated = catalog.update_product(id, &product).await?;
    println!("Updated product {} ({})", updated.id, updated.name);
    Ok(())
}

/// Delete a product. Refuses to run without `--yes`.
#[allow(clippy::print_stdout)]
pub async fn remove(
    catalog: &CatalogService<BackendClient>,
    id: ProductId,
    yes: bool,
) -> CommandResult {
    if !yes {
        return Err(format!("refusing to delete product {id}; re-run with --yes").into());
    }

    catalog.delete_product(id).await?;
    println!("Deleted product {id}");
    Ok(())
}
