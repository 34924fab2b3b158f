//! Product catalog and credential directory loading.
//!
//! Both fall back to built-in data when no file is configured.

use std::path::{Path, PathBuf};

use pocket_shop_core::ProductId;
use pocket_shop_core::auth::{AuthDirectory, DirectoryError};
use pocket_shop_core::cart::ListingItem;
use thiserror::Error;

/// Errors that can occur while loading data files.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: DirectoryError,
    },
}

const BUILTIN_CATALOG: &[(&str, &str, &str, &str)] = &[
    ("phone-x", "Smartphone X", "$799.00", "phone_x.png"),
    ("tablet-10", "Tablet 10\"", "$329.99", "tablet_10.png"),
    ("earbuds", "Wireless Earbuds", "$59.90", "earbuds.png"),
    ("charger-65w", "65W USB-C Charger", "$24.50", "charger_65w.png"),
    ("smartwatch", "Smartwatch", "$199.00", "smartwatch.png"),
    ("power-bank", "Power Bank 20000mAh", "$34.95", "power_bank.png"),
];

/// The built-in product catalog.
#[must_use]
pub fn builtin_catalog() -> Vec<ListingItem> {
    BUILTIN_CATALOG
        .iter()
        .map(|(id, name, price, image)| ListingItem {
            id: ProductId::new(*id),
            name: (*name).to_owned(),
            price: (*price).to_owned(),
            image: (*image).to_owned(),
            quantity: None,
        })
        .collect()
}

/// Load the catalog from a JSON file, or the built-in one.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed.
pub async fn load_catalog(path: Option<&Path>) -> Result<Vec<ListingItem>, CatalogError> {
    let Some(path) = path else {
        return Ok(builtin_catalog());
    };

    let json = read(path).await?;
    let catalog: Vec<ListingItem> =
        serde_json::from_str(&json).map_err(|source| CatalogError::Parse {
            path: path.to_owned(),
            source,
        })?;
    tracing::info!(path = %path.display(), products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Load the credential directory from a JSON file, or the built-in one.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed.
pub async fn load_directory(path: Option<&Path>) -> Result<AuthDirectory, CatalogError> {
    let Some(path) = path else {
        return Ok(AuthDirectory::builtin());
    };

    let json = read(path).await?;
    let directory = AuthDirectory::from_json(&json).map_err(|source| CatalogError::Directory {
        path: path.to_owned(),
        source,
    })?;
    tracing::info!(path = %path.display(), users = directory.len(), "Directory loaded");
    Ok(directory)
}

/// Read a cart file as listing items.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed.
pub async fn load_cart(path: &Path) -> Result<Vec<ListingItem>, CatalogError> {
    let json = read(path).await?;
    serde_json::from_str(&json).map_err(|source| CatalogError::Parse {
        path: path.to_owned(),
        source,
    })
}

async fn read(path: &Path) -> Result<String, CatalogError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_owned(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pocket_shop_core::Price;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pocket-shop-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_builtin_catalog_prices_parse() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 6);
        for item in &catalog {
            assert!(Price::parse(&item.price).is_ok(), "bad price for {}", item.id);
        }
    }

    #[test]
    fn test_builtin_catalog_ids_unique() {
        let catalog = builtin_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|item| item.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[tokio::test]
    async fn test_load_defaults() {
        assert_eq!(load_catalog(None).await.unwrap().len(), 6);
        assert_eq!(load_directory(None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_load_catalog_file() {
        let path = temp_file(
            "catalog.json",
            r#"[{"id": "mug", "name": "Mug", "price": "$4.00"}]"#,
        );
        let catalog = load_catalog(Some(&path)).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, ProductId::new("mug"));
        assert!(catalog[0].image.is_empty());
    }

    #[tokio::test]
    async fn test_load_directory_file() {
        let path = temp_file(
            "users.json",
            r#"[{"email": "a@example.com", "password": "pw"}]"#,
        );
        let directory = load_directory(Some(&path)).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(directory.len(), 1);
        assert!(directory.lookup("a@example.com", "pw").is_some());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let path = std::env::temp_dir().join("pocket-shop-does-not-exist.json");
        let err = load_catalog(Some(&path)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let path = temp_file("broken.json", "{ not json");
        let err = load_cart(&path).await.unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
