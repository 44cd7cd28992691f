//! Guest cart persistence.
//!
//! Guests keep their cart in a single local JSON document holding
//! `{items, total_amount}`, the client-side analogue of browser local
//! storage. Writes are best-effort and not atomic with the in-memory state;
//! losing a guest cart to a crash is acceptable, losing it to a clean
//! restart is not.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally::{
    cart::{Cart, CartLine},
    money::MinorUnits,
};

/// Errors reading or writing the local cart document.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access local cart storage")]
    Io(#[from] std::io::Error),

    #[error("local cart document is malformed")]
    Malformed(#[from] serde_json::Error),
}

/// The persisted document. Only items and the derived total are stored;
/// discounts are server-owned and never survive locally.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCart {
    items: Vec<CartLine>,
    total_amount: MinorUnits,
}

/// File-backed guest cart store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// A store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store in the user's data directory, when one exists.
    pub fn in_user_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("tally").join("cart.json")))
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted guest cart. A missing document is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the document exists but cannot be read or
    /// parsed.
    pub fn load(&self) -> Result<Option<Cart>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let stored: StoredCart = serde_json::from_str(&contents)?;

        Ok(Some(Cart::from_lines(stored.items, None)))
    }

    /// Persist the guest cart, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredCart {
            items: cart.lines().to_vec(),
            total_amount: cart.total(),
        };

        fs::write(&self.path, serde_json::to_string(&stored)?)?;

        Ok(())
    }

    /// Remove the persisted document, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when deletion fails for a reason other than the
    /// document already being absent.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
