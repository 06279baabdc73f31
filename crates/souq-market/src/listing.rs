//! Listing/inventory collaborator boundary.
//!
//! Listing management lives outside the trade core; the core only needs
//! a conditional stock reservation that cannot oversell under concurrent
//! buyers, and its inverse for cancellations before fulfilment. The
//! in-memory implementation backs tests and single-process deployments.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use souq_core::{Amount, ListingId, UserId};

use crate::error::{MarketError, Result};

/// Availability status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Purchasable.
    Active,
    /// Temporarily withdrawn by the seller.
    Paused,
    /// Stock exhausted.
    SoldOut,
}

/// Inputs for registering a listing with the in-memory directory.
#[derive(Debug, Clone)]
pub struct NewListing {
    /// The selling user.
    pub seller: UserId,
    /// Display title.
    pub title: String,
    /// Price per unit.
    pub unit_price: Amount,
    /// Units in stock.
    pub available_stock: u32,
    /// Minimum units per purchase.
    pub min_purchase: u32,
    /// Delivery method label copied onto orders.
    pub delivery_method: String,
}

/// A marketplace listing as the trade core sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing id.
    pub id: ListingId,
    /// The selling user.
    pub seller: UserId,
    /// Display title.
    pub title: String,
    /// Price per unit.
    pub unit_price: Amount,
    /// Units currently in stock.
    pub available_stock: u32,
    /// Minimum units per purchase.
    pub min_purchase: u32,
    /// Delivery method label.
    pub delivery_method: String,
    /// Availability status.
    pub status: ListingStatus,
}

/// Boundary contract for the listing/inventory collaborator.
pub trait ListingDirectory: Send + Sync {
    /// Fetches a listing snapshot.
    fn get(&self, id: ListingId) -> Result<Listing>;

    /// Atomically validates and decrements stock for a purchase,
    /// returning the post-reservation snapshot.
    ///
    /// The check and the decrement happen under one critical section so
    /// concurrent buyers cannot exhaust stock past zero.
    fn reserve_stock(&self, id: ListingId, quantity: u32) -> Result<Listing>;

    /// Returns previously reserved stock (cancellation before
    /// fulfilment), reactivating a sold-out listing.
    fn release_stock(&self, id: ListingId, quantity: u32) -> Result<()>;
}

/// In-memory listing directory.
#[derive(Debug, Default)]
pub struct InMemoryListings {
    listings: RwLock<HashMap<ListingId, Listing>>,
}

impl InMemoryListings {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listing and returns its id.
    pub fn insert(&self, new: NewListing) -> ListingId {
        let id = ListingId::new();
        let status = if new.available_stock == 0 {
            ListingStatus::SoldOut
        } else {
            ListingStatus::Active
        };
        let listing = Listing {
            id,
            seller: new.seller,
            title: new.title,
            unit_price: new.unit_price,
            available_stock: new.available_stock,
            min_purchase: new.min_purchase.max(1),
            delivery_method: new.delivery_method,
            status,
        };
        self.listings.write().insert(id, listing);
        id
    }

    /// Pauses a listing so it can no longer be purchased.
    pub fn pause(&self, id: ListingId) -> Result<()> {
        let mut listings = self.listings.write();
        let listing = listings
            .get_mut(&id)
            .ok_or(MarketError::ListingNotFound { id })?;
        listing.status = ListingStatus::Paused;
        Ok(())
    }
}

impl ListingDirectory for InMemoryListings {
    fn get(&self, id: ListingId) -> Result<Listing> {
        self.listings
            .read()
            .get(&id)
            .cloned()
            .ok_or(MarketError::ListingNotFound { id })
    }

    fn reserve_stock(&self, id: ListingId, quantity: u32) -> Result<Listing> {
        let mut listings = self.listings.write();
        let listing = listings
            .get_mut(&id)
            .ok_or(MarketError::ListingNotFound { id })?;

        if listing.status != ListingStatus::Active {
            return Err(MarketError::ListingUnavailable { id });
        }
        if quantity < listing.min_purchase {
            return Err(MarketError::BelowMinimumPurchase {
                requested: quantity,
                min: listing.min_purchase,
            });
        }
        if quantity > listing.available_stock {
            return Err(MarketError::InsufficientStock {
                id,
                requested: quantity,
                available: listing.available_stock,
            });
        }

        listing.available_stock -= quantity;
        if listing.available_stock == 0 {
            listing.status = ListingStatus::SoldOut;
        }
        Ok(listing.clone())
    }

    fn release_stock(&self, id: ListingId, quantity: u32) -> Result<()> {
        let mut listings = self.listings.write();
        let listing = listings
            .get_mut(&id)
            .ok_or(MarketError::ListingNotFound { id })?;

        listing.available_stock = listing.available_stock.saturating_add(quantity);
        if listing.status == ListingStatus::SoldOut && listing.available_stock > 0 {
            listing.status = ListingStatus::Active;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with(stock: u32, min: u32) -> (InMemoryListings, ListingId) {
        let directory = InMemoryListings::new();
        let id = directory.insert(NewListing {
            seller: UserId::new(),
            title: "100k gold".to_string(),
            unit_price: Amount::from_major(5),
            available_stock: stock,
            min_purchase: min,
            delivery_method: "in_game_mail".to_string(),
        });
        (directory, id)
    }

    #[test]
    fn reserve_decrements_stock() {
        let (directory, id) = directory_with(10, 1);
        let listing = directory.reserve_stock(id, 4).expect("reserve");
        assert_eq!(listing.available_stock, 6);
        assert_eq!(listing.status, ListingStatus::Active);
    }

    #[test]
    fn reserve_flips_sold_out_at_zero() {
        let (directory, id) = directory_with(4, 1);
        let listing = directory.reserve_stock(id, 4).expect("reserve");
        assert_eq!(listing.available_stock, 0);
        assert_eq!(listing.status, ListingStatus::SoldOut);

        let err = directory.reserve_stock(id, 1).unwrap_err();
        assert!(matches!(err, MarketError::ListingUnavailable { .. }));
    }

    #[test]
    fn reserve_rejects_overdraw() {
        let (directory, id) = directory_with(3, 1);
        let err = directory.reserve_stock(id, 5).unwrap_err();
        assert!(matches!(
            err,
            MarketError::InsufficientStock {
                requested: 5,
                available: 3,
                ..
            }
        ));
        // Stock untouched by the failed reservation.
        assert_eq!(directory.get(id).expect("get").available_stock, 3);
    }

    #[test]
    fn reserve_enforces_minimum_purchase() {
        let (directory, id) = directory_with(10, 5);
        let err = directory.reserve_stock(id, 2).unwrap_err();
        assert!(matches!(
            err,
            MarketError::BelowMinimumPurchase { requested: 2, min: 5 }
        ));
    }

    #[test]
    fn paused_listing_not_purchasable() {
        let (directory, id) = directory_with(10, 1);
        directory.pause(id).expect("pause");
        assert!(matches!(
            directory.reserve_stock(id, 1),
            Err(MarketError::ListingUnavailable { .. })
        ));
    }

    #[test]
    fn release_restores_stock_and_reactivates() {
        let (directory, id) = directory_with(2, 1);
        directory.reserve_stock(id, 2).expect("reserve");
        assert_eq!(directory.get(id).expect("get").status, ListingStatus::SoldOut);

        directory.release_stock(id, 2).expect("release");
        let listing = directory.get(id).expect("get");
        assert_eq!(listing.available_stock, 2);
        assert_eq!(listing.status, ListingStatus::Active);
    }

    #[test]
    fn unknown_listing_is_not_found() {
        let directory = InMemoryListings::new();
        assert!(matches!(
            directory.get(ListingId::new()),
            Err(MarketError::ListingNotFound { .. })
        ));
    }

    #[test]
    fn zero_stock_listing_starts_sold_out() {
        let (directory, id) = directory_with(0, 1);
        assert_eq!(directory.get(id).expect("get").status, ListingStatus::SoldOut);
    }
}
