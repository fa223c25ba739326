// Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use filament_match::core::{Geocoder, GeocodingError};
use filament_match::models::{Coordinates, MaterialType, StockId, StockLot, Supplier, SupplierId};
use filament_match::services::InMemoryInventory;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Upper East Side, Manhattan
pub const BUYER: (f64, f64) = (40.7903, -73.9477);
pub const BUYER_ADDRESS: &str = "1000 5th Ave, New York, NY 10028";

pub const JERSEY_CITY_ID: SupplierId = 1;
pub const NEW_HAVEN_ID: SupplierId = 2;
pub const JERSEY_CITY_STOCK: StockId = 101;
pub const NEW_HAVEN_STOCK: StockId = 201;

pub fn create_supplier(id: SupplierId, name: &str, lat: f64, lon: f64) -> Supplier {
    Supplier {
        id,
        name: name.to_string(),
        email: format!("orders@supplier{}.test", id),
        phone: Some("+1-555-0100".to_string()),
        address: format!("{} warehouse", name),
        city: Some(name.to_string()),
        country: Some("US".to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        verified: true,
        active: true,
    }
}

pub fn create_lot(
    id: StockId,
    supplier_id: SupplierId,
    color: &str,
    quantity_kg: f64,
    reserved_kg: f64,
) -> StockLot {
    StockLot {
        id,
        supplier_id,
        material_type: MaterialType::Pla,
        color: color.to_string(),
        quantity_kg,
        reserved_kg,
        available: true,
        last_restocked_at: None,
        expires_at: None,
    }
}

/// Jersey City (close) and New Haven (far), both with plenty of red PLA
pub async fn seeded_inventory() -> InMemoryInventory {
    let inventory = InMemoryInventory::new();
    inventory
        .upsert_supplier(create_supplier(JERSEY_CITY_ID, "Jersey City", 40.7178, -74.0431))
        .await;
    inventory
        .upsert_supplier(create_supplier(NEW_HAVEN_ID, "New Haven", 41.3083, -72.9279))
        .await;
    inventory
        .upsert_stock(create_lot(JERSEY_CITY_STOCK, JERSEY_CITY_ID, "Red", 20.0, 0.0))
        .await;
    inventory
        .upsert_stock(create_lot(NEW_HAVEN_STOCK, NEW_HAVEN_ID, "Red", 50.0, 0.0))
        .await;
    inventory
}

/// Geocoder backed by a fixed address book
#[derive(Default)]
pub struct StaticGeocoder {
    addresses: HashMap<String, Coordinates>,
    calls: AtomicUsize,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: &str, lat: f64, lon: f64) -> Self {
        self.addresses.insert(address.to_string(), Coordinates::new(lat, lon));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.addresses
            .get(address)
            .copied()
            .ok_or_else(|| GeocodingError::NoResults(address.to_string()))
    }
}
