// Integration tests for Filament Match

mod common;

use common::*;
use filament_match::core::{MatchError, SupplierMatcher};
use filament_match::models::{MatchRequest, MaterialType};
use filament_match::services::InMemoryInventory;
use filament_match::{LedgerError, StockLedger, SupplierCatalog};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn create_request(color: &str, required_kg: f64) -> MatchRequest {
    MatchRequest {
        material_type: MaterialType::Pla,
        color: color.to_string(),
        required_quantity_kg: required_kg,
        buyer_address: BUYER_ADDRESS.to_string(),
        buyer_latitude: Some(BUYER.0),
        buyer_longitude: Some(BUYER.1),
    }
}

fn create_matcher(inventory: Arc<InMemoryInventory>) -> SupplierMatcher {
    SupplierMatcher::with_default_settings(inventory, Arc::new(StaticGeocoder::new()))
}

#[tokio::test]
async fn test_integration_selects_nearest_supplier() {
    let inventory = Arc::new(seeded_inventory().await);
    let matcher = create_matcher(inventory);

    let result = matcher
        .find_closest_supplier(&create_request("Red", 5.0))
        .await
        .unwrap();

    assert_eq!(result.supplier.id, JERSEY_CITY_ID);
    assert_eq!(result.available_stock.id, JERSEY_CITY_STOCK);
    assert!(result.distance_km > 5.0 && result.distance_km < 20.0, "got {}", result.distance_km);
    assert_eq!(result.message, "Closest supplier found successfully");
}

#[tokio::test]
async fn test_integration_falls_back_when_nearest_is_short() {
    let inventory = Arc::new(seeded_inventory().await);
    inventory.reserve(JERSEY_CITY_STOCK, 18.0).await.unwrap();
    let matcher = create_matcher(inventory);

    // Jersey City now only has 2 kg unreserved
    let result = matcher
        .find_closest_supplier(&create_request("Red", 5.0))
        .await
        .unwrap();

    assert_eq!(result.supplier.id, NEW_HAVEN_ID);
    assert_eq!(result.available_stock.id, NEW_HAVEN_STOCK);
    assert!(result.distance_km > 80.0 && result.distance_km < 130.0, "got {}", result.distance_km);
}

#[tokio::test]
async fn test_integration_no_stock_names_the_request() {
    let inventory = Arc::new(seeded_inventory().await);
    let matcher = create_matcher(inventory);

    let err = matcher
        .find_closest_supplier(&create_request("Red", 500.0))
        .await
        .unwrap_err();

    assert!(matches!(err, MatchError::SupplierNotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("PLA"));
    assert!(message.contains("Red"));
    assert!(message.contains("500"));
}

#[tokio::test]
async fn test_integration_color_must_match_exactly() {
    let inventory = Arc::new(seeded_inventory().await);
    let matcher = create_matcher(inventory);

    let err = matcher
        .find_closest_supplier(&create_request("red", 1.0))
        .await
        .unwrap_err();

    assert!(matches!(err, MatchError::SupplierNotFound { .. }));
}

#[tokio::test]
async fn test_integration_unavailable_and_unverified_are_skipped() {
    let inventory = Arc::new(seeded_inventory().await);

    let mut lot = create_lot(JERSEY_CITY_STOCK, JERSEY_CITY_ID, "Red", 20.0, 0.0);
    lot.available = false;
    inventory.upsert_stock(lot).await;

    let mut unverified = create_supplier(3, "Hoboken", 40.7440, -74.0324);
    unverified.verified = false;
    inventory.upsert_supplier(unverified).await;
    inventory.upsert_stock(create_lot(301, 3, "Red", 100.0, 0.0)).await;

    let matcher = create_matcher(inventory);
    let result = matcher
        .find_closest_supplier(&create_request("Red", 5.0))
        .await
        .unwrap();

    assert_eq!(result.supplier.id, NEW_HAVEN_ID);
}

#[tokio::test]
async fn test_integration_equidistant_suppliers_prefer_lowest_id() {
    let inventory = Arc::new(InMemoryInventory::new());
    inventory.upsert_supplier(create_supplier(9, "Second", 40.7178, -74.0431)).await;
    inventory.upsert_supplier(create_supplier(4, "First", 40.7178, -74.0431)).await;
    inventory.upsert_stock(create_lot(90, 9, "Red", 10.0, 0.0)).await;
    inventory.upsert_stock(create_lot(40, 4, "Red", 10.0, 0.0)).await;

    let matcher = create_matcher(inventory);
    let result = matcher
        .find_closest_supplier(&create_request("Red", 1.0))
        .await
        .unwrap();

    assert_eq!(result.supplier.id, 4);
    assert_eq!(result.available_stock.id, 40);
}

#[tokio::test]
async fn test_integration_geocodes_when_coordinates_missing() {
    let inventory = Arc::new(seeded_inventory().await);
    let geocoder = Arc::new(StaticGeocoder::new().with_address(BUYER_ADDRESS, BUYER.0, BUYER.1));
    let matcher = SupplierMatcher::with_default_settings(inventory, geocoder.clone());

    let mut request = create_request("Red", 5.0);
    request.buyer_latitude = None;
    request.buyer_longitude = None;

    let result = matcher.find_closest_supplier(&request).await.unwrap();

    assert_eq!(result.supplier.id, JERSEY_CITY_ID);
    assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn test_integration_unknown_address_is_unmatched() {
    let inventory = Arc::new(seeded_inventory().await);
    let matcher = create_matcher(inventory);

    let mut request = create_request("Red", 5.0);
    request.buyer_address = "Atlantis".to_string();
    request.buyer_latitude = None;
    request.buyer_longitude = None;

    let err = matcher.find_closest_supplier(&request).await.unwrap_err();

    assert!(matches!(err, MatchError::GeocodingFailed { ref address, .. } if address == "Atlantis"));
    assert!(err.is_unmatched());
}

/// Counts catalog queries to prove validation happens first
struct CountingCatalog {
    inner: InMemoryInventory,
    queries: AtomicUsize,
}

#[async_trait::async_trait]
impl SupplierCatalog for CountingCatalog {
    async fn find_candidates(
        &self,
        query: &filament_match::models::CandidateQuery,
    ) -> Result<Vec<filament_match::models::SupplierCandidate>, filament_match::core::CatalogError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_candidates(query).await
    }

    async fn find_stock(
        &self,
        stock_id: filament_match::models::StockId,
    ) -> Result<Option<filament_match::StockLot>, filament_match::core::CatalogError> {
        self.inner.find_stock(stock_id).await
    }
}

#[tokio::test]
async fn test_integration_invalid_request_never_reaches_catalog() {
    let catalog = Arc::new(CountingCatalog {
        inner: seeded_inventory().await,
        queries: AtomicUsize::new(0),
    });
    let geocoder = Arc::new(StaticGeocoder::new());
    let matcher = SupplierMatcher::with_default_settings(catalog.clone(), geocoder.clone());

    let invalid = vec![
        create_request("", 5.0),
        create_request("   ", 5.0),
        create_request("Red", 0.0),
        create_request("Red", -2.0),
        MatchRequest {
            buyer_address: String::new(),
            ..create_request("Red", 5.0)
        },
        MatchRequest {
            buyer_longitude: None,
            ..create_request("Red", 5.0)
        },
        MatchRequest {
            buyer_latitude: Some(91.0),
            ..create_request("Red", 5.0)
        },
    ];

    for request in &invalid {
        let err = matcher.find_closest_supplier(request).await.unwrap_err();
        assert!(
            matches!(err, MatchError::InvalidArgument { .. }),
            "expected InvalidArgument for {:?}, got {:?}",
            request,
            err
        );
    }

    assert_eq!(catalog.queries.load(Ordering::SeqCst), 0);
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn test_integration_match_does_not_reserve() {
    let inventory = Arc::new(seeded_inventory().await);
    let matcher = create_matcher(inventory.clone());

    for _ in 0..3 {
        matcher
            .find_closest_supplier(&create_request("Red", 15.0))
            .await
            .unwrap();
    }

    let lot = inventory.stock_lot(JERSEY_CITY_STOCK).await.unwrap().unwrap();
    assert_eq!(lot.reserved_kg, 0.0);
}

#[tokio::test]
async fn test_integration_match_then_reserve_shifts_next_match() {
    let inventory = Arc::new(seeded_inventory().await);
    let matcher = create_matcher(inventory.clone());
    let request = create_request("Red", 15.0);

    let first = matcher.find_closest_supplier(&request).await.unwrap();
    inventory
        .reserve(first.available_stock.id, request.required_quantity_kg)
        .await
        .unwrap();

    let second = matcher.find_closest_supplier(&request).await.unwrap();
    assert_eq!(first.supplier.id, JERSEY_CITY_ID);
    assert_eq!(second.supplier.id, NEW_HAVEN_ID);

    // Returning the reservation makes Jersey City eligible again
    inventory.release(first.available_stock.id, 15.0).await.unwrap();
    let third = matcher.find_closest_supplier(&request).await.unwrap();
    assert_eq!(third.supplier.id, JERSEY_CITY_ID);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_integration_concurrent_reservations_never_oversell() {
    let inventory = Arc::new(InMemoryInventory::new());
    inventory.upsert_supplier(create_supplier(1, "Jersey City", 40.7178, -74.0431)).await;
    inventory.upsert_stock(create_lot(1, 1, "Red", 10.0, 0.0)).await;

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let inventory = inventory.clone();
            tokio::spawn(async move { inventory.reserve(1, 0.75).await })
        })
        .collect();

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InsufficientStock { .. }) => rejected += 1,
            Err(e) => panic!("unexpected ledger error: {}", e),
        }
    }

    // floor(10 / 0.75) = 13
    assert_eq!(succeeded, 13);
    assert_eq!(rejected, 19);

    let lot = inventory.stock_lot(1).await.unwrap().unwrap();
    assert!((lot.reserved_kg - 9.75).abs() < 1e-9);
    assert!(lot.reserved_kg <= lot.quantity_kg);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_integration_concurrent_reserve_and_release_balance() {
    let inventory = Arc::new(InMemoryInventory::new());
    inventory.upsert_stock(create_lot(7, 1, "Black", 5.0, 2.5)).await;

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let inventory = inventory.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    inventory.reserve(7, 0.1).await.map(|_| ())
                } else {
                    inventory.release(7, 0.1).await.map(|_| ())
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // 25 reserves and 25 releases of 0.1 kg cancel out
    let lot = inventory.stock_lot(7).await.unwrap().unwrap();
    assert_eq!(lot.reserved_kg, 2.5);
}

#[tokio::test]
async fn test_integration_lots_are_independent() {
    let inventory = seeded_inventory().await;

    inventory.reserve(JERSEY_CITY_STOCK, 20.0).await.unwrap();
    let err = inventory.reserve(JERSEY_CITY_STOCK, 0.001).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientStock { .. }));

    let other = inventory.reserve(NEW_HAVEN_STOCK, 49.0).await.unwrap();
    assert_eq!(other.reserved_kg, 49.0);

    let untouched = inventory.stock_lot(JERSEY_CITY_STOCK).await.unwrap().unwrap();
    assert_eq!(untouched.reserved_kg, 20.0);
}

#[tokio::test]
async fn test_integration_ledger_rejections_leave_state_unchanged() {
    let inventory = seeded_inventory().await;
    inventory.reserve(JERSEY_CITY_STOCK, 4.0).await.unwrap();

    assert!(matches!(
        inventory.release(JERSEY_CITY_STOCK, 4.5).await,
        Err(LedgerError::InvalidRelease { .. })
    ));
    assert!(matches!(
        inventory.reserve(JERSEY_CITY_STOCK, 0.0).await,
        Err(LedgerError::InvalidArgument { .. })
    ));
    assert!(matches!(
        inventory.reserve(999, 1.0).await,
        Err(LedgerError::InvalidArgument { .. })
    ));

    let lot = inventory.stock_lot(JERSEY_CITY_STOCK).await.unwrap().unwrap();
    assert_eq!(lot.reserved_kg, 4.0);
    assert_eq!(lot.quantity_kg, 20.0);
}

#[tokio::test]
async fn test_integration_sub_milligram_request_rejected() {
    let inventory = Arc::new(InMemoryInventory::new());
    inventory.upsert_supplier(create_supplier(1, "Jersey City", 40.7178, -74.0431)).await;
    inventory.upsert_stock(create_lot(1, 1, "Red", 10.0, 10.0)).await;
    let matcher = create_matcher(inventory.clone());

    let err = matcher
        .find_closest_supplier(&create_request("Red", 4e-7))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::InvalidArgument { .. }));

    // The ledger refuses the same amount
    assert!(matches!(
        inventory.reserve(1, 4e-7).await,
        Err(LedgerError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn test_integration_matched_lot_accepts_the_reservation() {
    let inventory = Arc::new(InMemoryInventory::new());
    inventory.upsert_supplier(create_supplier(1, "Jersey City", 40.7178, -74.0431)).await;
    inventory.upsert_stock(create_lot(1, 1, "Red", 5.0, 0.0)).await;
    let matcher = create_matcher(inventory.clone());

    let request = create_request("Red", 5.000_000_4);
    let result = matcher.find_closest_supplier(&request).await.unwrap();
    assert_eq!(result.available_stock.id, 1);

    let lot = inventory
        .reserve(result.available_stock.id, request.required_quantity_kg)
        .await
        .unwrap();
    assert_eq!(lot.reserved_kg, 5.0);
    assert_eq!(lot.available_quantity_kg(), 0.0);

    // A request that rounds above the remaining milligram is short
    inventory.release(1, 0.001).await.unwrap();
    let err = matcher
        .find_closest_supplier(&create_request("Red", 0.001_000_6))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::SupplierNotFound { .. }));
}
