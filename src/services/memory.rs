use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::core::{
    catalog::{CatalogError, SupplierCatalog},
    distance::haversine_distance,
    filters::{is_eligible_supplier, matches_stock_criteria},
    ledger::{apply_release, apply_reserve, validate_quantity, LedgerError, StockLedger},
    matcher::compare_candidates,
};
use crate::models::{CandidateQuery, StockId, StockLot, Supplier, SupplierCandidate, SupplierId};

/// In-process supplier catalog and stock ledger
///
/// Every lot sits behind its own mutex, so reservations on one lot are
/// serialized while different lots never contend. The outer maps are only
/// write-locked when records are loaded.
#[derive(Default)]
pub struct InMemoryInventory {
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
    lots: RwLock<HashMap<StockId, Arc<Mutex<StockLot>>>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a supplier record
    pub async fn upsert_supplier(&self, supplier: Supplier) {
        self.suppliers.write().await.insert(supplier.id, supplier);
    }

    /// Insert or replace a stock lot
    pub async fn upsert_stock(&self, lot: StockLot) {
        self.lots
            .write()
            .await
            .insert(lot.id, Arc::new(Mutex::new(lot)));
    }

    #[cfg(test)]
    async fn remove_stock(&self, stock_id: StockId) -> Option<StockLot> {
        let handle = self.lots.write().await.remove(&stock_id)?;
        let lot = handle.lock().await.clone();
        Some(lot)
    }

    async fn lot_handle(&self, stock_id: StockId) -> Option<Arc<Mutex<StockLot>>> {
        self.lots.read().await.get(&stock_id).cloned()
    }

    async fn snapshot_lots(&self) -> Vec<StockLot> {
        let handles: Vec<Arc<Mutex<StockLot>>> = self.lots.read().await.values().cloned().collect();

        let mut lots = Vec::with_capacity(handles.len());
        for handle in handles {
            lots.push(handle.lock().await.clone());
        }
        lots
    }
}

#[async_trait]
impl SupplierCatalog for InMemoryInventory {
    async fn find_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<SupplierCandidate>, CatalogError> {
        let lots = self.snapshot_lots().await;
        let suppliers = self.suppliers.read().await;

        let mut candidates: Vec<SupplierCandidate> = lots
            .iter()
            .filter(|lot| matches_stock_criteria(lot, query))
            .filter_map(|lot| {
                let supplier = suppliers.get(&lot.supplier_id)?;
                if !is_eligible_supplier(supplier) {
                    return None;
                }

                let summary = supplier.summary()?;
                let distance_km = haversine_distance(
                    query.origin.latitude,
                    query.origin.longitude,
                    summary.latitude,
                    summary.longitude,
                );

                Some(SupplierCandidate {
                    supplier: summary,
                    stock_id: lot.id,
                    distance_km,
                })
            })
            .collect();

        candidates.sort_by(compare_candidates);
        candidates.truncate(query.limit);

        Ok(candidates)
    }

    async fn find_stock(&self, stock_id: StockId) -> Result<Option<StockLot>, CatalogError> {
        match self.lot_handle(stock_id).await {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StockLedger for InMemoryInventory {
    async fn reserve(&self, stock_id: StockId, quantity_kg: f64) -> Result<StockLot, LedgerError> {
        validate_quantity(quantity_kg)?;
        let handle = self
            .lot_handle(stock_id)
            .await
            .ok_or_else(|| LedgerError::unknown_stock(stock_id))?;

        let mut lot = handle.lock().await;
        apply_reserve(&mut lot, quantity_kg)?;

        tracing::debug!(
            "Reserved {} kg from lot {} ({} of {} kg reserved)",
            quantity_kg,
            stock_id,
            lot.reserved_kg,
            lot.quantity_kg
        );

        Ok(lot.clone())
    }

    async fn release(&self, stock_id: StockId, quantity_kg: f64) -> Result<StockLot, LedgerError> {
        validate_quantity(quantity_kg)?;
        let handle = self
            .lot_handle(stock_id)
            .await
            .ok_or_else(|| LedgerError::unknown_stock(stock_id))?;

        let mut lot = handle.lock().await;
        apply_release(&mut lot, quantity_kg)?;

        tracing::debug!(
            "Released {} kg back to lot {} ({} of {} kg reserved)",
            quantity_kg,
            stock_id,
            lot.reserved_kg,
            lot.quantity_kg
        );

        Ok(lot.clone())
    }

    async fn stock_lot(&self, stock_id: StockId) -> Result<Option<StockLot>, LedgerError> {
        Ok(self.find_stock(stock_id).await?)
    }
}
