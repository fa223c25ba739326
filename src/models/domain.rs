use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supplier primary key
pub type SupplierId = i64;

/// Stock lot primary key
pub type StockId = i64;

/// Filament material categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "material_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialType {
    Pla,
    Abs,
    Petg,
    Tpu,
    Nylon,
    Asa,
    Pc,
    Hips,
    Pva,
    Wood,
    CarbonFiber,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Pla => "PLA",
            MaterialType::Abs => "ABS",
            MaterialType::Petg => "PETG",
            MaterialType::Tpu => "TPU",
            MaterialType::Nylon => "NYLON",
            MaterialType::Asa => "ASA",
            MaterialType::Pc => "PC",
            MaterialType::Hips => "HIPS",
            MaterialType::Pva => "PVA",
            MaterialType::Wood => "WOOD",
            MaterialType::CarbonFiber => "CARBON_FIBER",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components finite and within their geographic ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Filament supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "isVerified", default)]
    pub verified: bool,
    #[serde(rename = "isActive", default = "default_true")]
    pub active: bool,
}

impl Supplier {
    /// Location, if both coordinates are known
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Buyer-facing view; `None` when the supplier has no known location
    pub fn summary(&self) -> Option<SupplierSummary> {
        let location = self.coordinates()?;
        Some(SupplierSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }
}

fn default_true() -> bool { true }

/// One supplier's stock of a single material/color combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockLot {
    pub id: StockId,
    #[serde(rename = "supplierId")]
    pub supplier_id: SupplierId,
    #[serde(rename = "materialType")]
    pub material_type: MaterialType,
    pub color: String,
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    #[serde(rename = "reservedKg", default)]
    pub reserved_kg: f64,
    #[serde(rename = "isAvailable", default = "default_true")]
    pub available: bool,
    #[serde(rename = "lastRestockedAt", default)]
    pub last_restocked_at: Option<DateTime<Utc>>,
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StockLot {
    /// Quantity not yet committed to any reservation
    pub fn available_quantity_kg(&self) -> f64 {
        self.quantity_kg - self.reserved_kg
    }
}

/// Supplier fields exposed to buyers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSummary {
    pub id: SupplierId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Stock fields exposed to buyers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub id: StockId,
    #[serde(rename = "materialType")]
    pub material_type: MaterialType,
    pub color: String,
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    #[serde(rename = "reservedKg")]
    pub reserved_kg: f64,
    #[serde(rename = "availableQuantityKg")]
    pub available_quantity_kg: f64,
}

impl From<&StockLot> for StockSummary {
    fn from(lot: &StockLot) -> Self {
        Self {
            id: lot.id,
            material_type: lot.material_type,
            color: lot.color.clone(),
            quantity_kg: lot.quantity_kg,
            reserved_kg: lot.reserved_kg,
            available_quantity_kg: lot.available_quantity_kg(),
        }
    }
}

/// Eligible supplier/stock pair with its distance from the buyer
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierCandidate {
    pub supplier: SupplierSummary,
    pub stock_id: StockId,
    pub distance_km: f64,
}

/// Catalog query parameters
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub material_type: MaterialType,
    pub color: String,
    pub required_kg: f64,
    pub origin: Coordinates,
    pub limit: usize,
}
