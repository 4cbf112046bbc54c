//! Entity models for labs, tests and prices.
//!
//! Rows are read-only from the application's point of view except for
//! [`Booking`], which is written once when a booking is confirmed.
//!
//! Joined shapes are separate types: a [`LabTestPrice`] never carries
//! embedded rows, while [`LabTestPriceWithLab`] and
//! [`LabTestPriceWithRelations`] always do. The embeds a shape needs are
//! declared through [`Entity::EMBEDS`], so asking the gateway for a shape is
//! the same as naming the join.

// Row fields mirror backend columns
#![allow(missing_docs)]

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::query::{Embed, Table};

/// A row type the gateway knows how to fetch.
pub trait Entity: DeserializeOwned + Send + 'static {
    /// Table the rows live in.
    const TABLE: Table;

    /// Relations embedded into each row of this shape.
    const EMBEDS: &'static [Embed] = &[];

    /// Primary key of the row.
    fn id(&self) -> &str;
}

/// A diagnostic service provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Display rating; no range is enforced.
    pub rating: f64,
    pub accredited: bool,
}

impl Entity for Lab {
    const TABLE: Table = Table::Labs;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A named diagnostic procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    pub preparation_instructions: String,
    pub report_time_hours: u32,
}

impl Entity for Test {
    const TABLE: Table = Table::Tests;

    fn id(&self) -> &str {
        &self.id
    }
}

/// The price and logistics at which a lab offers a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTestPrice {
    pub id: String,
    pub lab_id: String,
    pub test_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub home_collection_available: bool,
    /// Only meaningful when `home_collection_available` is set.
    #[serde(with = "rust_decimal::serde::float")]
    pub home_collection_fee: Decimal,
}

impl LabTestPrice {
    /// The fee to display next to the price, if home collection is offered.
    pub fn home_collection_annotation(&self) -> Option<Decimal> {
        self.home_collection_available.then_some(self.home_collection_fee)
    }
}

impl Entity for LabTestPrice {
    const TABLE: Table = Table::LabTestPrices;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A price row with its lab embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTestPriceWithLab {
    #[serde(flatten)]
    pub price: LabTestPrice,
    pub lab: Lab,
}

impl Entity for LabTestPriceWithLab {
    const TABLE: Table = Table::LabTestPrices;
    const EMBEDS: &'static [Embed] = &[Embed::Lab];

    fn id(&self) -> &str {
        &self.price.id
    }
}

/// A price row with both its lab and its test embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTestPriceWithRelations {
    #[serde(flatten)]
    pub price: LabTestPrice,
    pub lab: Lab,
    pub test: Test,
}

impl Entity for LabTestPriceWithRelations {
    const TABLE: Table = Table::LabTestPrices;
    const EMBEDS: &'static [Embed] = &[Embed::Lab, Embed::Test];

    fn id(&self) -> &str {
        &self.price.id
    }
}

/// The five collection windows a booking may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "07:00")]
    H07,
    #[serde(rename = "08:00")]
    H08,
    #[serde(rename = "09:00")]
    H09,
    #[serde(rename = "10:00")]
    H10,
    #[serde(rename = "11:00")]
    H11,
}

impl TimeSlot {
    /// Every slot in chronological order.
    pub const ALL: [TimeSlot; 5] = [
        TimeSlot::H07,
        TimeSlot::H08,
        TimeSlot::H09,
        TimeSlot::H10,
        TimeSlot::H11,
    ];

    /// Slot value, the start of the window (`"09:00"`).
    pub fn value(&self) -> &'static str {
        match self {
            TimeSlot::H07 => "07:00",
            TimeSlot::H08 => "08:00",
            TimeSlot::H09 => "09:00",
            TimeSlot::H10 => "10:00",
            TimeSlot::H11 => "11:00",
        }
    }

    /// Human-readable window.
    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::H07 => "7:00 AM - 8:00 AM",
            TimeSlot::H08 => "8:00 AM - 9:00 AM",
            TimeSlot::H09 => "9:00 AM - 10:00 AM",
            TimeSlot::H10 => "10:00 AM - 11:00 AM",
            TimeSlot::H11 => "11:00 AM - 12:00 PM",
        }
    }

    /// Parses a slot value. Anything outside the five known values is `None`.
    pub fn parse(value: &str) -> Option<TimeSlot> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.value() == value)
    }
}

/// A confirmed booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub price_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub home_collection: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Entity for Booking {
    const TABLE: Table = Table::Bookings;

    fn id(&self) -> &str {
        &self.id
    }
}
