//! Administrative seed catalog.
//!
//! The Jaipur catalog used for local demos and by the `seed-labs` binary.
//! Identifiers are derived from names so a reseed produces the same ids.

#![allow(missing_docs)]

use rust_decimal::Decimal;
use tracing::info;

use crate::core::QueryBackend;
use crate::error::StorageResult;
use crate::gateway::Gateway;
use crate::models::{Lab, LabTestPrice, Test};

/// Labs, tests and prices to insert together.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    pub labs: Vec<Lab>,
    pub tests: Vec<Test>,
    pub prices: Vec<LabTestPrice>,
}

/// Counts of rows written by [`SeedCatalog::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub labs: usize,
    pub tests: usize,
    pub prices: usize,
}

impl SeedCatalog {
    /// Inserts labs, then tests, then prices.
    pub async fn apply<B: QueryBackend>(&self, gateway: &Gateway<B>) -> StorageResult<SeedReport> {
        let labs: Vec<Lab> = gateway.insert(&self.labs).await?;
        for lab in &labs {
            info!(lab = %lab.name, "Inserted lab");
        }
        let tests: Vec<Test> = gateway.insert(&self.tests).await?;
        let prices: Vec<LabTestPrice> = gateway.insert(&self.prices).await?;

        Ok(SeedReport {
            labs: labs.len(),
            tests: tests.len(),
            prices: prices.len(),
        })
    }

    /// Looks up a seeded lab by name.
    pub fn lab(&self, name: &str) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.name == name)
    }
}

/// Turns a display name into an id fragment: `"Dr. Lal PathLabs"` -> `"dr-lal-pathlabs"`.
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

struct LabSeed {
    name: &'static str,
    address: &'static str,
    rating: f64,
    accredited: bool,
    home_collection_fee: Option<i64>,
    offers: &'static [(&'static str, i64)],
}

struct TestSeed {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    parameters: &'static [&'static str],
    preparation: &'static str,
    report_time_hours: u32,
}

const LABS: &[LabSeed] = &[
    LabSeed {
        name: "Pathkind Labs",
        address: "Raja Park, Jaipur",
        rating: 4.4,
        accredited: true,
        home_collection_fee: Some(199),
        offers: &[
            ("Full Body Checkup", 999),
            ("Blood Sugar", 199),
            ("Liver Function Test", 599),
            ("Lipid Profile", 699),
        ],
    },
    LabSeed {
        name: "Dr. Lal PathLabs",
        address: "Malviya Nagar, Jaipur",
        rating: 4.6,
        accredited: true,
        home_collection_fee: Some(150),
        offers: &[
            ("Thyroid Test", 499),
            ("Complete Blood Count", 299),
            ("Cholesterol Test", 399),
            ("Blood Sugar", 249),
        ],
    },
    LabSeed {
        name: "Path Plus Care",
        address: "Vaishali Nagar, Jaipur",
        rating: 4.1,
        accredited: false,
        home_collection_fee: None,
        offers: &[
            ("Kidney Function Test", 899),
            ("Vitamin D Test", 699),
            ("Diabetes Panel", 1199),
            ("Thyroid Test", 449),
        ],
    },
    LabSeed {
        name: "Tata 1mg Labs",
        address: "C-Scheme, Jaipur",
        rating: 4.3,
        accredited: true,
        home_collection_fee: Some(99),
        offers: &[
            ("Iron Deficiency Test", 349),
            ("Cardiac Risk Markers", 899),
            ("Lipid Profile", 749),
            ("Complete Blood Count", 279),
        ],
    },
    LabSeed {
        name: "Redcliffe Labs",
        address: "Mansarovar, Jaipur",
        rating: 4.2,
        accredited: false,
        home_collection_fee: Some(0),
        offers: &[
            ("Full Body Checkup Advanced", 1499),
            ("Liver Panel", 799),
            ("Dengue Test", 599),
            ("Full Body Checkup", 1099),
        ],
    },
];

const TESTS: &[TestSeed] = &[
    TestSeed {
        name: "Full Body Checkup",
        category: "Health Package",
        description: "Comprehensive screening covering blood counts, sugar, liver, kidney and lipid markers.",
        parameters: &["CBC", "Fasting Blood Sugar", "LFT", "KFT", "Lipid Profile"],
        preparation: "Fast for 10-12 hours before sample collection.",
        report_time_hours: 24,
    },
    TestSeed {
        name: "Full Body Checkup Advanced",
        category: "Health Package",
        description: "Extended package adding thyroid, vitamin and iron studies to the full body checkup.",
        parameters: &[
            "CBC",
            "HbA1c",
            "LFT",
            "KFT",
            "Lipid Profile",
            "Thyroid Profile",
            "Vitamin D",
            "Vitamin B12",
            "Iron Studies",
        ],
        preparation: "Fast for 10-12 hours before sample collection.",
        report_time_hours: 48,
    },
    TestSeed {
        name: "Blood Sugar",
        category: "Diabetes",
        description: "Measures glucose in the blood to screen for and monitor diabetes.",
        parameters: &["Fasting Blood Sugar"],
        preparation: "Fast for 8-10 hours. Water is allowed.",
        report_time_hours: 6,
    },
    TestSeed {
        name: "Liver Function Test",
        category: "Liver",
        description: "Checks enzymes, proteins and bilirubin that reflect how well the liver is working.",
        parameters: &["SGOT", "SGPT", "ALP", "Bilirubin", "Albumin"],
        preparation: "No special preparation required.",
        report_time_hours: 12,
    },
    TestSeed {
        name: "Liver Panel",
        category: "Liver",
        description: "Extended liver assessment including GGT and total protein.",
        parameters: &["SGOT", "SGPT", "ALP", "GGT", "Bilirubin", "Total Protein"],
        preparation: "No special preparation required.",
        report_time_hours: 24,
    },
    TestSeed {
        name: "Thyroid Test",
        category: "Hormones",
        description: "Evaluates thyroid gland function through circulating hormone levels.",
        parameters: &["T3", "T4", "TSH"],
        preparation: "No fasting required. Morning samples preferred.",
        report_time_hours: 12,
    },
    TestSeed {
        name: "Complete Blood Count",
        category: "Hematology",
        description: "Counts red cells, white cells and platelets to screen for infection and anaemia.",
        parameters: &["Hemoglobin", "RBC", "WBC", "Platelets", "Hematocrit"],
        preparation: "No special preparation required.",
        report_time_hours: 6,
    },
    TestSeed {
        name: "Cholesterol Test",
        category: "Heart",
        description: "Measures total cholesterol in the blood.",
        parameters: &["Total Cholesterol"],
        preparation: "Fast for 9-12 hours before the test.",
        report_time_hours: 12,
    },
    TestSeed {
        name: "Kidney Function Test",
        category: "Kidney",
        description: "Assesses how well the kidneys filter waste from the blood.",
        parameters: &["Urea", "Creatinine", "Uric Acid", "BUN", "Electrolytes"],
        preparation: "No special preparation required.",
        report_time_hours: 12,
    },
    TestSeed {
        name: "Vitamin D Test",
        category: "Vitamins",
        description: "Measures 25-hydroxy vitamin D to detect deficiency.",
        parameters: &["25-OH Vitamin D"],
        preparation: "No special preparation required.",
        report_time_hours: 24,
    },
    TestSeed {
        name: "Diabetes Panel",
        category: "Diabetes",
        description: "Combined fasting, post-meal and long-term glucose markers.",
        parameters: &["Fasting Blood Sugar", "Post Prandial Blood Sugar", "HbA1c"],
        preparation: "Fast for 8-10 hours. A second sample is taken two hours after a meal.",
        report_time_hours: 24,
    },
    TestSeed {
        name: "Iron Deficiency Test",
        category: "Hematology",
        description: "Evaluates iron stores and transport to detect deficiency.",
        parameters: &["Serum Iron", "TIBC", "Ferritin", "Transferrin Saturation"],
        preparation: "Fasting morning sample preferred.",
        report_time_hours: 24,
    },
    TestSeed {
        name: "Cardiac Risk Markers",
        category: "Heart",
        description: "Markers associated with cardiovascular risk beyond a routine lipid profile.",
        parameters: &["hs-CRP", "Lipoprotein(a)", "Homocysteine", "Apo A1", "Apo B"],
        preparation: "Fast for 10-12 hours before sample collection.",
        report_time_hours: 48,
    },
    TestSeed {
        name: "Lipid Profile",
        category: "Heart",
        description: "Breaks down cholesterol and triglycerides to assess heart health.",
        parameters: &["Total Cholesterol", "HDL", "LDL", "VLDL", "Triglycerides"],
        preparation: "Fast for 10-12 hours before the test.",
        report_time_hours: 12,
    },
    TestSeed {
        name: "Dengue Test",
        category: "Infection",
        description: "Detects dengue antigen and antibodies in suspected fever cases.",
        parameters: &["NS1 Antigen", "IgG", "IgM"],
        preparation: "No special preparation required.",
        report_time_hours: 12,
    },
];

/// The Jaipur catalog: five labs, their tests and prices.
pub fn jaipur_catalog() -> SeedCatalog {
    let tests: Vec<Test> = TESTS
        .iter()
        .map(|seed| Test {
            id: format!("test-{}", slug(seed.name)),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            category: seed.category.to_string(),
            parameters: seed.parameters.iter().map(|p| p.to_string()).collect(),
            preparation_instructions: seed.preparation.to_string(),
            report_time_hours: seed.report_time_hours,
        })
        .collect();

    let mut labs = Vec::with_capacity(LABS.len());
    let mut prices = Vec::new();
    for seed in LABS {
        let lab_id = format!("lab-{}", slug(seed.name));
        for (test_name, price) in seed.offers {
            let test_id = format!("test-{}", slug(test_name));
            prices.push(LabTestPrice {
                id: format!("price-{}-{}", slug(seed.name), slug(test_name)),
                lab_id: lab_id.clone(),
                test_id,
                price: Decimal::from(*price),
                home_collection_available: seed.home_collection_fee.is_some(),
                home_collection_fee: Decimal::from(seed.home_collection_fee.unwrap_or(0)),
            });
        }
        labs.push(Lab {
            id: lab_id,
            name: seed.name.to_string(),
            address: seed.address.to_string(),
            city: "Jaipur".to_string(),
            rating: seed.rating,
            accredited: seed.accredited,
        });
    }

    SeedCatalog {
        labs,
        tests,
        prices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Dr. Lal PathLabs"), "dr-lal-pathlabs");
        assert_eq!(slug("Tata 1mg Labs"), "tata-1mg-labs");
        assert_eq!(slug("Lipoprotein(a) "), "lipoprotein-a");
    }

    #[test]
    fn test_every_price_references_known_rows() {
        let catalog = jaipur_catalog();
        let labs: HashSet<_> = catalog.labs.iter().map(|l| l.id.as_str()).collect();
        let tests: HashSet<_> = catalog.tests.iter().map(|t| t.id.as_str()).collect();

        for price in &catalog.prices {
            assert!(labs.contains(price.lab_id.as_str()), "{}", price.lab_id);
            assert!(tests.contains(price.test_id.as_str()), "{}", price.test_id);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let catalog = jaipur_catalog();
        let ids: HashSet<_> = catalog.prices.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.prices.len());
    }

    #[test]
    fn test_lab_without_home_collection_has_no_fee() {
        let catalog = jaipur_catalog();
        let lab = catalog.lab("Path Plus Care").unwrap();
        assert!(
            catalog
                .prices
                .iter()
                .filter(|p| p.lab_id == lab.id)
                .all(|p| !p.home_collection_available && p.home_collection_fee.is_zero())
        );
    }
}
