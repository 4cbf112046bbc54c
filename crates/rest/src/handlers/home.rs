//! Landing page handler.

use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// A highlighted selling point.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    /// Short heading.
    pub title: &'static str,
    /// One-sentence description.
    pub description: &'static str,
}

/// A featured health package.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    /// Package name.
    pub name: &'static str,
    /// Parameter count as displayed.
    pub parameters: &'static str,
    /// Starting price in rupees.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Where the search for this package starts.
    pub search_href: String,
}

/// A navigation link.
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    /// Link text.
    pub label: &'static str,
    /// Target path.
    pub href: &'static str,
}

/// What the landing page renders.
#[derive(Debug, Clone, Serialize)]
pub struct LandingView {
    /// Hero heading.
    pub headline: &'static str,
    /// Hero sub-heading.
    pub tagline: &'static str,
    /// Placeholder of the hero search box.
    pub search_placeholder: &'static str,
    /// Where the hero search submits.
    pub search_action: &'static str,
    /// Selling points.
    pub features: Vec<Feature>,
    /// Popular packages.
    pub packages: Vec<Package>,
    /// Primary navigation.
    pub navigation: Vec<NavLink>,
}

/// Builds the landing page.
pub fn landing_view() -> LandingView {
    let package = |name: &'static str, parameters: &'static str, price: i64, query: &str| Package {
        name,
        parameters,
        price: Decimal::from(price),
        search_href: format!("/search?q={}", query),
    };

    LandingView {
        headline: "Find and Compare Lab Tests Near You",
        tagline: "Compare prices, book appointments, and get your tests done from the most trusted labs in your area.",
        search_placeholder: "Search for tests (e.g., Blood Sugar, Thyroid Profile)",
        search_action: "/search",
        features: vec![
            Feature {
                title: "Trusted Labs",
                description: "All labs are verified and accredited for quality assurance",
            },
            Feature {
                title: "Quick Results",
                description: "Get your test results quickly and securely online",
            },
            Feature {
                title: "Home Collection",
                description: "Convenient home sample collection at your preferred time",
            },
        ],
        packages: vec![
            package("Complete Health Checkup", "70+ Parameters", 1999, "Full%20Body"),
            package("Diabetes Screening", "15+ Parameters", 799, "Diabetes"),
            package("Thyroid Profile", "3 Parameters", 599, "Thyroid"),
        ],
        navigation: vec![
            NavLink {
                label: "Home",
                href: "/",
            },
            NavLink {
                label: "Search Tests",
                href: "/search",
            },
            NavLink {
                label: "Labs",
                href: "/labs",
            },
        ],
    }
}

/// Handler for the landing page.
///
/// # HTTP Request
///
/// `GET [base]/`
pub async fn home_handler() -> Json<LandingView> {
    debug!("Rendering landing page");
    Json(landing_view())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_view_content() {
        let view = landing_view();
        assert_eq!(view.features.len(), 3);
        assert_eq!(view.packages.len(), 3);
        assert_eq!(view.packages[1].price, Decimal::from(799));
        assert!(view.navigation.iter().any(|link| link.href == "/search"));
    }
}
