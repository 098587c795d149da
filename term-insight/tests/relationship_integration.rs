//! Integration tests for cross-dataset relationship discovery.

use term_insight::core::{CellValue, ConfidenceLevel, DataSet};
use term_insight::relationships::{
    find_relationships, Cardinality, MatchType, RelationshipConfig, RelationshipEngine,
};

fn customers() -> DataSet {
    let rows = (1..=60)
        .map(|i| vec![CellValue::from(i as f64), CellValue::from(format!("Customer {i}"))])
        .collect();
    DataSet::new("customers", vec!["customer_id".into(), "name".into()], rows).unwrap()
}

/// 120 orders, two per customer, each for one of ten products.
fn orders() -> DataSet {
    let rows = (0..120)
        .map(|i| {
            vec![
                CellValue::from(format!("o-{i}")),
                CellValue::from((i % 60 + 1) as f64),
                CellValue::from(format!("p-{}", i % 10 + 1)),
                CellValue::from((i % 4) as f64 * 25.0),
            ]
        })
        .collect();
    DataSet::new(
        "orders",
        vec![
            "order_id".into(),
            "cust_id".into(),
            "product_id".into(),
            "amount".into(),
        ],
        rows,
    )
    .unwrap()
}

fn products() -> DataSet {
    let rows = (1..=10)
        .map(|i| vec![CellValue::from(format!("p-{i}")), CellValue::from((i % 3) as f64)])
        .collect();
    DataSet::new("products", vec!["product_id".into(), "price_band".into()], rows).unwrap()
}

#[test]
fn test_star_schema_is_discovered() {
    let report = find_relationships(&[customers(), orders(), products()]);
    assert_eq!(report.relationships.len(), 2);

    let product = &report.relationships[0];
    assert_eq!(product.source_dataset, "orders");
    assert_eq!(product.target_dataset, "products");
    assert_eq!(product.match_type, MatchType::Exact);
    assert_eq!(product.cardinality, Cardinality::ManyToOne);
    assert_eq!(product.statistics.matched_count, 10);
    assert_eq!(product.confidence, 90.0);
    assert_eq!(product.confidence_level, ConfidenceLevel::High);

    let customer = &report.relationships[1];
    assert_eq!(customer.source_column, "customer_id");
    assert_eq!(customer.target_column, "cust_id");
    assert_eq!(customer.match_type, MatchType::Fuzzy);
    assert_eq!(customer.cardinality, Cardinality::OneToMany);
    assert_eq!(customer.statistics.match_percentage, 100.0);
    assert_eq!(customer.confidence, 80.0);
    assert_eq!(customer.confidence_level, ConfidenceLevel::Medium);

    assert!(report.orphan_analysis.is_empty());
    assert!(report.best_between("customers", "products").is_none());
}

#[test]
fn test_summary_and_diagram() {
    let report = find_relationships(&[customers(), orders(), products()]);

    assert_eq!(
        report.summary,
        "Found 2 relationship(s) across 2 dataset pair(s)\n\
         - orders and products: 1 relationship(s), best confidence 90%\n\
         - customers and orders: 1 relationship(s), best confidence 80%"
    );
    let lines: Vec<&str> = report.diagram.lines().collect();
    assert_eq!(lines[0], "orders <-> products");
    assert_eq!(
        lines[1],
        "  orders.product_id --[many_to_one, exact, 90%]--> products.product_id"
    );
    assert_eq!(lines[2], "customers <-> orders");
}

fn coded(name: &str, column: &str, codes: impl Iterator<Item = usize>) -> DataSet {
    let rows = codes
        .map(|c| vec![CellValue::from(format!("INV-{c}"))])
        .collect();
    DataSet::new(name, vec![column.into()], rows).unwrap()
}

#[test]
fn test_shared_suffix_with_overlapping_values() {
    let invoices = coded("invoices", "invoice_code", 1..=20);
    let payments = coded("payments", "voucher_code", 1..=20);

    let report = find_relationships(&[invoices.clone(), payments.clone()]);
    let rel = report.best_between("payments", "invoices").unwrap();
    assert_eq!(rel.match_type, MatchType::ValueOverlap);
    assert_eq!(rel.cardinality, Cardinality::OneToOne);
    assert_eq!(rel.confidence, 50.0);
    assert_eq!(rel.confidence_level, ConfidenceLevel::Low);

    let strict = RelationshipEngine::with_config(RelationshipConfig::default().with_min_confidence(60.0));
    assert!(strict.find(&[invoices, payments]).relationships.is_empty());
}

#[test]
fn test_mostly_unmatched_keys_explain_themselves() {
    let invoices = coded("invoices", "invoice_code", 1..=20);
    let archive = coded("archive", "invoice_code", 15..=60);

    let report = find_relationships(&[invoices, archive]);
    let orphans = &report.orphan_analysis[0];
    assert_eq!(orphans.source_orphan_count, 14);
    assert_eq!(orphans.target_orphan_count, 40);
    assert_eq!(orphans.source_samples.len(), 5);
    assert!(orphans.reasons.iter().any(|r| r.contains("may be unrelated")));

    // 6 of 20 matched: 70 - 10 for the overlap band
    assert_eq!(report.relationships[0].confidence, 60.0);
}

#[test]
fn test_fewer_than_two_datasets() {
    let report = find_relationships(&[]);
    assert!(report.relationships.is_empty());
    assert!(report.diagram.is_empty());
    assert_eq!(
        report.summary,
        "Relationship discovery needs at least 2 datasets; 0 provided"
    );
}

#[test]
fn test_report_serializes_to_json() {
    let report = find_relationships(&[customers(), orders()]);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["relationships"][0]["cardinality"], "one_to_many");
    assert_eq!(json["relationships"][0]["match_type"], "fuzzy");
    assert_eq!(json["relationships"][0]["statistics"]["matched_count"], 60);
}
