//! Content rule engine
//!
//! Annotations are first reduced to a list of signals, the signals become
//! findings, and a final pass reclassifies findings whose meaning depends on
//! co-occurring signals (people shown together with clothing).

use aplus_core::{Finding, FindingCode, RemoteServiceError, Severity, VisionAnnotations};
use serde_json::json;

use super::RuleFindings;

/// Objects that never count as a product
const NON_PRODUCT_OBJECTS: &[&str] = &["Human", "Person", "Mannequin", "Clothing"];
const PEOPLE_OBJECTS: &[&str] = &["Human", "Person", "Mannequin"];
const CLOTHING_OBJECTS: &[&str] = &["Clothing", "Apparel"];
const FOOTWEAR_KEYWORDS: &[&str] = &["shoe", "footwear"];

const CLOTHING_ON_MODEL_MESSAGE: &str = "For adult clothing, show the product on a standing model. For children's clothing, show the product flat.";

/// What the annotations say about the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSignal {
    Text,
    Logo,
    /// Number of product-like detections
    MultipleProducts(usize),
    /// Names of detected people or mannequins, in detection order
    People(Vec<String>),
    Clothing,
    Footwear,
}

/// Reduce annotations to signals, in rule order.
pub fn detect_signals(annotations: &VisionAnnotations) -> Vec<ContentSignal> {
    let mut signals = Vec::new();

    if !annotations.text_annotations.is_empty() {
        signals.push(ContentSignal::Text);
    }
    if !annotations.logo_annotations.is_empty() {
        signals.push(ContentSignal::Logo);
    }

    // Counts detections, not distinct names: two "Shoe" boxes are two units
    let products = annotations
        .object_names()
        .filter(|name| !NON_PRODUCT_OBJECTS.contains(name))
        .count();
    if products > 1 {
        signals.push(ContentSignal::MultipleProducts(products));
    }

    let people: Vec<String> = annotations
        .object_names()
        .filter(|name| PEOPLE_OBJECTS.contains(name))
        .map(str::to_string)
        .collect();
    if !people.is_empty() {
        signals.push(ContentSignal::People(people));
    }

    if annotations
        .object_names()
        .any(|name| CLOTHING_OBJECTS.contains(&name))
    {
        signals.push(ContentSignal::Clothing);
    }

    if annotations.object_names().any(|name| {
        let lower = name.to_lowercase();
        FOOTWEAR_KEYWORDS.iter().any(|k| lower.contains(k))
    }) {
        signals.push(ContentSignal::Footwear);
    }

    signals
}

fn finding_for(signal: &ContentSignal) -> Option<Finding> {
    let finding = match signal {
        ContentSignal::Text => Finding::issue(
            FindingCode::TextDetected,
            "No text, logos, watermarks, or other graphics are allowed on the main product image.",
        ),
        ContentSignal::Logo => Finding::issue(
            FindingCode::LogoDetected,
            "No brand logos, trademarks, or watermarks are allowed on the main product image.",
        ),
        ContentSignal::MultipleProducts(_) => Finding::issue(
            FindingCode::MultipleProducts,
            "Show only one unit of the product in the main image.",
        ),
        ContentSignal::People(names) => Finding::issue(
            FindingCode::MannequinDetected,
            "Do not show mannequins or models in the main product image (except for adult clothing).",
        )
        .with_details(json!({ "detected": names.join(", ") })),
        ContentSignal::Clothing => return None,
        ContentSignal::Footwear => Finding::warning(
            FindingCode::ShoeOrientation,
            "For shoes, show a single shoe facing left at a 45-degree angle.",
        ),
    };
    Some(finding)
}

/// Interpret the annotations of one image into content findings.
///
/// A mannequin finding that co-occurs with clothing is reclassified to a
/// warning with clothing guidance. It stays in the issues list, so it still
/// fails compliance.
pub fn interpret(annotations: &VisionAnnotations) -> RuleFindings {
    let signals = detect_signals(annotations);
    let mut findings = RuleFindings::default();
    for finding in signals.iter().filter_map(finding_for) {
        findings.push(finding);
    }

    if signals.contains(&ContentSignal::Clothing) {
        findings.issues = findings
            .issues
            .into_iter()
            .map(|finding| {
                if finding.code == FindingCode::MannequinDetected {
                    finding.reclassified(CLOTHING_ON_MODEL_MESSAGE, Severity::Warning)
                } else {
                    finding
                }
            })
            .collect();
    }

    findings
}

/// Warning emitted when the annotation call fails for any reason
pub fn vision_error(error: &RemoteServiceError) -> RuleFindings {
    tracing::warn!(error = %error, "Vision annotation failed, content rules skipped");
    let mut findings = RuleFindings::default();
    findings.push(Finding::warning(
        FindingCode::VisionApiError,
        "Could not complete all image validations due to an API error.",
    ));
    findings
}
