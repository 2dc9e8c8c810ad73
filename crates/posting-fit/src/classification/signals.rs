use std::collections::BTreeMap;

use super::domain::{ClassificationInput, CompanyType, SignalKind, SignalResult};
use super::tables::{ClassifierTables, CuratedMatch};

/// Matches needed for a keyword-count signal to reach full strength.
const SATURATION: f64 = 3.0;

pub(crate) fn collect_signals(
    tables: &ClassifierTables,
    input: &ClassificationInput,
) -> BTreeMap<SignalKind, SignalResult> {
    let mut signals = BTreeMap::new();
    signals.insert(SignalKind::CuratedList, curated_list(tables, &input.company));
    signals.insert(SignalKind::NameKeywords, name_keywords(tables, &input.company));
    signals.insert(
        SignalKind::DomainKeywords,
        domain_keywords(tables, &input.domain_keywords),
    );
    signals.insert(
        SignalKind::JobContent,
        job_content(
            tables,
            input.job_title.as_deref(),
            input.job_description.as_deref(),
        ),
    );
    signals
}

pub(crate) fn name_keywords(tables: &ClassifierTables, company: &str) -> SignalResult {
    let hardware = tables.hardware_indicators().matched(company);
    let software = tables.software_indicators().matched(company);

    let (company_type, score) = match (hardware.is_empty(), software.is_empty()) {
        (false, true) => (CompanyType::Hardware, 1.0),
        (true, false) => (CompanyType::Software, 1.0),
        (false, false) => (CompanyType::Both, 0.8),
        (true, true) => return SignalResult::unknown(),
    };

    let evidence = hardware
        .into_iter()
        .chain(software)
        .map(str::to_string)
        .collect();
    SignalResult::new(company_type, score, evidence)
}

pub(crate) fn curated_list(tables: &ClassifierTables, company: &str) -> SignalResult {
    match tables.curated_match(company) {
        Some(CuratedMatch::Exact {
            company_type,
            entry,
        }) => SignalResult::new(company_type, 1.0, vec![format!("exact:{entry}")]),
        Some(CuratedMatch::Partial {
            company_type,
            entry,
        }) => SignalResult::new(company_type, 0.9, vec![format!("partial:{entry}")]),
        None => SignalResult::unknown(),
    }
}

pub(crate) fn domain_keywords(tables: &ClassifierTables, keywords: &[String]) -> SignalResult {
    let hardware: Vec<&str> = keywords
        .iter()
        .map(String::as_str)
        .filter(|keyword| tables.hardware_indicators().matches(keyword))
        .collect();
    let software: Vec<&str> = keywords
        .iter()
        .map(String::as_str)
        .filter(|keyword| tables.software_indicators().matches(keyword))
        .collect();

    majority(hardware, software)
}

pub(crate) fn job_content(
    tables: &ClassifierTables,
    title: Option<&str>,
    description: Option<&str>,
) -> SignalResult {
    let text = [title, description]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let hardware = tables.hardware_indicators().matched(&text);
    let software = tables.software_indicators().matched(&text);

    majority(hardware, software)
}

/// More matches wins; a non-zero tie means both. Strength grows with the winning count.
fn majority(hardware: Vec<&str>, software: Vec<&str>) -> SignalResult {
    let (company_type, winning) = match hardware.len().cmp(&software.len()) {
        std::cmp::Ordering::Greater => (CompanyType::Hardware, hardware.len()),
        std::cmp::Ordering::Less => (CompanyType::Software, software.len()),
        std::cmp::Ordering::Equal if hardware.is_empty() => return SignalResult::unknown(),
        std::cmp::Ordering::Equal => (CompanyType::Both, hardware.len()),
    };

    let evidence = hardware
        .into_iter()
        .chain(software)
        .map(str::to_string)
        .collect();
    SignalResult::new(company_type, winning as f64 / SATURATION, evidence)
}

/// Weighted vote across signals: returns the winning type and the summed weight of the
/// signals that voted for it. Ties go to the type backed by the heaviest signal.
pub(crate) fn combine(signals: &BTreeMap<SignalKind, SignalResult>) -> (CompanyType, f64) {
    let mut tallies: BTreeMap<CompanyType, (f64, f64, f64)> = BTreeMap::new();

    for (kind, signal) in signals {
        if signal.company_type == CompanyType::Unknown || signal.score <= 0.0 {
            continue;
        }
        let entry = tallies.entry(signal.company_type).or_insert((0.0, 0.0, 0.0));
        entry.0 += kind.weight() * signal.score;
        entry.1 += kind.weight();
        entry.2 = entry.2.max(kind.weight());
    }

    let winner = tallies.into_iter().max_by(|(_, left), (_, right)| {
        left.0
            .total_cmp(&right.0)
            .then_with(|| left.2.total_cmp(&right.2))
    });

    match winner {
        Some((company_type, (_, agreement, _))) => (company_type, round_confidence(agreement)),
        None => (CompanyType::Unknown, 0.0),
    }
}

fn round_confidence(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, 1.0)
}
